// Copyright 2015-2018 Aerospike, Inc.
//
// Portions may be licensed to Aerospike, Inc. under one or more contributor
// license agreements.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License. You may obtain a copy of
// the License at http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the
// License for the specific language governing permissions and limitations under
// the License.

use crate::batch::BatchRead;
use crate::commands::command::CommandBehavior;
use crate::commands::multi_command::{self, FramingMode};
use crate::errors::{Error, Result};
use crate::net::Connection;
use crate::policy::BatchPolicy;

/// Requests one group's worth of keys and parses the streamed response back into the matching
/// `BatchRead`s. Driven through `AsyncCommand` exactly like `ScanCommand`, so a group gets the
/// same admission backpressure, dual-timeout enforcement and in-doubt accounting as any other
/// command; `BatchExecutor` only decides how the full batch is split into groups and how many
/// of them run concurrently.
pub struct BatchReadCommand<'a> {
    policy: &'a BatchPolicy,
    pub batch_reads: Vec<BatchRead>,
}

impl<'a> BatchReadCommand<'a> {
    pub fn new(policy: &'a BatchPolicy, batch_reads: Vec<BatchRead>) -> Self {
        BatchReadCommand {
            policy,
            batch_reads,
        }
    }
}

#[async_trait::async_trait]
impl<'a> CommandBehavior for BatchReadCommand<'a> {
    fn write_buffer(&mut self, conn: &mut Connection) -> Result<()> {
        conn.buffer.set_batch_read(self.policy, &self.batch_reads)?;
        conn.buffer.write_timeout(self.policy.socket_timeout());
        Ok(())
    }

    async fn parse_response(&mut self, conn: &mut Connection) -> Result<()> {
        let batch_reads = &mut self.batch_reads;
        multi_command::drain(conn, FramingMode::Batch, |parsed| {
            let index = parsed
                .batch_index
                .ok_or_else(|| Error::BadResponse("batch record missing index".to_string()))?;
            let read = batch_reads
                .get_mut(index)
                .ok_or_else(|| Error::BadResponse("batch index out of range".to_string()))?;

            // The server echoes the digest of the key it is answering rather than repeating
            // the key itself; a mismatch means the response is desynchronized from the
            // request (a corrupted or out-of-order stream) and must not be trusted.
            if digest_mismatch(&read.key.digest, &parsed.key.digest) {
                return Err(Error::BadResponse(format!(
                    "batch response digest mismatch at index {index}"
                )));
            }

            read.record = parsed.record;
            Ok(())
        })
        .await
    }
}

fn digest_mismatch(expected: &[u8; 20], actual: &[u8; 20]) -> bool {
    expected != actual
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_digests_are_accepted() {
        let digest = [7u8; 20];
        assert!(!digest_mismatch(&digest, &digest));
    }

    #[test]
    fn mismatched_digests_are_rejected() {
        let mut other = [7u8; 20];
        other[0] = 1;
        assert!(digest_mismatch(&[7u8; 20], &other));
    }
}
