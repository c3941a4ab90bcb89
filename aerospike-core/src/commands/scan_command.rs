// Copyright 2015-2018 Aerospike, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::commands::command::CommandBehavior;
use crate::commands::multi_command::{self, FramingMode};
use crate::errors::Result;
use crate::net::Connection;
use crate::policy::ScanPolicy;
use crate::{Bins, Record};

/// Streams every record in a namespace/set off one node. There is no partition map in this
/// client, so a scan against the cluster is the caller issuing one `ScanCommand` per node
/// (see `Client::scan`) rather than this type itself fanning out.
pub struct ScanCommand<'a> {
    pub records: Vec<Record>,
    policy: &'a ScanPolicy,
    namespace: &'a str,
    set_name: &'a str,
    bins: Bins,
    task_id: u64,
}

impl<'a> ScanCommand<'a> {
    pub fn new(
        policy: &'a ScanPolicy,
        namespace: &'a str,
        set_name: &'a str,
        bins: Bins,
        task_id: u64,
    ) -> Self {
        ScanCommand {
            records: Vec::new(),
            policy,
            namespace,
            set_name,
            bins,
            task_id,
        }
    }
}

#[async_trait::async_trait]
impl<'a> CommandBehavior for ScanCommand<'a> {
    fn write_buffer(&mut self, conn: &mut Connection) -> Result<()> {
        conn.buffer.set_scan(
            self.policy,
            self.namespace,
            self.set_name,
            &self.bins,
            self.task_id,
        )?;
        conn.buffer.write_timeout(self.policy.socket_timeout());
        Ok(())
    }

    async fn parse_response(&mut self, conn: &mut Connection) -> Result<()> {
        let records = &mut self.records;
        multi_command::drain(conn, FramingMode::Stream, |parsed| {
            if let Some(record) = parsed.record {
                records.push(record);
            }
            Ok(())
        })
        .await
    }
}
