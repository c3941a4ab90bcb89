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

use std::sync::Arc;

use crate::batch::BatchRead;
use crate::cluster::Cluster;
use crate::commands::{AsyncCommand, BatchReadCommand};
use crate::errors::{Error, Result};
use crate::net::{Scheduler, TimeoutQueue};
use crate::policy::{BatchPolicy, Concurrency};

/// Splits a batch into groups and runs each group as an `AsyncCommand<BatchReadCommand>`, so
/// every group gets the same admission, retry and dual-timeout handling as any other command.
/// There is no partition map in this client, so "one group per node" from the original design
/// becomes "one group per slot", where the number of slots is the effective concurrency the
/// policy asks for.
pub struct BatchExecutor<'a> {
    cluster: Arc<Cluster>,
    scheduler: &'a Scheduler,
    timeout_queue: &'a TimeoutQueue,
}

impl<'a> BatchExecutor<'a> {
    pub const fn new(
        cluster: Arc<Cluster>,
        scheduler: &'a Scheduler,
        timeout_queue: &'a TimeoutQueue,
    ) -> Self {
        BatchExecutor {
            cluster,
            scheduler,
            timeout_queue,
        }
    }

    pub async fn execute_batch_read(
        &self,
        policy: &BatchPolicy,
        batch_reads: Vec<BatchRead>,
    ) -> Result<Vec<BatchRead>> {
        if batch_reads.is_empty() {
            return Ok(batch_reads);
        }

        let slots = effective_concurrency(policy).min(batch_reads.len());
        let groups = split(batch_reads, slots);

        let futures = groups.into_iter().map(|reads| {
            let behavior = BatchReadCommand::new(policy, reads);
            let command = AsyncCommand::new(
                self.cluster.clone(),
                policy,
                self.scheduler,
                self.timeout_queue,
                behavior,
            );
            async move { command.execute().await }
        });

        let results: std::result::Result<Vec<BatchReadCommand>, _> =
            futures::future::join_all(futures).await.into_iter().collect();

        let commands = results.map_err(Error::from)?;
        Ok(commands.into_iter().flat_map(|cmd| cmd.batch_reads).collect())
    }
}

fn effective_concurrency(policy: &BatchPolicy) -> usize {
    match policy.concurrency {
        Concurrency::Sequential => 1,
        Concurrency::Parallel => policy.max_concurrent_threads.max(1),
        Concurrency::MaxThreads(n) => n.max(1),
    }
}

fn split(batch_reads: Vec<BatchRead>, slots: usize) -> Vec<Vec<BatchRead>> {
    let slots = slots.max(1);
    let mut groups: Vec<Vec<BatchRead>> = (0..slots).map(|_| Vec::new()).collect();
    for (i, read) in batch_reads.into_iter().enumerate() {
        groups[i % slots].push(read);
    }
    groups.retain(|g| !g.is_empty());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bins, Key};

    fn reads(n: usize) -> Vec<BatchRead> {
        (0..n)
            .map(|i| BatchRead::new(Key::new("ns", "set", (i as i64).into()).unwrap(), Bins::All))
            .collect()
    }

    #[test]
    fn split_never_exceeds_requested_slots() {
        let groups = split(reads(7), 3);
        assert!(groups.len() <= 3);
        assert_eq!(groups.iter().map(Vec::len).sum::<usize>(), 7);
    }

    #[test]
    fn split_drops_empty_groups_when_slots_outnumber_keys() {
        let groups = split(reads(2), 5);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.len() == 1));
    }

    #[test]
    fn effective_concurrency_maps_policy_modes() {
        let mut policy = BatchPolicy::default();
        policy.concurrency = Concurrency::Sequential;
        assert_eq!(effective_concurrency(&policy), 1);

        policy.concurrency = Concurrency::MaxThreads(4);
        assert_eq!(effective_concurrency(&policy), 4);
    }
}
