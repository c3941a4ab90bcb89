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

//! The `Client` facade: owns the long-lived engine components (`BufferPool`, `Scheduler`,
//! `TimeoutQueue`) a command needs and exposes the key-value operations built on top of
//! `AsyncCommand`. The full typed put/get surface, secondary-index queries, UDF execution and
//! index/truncate administration are out of scope; see the individual methods below for what
//! remains.

use std::sync::Arc;

use crate::batch::{BatchExecutor, BatchRead};
use crate::cluster::{Cluster, Node};
use crate::commands::{
    AsyncCommand, CommandBehavior, DeleteCommand, ExistsCommand, ReadCommand, ScanCommand,
    TouchCommand, WriteCommand,
};
use crate::errors::{CommandError, Error, Result};
use crate::net::{BufferPool, Scheduler, TimeoutQueue};
use crate::policy::{BatchPolicy, ClientPolicy, Policy, ReadPolicy, ScanPolicy, WritePolicy};
use crate::{Bin, Bins, Key, Record, ToHosts};

/// Instantiate a client for an Aerospike cluster and run commands against it.
///
/// A `Client` owns the admission/timeout machinery (`BufferPool`, `Scheduler`, `TimeoutQueue`)
/// that every command built on `AsyncCommand` needs, so it should be constructed once and
/// shared (e.g. behind an `Arc`) rather than rebuilt per call.
pub struct Client {
    cluster: Arc<Cluster>,
    scheduler: Scheduler,
    timeout_queue: Arc<TimeoutQueue>,
}

impl Client {
    /// Connect to an Aerospike cluster using the given seed hosts.
    pub async fn new(policy: &ClientPolicy, hosts: &str) -> Result<Self> {
        let hosts = hosts.to_hosts()?;
        let cluster = Cluster::new(policy.clone(), &hosts).await?;

        let pool = BufferPool::new(policy.async_max_commands);
        let scheduler = Scheduler::new(
            pool,
            policy.scheduling_mode,
            policy.async_max_commands_in_queue,
        );

        let timeout_queue = Arc::new(TimeoutQueue::new());
        timeout_queue.spawn_ticker(policy.timeout_tick_interval);

        Ok(Client {
            cluster,
            scheduler,
            timeout_queue,
        })
    }

    /// Close all connections to the cluster.
    pub async fn close(&self) -> Result<()> {
        self.cluster.close().await;
        Ok(())
    }

    /// Names of the nodes this client is configured with.
    pub fn node_names(&self) -> Vec<String> {
        self.cluster
            .nodes()
            .iter()
            .map(|n| n.name().to_string())
            .collect()
    }

    /// The nodes this client is configured with.
    pub fn nodes(&self) -> Vec<Arc<Node>> {
        self.cluster.nodes()
    }

    fn run<'a, B>(
        &'a self,
        policy: &'a (dyn Policy + Send + Sync),
        behavior: B,
    ) -> AsyncCommand<'a, B>
    where
        B: CommandBehavior,
    {
        AsyncCommand::new(
            self.cluster.clone(),
            policy,
            &self.scheduler,
            &self.timeout_queue,
            behavior,
        )
    }

    /// Fetch a single record, optionally restricted to a subset of bins.
    pub async fn get(
        &self,
        policy: &ReadPolicy,
        key: &Key,
        bins: Bins,
    ) -> std::result::Result<Record, CommandError> {
        let command = ReadCommand::new(policy, key, bins);
        let result = self.run(policy, command).execute().await?;
        Ok(result
            .record
            .expect("a successful read without an error always carries a record"))
    }

    /// Fetch multiple records in one batch, fanning out across the cluster with bounded
    /// concurrency.
    pub async fn batch_get(
        &self,
        policy: &BatchPolicy,
        batch_reads: Vec<BatchRead>,
    ) -> Result<Vec<BatchRead>> {
        let executor =
            BatchExecutor::new(self.cluster.clone(), &self.scheduler, &self.timeout_queue);
        executor.execute_batch_read(policy, batch_reads).await
    }

    /// Write record bin(s).
    pub async fn put(
        &self,
        policy: &WritePolicy,
        key: &Key,
        bins: &[Bin<'_>],
    ) -> std::result::Result<(), CommandError> {
        let command = WriteCommand::new(policy, key, bins);
        self.run(policy, command).execute().await?;
        Ok(())
    }

    /// Delete a record, reporting whether it existed before the delete.
    pub async fn delete(
        &self,
        policy: &WritePolicy,
        key: &Key,
    ) -> std::result::Result<bool, CommandError> {
        let command = DeleteCommand::new(policy, key);
        let result = self.run(policy, command).execute().await?;
        Ok(result.existed)
    }

    /// Refresh a record's TTL without touching its bins.
    pub async fn touch(
        &self,
        policy: &WritePolicy,
        key: &Key,
    ) -> std::result::Result<(), CommandError> {
        let command = TouchCommand::new(policy, key);
        self.run(policy, command).execute().await?;
        Ok(())
    }

    /// Check whether a record exists without fetching its bins.
    pub async fn exists(
        &self,
        policy: &ReadPolicy,
        key: &Key,
    ) -> std::result::Result<bool, CommandError> {
        let command = ExistsCommand::new(policy, key);
        let result = self.run(policy, command).execute().await?;
        Ok(result.exists)
    }

    /// Scan every record of a namespace/set. There is no partition map in this client, so the
    /// scan is run against every configured node in turn and the streamed records flattened.
    pub async fn scan(
        &self,
        policy: &ScanPolicy,
        namespace: &str,
        set_name: &str,
        bins: Bins,
    ) -> std::result::Result<Vec<Record>, CommandError> {
        let mut records = Vec::new();
        let task_id = rand::random::<u64>();
        for _ in &self.cluster.nodes() {
            let command = ScanCommand::new(policy, namespace, set_name, bins.clone(), task_id);
            let result = self.run(policy, command).execute().await?;
            records.extend(result.records);
        }
        Ok(records)
    }
}

impl From<CommandError> for Error {
    fn from(err: CommandError) -> Self {
        err.cause
    }
}
