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

//! A single cluster member: a connection pool plus the error/timeout/latency counters and
//! session bookkeeping the command engine (C5) consults on the retry path (spec §4.8).

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::lock::Mutex;

use crate::errors::{Error, Result};
use crate::net::{ConnectionPool, Host, PooledConnection};
use crate::policy::ClientPolicy;

const ERROR_RATE_QUARANTINE_THRESHOLD: u64 = 100;

/// A single node in the cluster adapter (spec §4.8, "interface only").
///
/// Unlike the historical tending client, this `Node` is never re-validated or refreshed: it is
/// created once from a configured seed host and lives for the lifetime of the `Cluster`. Full
/// partition-aware routing and node discovery are out of scope (see `SPEC_FULL.md` §1).
#[derive(Debug)]
pub struct Node {
    client_policy: ClientPolicy,
    name: String,
    host: Host,
    connection_pool: ConnectionPool,
    active: AtomicBool,

    errors: AtomicU64,
    timeouts: AtomicU64,
    key_busy: AtomicU64,
    bytes_in: AtomicU64,
    bytes_out: AtomicU64,
    error_rate: AtomicU64,

    session_token: Mutex<Option<String>>,
}

impl Node {
    pub(crate) fn new(client_policy: ClientPolicy, host: Host) -> Self {
        let name = host.to_string();
        Node {
            connection_pool: ConnectionPool::new(host.clone(), client_policy.clone()),
            client_policy,
            name,
            host,
            active: AtomicBool::new(true),
            errors: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            key_busy: AtomicU64::new(0),
            bytes_in: AtomicU64::new(0),
            bytes_out: AtomicU64::new(0),
            error_rate: AtomicU64::new(0),
            session_token: Mutex::new(None),
        }
    }

    /// Returns the node name (currently just the host's address string; a tending client would
    /// learn this from the server's `node` info command).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn client_policy(&self) -> &ClientPolicy {
        &self.client_policy
    }

    pub fn host(&self) -> Host {
        self.host.clone()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub(crate) fn inactivate(&self) {
        self.active.store(false, Ordering::Relaxed);
    }

    /// Acquire a pooled connection, opening a fresh one if the pool has headroom.
    pub async fn get_connection(&self) -> Result<PooledConnection> {
        self.connection_pool.get().await
    }

    pub async fn close(&mut self) {
        self.inactivate();
        self.connection_pool.close().await;
    }

    // --- error / timeout / latency counters (spec §4.8) ---

    pub fn add_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        self.error_rate.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// `KEY_BUSY` is deliberately double counted: both the generic error counter and this
    /// dedicated counter are incremented, matching the source's observability behavior.
    pub fn add_key_busy(&self) {
        self.add_error();
        self.key_busy.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bytes_in(&self, n: usize) {
        self.bytes_in.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn add_bytes_out(&self, n: usize) {
        self.bytes_out.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn timeouts(&self) -> u64 {
        self.timeouts.load(Ordering::Relaxed)
    }

    pub fn key_busy(&self) -> u64 {
        self.key_busy.load(Ordering::Relaxed)
    }

    pub fn incr_error_rate(&self) -> u64 {
        self.error_rate.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn reset_error_rate(&self) {
        self.error_rate.store(0, Ordering::Relaxed);
    }

    /// Raises `Backoff` once the node's error rate crosses the quarantine threshold.
    pub fn validate_error_count(&self) -> Result<()> {
        if self.error_rate.load(Ordering::Relaxed) >= ERROR_RATE_QUARANTINE_THRESHOLD {
            return Err(Error::Backoff(format!(
                "node {} exceeded error-rate quarantine threshold",
                self.name
            )));
        }
        Ok(())
    }

    pub async fn session_token(&self) -> Option<String> {
        self.session_token.lock().await.clone()
    }

    /// Requests re-authentication out of band; the next connection acquired for this node will
    /// authenticate again.
    pub async fn signal_login(&self) {
        *self.session_token.lock().await = None;
    }

    pub async fn set_session_token(&self, token: String) {
        *self.session_token.lock().await = Some(token);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.host)
    }
}
