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

use aerospike_rt::time::Duration;

use crate::net::SchedulingMode;

/// `ClientPolicy` encapsulates parameters for client policy command.
#[derive(Debug, Clone)]
pub struct ClientPolicy {
    /// User authentication to cluster. Leave `None` for clusters running without restricted
    /// access.
    pub user_password: Option<(String, String)>,

    /// Initial host connection timeout. The timeout when opening a connection to the server
    /// host for the first time.
    pub timeout: Option<Duration>,

    /// Default socket timeout stamped onto connections opened under this policy, used by
    /// commands that don't set `BasePolicy::socket_timeout` themselves (e.g. the admin
    /// login/authenticate exchange run during connection setup).
    pub socket_timeout: Option<Duration>,

    /// Socket idle timeout. The socket is closed (and the in-flight command retried) if it sits
    /// idle longer than this. Default: no idle timeout.
    pub idle_timeout: Option<Duration>,

    /// Maximum number of synchronous connections allowed per server node.
    pub max_conns_per_node: usize,

    /// Number of connection pools per node. Defaults to 1.
    pub conn_pools_per_node: usize,

    /// Threshold at which the `Buffer` backing a connection releases its backing storage
    /// back to the allocator instead of keeping it resident for reuse.
    pub buffer_reclaim_threshold: usize,

    /// Logical name of the cluster, used to guard against split-brain connects to the wrong
    /// cluster during node validation.
    pub cluster_name: Option<String>,

    /// Number of slots in the global `BufferPool`; caps the number of commands that may be
    /// in flight across the whole client at once (`asyncMaxCommands`).
    pub async_max_commands: usize,

    /// Depth of the admission queue used by `SchedulingMode::Block` and `SchedulingMode::Delay`
    /// before the scheduler starts rejecting new commands outright.
    pub async_max_commands_in_queue: usize,

    /// Admission policy applied once `async_max_commands` is exhausted.
    pub scheduling_mode: SchedulingMode,

    /// How often the `TimeoutQueue` wakes up to check in-flight commands for expired
    /// deadlines.
    pub timeout_tick_interval: Duration,
}

impl ClientPolicy {
    /// Create a new client policy instance.
    pub fn new() -> Self {
        ClientPolicy::default()
    }
}

impl Default for ClientPolicy {
    fn default() -> ClientPolicy {
        ClientPolicy {
            user_password: None,
            timeout: Some(Duration::from_secs(30)),
            socket_timeout: Some(Duration::from_secs(30)),
            idle_timeout: Some(Duration::from_secs(5 * 60)),
            max_conns_per_node: 100,
            conn_pools_per_node: 1,
            buffer_reclaim_threshold: 65536,
            cluster_name: None,
            async_max_commands: 100,
            async_max_commands_in_queue: 0,
            scheduling_mode: SchedulingMode::Block,
            timeout_tick_interval: Duration::from_millis(1),
        }
    }
}
