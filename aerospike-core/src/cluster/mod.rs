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

//! Minimal Node/Cluster adapter (spec §4.8: "interface only"). Node discovery, cluster
//! tending, and partition-map maintenance are explicitly out of scope; this adapter resolves
//! a target node for a command from a fixed, statically-configured set of seed hosts.

pub mod node;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub use self::node::Node;

use crate::errors::{Error, Result};
use crate::net::Host;
use crate::policy::ClientPolicy;

/// Holds the fixed set of cluster members the client was configured with and hands out a
/// target `Node` for each command (spec §4.8 `GetNode`).
#[derive(Debug)]
pub struct Cluster {
    client_policy: ClientPolicy,
    nodes: Vec<Arc<Node>>,
    node_index: AtomicUsize,
}

impl Cluster {
    /// Build a cluster adapter from a fixed list of seed hosts. No network round trip is made
    /// here; nodes open connections lazily on first use.
    pub async fn new(policy: ClientPolicy, hosts: &[Host]) -> Result<Arc<Self>> {
        if hosts.is_empty() {
            return Err(Error::InvalidNode("no seed hosts configured".to_string()));
        }

        let nodes = hosts
            .iter()
            .map(|host| Arc::new(Node::new(policy.clone(), host.clone())))
            .collect();

        Ok(Arc::new(Cluster {
            client_policy: policy,
            nodes,
            node_index: AtomicUsize::new(0),
        }))
    }

    pub const fn client_policy(&self) -> &ClientPolicy {
        &self.client_policy
    }

    pub fn nodes(&self) -> Vec<Arc<Node>> {
        self.nodes.clone()
    }

    /// Round-robins over the configured nodes, skipping any a prior `Backoff` marked inactive.
    /// Real partition-aware key routing is out of scope for this adapter.
    pub fn get_node(&self) -> Result<Arc<Node>> {
        let len = self.nodes.len();
        for _ in 0..len {
            let i = self.node_index.fetch_add(1, Ordering::Relaxed) % len;
            let node = &self.nodes[i];
            if node.is_active() {
                node.validate_error_count()?;
                return Ok(node.clone());
            }
        }
        Err(Error::InvalidNode("no active node available".to_string()))
    }

    pub async fn close(&self) {
        // Nodes close their connection pools individually; nothing to tear down at the
        // cluster level since there is no tend task to stop.
    }
}
