// Copyright 2015-2020 Aerospike, Inc.
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

use crate::policy::{BasePolicy, PolicyLike};

/// `ScanPolicy` encapsulates optional parameters used in scan operations. Secondary-index
/// query planning and partition-aware node selection are out of scope; a scan runs against
/// every configured node in turn and streams every matching record back through
/// `MultiCommand`.
#[derive(Debug, Clone)]
pub struct ScanPolicy {
    /// Base policy instance.
    pub base_policy: BasePolicy,

    /// Percentage of records to scan, 1 to 100. Default: 100.
    pub scan_percent: u8,

    /// Terminate the scan if the cluster changes while it is in progress. Deprecated by the
    /// server and not enforced here; kept so the wire field can still be sent.
    pub fail_on_cluster_change: bool,
}

impl ScanPolicy {
    /// Create a new scan policy instance with default parameters.
    pub fn new() -> Self {
        ScanPolicy::default()
    }
}

impl Default for ScanPolicy {
    fn default() -> Self {
        ScanPolicy {
            base_policy: BasePolicy::default(),
            scan_percent: 100,
            fail_on_cluster_change: true,
        }
    }
}

impl PolicyLike for ScanPolicy {
    fn base(&self) -> &BasePolicy {
        &self.base_policy
    }
}
