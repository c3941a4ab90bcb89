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

/// `Concurrency` determines how batch sub-commands are dispatched across nodes.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Concurrency {
    /// Issue commands sequentially, one node at a time, waiting for each to complete
    /// before moving on to the next.
    Sequential,

    /// Issue all per-node commands at once, bounded by the `BatchExecutor`'s
    /// concurrency cap.
    Parallel,

    /// Issue up to `n` per-node commands concurrently.
    MaxThreads(usize),
}

impl Default for Concurrency {
    fn default() -> Concurrency {
        Concurrency::Sequential
    }
}
