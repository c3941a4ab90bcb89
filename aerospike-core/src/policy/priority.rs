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

/// `Priority` of transactions, used for throttling transactions right before
/// sending them to the server.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Priority {
    /// Default determines that the server defines the priority.
    Default,

    /// Low determines that the command is run in a background thread.
    Low,

    /// Medium determines that the command is run at medium priority.
    Medium,

    /// High determines that the command is run at the highest priority.
    High,
}

impl Default for Priority {
    fn default() -> Priority {
        Priority::Default
    }
}
