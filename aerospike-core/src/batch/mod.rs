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

//! Batch read fan-out. Batch write/delete/UDF operations and filter-expression-qualified
//! per-key policies are out of scope; a batch is a flat list of `BatchRead`s executed
//! through the `BatchExecutor`.

pub mod batch_executor;
pub mod batch_read;

pub use self::batch_executor::BatchExecutor;
pub use self::batch_read::BatchRead;
