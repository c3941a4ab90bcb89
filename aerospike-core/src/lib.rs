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

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::checked_conversions,
    clippy::copy_iterator,
    clippy::fallible_impl_from,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::too_many_lines,
    unknown_lints,
    clippy::unseparated_literal_suffix,
    clippy::unused_self,
    clippy::use_self,
    clippy::missing_errors_doc
)]

//! A pure-Rust async command engine for an Aerospike-family key-value store. Records are
//! addressed by namespace/set/key, operations travel over a length-prefixed binary wire
//! protocol, and every command is admitted through a bounded `BufferPool` before it is allowed
//! to touch the network (see `commands::command::AsyncCommand`).
//!
//! The full typed put/get operate surface, secondary-index queries, UDF execution and
//! cluster-tending/partition-map maintenance are out of scope; `Client` exposes a small
//! get/put/delete/touch/exists/batch-get/scan surface built on the shared command engine.

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub use batch::{BatchExecutor, BatchRead};
pub use bin::{Bin, Bins};
pub use client::Client;
pub use cluster::Node;
pub use commands::particle_type::ParticleType;
pub use errors::{CommandError, CommandErrorKind, Error, Result};
pub use key::Key;
pub use net::{Host, SchedulingMode, ToHosts};
pub use policy::{
    BasePolicy, BatchPolicy, ClientPolicy, CommitLevel, Concurrency, ConsistencyLevel,
    Expiration, GenerationPolicy, Policy, PolicyLike, Priority, ReadPolicy, ReadTouchTTL,
    RecordExistsAction, ScanPolicy, WritePolicy,
};
pub use record::Record;
pub use result_code::ResultCode;
pub use value::{FloatValue, Value};

pub mod errors;
#[macro_use]
mod value;
#[macro_use]
mod bin;
#[macro_use]
mod key;
mod batch;
mod client;
mod cluster;
mod commands;
mod net;
pub mod policy;
mod record;
mod result_code;

#[cfg(test)]
extern crate hex;
