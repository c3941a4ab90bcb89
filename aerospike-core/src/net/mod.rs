// Copyright 2015-2018 Aerospike, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

pub mod buffer_pool;
pub mod connection;
pub mod connection_pool;
pub mod host;
pub mod parser;
pub mod scheduler;
pub mod timeout_queue;

pub use self::buffer_pool::{BufferPool, BufferSegment};
pub use self::connection::Connection;
pub use self::connection_pool::{ConnectionPool, PooledConnection};
pub use self::host::{Host, ToHosts};
pub use self::scheduler::{Scheduler, SchedulingMode};
pub use self::timeout_queue::TimeoutQueue;
