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

//! Policy types encapsulate optional parameters for various client operations.
#![allow(clippy::missing_errors_doc)]

mod batch_policy;
mod client_policy;
mod commit_level;
mod concurrency;
mod consistency_level;
mod expiration;
mod generation_policy;
mod priority;
mod read_policy;
mod read_touch_ttl_percent;
mod record_exists_action;
mod scan_policy;
mod write_policy;

pub use self::batch_policy::BatchPolicy;
pub use self::client_policy::ClientPolicy;
pub use self::commit_level::CommitLevel;
pub use self::concurrency::Concurrency;
pub use self::consistency_level::ConsistencyLevel;
pub use self::expiration::Expiration;
pub use self::generation_policy::GenerationPolicy;
pub use self::priority::Priority;
pub use self::read_policy::ReadPolicy;
pub use self::read_touch_ttl_percent::ReadTouchTTL;
pub use self::record_exists_action::RecordExistsAction;
pub use self::scan_policy::ScanPolicy;
pub use self::write_policy::WritePolicy;

use aerospike_rt::time::{Duration, Instant};
use std::option::Option;

/// Trait implemented by most policy types; policies that implement this trait typically encompass
/// an instance of `BasePolicy`.
pub trait Policy {
    /// Transaction priority.
    fn priority(&self) -> &Priority;

    #[doc(hidden)]
    /// Deadline for current transaction based on the total timeout. For internal use only;
    /// consumed by `commands::command` to seed `CommandShared::total_deadline`.
    fn deadline(&self) -> Option<Instant>;

    /// Absolute wall-clock deadline for both client and server. Sent to the server along with
    /// the transaction in the wire protocol; fixed once per logical command and unaffected by
    /// retries. Default: no timeout.
    fn total_timeout(&self) -> Option<Duration>;

    /// Idle-socket timeout. Restarted on every attempt and on every receive event; the
    /// `TimeoutQueue` closes the connection (but does not itself notify the caller) if a
    /// connection sits idle longer than this. Default: no timeout.
    fn socket_timeout(&self) -> Option<Duration>;

    /// Maximum number of retries before aborting the current transaction. A retry may be attempted
    /// when there is a network error. If `max_retries` is exceeded, the abort will occur even if
    /// the timeout has not yet been exceeded.
    fn max_retries(&self) -> Option<usize>;

    /// Time to sleep between retries. Set to zero to skip sleep. Default: 500ms.
    fn sleep_between_retries(&self) -> Option<Duration>;

    /// How replicas should be consulted in read operations to provide the desired consistency
    /// guarantee.
    fn consistency_level(&self) -> &ConsistencyLevel;
}

#[doc(hidden)]
/// Policy-like object that encapsulates a base policy instance.
pub trait PolicyLike {
    /// Retrieve a reference to the base policy.
    fn base(&self) -> &BasePolicy;
}

impl<T> Policy for T
where
    T: PolicyLike,
{
    fn priority(&self) -> &Priority {
        self.base().priority()
    }

    fn consistency_level(&self) -> &ConsistencyLevel {
        self.base().consistency_level()
    }

    fn deadline(&self) -> Option<Instant> {
        self.base().deadline()
    }

    fn total_timeout(&self) -> Option<Duration> {
        self.base().total_timeout()
    }

    fn socket_timeout(&self) -> Option<Duration> {
        self.base().socket_timeout()
    }

    fn max_retries(&self) -> Option<usize> {
        self.base().max_retries()
    }

    fn sleep_between_retries(&self) -> Option<Duration> {
        self.base().sleep_between_retries()
    }
}

/// Common parameters shared by all policy types.
#[derive(Debug, Clone)]
pub struct BasePolicy {
    /// Priority of request relative to other transactions.
    /// Currently, only used for scans.
    /// This is deprected for Scan/Query commands and will not be sent to the server.
    pub priority: Priority,

    /// How replicas should be consulted in a read operation to provide the desired
    /// consistency guarantee. Default to allowing one replica to be used in the
    /// read operation.
    pub consistency_level: ConsistencyLevel,

    /// Absolute deadline for the whole command, survives retries. Sent to the server in the
    /// wire protocol. Default to no timeout.
    pub total_timeout: Option<Duration>,

    /// Idle-socket timeout, restarted every attempt. Default to no timeout.
    pub socket_timeout: Option<Duration>,

    /// MaxRetries determines maximum number of retries before aborting the current transaction.
    /// A retry is attempted when there is a network error other than timeout.
    /// If maxRetries is exceeded, the abort will occur even if the timeout
    /// has not yet been exceeded.
    pub max_retries: Option<usize>,

    /// SleepBetweenReplies determines duration to sleep between retries if a
    /// transaction fails and the timeout was not exceeded.  Enter zero to skip sleep.
    pub sleep_between_retries: Option<Duration>,

    /// Determines whether a record's last-update-time is reset on a read that hits a bin with
    /// a TTL, and if so by how much.
    pub read_touch_ttl: ReadTouchTTL,
}

impl Policy for BasePolicy {
    fn priority(&self) -> &Priority {
        &self.priority
    }

    fn deadline(&self) -> Option<Instant> {
        self.total_timeout.map(|timeout| Instant::now() + timeout)
    }

    fn total_timeout(&self) -> Option<Duration> {
        self.total_timeout
    }

    fn socket_timeout(&self) -> Option<Duration> {
        self.socket_timeout
    }

    fn max_retries(&self) -> Option<usize> {
        self.max_retries
    }

    fn sleep_between_retries(&self) -> Option<Duration> {
        self.sleep_between_retries
    }

    fn consistency_level(&self) -> &ConsistencyLevel {
        &self.consistency_level
    }
}

impl Default for BasePolicy {
    fn default() -> Self {
        BasePolicy {
            priority: Priority::default(),
            consistency_level: ConsistencyLevel::default(),
            total_timeout: Some(Duration::new(30, 0)),
            socket_timeout: None,
            max_retries: Some(2),
            sleep_between_retries: Some(Duration::from_millis(500)),
            read_touch_ttl: ReadTouchTTL::ServerDefault,
        }
    }
}
