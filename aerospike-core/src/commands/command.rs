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

//! The `AsyncCommand` state machine: a single engine, generic over a `CommandBehavior`, that
//! owns the per-attempt retry loop, the CAS state word, and in-doubt accounting. Concrete
//! commands (`ReadCommand`, `WriteCommand`, ...) only ever implement `CommandBehavior`.

use std::sync::Arc;

use aerospike_rt::time::{Duration, Instant};

use crate::cluster::{Cluster, Node};
use crate::commands::state::{CommandShared, CommandState};
use crate::errors::{CommandError, CommandErrorKind, Error, Result};
use crate::net::{Connection, PooledConnection, Scheduler, TimeoutQueue};
use crate::policy::Policy;
use crate::ResultCode;

/// The per-command hooks the engine calls into. Everything about retrying, CAS state, and
/// in-doubt bookkeeping is handled once, here, rather than in each implementor.
#[async_trait::async_trait]
pub trait CommandBehavior: Send {
    /// Serialize the request into `conn.buffer`.
    fn write_buffer(&mut self, conn: &mut Connection) -> Result<()>;

    /// Consume the response already available on `conn` (header, then body as needed).
    async fn parse_response(&mut self, conn: &mut Connection) -> Result<()>;

    /// Whether this command ever writes to the server; drives in-doubt accounting.
    fn is_write(&self) -> bool {
        false
    }

    /// Invoked exactly once, before the failure is reported to the caller, when a write is
    /// judged in-doubt.
    fn on_in_doubt(&mut self) {}

    /// Per-result-code override of the default keep/close decision for the connection that
    /// produced `err` (`KeepConnection()`). `None` defers to the engine's default, which
    /// closes on network/timeout failures and a bad parse, and keeps the connection open for
    /// anything else (a well-formed server response the caller just didn't like).
    fn should_keep_connection_on_error(&self, _err: &Error) -> Option<bool> {
        None
    }
}

/// Drives one logical command against a cluster, retrying according to the policy's retry
/// budget until success or a terminal failure.
pub struct AsyncCommand<'a, B: CommandBehavior> {
    cluster: Arc<Cluster>,
    policy: &'a (dyn Policy + Send + Sync),
    scheduler: &'a Scheduler,
    timeout_queue: &'a TimeoutQueue,
    behavior: B,
}

impl<'a, B: CommandBehavior> AsyncCommand<'a, B> {
    pub fn new(
        cluster: Arc<Cluster>,
        policy: &'a (dyn Policy + Send + Sync),
        scheduler: &'a Scheduler,
        timeout_queue: &'a TimeoutQueue,
        behavior: B,
    ) -> Self {
        AsyncCommand {
            cluster,
            policy,
            scheduler,
            timeout_queue,
            behavior,
        }
    }

    /// Run the command end to end: admission, attempt loop, retry, terminal delivery.
    pub async fn execute(mut self) -> std::result::Result<B, CommandError> {
        let total_deadline = self.policy.deadline();
        let max_attempts = self.policy.max_retries().unwrap_or(0) as u32 + 1;
        let sleep_between_retries = self
            .policy
            .sleep_between_retries()
            .unwrap_or(Duration::from_millis(0));

        // Admission: a command must hold a buffer segment before it is allowed to touch the
        // network. If admission itself fails (Reject, or Delay's queue is full) the command
        // never reaches `InProgress`.
        let segment = match self.scheduler.schedule().await {
            Ok(seg) => seg,
            Err(_) => {
                return Err(CommandError {
                    kind: CommandErrorKind::QueueError,
                    result_code: None,
                    node: None,
                    iteration: 0,
                    in_doubt: false,
                    cause: Error::CommandRejected,
                })
            }
        };

        let mut shared = Arc::new(CommandShared::new(total_deadline, self.behavior.is_write()));
        let mut last_node: Option<Arc<Node>> = None;

        loop {
            let iteration = shared.iteration();
            let outcome = self.attempt(&shared, &mut last_node).await;

            match outcome {
                Ok(()) => {
                    if shared.try_transition(CommandState::Success) {
                        self.scheduler.record_success();
                        self.scheduler.release(segment);
                        return Ok(self.behavior);
                    }
                    // The ticker beat us to a terminal transition; the caller was already (or
                    // will be) told about the total/socket timeout, so success is dropped
                    // silently rather than delivered twice.
                    self.scheduler.release(segment);
                    return Err(self.terminal_error(&shared, last_node, None));
                }
                Err(err) => {
                    let (state, retryable) = classify(&err);

                    if !shared.try_transition(state) {
                        self.scheduler.release(segment);
                        return Err(self.terminal_error(&shared, last_node, None));
                    }

                    if let Some(node) = &last_node {
                        if matches!(err, Error::ServerError(ResultCode::KeyBusy)) {
                            node.add_key_busy();
                        } else {
                            node.add_error();
                        }
                        if matches!(state, CommandState::FailSocketTimeout) {
                            node.add_timeout();
                        }
                        if !retryable {
                            node.incr_error_rate();
                        }
                    }

                    let within_deadline =
                        total_deadline.map_or(true, |deadline| Instant::now() < deadline);
                    let should_retry = retryable && iteration < max_attempts && within_deadline;

                    if !should_retry {
                        self.scheduler.record_error();
                        self.scheduler.release(segment);
                        return Err(self.terminal_error(&shared, last_node, Some(err)));
                    }

                    if sleep_between_retries > Duration::from_millis(0) {
                        aerospike_rt::sleep(sleep_between_retries).await;
                    }
                    shared = Arc::new(shared.for_retry());
                }
            }
        }
    }

    /// Build the terminal `CommandError` delivered to the caller, reading the *authoritative*
    /// state off `shared` rather than whatever the losing side locally computed - the ticker
    /// may have already written a different terminal state via CAS. `cause` is the attempt's
    /// own error when it won the transition; `None` when the ticker won it first, in which
    /// case a cause is synthesized from the winning state.
    fn terminal_error(
        &mut self,
        shared: &CommandShared,
        node: Option<Arc<Node>>,
        cause: Option<Error>,
    ) -> CommandError {
        let state = shared.state();
        let in_doubt = shared.in_doubt(state);
        if in_doubt {
            self.behavior.on_in_doubt();
        }
        let cause = cause.unwrap_or(match state {
            CommandState::FailSocketTimeout => Error::SocketTimeout,
            _ => Error::TotalTimeout,
        });
        let result_code = match &cause {
            Error::ServerError(rc) => Some(*rc),
            _ => None,
        };
        CommandError {
            kind: kind_for_state(state),
            result_code,
            node: node.map(|n| n.name().to_string()),
            iteration: shared.iteration(),
            in_doubt,
            cause,
        }
    }

    /// One attempt: resolve a node, acquire a connection, enroll in the timeout queue, write
    /// and parse. Returns `Ok(())` on success or the `Error` that should drive retry/terminal
    /// classification.
    async fn attempt(
        &mut self,
        shared: &Arc<CommandShared>,
        last_node: &mut Option<Arc<Node>>,
    ) -> std::result::Result<(), Error> {
        if shared.state() != CommandState::InProgress {
            return Err(Error::TotalTimeout);
        }

        let node = self.cluster.get_node()?;
        *last_node = Some(node.clone());

        let mut pooled = node.get_connection().await?;

        let socket_timeout = self.policy.socket_timeout();
        if let Some(timeout) = socket_timeout {
            shared.restart_socket_watch(timeout);
        }

        let tag = pooled.bind();
        // Two independent mechanisms guard against a stuck attempt: the binding tag lets a
        // late completion recognize it has been superseded, and every I/O step below is
        // itself bounded by the same deadlines the ticker enforces, so an attempt that hangs
        // observes its own timeout rather than relying solely on external cancellation.
        self.timeout_queue.enroll(
            shared.clone(),
            socket_timeout,
            {
                let shared = shared.clone();
                move || shared.clear_socket_watch()
            },
            || {},
        );

        let result = self.write_and_parse(&mut pooled, shared).await;

        match &result {
            Ok(()) => {
                node.add_bytes_in(pooled.bytes_read());
                if pooled.is_bound_to(tag) {
                    pooled.bookmark();
                }
            }
            Err(err) => {
                pooled.reset();
                let keep = self
                    .behavior
                    .should_keep_connection_on_error(err)
                    .unwrap_or_else(|| default_keep_connection(err));
                if !keep {
                    pooled.invalidate();
                }
            }
        }

        result
    }

    async fn write_and_parse(
        &mut self,
        conn: &mut PooledConnection,
        shared: &Arc<CommandShared>,
    ) -> std::result::Result<(), Error> {
        self.behavior.write_buffer(&mut *conn)?;

        let write_budget = remaining_budget(shared, self.policy.socket_timeout());
        run_with_budget(conn.flush(), write_budget, shared).await?;
        shared.mark_sent();
        shared.notify_event_received();

        // `parse_response` may read many chunks off the wire (a scan or batch stream); rather
        // than bound the whole call by one budget computed now, `Connection` recomputes its
        // own budget fresh before each individual read and restarts it on every byte of
        // progress, so a slow-but-advancing response is never mistaken for a stuck one.
        conn.watch_progress(shared.clone());
        let result = self.behavior.parse_response(&mut *conn).await;
        conn.clear_progress_watch();
        result?;

        Ok(())
    }
}

/// The smaller of whatever's left of the total deadline and the per-attempt socket timeout;
/// `None` means this step is unbounded.
fn remaining_budget(shared: &CommandShared, socket_timeout: Option<Duration>) -> Option<Duration> {
    let total_left = shared.total_deadline().map(|deadline| {
        let now = Instant::now();
        if now >= deadline {
            Duration::from_millis(0)
        } else {
            deadline - now
        }
    });

    match (total_left, socket_timeout) {
        (Some(t), Some(s)) => Some(if t < s { t } else { s }),
        (Some(t), None) => Some(t),
        (None, Some(s)) => Some(s),
        (None, None) => None,
    }
}

async fn run_with_budget<F, T>(
    fut: F,
    budget: Option<Duration>,
    shared: &CommandShared,
) -> std::result::Result<T, Error>
where
    F: std::future::Future<Output = std::result::Result<T, Error>>,
{
    match budget {
        Some(d) => match aerospike_rt::timeout(d, fut).await {
            Ok(inner) => inner,
            Err(_) => Err(timeout_error(shared)),
        },
        None => fut.await,
    }
}

/// Whichever deadline actually expired: the total deadline takes precedence so a command
/// that blew its total budget is never misreported as a mere socket timeout.
fn timeout_error(shared: &CommandShared) -> Error {
    match shared.total_deadline() {
        Some(deadline) if Instant::now() >= deadline => Error::TotalTimeout,
        _ => Error::SocketTimeout,
    }
}

/// The engine's default connection keep/close rule: network and timeout failures close the
/// bound connection since its state can no longer be trusted, a decode failure always forces
/// a close since the stream itself is desynchronized, and everything else (a well-formed
/// server response, including ones the caller treats as an error) keeps it.
fn default_keep_connection(err: &Error) -> bool {
    if matches!(err, Error::BadResponse(_)) {
        return false;
    }
    !classify(err).0.closes_connection()
}

/// Maps an `Error` to `(terminal CommandState, retryable)`.
fn classify(err: &Error) -> (CommandState, bool) {
    match err {
        Error::Connection(_) | Error::Io(_) => (CommandState::FailNetworkError, true),
        Error::SocketTimeout => (CommandState::FailSocketTimeout, true),
        Error::TotalTimeout => (CommandState::FailTotalTimeout, false),
        Error::Backoff(_) => (CommandState::FailNetworkError, true),
        Error::ServerError(ResultCode::Timeout | ResultCode::DeviceOverload | ResultCode::KeyBusy) => {
            (CommandState::FailApplicationError, true)
        }
        Error::ServerError(_) => (CommandState::FailApplicationError, false),
        Error::BadResponse(_) => (CommandState::FailApplicationError, false),
        Error::CommandRejected => (CommandState::FailQueueError, false),
        _ => (CommandState::FailNetworkError, false),
    }
}

const fn kind_for_state(state: CommandState) -> CommandErrorKind {
    match state {
        CommandState::FailTotalTimeout => CommandErrorKind::TotalTimeout,
        CommandState::FailNetworkInit => CommandErrorKind::NetworkInit,
        CommandState::FailNetworkError => CommandErrorKind::NetworkError,
        CommandState::FailApplicationInit => CommandErrorKind::ApplicationInit,
        CommandState::FailApplicationError => CommandErrorKind::ApplicationError,
        CommandState::FailSocketTimeout => CommandErrorKind::SocketTimeout,
        CommandState::FailQueueError | CommandState::InProgress | CommandState::Success => {
            CommandErrorKind::QueueError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_server_transient_is_retryable() {
        let (state, retryable) = classify(&Error::ServerError(ResultCode::Timeout));
        assert_eq!(state, CommandState::FailApplicationError);
        assert!(retryable);
    }

    #[test]
    fn classify_total_timeout_is_terminal() {
        let (state, retryable) = classify(&Error::TotalTimeout);
        assert_eq!(state, CommandState::FailTotalTimeout);
        assert!(!retryable);
    }

    #[test]
    fn classify_connection_error_closes_and_retries() {
        let (state, retryable) = classify(&Error::Connection("broken".into()));
        assert_eq!(state, CommandState::FailNetworkError);
        assert!(retryable);
        assert!(state.closes_connection());
    }

    #[test]
    fn classify_key_busy_is_retryable() {
        let (state, retryable) = classify(&Error::ServerError(ResultCode::KeyBusy));
        assert_eq!(state, CommandState::FailApplicationError);
        assert!(retryable);
    }

    #[test]
    fn default_keep_connection_force_closes_on_bad_response() {
        // `BadResponse` maps to `FailApplicationError`, which `closes_connection()` does not
        // include, so the force-close has to come from `default_keep_connection` itself.
        assert!(!default_keep_connection(&Error::BadResponse("desync".into())));
    }

    #[test]
    fn default_keep_connection_keeps_well_formed_server_errors() {
        assert!(default_keep_connection(&Error::ServerError(ResultCode::KeyNotFoundError)));
    }

    #[test]
    fn default_keep_connection_closes_network_errors() {
        assert!(!default_keep_connection(&Error::Connection("broken".into())));
    }

    #[test]
    fn timeout_error_prefers_total_timeout_when_it_has_elapsed() {
        let shared = CommandShared::new(Some(Instant::now() - Duration::from_millis(1)), false);
        assert!(matches!(timeout_error(&shared), Error::TotalTimeout));
    }

    #[test]
    fn timeout_error_falls_back_to_socket_timeout() {
        let shared = CommandShared::new(Some(Instant::now() + Duration::from_secs(60)), false);
        assert!(matches!(timeout_error(&shared), Error::SocketTimeout));

        let no_total_deadline = CommandShared::new(None, false);
        assert!(matches!(timeout_error(&no_total_deadline), Error::SocketTimeout));
    }
}
