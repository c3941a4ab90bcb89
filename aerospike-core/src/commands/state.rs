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

//! The single CAS state word shared by a command's attempt loop and the
//! `TimeoutQueue` ticker (spec §3, §4.5, §9 "thread-safety by CAS on one word").

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Mutex;

use aerospike_rt::time::Instant;

/// Terminal and transient states of a single command attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandState {
    InProgress = 0,
    Success = 1,
    FailTotalTimeout = 2,
    FailNetworkInit = 3,
    FailNetworkError = 4,
    FailApplicationInit = 5,
    FailApplicationError = 6,
    FailSocketTimeout = 7,
    FailQueueError = 8,
}

impl CommandState {
    const fn from_u8(v: u8) -> Self {
        match v {
            0 => CommandState::InProgress,
            1 => CommandState::Success,
            2 => CommandState::FailTotalTimeout,
            3 => CommandState::FailNetworkInit,
            4 => CommandState::FailNetworkError,
            5 => CommandState::FailApplicationInit,
            6 => CommandState::FailApplicationError,
            7 => CommandState::FailSocketTimeout,
            _ => CommandState::FailQueueError,
        }
    }

    /// Whether this is a terminal state that releases the bound connection by closing it
    /// (as opposed to returning it to the pool).
    pub const fn closes_connection(self) -> bool {
        matches!(
            self,
            CommandState::FailNetworkInit
                | CommandState::FailNetworkError
                | CommandState::FailTotalTimeout
                | CommandState::FailSocketTimeout
        )
    }
}

/// State shared between a command's attempt loop and the `TimeoutQueue`. One instance
/// per *attempt*; `AsyncCommand::Retry` creates a fresh `CommandShared` per spec's
/// "clone carries forward iteration/commandSentCounter/totalWatch" rule, see
/// `CommandShared::for_retry`.
#[derive(Debug)]
pub struct CommandShared {
    state: AtomicU8,
    /// Set by the I/O side whenever a receive event is observed; cleared by the ticker.
    event_received: AtomicBool,
    /// Restarted every attempt; read by the ticker to detect idle sockets.
    socket_deadline: Mutex<Option<Instant>>,
    /// Fixed once per logical command (survives retries); `None` disables the check.
    total_deadline: Option<Instant>,
    /// 1-based attempt counter.
    iteration: AtomicU32,
    /// Incremented on `sendComplete`, never on enqueue. Drives in-doubt accounting.
    command_sent_counter: AtomicU32,
    is_write: bool,
}

impl CommandShared {
    pub fn new(total_deadline: Option<Instant>, is_write: bool) -> Self {
        CommandShared {
            state: AtomicU8::new(CommandState::InProgress as u8),
            event_received: AtomicBool::new(false),
            socket_deadline: Mutex::new(None),
            total_deadline,
            iteration: AtomicU32::new(1),
            command_sent_counter: AtomicU32::new(0),
            is_write,
        }
    }

    /// Build the shared state for a retried attempt, carrying `iteration` and
    /// `commandSentCounter` forward (spec §4.5 `Retry()`/`CloneCommand()`).
    pub fn for_retry(&self) -> Self {
        CommandShared {
            state: AtomicU8::new(CommandState::InProgress as u8),
            event_received: AtomicBool::new(false),
            socket_deadline: Mutex::new(None),
            total_deadline: self.total_deadline,
            iteration: AtomicU32::new(self.iteration.load(Ordering::Relaxed) + 1),
            command_sent_counter: AtomicU32::new(self.command_sent_counter.load(Ordering::Relaxed)),
            is_write: self.is_write,
        }
    }

    pub fn state(&self) -> CommandState {
        CommandState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The only way `state` ever changes: a CAS away from `InProgress`.
    pub fn try_transition(&self, to: CommandState) -> bool {
        self.state
            .compare_exchange(
                CommandState::InProgress as u8,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub fn iteration(&self) -> u32 {
        self.iteration.load(Ordering::Relaxed)
    }

    pub fn command_sent_counter(&self) -> u32 {
        self.command_sent_counter.load(Ordering::Relaxed)
    }

    /// Called exactly once per attempt, after all request bytes have left the local
    /// buffer (`sendComplete`, not `send`-enqueue).
    pub fn mark_sent(&self) {
        self.command_sent_counter.fetch_add(1, Ordering::Relaxed);
    }

    pub const fn is_write(&self) -> bool {
        self.is_write
    }

    pub fn total_deadline(&self) -> Option<Instant> {
        self.total_deadline
    }

    /// Restart the idle-socket stopwatch; called at the start of every attempt and
    /// whenever a receive event arrives.
    pub fn restart_socket_watch(&self, timeout: std::time::Duration) {
        *self.socket_deadline.lock().unwrap() = Some(Instant::now() + timeout);
        self.event_received.store(false, Ordering::Release);
    }

    pub fn clear_socket_watch(&self) {
        *self.socket_deadline.lock().unwrap() = None;
    }

    pub fn socket_deadline(&self) -> Option<Instant> {
        *self.socket_deadline.lock().unwrap()
    }

    /// The smaller of whatever's left of the total deadline and the *current* socket
    /// deadline, read fresh on every call rather than captured once. Used to bound each
    /// individual read on the wire so a multi-chunk response that keeps making progress is
    /// judged against a deadline the ticker has kept restarting, not a single static budget
    /// computed before the first byte arrived.
    pub fn remaining_budget(&self) -> Option<std::time::Duration> {
        let now = Instant::now();
        let total_left = self
            .total_deadline
            .map(|deadline| if now >= deadline { std::time::Duration::from_millis(0) } else { deadline - now });
        let socket_left = self
            .socket_deadline()
            .map(|deadline| if now >= deadline { std::time::Duration::from_millis(0) } else { deadline - now });

        match (total_left, socket_left) {
            (Some(t), Some(s)) => Some(if t < s { t } else { s }),
            (Some(t), None) => Some(t),
            (None, Some(s)) => Some(s),
            (None, None) => None,
        }
    }

    /// Written by the I/O thread when data is observed on the wire.
    pub fn notify_event_received(&self) {
        self.event_received.store(true, Ordering::Release);
    }

    /// Read-and-clear, called once per tick by the `TimeoutQueue`.
    pub fn take_event_received(&self) -> bool {
        self.event_received.swap(false, Ordering::AcqRel)
    }

    /// `inDoubt` per spec §4.5: only for writes whose first byte left the wire, failed
    /// with a network/timeout terminal state.
    pub fn in_doubt(&self, final_state: CommandState) -> bool {
        self.is_write
            && self.command_sent_counter() > 0
            && matches!(
                final_state,
                CommandState::FailNetworkError
                    | CommandState::FailTotalTimeout
                    | CommandState::FailSocketTimeout
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_transition_wins() {
        let shared = CommandShared::new(None, false);
        assert!(shared.try_transition(CommandState::Success));
        assert!(!shared.try_transition(CommandState::FailTotalTimeout));
        assert_eq!(shared.state(), CommandState::Success);
    }

    #[test]
    fn in_doubt_requires_write_and_sent_bytes() {
        let shared = CommandShared::new(None, true);
        assert!(!shared.in_doubt(CommandState::FailNetworkError));
        shared.mark_sent();
        assert!(shared.in_doubt(CommandState::FailNetworkError));
        assert!(shared.in_doubt(CommandState::FailTotalTimeout));
        assert!(shared.in_doubt(CommandState::FailSocketTimeout));
        assert!(!shared.in_doubt(CommandState::FailApplicationError));
    }

    #[test]
    fn retry_carries_iteration_and_sent_counter_forward() {
        let shared = CommandShared::new(None, true);
        shared.mark_sent();
        shared.mark_sent();
        let retried = shared.for_retry();
        assert_eq!(retried.iteration(), 2);
        assert_eq!(retried.command_sent_counter(), 2);
        assert_eq!(retried.state(), CommandState::InProgress);
    }

    #[test]
    fn remaining_budget_is_none_with_no_deadlines() {
        let shared = CommandShared::new(None, false);
        assert!(shared.remaining_budget().is_none());
    }

    #[test]
    fn remaining_budget_picks_the_sooner_deadline() {
        let shared = CommandShared::new(Some(Instant::now() + std::time::Duration::from_secs(60)), false);
        shared.restart_socket_watch(std::time::Duration::from_millis(5));
        let budget = shared.remaining_budget().unwrap();
        assert!(budget <= std::time::Duration::from_millis(5));
    }

    #[test]
    fn remaining_budget_is_zero_past_an_elapsed_deadline() {
        let shared = CommandShared::new(Some(Instant::now() - std::time::Duration::from_millis(1)), false);
        assert_eq!(shared.remaining_budget(), Some(std::time::Duration::from_millis(0)));
    }
}
