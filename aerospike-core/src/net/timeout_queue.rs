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

//! Single background ticker checking enrolled commands for idle/total timeout.
//!
//! A command is re-enrolled once per attempt, by whatever opened the
//! connection for that attempt (the engine in `commands/command.rs`). An
//! entry whose `CommandShared` is no longer `InProgress` when a tick observes
//! it is dropped without being re-enqueued, matching the invariant that a
//! completed command is never scanned again.

use std::sync::{Arc, Mutex};

use aerospike_rt::time::{Duration, Instant};

use crate::commands::state::{CommandShared, CommandState};

type AbortFn = Box<dyn Fn() + Send + Sync>;
type TotalTimeoutFn = Box<dyn FnOnce() + Send>;

struct Slot {
    shared: Arc<CommandShared>,
    socket_timeout: Option<Duration>,
    abort_connection: AbortFn,
    on_total_timeout: Mutex<Option<TotalTimeoutFn>>,
}

/// The engine's single long-lived timeout worker. One instance per client.
pub struct TimeoutQueue {
    slots: Mutex<Vec<Slot>>,
}

impl TimeoutQueue {
    pub fn new() -> Self {
        TimeoutQueue {
            slots: Mutex::new(Vec::new()),
        }
    }

    /// Enroll one in-flight attempt. `abort_connection` is invoked (possibly
    /// from the ticker task) when either timeout fires, to close the bound
    /// connection and unblock any I/O stuck on it. `on_total_timeout` is the
    /// terminal user-visible callback delivered only for the total-timeout
    /// path, since the socket-timeout path leaves delivery to the I/O
    /// callback that observes the CAS loss.
    pub fn enroll(
        &self,
        shared: Arc<CommandShared>,
        socket_timeout: Option<Duration>,
        abort_connection: impl Fn() + Send + Sync + 'static,
        on_total_timeout: impl FnOnce() + Send + 'static,
    ) {
        self.slots.lock().unwrap().push(Slot {
            shared,
            socket_timeout,
            abort_connection: Box::new(abort_connection),
            on_total_timeout: Mutex::new(Some(Box::new(on_total_timeout))),
        });
    }

    /// Spawn the ticker as a background task, waking every `interval`.
    pub fn spawn_ticker(self: &Arc<Self>, interval: Duration) {
        let this = Arc::clone(self);
        aerospike_rt::spawn(async move {
            loop {
                aerospike_rt::sleep(interval).await;
                this.tick();
            }
        });
    }

    /// Scan all enrolled entries once. Total timeout is checked before socket
    /// timeout on ties; this ordering is normative (spec leaves it open, this
    /// implementation fixes it for determinism).
    pub fn tick(&self) {
        let mut slots = self.slots.lock().unwrap();
        slots.retain(|slot| self.tick_one(slot));
    }

    fn tick_one(&self, slot: &Slot) -> bool {
        if slot.shared.state() != CommandState::InProgress {
            return false;
        }

        let now = Instant::now();

        if let Some(deadline) = slot.shared.total_deadline() {
            if now >= deadline {
                if slot.shared.try_transition(CommandState::FailTotalTimeout) {
                    (slot.abort_connection)();
                    if let Some(cb) = slot.on_total_timeout.lock().unwrap().take() {
                        cb();
                    }
                }
                return false;
            }
        }

        if let Some(deadline) = slot.shared.socket_deadline() {
            if slot.shared.take_event_received() {
                if let Some(timeout) = slot.socket_timeout {
                    slot.shared.restart_socket_watch(timeout);
                }
                return true;
            }

            if now >= deadline {
                if slot.shared.try_transition(CommandState::FailSocketTimeout) {
                    (slot.abort_connection)();
                }
                return false;
            }
        }

        true
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().unwrap().len()
    }
}

impl Default for TimeoutQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[test]
    fn total_timeout_fires_and_drops_entry() {
        let queue = TimeoutQueue::new();
        let shared = Arc::new(CommandShared::new(
            Some(Instant::now() - Duration::from_millis(1)),
            false,
        ));
        let aborted = Arc::new(AtomicBool::new(false));
        let callback_fired = Arc::new(AtomicBool::new(false));

        let aborted_clone = Arc::clone(&aborted);
        let callback_clone = Arc::clone(&callback_fired);
        queue.enroll(
            Arc::clone(&shared),
            None,
            move || aborted_clone.store(true, Ordering::SeqCst),
            move || callback_clone.store(true, Ordering::SeqCst),
        );

        queue.tick();

        assert_eq!(shared.state(), CommandState::FailTotalTimeout);
        assert!(aborted.load(Ordering::SeqCst));
        assert!(callback_fired.load(Ordering::SeqCst));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn event_received_restarts_socket_watch_instead_of_firing() {
        let queue = TimeoutQueue::new();
        let shared = Arc::new(CommandShared::new(None, false));
        shared.restart_socket_watch(Duration::from_millis(1));
        shared.notify_event_received();

        let fire_count = Arc::new(AtomicUsize::new(0));
        let fire_clone = Arc::clone(&fire_count);
        queue.enroll(
            Arc::clone(&shared),
            Some(Duration::from_secs(60)),
            move || {
                fire_clone.fetch_add(1, Ordering::SeqCst);
            },
            || {},
        );

        queue.tick();

        assert_eq!(fire_count.load(Ordering::SeqCst), 0);
        assert_eq!(shared.state(), CommandState::InProgress);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn socket_timeout_fires_without_calling_total_timeout_callback() {
        let queue = TimeoutQueue::new();
        let shared = Arc::new(CommandShared::new(None, false));
        shared.restart_socket_watch(Duration::from_millis(1));
        std::thread::sleep(std::time::Duration::from_millis(5));

        let aborted = Arc::new(AtomicBool::new(false));
        let aborted_clone = Arc::clone(&aborted);
        queue.enroll(
            Arc::clone(&shared),
            Some(Duration::from_millis(1)),
            move || aborted_clone.store(true, Ordering::SeqCst),
            || panic!("total timeout callback must not fire on socket timeout"),
        );

        queue.tick();

        assert_eq!(shared.state(), CommandState::FailSocketTimeout);
        assert!(aborted.load(Ordering::SeqCst));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn already_terminal_entry_is_dropped_without_callbacks() {
        let queue = TimeoutQueue::new();
        let shared = Arc::new(CommandShared::new(
            Some(Instant::now() - Duration::from_millis(1)),
            false,
        ));
        assert!(shared.try_transition(CommandState::Success));

        queue.enroll(
            Arc::clone(&shared),
            None,
            || panic!("must not abort an already-terminal command"),
            || panic!("must not fire total timeout callback on an already-terminal command"),
        );

        queue.tick();
        assert_eq!(queue.len(), 0);
    }
}
