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

//! Admission control in front of the `BufferPool`. A command must go through
//! the `Scheduler` to obtain a `BufferSegment` before it is allowed to touch
//! the network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use crossbeam_queue::SegQueue;
use futures::channel::oneshot;

use crate::errors::{Error, Result};
use crate::net::buffer_pool::{BufferPool, BufferSegment};

/// Default consecutive-error threshold below which `Delay` mode runs a drained
/// command inline on the releasing task rather than handing it to a worker.
const DEFAULT_INLINE_THRESHOLD: u32 = 5;

/// Admission policy applied once the `BufferPool` is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingMode {
    /// Fail synchronously with `CommandRejected` if no segment is free.
    Reject,
    /// Wait (FIFO) for a segment to be released.
    Block,
    /// Queue up to a bounded depth, draining FIFO as segments free up; beyond
    /// that depth, fail with `CommandRejected`.
    Delay,
}

enum Waiters {
    Reject,
    Block(Mutex<VecDeque<oneshot::Sender<BufferSegment>>>),
    Delay {
        queue: SegQueue<oneshot::Sender<BufferSegment>>,
        depth: AtomicU32,
        max_depth: usize,
        job_scheduled: AtomicBool,
    },
}

/// Matches pending commands to `BufferPool` slots under one of three
/// admission policies.
pub struct Scheduler {
    pool: BufferPool,
    waiters: Waiters,
    consecutive_errors: AtomicU32,
    inline_threshold: u32,
}

impl Scheduler {
    pub fn new(pool: BufferPool, mode: SchedulingMode, max_queue_depth: usize) -> Self {
        let waiters = match mode {
            SchedulingMode::Reject => Waiters::Reject,
            SchedulingMode::Block => Waiters::Block(Mutex::new(VecDeque::new())),
            SchedulingMode::Delay => Waiters::Delay {
                queue: SegQueue::new(),
                depth: AtomicU32::new(0),
                max_depth: max_queue_depth,
                job_scheduled: AtomicBool::new(false),
            },
        };
        Scheduler {
            pool,
            waiters,
            consecutive_errors: AtomicU32::new(0),
            inline_threshold: DEFAULT_INLINE_THRESHOLD,
        }
    }

    pub const fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Obtain a segment under this scheduler's admission policy.
    pub async fn schedule(&self) -> Result<BufferSegment> {
        if let Some(seg) = self.pool.acquire() {
            return Ok(seg);
        }

        match &self.waiters {
            Waiters::Reject => Err(Error::CommandRejected),
            Waiters::Block(waiters) => {
                let (tx, rx) = oneshot::channel();
                waiters.lock().unwrap().push_back(tx);
                rx.await.map_err(|_| Error::CommandRejected)
            }
            Waiters::Delay {
                queue,
                depth,
                max_depth,
                ..
            } => {
                if depth.load(Ordering::Acquire) as usize >= *max_depth {
                    return Err(Error::CommandRejected);
                }
                let (tx, rx) = oneshot::channel();
                depth.fetch_add(1, Ordering::AcqRel);
                queue.push(tx);
                self.drain_delay_queue();
                rx.await.map_err(|_| Error::CommandRejected)
            }
        }
    }

    /// Return a segment, handing it directly to a waiting command if one
    /// exists rather than pooling it back. Starvation is bounded because
    /// every release attempts a handoff before falling back to the pool.
    pub fn release(&self, seg: BufferSegment) {
        match &self.waiters {
            Waiters::Reject => self.pool.release(seg),
            Waiters::Block(waiters) => {
                let mut seg = seg;
                loop {
                    let next = waiters.lock().unwrap().pop_front();
                    match next {
                        Some(tx) => match tx.send(seg) {
                            Ok(()) => return,
                            // Receiver gone (command was cancelled); try the next waiter.
                            Err(returned) => seg = returned,
                        },
                        None => {
                            self.pool.release(seg);
                            return;
                        }
                    }
                }
            }
            Waiters::Delay { queue, depth, .. } => {
                let mut seg = seg;
                loop {
                    match queue.pop() {
                        Some(tx) => {
                            depth.fetch_sub(1, Ordering::AcqRel);
                            match tx.send(seg) {
                                Ok(()) => break,
                                Err(returned) => seg = returned,
                            }
                        }
                        None => {
                            self.pool.release(seg);
                            break;
                        }
                    }
                }
                self.drain_delay_queue();
            }
        }
    }

    /// Drain any pending `Delay` admissions against freshly pooled segments.
    /// Guarded by a CAS flag so at most one task drains at a time.
    fn drain_delay_queue(&self) {
        let Waiters::Delay {
            queue,
            depth,
            job_scheduled,
            ..
        } = &self.waiters
        else {
            return;
        };

        if job_scheduled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        while let Some(seg) = self.pool.acquire() {
            match queue.pop() {
                Some(tx) => {
                    depth.fetch_sub(1, Ordering::AcqRel);
                    if let Err(seg) = tx.send(seg) {
                        self.pool.release(seg);
                    }
                }
                None => {
                    self.pool.release(seg);
                    break;
                }
            }
        }

        job_scheduled.store(false, Ordering::Release);
    }

    pub fn record_success(&self) {
        self.consecutive_errors.store(0, Ordering::Relaxed);
    }

    pub fn record_error(&self) -> u32 {
        self.consecutive_errors.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Whether a just-drained `Delay` admission should run on the releasing
    /// task instead of being dispatched to a worker. Only meaningful in
    /// `Delay` mode; other modes never skip the thread hop.
    pub fn should_run_inline(&self) -> bool {
        matches!(self.waiters, Waiters::Delay { .. })
            && self.consecutive_errors.load(Ordering::Relaxed) < self.inline_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::buffer_pool::BufferPool;

    #[test]
    fn reject_fails_synchronously_when_pool_exhausted() {
        let scheduler = Scheduler::new(BufferPool::new(1), SchedulingMode::Reject, 0);
        let seg = futures::executor::block_on(scheduler.schedule()).unwrap();
        let err = futures::executor::block_on(scheduler.schedule());
        assert!(matches!(err, Err(Error::CommandRejected)));
        scheduler.release(seg);
    }

    #[test]
    fn delay_rejects_beyond_queue_depth() {
        let scheduler = Scheduler::new(BufferPool::new(1), SchedulingMode::Delay, 0);
        let _seg = futures::executor::block_on(scheduler.schedule()).unwrap();
        // pool is exhausted and max_queue_depth is 0, so the next admission is rejected
        // immediately rather than queued.
        let rejected = futures::executor::block_on(scheduler.schedule());
        assert!(matches!(rejected, Err(Error::CommandRejected)));
    }

    #[test]
    fn block_hands_segment_directly_to_waiter_on_release() {
        let scheduler = Scheduler::new(BufferPool::new(1), SchedulingMode::Block, 0);
        let seg = futures::executor::block_on(scheduler.schedule()).unwrap();
        let waiting = scheduler.schedule();
        futures::pin_mut!(waiting);
        scheduler.release(seg);
        let _handed_off = futures::executor::block_on(waiting).unwrap();
    }
}
