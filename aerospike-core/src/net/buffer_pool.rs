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

//! Fixed-slot buffer pool. Possession of a `BufferSegment` is the admission
//! ticket a command needs before it is allowed to touch the network (spec §4.1).
//!
//! The segment itself carries no bytes: each command's wire buffer is allocated and
//! grown independently in `commands::buffer`, the same way the teacher's connection pool
//! bounds concurrent connections without owning their read/write buffers. `BufferSegment`
//! exists purely so a slot can be counted out and back in, and so callers have a token to
//! hand to `Scheduler::release`.

use std::sync::Mutex;

use crossbeam_queue::ArrayQueue;

/// An admission ticket for one pool slot, checked out from `BufferPool::acquire` and
/// returned via `BufferPool::release`.
#[derive(Debug)]
pub struct BufferSegment {
    index: i32,
}

impl BufferSegment {
    /// Pool-relative slot index.
    pub const fn index(&self) -> i32 {
        self.index
    }
}

/// A fixed array of segments pre-allocated at startup. Admission is capped by the number
/// of free slots: `acquire()` never blocks, callers that need to wait are the
/// `Scheduler`'s job, not the pool's.
#[derive(Debug)]
pub struct BufferPool {
    free: ArrayQueue<i32>,
    capacity: usize,
    // Only used by tests/metrics to report `segments_in_pool`; not on the acquire/release
    // hot path.
    outstanding: Mutex<usize>,
}

impl BufferPool {
    /// Create a pool of `capacity` segments.
    pub fn new(capacity: usize) -> Self {
        let free = ArrayQueue::new(capacity);
        for i in 0..capacity {
            // Queue is sized to `capacity`, so this push never fails.
            let _ = free.push(i as i32);
        }
        BufferPool {
            free,
            capacity,
            outstanding: Mutex::new(0),
        }
    }

    /// Total number of pool-owned slots (`asyncMaxCommands`).
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of segments currently checked out. For tests validating the buffer
    /// conservation invariant (spec §8).
    pub fn outstanding(&self) -> usize {
        *self.outstanding.lock().unwrap()
    }

    /// Try to check out a free segment. Never blocks.
    pub fn acquire(&self) -> Option<BufferSegment> {
        let index = self.free.pop()?;
        *self.outstanding.lock().unwrap() += 1;
        Some(BufferSegment { index })
    }

    /// Return a segment to the pool.
    pub fn release(&self, seg: BufferSegment) {
        *self.outstanding.lock().unwrap() -= 1;
        // Queue was sized to `capacity` and every segment is released exactly once, so
        // this push always succeeds.
        let _ = self.free.push(seg.index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_release_conserves_capacity() {
        let pool = BufferPool::new(4);
        assert_eq!(pool.outstanding(), 0);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_eq!(pool.outstanding(), 2);
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.outstanding(), 0);
        // every pooled index must still be acquirable
        for _ in 0..4 {
            assert!(pool.acquire().is_some());
        }
        assert!(pool.acquire().is_none());
    }
}
