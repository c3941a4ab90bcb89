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

use crate::commands::admin_command::AdminCommand;
use crate::commands::buffer::Buffer;
use crate::commands::state::CommandShared;
use crate::errors::{Error, Result};
use crate::policy::ClientPolicy;
#[cfg(all(any(feature = "rt-async-std"), not(feature = "rt-tokio")))]
use aerospike_rt::async_std::net::Shutdown;
#[cfg(all(any(feature = "rt-tokio"), not(feature = "rt-async-std")))]
use aerospike_rt::io::{AsyncReadExt, AsyncWriteExt};
use aerospike_rt::net::TcpStream;
use aerospike_rt::time::{Duration, Instant};
#[cfg(all(any(feature = "rt-async-std"), not(feature = "rt-tokio")))]
use futures::{AsyncReadExt, AsyncWriteExt};
use std::ops::Add;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonically increasing tag handed out to every attempt that binds this
/// connection. `reset()` bumps it so that a completion arriving for a stale
/// attempt (one the `TimeoutQueue` already gave up on) can be recognized as
/// spurious and logged rather than delivered to the wrong command.
static NEXT_BINDING: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub struct Connection {
    timeout: Option<Duration>,

    // duration after which connection is considered idle
    idle_timeout: Option<Duration>,
    idle_deadline: Option<Instant>,

    // connection object
    conn: TcpStream,

    bytes_read: usize,

    pub buffer: Buffer,

    binding: AtomicU64,

    /// Set by the engine for the duration of one attempt's `parse_response`, so each
    /// individual read on the wire can restart its idle-timeout clock as soon as it
    /// observes progress, rather than the whole multi-chunk response sharing one static
    /// budget computed before the first byte arrived.
    progress: Option<Arc<CommandShared>>,
}

impl Connection {
    pub async fn new(addr: &str, policy: &ClientPolicy) -> Result<Self> {
        let stream = aerospike_rt::timeout(Duration::from_secs(10), TcpStream::connect(addr)).await;
        if stream.is_err() {
            return Err(Error::Connection(
                "Could not open network connection".to_string(),
            ));
        }
        let mut conn = Connection {
            buffer: Buffer::new(policy.buffer_reclaim_threshold),
            bytes_read: 0,
            timeout: policy.socket_timeout,
            conn: stream.unwrap()?,
            idle_timeout: policy.idle_timeout,
            idle_deadline: policy.idle_timeout.map(|timeout| Instant::now() + timeout),
            binding: AtomicU64::new(0),
            progress: None,
        };
        conn.authenticate(&policy.user_password).await?;
        conn.refresh();
        Ok(conn)
    }

    pub async fn close(&mut self) {
        #[cfg(all(any(feature = "rt-async-std"), not(feature = "rt-tokio")))]
        let _s = self.conn.shutdown(Shutdown::Both);
        #[cfg(all(any(feature = "rt-tokio"), not(feature = "rt-async-std")))]
        let _s = self.conn.shutdown().await;
        self.reset();
    }

    /// Bind this connection to a new attempt, returning the tag that attempt must
    /// present to `is_bound_to` for any completion it delivers to be accepted.
    pub fn bind(&self) -> u64 {
        let tag = NEXT_BINDING.fetch_add(1, Ordering::Relaxed);
        self.binding.store(tag, Ordering::Release);
        tag
    }

    /// Invalidate the current binding, e.g. after the `TimeoutQueue` gives up on the
    /// in-flight attempt. Any I/O that later completes for the old tag is spurious.
    pub fn reset(&self) {
        self.binding.store(0, Ordering::Release);
    }

    pub fn is_bound_to(&self, tag: u64) -> bool {
        tag != 0 && self.binding.load(Ordering::Acquire) == tag
    }

    pub async fn flush(&mut self) -> Result<()> {
        self.conn.write_all(&self.buffer.data_buffer).await?;
        self.refresh();
        Ok(())
    }

    pub async fn read_buffer(&mut self, size: usize) -> Result<()> {
        self.buffer.resize_buffer(size)?;
        self.read_exact_tracked(size).await?;
        self.buffer.reset_offset();
        self.refresh();
        Ok(())
    }

    pub async fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.conn.write_all(buf).await?;
        self.refresh();
        Ok(())
    }

    pub async fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        let budget = self.progress.as_ref().and_then(|shared| shared.remaining_budget());
        match budget {
            Some(d) => match aerospike_rt::timeout(d, self.conn.read_exact(buf)).await {
                Ok(inner) => inner?,
                Err(_) => return Err(self.timeout_error()),
            },
            None => self.conn.read_exact(buf).await?,
        }
        self.bytes_read += buf.len();
        self.refresh();
        if let Some(shared) = &self.progress {
            shared.notify_event_received();
        }
        Ok(())
    }

    /// Reads exactly `size` bytes into `self.buffer.data_buffer`, bounding the read by the
    /// live remaining budget (recomputed fresh, not the static value at the start of
    /// `parse_response`) when a command has registered interest via `watch_progress`, and
    /// notifying it of progress on success so the `TimeoutQueue` ticker restarts its idle
    /// watch instead of treating a slow-but-advancing stream as stuck.
    async fn read_exact_tracked(&mut self, size: usize) -> Result<()> {
        let budget = self.progress.as_ref().and_then(|shared| shared.remaining_budget());
        match budget {
            Some(d) => match aerospike_rt::timeout(d, self.conn.read_exact(&mut self.buffer.data_buffer)).await
            {
                Ok(inner) => inner?,
                Err(_) => return Err(self.timeout_error()),
            },
            None => self.conn.read_exact(&mut self.buffer.data_buffer).await?,
        }
        self.bytes_read += size;
        if let Some(shared) = &self.progress {
            shared.notify_event_received();
        }
        Ok(())
    }

    /// Whichever deadline actually expired on this read: the total deadline takes
    /// precedence so a command that blew its total budget mid-stream is never misreported
    /// as a mere socket timeout.
    fn timeout_error(&self) -> Error {
        match self.progress.as_ref().and_then(|shared| shared.total_deadline()) {
            Some(deadline) if Instant::now() >= deadline => Error::TotalTimeout,
            _ => Error::SocketTimeout,
        }
    }

    /// Registers interest for per-read progress/timeout tracking for the duration of one
    /// attempt. Cleared by `clear_progress_watch` once that attempt's `parse_response`
    /// returns.
    pub fn watch_progress(&mut self, shared: Arc<CommandShared>) {
        self.progress = Some(shared);
    }

    pub fn clear_progress_watch(&mut self) {
        self.progress = None;
    }

    pub fn is_idle(&self) -> bool {
        self.idle_deadline
            .map_or(false, |idle_dl| Instant::now() >= idle_dl)
    }

    fn refresh(&mut self) {
        self.idle_deadline = None;
        if let Some(idle_to) = self.idle_timeout {
            self.idle_deadline = Some(Instant::now().add(idle_to));
        };
    }

    async fn authenticate(&mut self, user_password: &Option<(String, String)>) -> Result<()> {
        if let Some((ref user, ref password)) = *user_password {
            return match AdminCommand::authenticate(self, user, password).await {
                Ok(()) => Ok(()),
                Err(err) => {
                    self.close().await;
                    Err(err)
                }
            };
        }

        Ok(())
    }

    pub fn bookmark(&mut self) {
        self.bytes_read = 0;
    }

    pub const fn bytes_read(&self) -> usize {
        self.bytes_read
    }
}
