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

//! Error and Result types for the command engine.

use crate::ResultCode;
use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the command engine and its collaborators.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The client was not able to communicate with the cluster due to some issue with the
    /// network connection. Always retryable.
    #[error("connection error: {0}")]
    Connection(String),

    /// Idle-socket timeout fired while a command was in flight. Collaborates with retry: the
    /// `TimeoutQueue` closes the connection but does not notify the caller directly.
    #[error("socket timeout")]
    SocketTimeout,

    /// Absolute wall-clock deadline for the command elapsed. Terminal and user-observable; set
    /// exclusively by the `TimeoutQueue` ticker.
    #[error("total timeout")]
    TotalTimeout,

    /// The node asked the client to back off (e.g. `SERVER_NOT_AVAILABLE`). Retried without
    /// consuming a connection.
    #[error("node requested backoff: {0}")]
    Backoff(String),

    /// A well-formed server response carrying a non-success result code.
    #[error("server error: {0}")]
    ServerError(ResultCode),

    /// The response could not be decoded; indicates protocol desynchronization. Always closes
    /// the connection and is treated as non-retryable.
    #[error("parse error: {0}")]
    BadResponse(String),

    /// Admission was refused by the `Scheduler` before any buffer was bound or any byte reached
    /// the wire.
    #[error("command rejected: scheduler admission queue is full")]
    CommandRejected,

    /// One or more arguments passed to the client are invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The target cluster node could not be resolved or failed validation.
    #[error("invalid node: {0}")]
    InvalidNode(String),

    /// The per-node connection pool is exhausted.
    #[error("too many connections")]
    NoMoreConnections,

    /// A multi-record stream observed `valid == false` between record groups, i.e. a sibling
    /// batch sub-command failed and the whole batch is being torn down cooperatively.
    #[error("query terminated")]
    QueryTerminated,

    /// Splitting a batch against a fresher partition map failed; carries the original cause.
    #[error("batch split retry failed: {0}")]
    BatchSplitRetryFailed(Box<Error>),

    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("utf8 error: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("address parse error: {0}")]
    ParseAddr(#[from] std::net::AddrParseError),

    #[error("integer parse error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("password hashing error: {0}")]
    PwHash(#[from] pwhash::error::Error),
}

/// The structured failure handed to a command's failure callback (spec §6 "Error struct").
#[derive(Debug, Clone)]
pub struct CommandError {
    /// High level failure taxonomy, expressed as the terminal `CommandState` that produced it.
    pub kind: CommandErrorKind,
    /// Server result code, when the failure originated from a well-formed response.
    pub result_code: Option<ResultCode>,
    /// Name of the node the failing attempt was last targeted at, if resolved.
    pub node: Option<String>,
    /// Attempt number (1-based) at which the command gave up.
    pub iteration: u32,
    /// True iff a write may have reached the server but no acknowledgement was observed.
    pub in_doubt: bool,
    /// The underlying error describing the failure in detail.
    pub cause: Error,
}

/// Coarse failure category, one per terminal `CommandState` variant that is not `Success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandErrorKind {
    TotalTimeout,
    NetworkInit,
    NetworkError,
    ApplicationInit,
    ApplicationError,
    SocketTimeout,
    QueueError,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} (iteration {}, in_doubt={}): {}",
            self.kind, self.iteration, self.in_doubt, self.cause
        )
    }
}

impl std::error::Error for CommandError {}
