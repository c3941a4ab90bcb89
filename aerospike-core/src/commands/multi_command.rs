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

//! Shared streaming parser for multi-record responses. Batch reads and scans frame their
//! bodies almost identically: an outer sequence of proto messages, each containing a run of
//! fixed-size record headers terminated by `INFO3_LAST`. The only difference is that a batch
//! record echoes back the index of the key it answers, while a scan record does not. Rather
//! than duplicating the outer/inner loop and the key-digest-echo logic in both
//! `batch_read_command` and `scan_command`, both drive this one parser and pick a
//! `FramingMode`.

use std::collections::HashMap;

use crate::commands::buffer;
use crate::commands::field_type::FieldType;
use crate::errors::{Error, Result};
use crate::net::Connection;
use crate::value::bytes_to_particle;
use crate::{Key, Record, ResultCode, Value};

/// Selects which record header shape a multi-record response uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingMode {
    /// Scan-style stream: no batch index field.
    Stream,
    /// Batch-style stream: each record carries the index of the key it answers.
    Batch,
}

/// One decoded record slot.
pub struct ParsedRecord {
    pub key: Key,
    pub record: Option<Record>,
    /// Only set for `FramingMode::Batch`.
    pub batch_index: Option<usize>,
}

enum Decoded {
    Record(ParsedRecord),
    EndOfStream,
}

/// Drains every outer proto-message from `conn`, invoking `sink` once per record until the
/// stream signals `INFO3_LAST` or a zero-length terminal message arrives.
pub async fn drain<F>(conn: &mut Connection, mode: FramingMode, mut sink: F) -> Result<()>
where
    F: FnMut(ParsedRecord) -> Result<()>,
{
    loop {
        conn.read_buffer(8).await?;
        let size = conn.buffer.read_msg_size(None) as usize;
        conn.bookmark();

        if size == 0 {
            return Ok(());
        }

        if !consume_message(conn, mode, size, &mut sink).await? {
            return Ok(());
        }
    }
}

async fn consume_message<F>(
    conn: &mut Connection,
    mode: FramingMode,
    size: usize,
    sink: &mut F,
) -> Result<bool>
where
    F: FnMut(ParsedRecord) -> Result<()>,
{
    while conn.bytes_read() < size {
        conn.read_buffer(buffer::MSG_REMAINING_HEADER_SIZE as usize)
            .await?;

        match decode_record(conn, mode, size).await? {
            Decoded::Record(rec) => sink(rec)?,
            Decoded::EndOfStream => return Ok(false),
        }
    }
    Ok(true)
}

async fn decode_record(conn: &mut Connection, mode: FramingMode, size: usize) -> Result<Decoded> {
    let info3 = conn.buffer.read_u8(Some(3));
    if info3 & buffer::INFO3_LAST == buffer::INFO3_LAST {
        if conn.bytes_read() < size {
            let remaining = size - conn.bytes_read();
            conn.read_buffer(remaining).await?;
        }
        return Ok(Decoded::EndOfStream);
    }

    let result_code = ResultCode::from(conn.buffer.read_u8(Some(5)));
    let found = match result_code {
        ResultCode::Ok => true,
        ResultCode::KeyNotFoundError => false,
        rc => return Err(Error::ServerError(rc)),
    };

    conn.buffer.skip(6);
    let generation = conn.buffer.read_u32(None);
    let expiration = conn.buffer.read_u32(None);
    let batch_index = match mode {
        FramingMode::Batch => Some(conn.buffer.read_u32(None) as usize),
        FramingMode::Stream => {
            conn.buffer.skip(4);
            None
        }
    };
    let field_count = conn.buffer.read_u16(None) as usize;
    let op_count = conn.buffer.read_u16(None) as usize;

    let key = parse_key(conn, field_count).await?;

    let record = if found {
        let bins = read_bins(conn, op_count).await?;
        Some(Record::new(Some(key.clone()), bins, generation, expiration))
    } else {
        None
    };

    Ok(Decoded::Record(ParsedRecord {
        key,
        record,
        batch_index,
    }))
}

async fn read_bins(conn: &mut Connection, op_count: usize) -> Result<HashMap<String, Value>> {
    let mut bins: HashMap<String, Value> = HashMap::with_capacity(op_count);

    for _ in 0..op_count {
        conn.read_buffer(8).await?;
        let op_size = conn.buffer.read_u32(None) as usize;
        conn.buffer.skip(1);
        let particle_type = conn.buffer.read_u8(None);
        conn.buffer.skip(1);
        let name_size = conn.buffer.read_u8(None) as usize;
        conn.read_buffer(name_size).await?;
        let name: String = conn.buffer.read_str(name_size)?;

        let particle_bytes_size = op_size - (4 + name_size);
        conn.read_buffer(particle_bytes_size).await?;
        let value = bytes_to_particle(particle_type, &mut conn.buffer, particle_bytes_size)?;

        bins.insert(name, value);
    }

    Ok(bins)
}

/// Reconstructs a `Key` from the digest-echo fields the server sends back instead of the
/// original key bytes.
async fn parse_key(conn: &mut Connection, field_count: usize) -> Result<Key> {
    let mut digest: [u8; 20] = [0; 20];
    let mut namespace = String::new();
    let mut set_name = String::new();
    let mut user_key: Option<Value> = None;

    for _ in 0..field_count {
        conn.read_buffer(4).await?;
        let field_len = conn.buffer.read_u32(None) as usize;
        conn.read_buffer(field_len).await?;
        let field_type = conn.buffer.read_u8(None);

        match field_type {
            x if x == FieldType::DigestRipe as u8 => {
                digest.copy_from_slice(conn.buffer.read_slice(field_len - 1));
            }
            x if x == FieldType::Namespace as u8 => {
                namespace = conn.buffer.read_str(field_len - 1)?;
            }
            x if x == FieldType::Table as u8 => {
                set_name = conn.buffer.read_str(field_len - 1)?;
            }
            x if x == FieldType::Key as u8 => {
                let particle_type = conn.buffer.read_u8(None);
                let particle_bytes_size = field_len - 2;
                user_key = Some(bytes_to_particle(
                    particle_type,
                    &mut conn.buffer,
                    particle_bytes_size,
                )?);
            }
            _ => {
                return Err(Error::BadResponse(
                    "unexpected field type in key digest echo".to_string(),
                ))
            }
        }
    }

    Ok(Key {
        namespace,
        set_name,
        user_key,
        digest,
    })
}
