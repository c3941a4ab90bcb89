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

//! Wire framing for the login handshake only. Full user/role administration
//! (create/drop user, grant/revoke roles) is out of scope; this module keeps
//! just enough of the teacher's admin wire protocol for `Connection::authenticate`.

use crate::errors::{Error, Result};
use crate::net::Connection;
use crate::ResultCode;

const LOGIN: u8 = 20;

const USER: u8 = 0;
const CREDENTIAL: u8 = 3;

const MSG_VERSION: i64 = 0;
const MSG_TYPE: i64 = 2;

const HEADER_SIZE: usize = 24;
const HEADER_REMAINING: u64 = 16;
const RESULT_CODE: usize = 9;

pub struct AdminCommand {}

impl AdminCommand {
    pub async fn authenticate(conn: &mut Connection, user: &str, password: &str) -> Result<()> {
        conn.buffer.resize_buffer(1024)?;
        conn.buffer.reset_offset();
        Self::write_header(conn, LOGIN, 2);
        Self::write_field_str(conn, USER, user);
        Self::write_field_bytes(conn, CREDENTIAL, password.as_bytes());
        conn.buffer.size_buffer()?;
        let size = conn.buffer.data_offset() as i64;
        conn.buffer.reset_offset();
        Self::write_size(conn, size);

        conn.flush().await?;
        conn.read_buffer(HEADER_SIZE).await?;
        let result_code = ResultCode::from(conn.buffer.read_u8(Some(RESULT_CODE)));
        if result_code != ResultCode::SecurityNotEnabled && result_code != ResultCode::Ok {
            return Err(Error::ServerError(result_code));
        }

        // Drain the rest of the response.
        let sz = conn.buffer.read_u64(Some(0));
        let receive_size = (sz & 0xFFFF_FFFF_FFFF) - HEADER_REMAINING;
        conn.read_buffer(receive_size as usize).await?;

        Ok(())
    }

    fn write_size(conn: &mut Connection, size: i64) {
        let size = (size - 8) | (MSG_VERSION << 56) | (MSG_TYPE << 48);
        conn.buffer.write_i64(size);
    }

    fn write_header(conn: &mut Connection, command: u8, field_count: u8) {
        conn.buffer.data_offset = 8;
        conn.buffer.write_u8(0);
        conn.buffer.write_u8(0);
        conn.buffer.write_u8(command);
        conn.buffer.write_u8(field_count);

        for _ in 0..(16 - 4) {
            conn.buffer.write_u8(0);
        }
    }

    fn write_field_header(conn: &mut Connection, id: u8, size: usize) {
        conn.buffer.write_u32(size as u32 + 1);
        conn.buffer.write_u8(id);
    }

    fn write_field_str(conn: &mut Connection, id: u8, s: &str) {
        Self::write_field_header(conn, id, s.len());
        conn.buffer.write_str(s);
    }

    fn write_field_bytes(conn: &mut Connection, id: u8, b: &[u8]) {
        Self::write_field_header(conn, id, b.len());
        conn.buffer.write_bytes(b);
    }
}
