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

use crate::commands::buffer;
use crate::commands::command::CommandBehavior;
use crate::errors::{Error, Result};
use crate::net::Connection;
use crate::policy::WritePolicy;
use crate::{Key, ResultCode};

/// Deletes a record, reporting whether it existed before the delete.
pub struct DeleteCommand<'a> {
    pub existed: bool,
    policy: &'a WritePolicy,
    key: &'a Key,
}

impl<'a> DeleteCommand<'a> {
    pub const fn new(policy: &'a WritePolicy, key: &'a Key) -> Self {
        DeleteCommand {
            existed: false,
            policy,
            key,
        }
    }
}

#[async_trait::async_trait]
impl<'a> CommandBehavior for DeleteCommand<'a> {
    fn write_buffer(&mut self, conn: &mut Connection) -> Result<()> {
        conn.buffer.set_delete(self.policy, self.key)?;
        conn.buffer.write_timeout(self.policy.socket_timeout());
        Ok(())
    }

    async fn parse_response(&mut self, conn: &mut Connection) -> Result<()> {
        conn.read_buffer(buffer::MSG_TOTAL_HEADER_SIZE as usize)
            .await?;

        conn.buffer.reset_offset();
        let result_code = ResultCode::from(conn.buffer.read_u8(Some(13)));
        match result_code {
            ResultCode::Ok => {
                self.existed = true;
                Ok(())
            }
            ResultCode::KeyNotFoundError => {
                self.existed = false;
                Ok(())
            }
            rc => Err(Error::ServerError(rc)),
        }
    }

    fn is_write(&self) -> bool {
        true
    }
}
