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

pub mod admin_command;
pub mod batch_read_command;
pub mod buffer;
pub mod command;
pub mod delete_command;
pub mod exists_command;
pub mod multi_command;
pub mod particle_type;
pub mod read_command;
pub mod scan_command;
pub mod state;
pub mod touch_command;
pub mod write_command;

mod field_type;

pub use self::batch_read_command::BatchReadCommand;
pub use self::command::{AsyncCommand, CommandBehavior};
pub use self::delete_command::DeleteCommand;
pub use self::exists_command::ExistsCommand;
pub use self::particle_type::ParticleType;
pub use self::read_command::ReadCommand;
pub use self::scan_command::ScanCommand;
pub use self::touch_command::TouchCommand;
pub use self::write_command::WriteCommand;
