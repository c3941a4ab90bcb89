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

use std::fmt;

use crate::errors::Result;
use crate::net::parser::Parser;

/// An Aerospike seed or alias host/port pair.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct Host {
    /// Hostname or IP address.
    pub name: String,
    /// Port the server listens on.
    pub port: u16,
}

impl Host {
    /// Construct a new `Host` instance.
    pub fn new(name: &str, port: u16) -> Self {
        Host {
            name: name.to_string(),
            port,
        }
    }

    /// `host:port` rendering used to open a TCP connection.
    pub fn address(&self) -> String {
        format!("{}:{}", self.name, self.port)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.port)
    }
}

/// Types that can be converted into one or more seed `Host`s, e.g. a
/// `"host1:3000,host2:3000"` connection string.
pub trait ToHosts {
    /// Convert to a vector of `Host` instances.
    fn to_hosts(&self) -> Result<Vec<Host>>;
}

impl ToHosts for str {
    fn to_hosts(&self) -> Result<Vec<Host>> {
        Parser::new(self, 3000).read_hosts()
    }
}

impl ToHosts for String {
    fn to_hosts(&self) -> Result<Vec<Host>> {
        self.as_str().to_hosts()
    }
}

impl ToHosts for Vec<Host> {
    fn to_hosts(&self) -> Result<Vec<Host>> {
        Ok(self.clone())
    }
}
