// Copyright 2015-2020 Aerospike, Inc.
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

use std::str;
use std::time::Duration;

use byteorder::{ByteOrder, LittleEndian, NetworkEndian};

use crate::commands::field_type::FieldType;
use crate::errors::{Error, Result};
use crate::policy::{
    BasePolicy, CommitLevel, ConsistencyLevel, GenerationPolicy, ReadPolicy, RecordExistsAction,
    WritePolicy,
};
use crate::{Bin, Bins, Key, Value};

/// Wire-protocol operation type, written into each operation header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum OperationType {
    Read = 1,
    Write = 2,
    Touch = 11,
}

// Contains a read operation.
pub(crate) const INFO1_READ: u8 = 1;

// Get all bins.
pub(crate) const INFO1_GET_ALL: u8 = 1 << 1;

// This is a batch request.
pub(crate) const INFO1_BATCH: u8 = 1 << 3;

// Do not read the bins
pub(crate) const INFO1_NOBINDATA: u8 = 1 << 5;

// Involve all replicas in read operation.
const INFO1_CONSISTENCY_ALL: u8 = 1 << 6;

// Create or update record
pub(crate) const INFO2_WRITE: u8 = 1;

// Fling a record into the belly of Moloch.
pub(crate) const INFO2_DELETE: u8 = 1 << 1;

// Update if expected generation == old.
pub(crate) const INFO2_GENERATION: u8 = 1 << 2;

// Update if new generation >= old, good for restore.
pub(crate) const INFO2_GENERATION_GT: u8 = 1 << 3;

// Transaction resulting in record deletion leaves tombstone (Enterprise only).
pub(crate) const INFO2_DURABLE_DELETE: u8 = 1 << 4;

// Create only. Fail if record already exists.
pub(crate) const INFO2_CREATE_ONLY: u8 = 1 << 5;

// This is the last of a multi-part message.
pub(crate) const INFO3_LAST: u8 = 1;

// Commit to master only before declaring success.
pub(crate) const INFO3_COMMIT_MASTER: u8 = 1 << 1;

// Update only. Merge bins.
pub(crate) const INFO3_UPDATE_ONLY: u8 = 1 << 3;

// Create or completely replace record.
pub(crate) const INFO3_CREATE_OR_REPLACE: u8 = 1 << 4;

// Completely replace existing record only.
pub(crate) const INFO3_REPLACE_ONLY: u8 = 1 << 5;

pub(crate) const MSG_TOTAL_HEADER_SIZE: u8 = 30;
pub(crate) const FIELD_HEADER_SIZE: u8 = 5;
pub(crate) const OPERATION_HEADER_SIZE: u8 = 8;
pub(crate) const MSG_REMAINING_HEADER_SIZE: u8 = 22;
const DIGEST_SIZE: u8 = 20;
const CL_MSG_VERSION: u8 = 2;
const AS_MSG_TYPE: u8 = 3;

// MAX_BUFFER_SIZE protects against allocating massive memory blocks for buffers.
pub(crate) const MAX_BUFFER_SIZE: usize = 120 * 1024 * 1024 + 8; // 1 MB + header

// Holds data buffer for the command
#[derive(Debug, Default)]
pub struct Buffer {
    pub data_buffer: Vec<u8>,
    pub data_offset: usize,
    pub reclaim_threshold: usize,
}

impl Buffer {
    pub(crate) fn new(reclaim_threshold: usize) -> Self {
        Buffer {
            data_buffer: Vec::with_capacity(1024),
            data_offset: 0,
            reclaim_threshold,
        }
    }

    fn begin(&mut self) {
        self.data_offset = MSG_TOTAL_HEADER_SIZE as usize;
    }

    pub(crate) fn size_buffer(&mut self) -> Result<()> {
        let offset = self.data_offset;
        self.resize_buffer(offset)
    }

    pub(crate) fn resize_buffer(&mut self, size: usize) -> Result<()> {
        // Corrupted data streams can result in a huge length.
        // Do a sanity check here.
        if size > MAX_BUFFER_SIZE {
            return Err(Error::InvalidArgument(format!(
                "Invalid size for buffer: {size}"
            )));
        }

        let mem_size = self.data_buffer.capacity();
        self.data_buffer.resize(size, 0);
        if mem_size > self.reclaim_threshold && size < mem_size {
            self.data_buffer.shrink_to_fit();
        }

        Ok(())
    }

    pub(crate) fn reset_offset(&mut self) {
        // reset data offset
        self.data_offset = 0;
    }

    pub(crate) fn end(&mut self) {
        let size = ((self.data_offset - 8) as i64)
            | ((i64::from(CL_MSG_VERSION) << 56) as i64)
            | (i64::from(AS_MSG_TYPE) << 48);

        // reset data offset
        self.reset_offset();
        self.write_i64(size);
    }

    // Writes the command for a put.
    pub(crate) fn set_write(
        &mut self,
        policy: &WritePolicy,
        key: &Key,
        bins: &[Bin],
    ) -> Result<()> {
        self.begin();
        let field_count = self.estimate_key_size(key, policy.send_key);

        for bin in bins {
            self.estimate_operation_size_for_bin(bin.as_ref());
        }

        self.size_buffer()?;
        self.write_header_with_policy(
            policy,
            0,
            INFO2_WRITE,
            field_count,
            bins.len() as u16,
        );
        self.write_key(key, policy.send_key);

        for bin in bins {
            self.write_operation_for_bin(bin.as_ref(), OperationType::Write);
        }

        self.end();
        Ok(())
    }

    // Writes the command for a delete.
    pub(crate) fn set_delete(&mut self, policy: &WritePolicy, key: &Key) -> Result<()> {
        self.begin();
        let field_count = self.estimate_key_size(key, false);

        self.size_buffer()?;
        self.write_header_with_policy(policy, 0, INFO2_WRITE | INFO2_DELETE, field_count, 0);
        self.write_key(key, false);

        self.end();
        Ok(())
    }

    // Writes the command for a touch.
    pub(crate) fn set_touch(&mut self, policy: &WritePolicy, key: &Key) -> Result<()> {
        self.begin();
        let field_count = self.estimate_key_size(key, policy.send_key);
        self.estimate_operation_size();
        self.size_buffer()?;
        self.write_header_with_policy(policy, 0, INFO2_WRITE, field_count, 1);
        self.write_key(key, policy.send_key);

        self.write_operation_for_operation_type(OperationType::Touch);
        self.end();
        Ok(())
    }

    // Writes the command for an exists check.
    pub(crate) fn set_exists(&mut self, policy: &ReadPolicy, key: &Key) -> Result<()> {
        self.begin();
        let field_count = self.estimate_key_size(key, false);

        self.size_buffer()?;
        self.write_header(
            &policy.base_policy,
            INFO1_READ | INFO1_NOBINDATA,
            0,
            field_count,
            0,
        );
        self.write_key(key, false);

        self.end();
        Ok(())
    }

    // Writes the command for a get.
    pub(crate) fn set_read(&mut self, policy: &BasePolicy, key: &Key, bins: &Bins) -> Result<()> {
        match bins {
            Bins::None => self.set_read_header(policy, key),
            Bins::All => self.set_read_for_key_only(policy, key),
            Bins::Some(ref bin_names) => {
                self.begin();
                let field_count = self.estimate_key_size(key, false);
                for bin_name in bin_names {
                    self.estimate_operation_size_for_bin_name(bin_name);
                }

                self.size_buffer()?;
                self.write_header(policy, INFO1_READ, 0, field_count, bin_names.len() as u16);
                self.write_key(key, false);

                for bin_name in bin_names {
                    self.write_operation_for_bin_name(bin_name, OperationType::Read);
                }

                self.end();
                Ok(())
            }
        }
    }

    // Writes the command for reading record metadata only.
    pub(crate) fn set_read_header(&mut self, policy: &BasePolicy, key: &Key) -> Result<()> {
        self.begin();
        let field_count = self.estimate_key_size(key, false);

        self.estimate_operation_size_for_bin_name("");
        self.size_buffer()?;
        self.write_header(policy, INFO1_READ | INFO1_NOBINDATA, 0, field_count, 1);
        self.write_key(key, false);

        self.write_operation_for_bin_name("", OperationType::Read);
        self.end();
        Ok(())
    }

    pub(crate) fn set_read_for_key_only(&mut self, policy: &BasePolicy, key: &Key) -> Result<()> {
        self.begin();

        let field_count = self.estimate_key_size(key, false);

        self.size_buffer()?;
        self.write_header(policy, INFO1_READ | INFO1_GET_ALL, 0, field_count, 0);
        self.write_key(key, false);

        self.end();
        Ok(())
    }

    // Writes a batch-index request: one field holding every key's digest plus a per-key
    // inline header (namespace/set/bins). Each key always carries its own full header; the
    // wire-level "repeat previous header" optimization is not implemented.
    pub(crate) fn set_batch_read(
        &mut self,
        policy: &BatchPolicy,
        batch_reads: &[crate::batch::BatchRead],
    ) -> Result<()> {
        self.begin();
        self.data_offset += FIELD_HEADER_SIZE as usize + 5;

        for batch_read in batch_reads {
            let key = &batch_read.key;
            self.data_offset += key.digest.len() + 4 + 1;
            if !key.namespace.is_empty() {
                self.data_offset += key.namespace.len() + FIELD_HEADER_SIZE as usize;
            }
            if !key.set_name.is_empty() {
                self.data_offset += key.set_name.len() + FIELD_HEADER_SIZE as usize;
            }
            self.data_offset += 4; // per-key read_attr + field_count + op_count
            if let Bins::Some(ref bin_names) = batch_read.bins {
                for name in bin_names {
                    self.estimate_operation_size_for_bin_name(name);
                }
            }
        }

        self.size_buffer()?;
        self.write_header(&policy.base_policy, INFO1_READ | INFO1_BATCH, 0, 1, 0);

        let field_size_offset = self.data_offset;
        self.write_field_header(0, FieldType::BatchIndexWithSet);
        self.write_u32(batch_reads.len() as u32);
        self.write_u8(u8::from(policy.allow_inline));

        for (index, batch_read) in batch_reads.iter().enumerate() {
            let key = &batch_read.key;
            self.write_u32(index as u32);
            self.write_bytes(&key.digest);
            self.write_u8(0); // never reuse the previous key's inline header

            let key_field_count = u16::from(!key.namespace.is_empty()) + u16::from(!key.set_name.is_empty());

            match &batch_read.bins {
                Bins::None => {
                    self.write_u8(INFO1_READ | INFO1_NOBINDATA);
                    self.write_u16(key_field_count);
                    self.write_u16(0);
                }
                Bins::All => {
                    self.write_u8(INFO1_READ | INFO1_GET_ALL);
                    self.write_u16(key_field_count);
                    self.write_u16(0);
                }
                Bins::Some(bin_names) => {
                    self.write_u8(INFO1_READ);
                    self.write_u16(key_field_count);
                    self.write_u16(bin_names.len() as u16);
                }
            }

            if !key.namespace.is_empty() {
                self.write_field_string(&key.namespace, FieldType::Namespace);
            }
            if !key.set_name.is_empty() {
                self.write_field_string(&key.set_name, FieldType::Table);
            }
            if let Bins::Some(bin_names) = &batch_read.bins {
                for name in bin_names {
                    self.write_operation_for_bin_name(name, OperationType::Read);
                }
            }
        }

        let field_size = self.data_offset - field_size_offset - FIELD_HEADER_SIZE as usize;
        NetworkEndian::write_u32(
            &mut self.data_buffer[field_size_offset..field_size_offset + 4],
            field_size as u32,
        );

        self.end();
        Ok(())
    }

    // Writes the command for a namespace/set scan; bins may restrict which bins stream back.
    pub(crate) fn set_scan(
        &mut self,
        policy: &crate::policy::ScanPolicy,
        namespace: &str,
        set_name: &str,
        bins: &Bins,
        task_id: u64,
    ) -> Result<()> {
        self.begin();

        let mut field_count: u16 = 0;
        if !namespace.is_empty() {
            self.data_offset += namespace.len() + FIELD_HEADER_SIZE as usize;
            field_count += 1;
        }
        if !set_name.is_empty() {
            self.data_offset += set_name.len() + FIELD_HEADER_SIZE as usize;
            field_count += 1;
        }
        self.data_offset += 2 + FIELD_HEADER_SIZE as usize; // scan options
        self.data_offset += 8 + FIELD_HEADER_SIZE as usize; // task id
        field_count += 2;

        let bin_count = match bins {
            Bins::Some(bin_names) => {
                for name in bin_names {
                    self.estimate_operation_size_for_bin_name(name);
                }
                bin_names.len() as u16
            }
            _ => 0,
        };

        self.size_buffer()?;

        let mut read_attr = INFO1_READ;
        if bins.is_none() {
            read_attr |= INFO1_NOBINDATA;
        }
        self.write_header(&policy.base_policy, read_attr, 0, field_count, bin_count);

        if !namespace.is_empty() {
            self.write_field_string(namespace, FieldType::Namespace);
        }
        if !set_name.is_empty() {
            self.write_field_string(set_name, FieldType::Table);
        }

        self.write_field_header(2, FieldType::ScanOptions);
        let mut priority = (policy.base_policy.priority as u8) << 4;
        if policy.fail_on_cluster_change {
            priority |= 0x08;
        }
        self.write_u8(priority);
        self.write_u8(policy.scan_percent);

        self.write_field_header(8, FieldType::TranId);
        self.write_u64(task_id);

        if let Bins::Some(bin_names) = bins {
            for name in bin_names {
                self.write_operation_for_bin_name(name, OperationType::Read);
            }
        }

        self.end();
        Ok(())
    }

    fn estimate_key_size(&mut self, key: &Key, send_key: bool) -> u16 {
        let mut field_count: u16 = 0;

        if !key.namespace.is_empty() {
            self.data_offset += key.namespace.len() + FIELD_HEADER_SIZE as usize;
            field_count += 1;
        }

        if !key.set_name.is_empty() {
            self.data_offset += key.set_name.len() + FIELD_HEADER_SIZE as usize;
            field_count += 1;
        }

        self.data_offset += (DIGEST_SIZE + FIELD_HEADER_SIZE) as usize;
        field_count += 1;

        if send_key {
            if let Some(ref user_key) = key.user_key {
                // field header size + key size
                self.data_offset += user_key.estimate_size() + FIELD_HEADER_SIZE as usize + 1;
                field_count += 1;
            }
        }

        field_count
    }

    fn estimate_operation_size_for_bin(&mut self, bin: &Bin) {
        self.data_offset += bin.name.len() + OPERATION_HEADER_SIZE as usize;
        self.data_offset += bin.value.estimate_size();
    }

    fn estimate_operation_size_for_bin_name(&mut self, bin_name: &str) {
        self.data_offset += bin_name.len() + OPERATION_HEADER_SIZE as usize;
    }

    fn estimate_operation_size(&mut self) {
        self.data_offset += OPERATION_HEADER_SIZE as usize;
    }

    fn write_header(
        &mut self,
        policy: &BasePolicy,
        read_attr: u8,
        write_attr: u8,
        field_count: u16,
        operation_count: u16,
    ) {
        let mut read_attr = read_attr;

        if policy.consistency_level == ConsistencyLevel::ConsistencyAll {
            read_attr |= INFO1_CONSISTENCY_ALL;
        }

        // Write all header data except total size which must be written last.
        self.data_buffer[8] = MSG_REMAINING_HEADER_SIZE; // Message header length.
        self.data_buffer[9] = read_attr;
        self.data_buffer[10] = write_attr;

        for i in 11..26 {
            self.data_buffer[i] = 0;
        }

        self.data_offset = 18;
        self.write_u32(policy.read_touch_ttl.into());

        self.data_offset = 26;
        self.write_u16(field_count);
        self.write_u16(operation_count);

        self.data_offset = MSG_TOTAL_HEADER_SIZE as usize;
    }

    // Header write for write operations.
    fn write_header_with_policy(
        &mut self,
        policy: &WritePolicy,
        read_attr: u8,
        write_attr: u8,
        field_count: u16,
        operation_count: u16,
    ) {
        // Set flags.
        let mut generation: u32 = 0;
        let mut info_attr: u8 = 0;
        let mut read_attr = read_attr;
        let mut write_attr = write_attr;

        match policy.record_exists_action {
            RecordExistsAction::Update => (),
            RecordExistsAction::UpdateOnly => info_attr |= INFO3_UPDATE_ONLY,
            RecordExistsAction::Replace => info_attr |= INFO3_CREATE_OR_REPLACE,
            RecordExistsAction::ReplaceOnly => info_attr |= INFO3_REPLACE_ONLY,
            RecordExistsAction::CreateOnly => write_attr |= INFO2_CREATE_ONLY,
        }

        match policy.generation_policy {
            GenerationPolicy::None => (),
            GenerationPolicy::ExpectGenEqual => {
                generation = policy.generation;
                write_attr |= INFO2_GENERATION;
            }
            GenerationPolicy::ExpectGenGreater => {
                generation = policy.generation;
                write_attr |= INFO2_GENERATION_GT;
            }
        }

        if policy.commit_level == CommitLevel::CommitMaster {
            info_attr |= INFO3_COMMIT_MASTER;
        }

        if policy.base_policy.consistency_level == ConsistencyLevel::ConsistencyAll {
            read_attr |= INFO1_CONSISTENCY_ALL;
        }

        if policy.durable_delete {
            write_attr |= INFO2_DURABLE_DELETE;
        }

        // Write all header data except total size which must be written last.
        self.data_offset = 8;
        self.write_u8(MSG_REMAINING_HEADER_SIZE); // Message header length.
        self.write_u8(read_attr);
        self.write_u8(write_attr);
        self.write_u8(info_attr);
        self.write_u8(0); // unused
        self.write_u8(0); // clear the result code

        self.write_u32(generation);
        self.write_u32(policy.expiration.into());

        // Initialize timeout. It will be written later.
        self.write_u8(0);
        self.write_u8(0);
        self.write_u8(0);
        self.write_u8(0);

        self.write_u16(field_count);
        self.write_u16(operation_count);
        self.data_offset = MSG_TOTAL_HEADER_SIZE as usize;
    }

    fn write_key(&mut self, key: &Key, send_key: bool) {
        // Write key into buffer.
        if !key.namespace.is_empty() {
            self.write_field_string(&key.namespace, FieldType::Namespace);
        }

        if !key.set_name.is_empty() {
            self.write_field_string(&key.set_name, FieldType::Table);
        }

        self.write_field_bytes(&key.digest, FieldType::DigestRipe);

        if send_key {
            if let Some(ref user_key) = key.user_key {
                self.write_field_value(user_key, FieldType::Key);
            }
        }
    }

    fn write_field_header(&mut self, size: usize, ftype: FieldType) {
        self.write_i32(size as i32 + 1);
        self.write_u8(ftype as u8);
    }

    fn write_field_string(&mut self, field: &str, ftype: FieldType) {
        self.write_field_header(field.len(), ftype);
        self.write_str(field);
    }

    fn write_field_bytes(&mut self, bytes: &[u8], ftype: FieldType) {
        self.write_field_header(bytes.len(), ftype);
        self.write_bytes(bytes);
    }

    fn write_field_value(&mut self, value: &Value, ftype: FieldType) {
        self.write_field_header(value.estimate_size() + 1, ftype);
        self.write_u8(value.particle_type() as u8);
        value.write_to(self);
    }

    fn write_operation_for_bin(&mut self, bin: &Bin, op_type: OperationType) {
        let name_length = bin.name.len();
        let value_length = bin.value.estimate_size();

        self.write_i32((name_length + value_length + 4) as i32);
        self.write_u8(op_type as u8);
        self.write_u8(bin.value.particle_type() as u8);
        self.write_u8(0);
        self.write_u8(name_length as u8);
        self.write_str(&bin.name);
        bin.value.write_to(self);
    }

    fn write_operation_for_bin_name(&mut self, name: &str, op_type: OperationType) {
        self.write_i32(name.len() as i32 + 4);
        self.write_u8(op_type as u8);
        self.write_u8(0);
        self.write_u8(0);
        self.write_u8(name.len() as u8);
        self.write_str(name);
    }

    fn write_operation_for_operation_type(&mut self, op_type: OperationType) {
        self.write_i32(4);
        self.write_u8(op_type as u8);
        self.write_u8(0);
        self.write_u8(0);
        self.write_u8(0);
    }

    // Data buffer implementations

    pub(crate) const fn data_offset(&self) -> usize {
        self.data_offset
    }

    pub(crate) fn skip_bytes(&mut self, count: usize) {
        self.data_offset += count;
    }

    pub(crate) fn skip(&mut self, count: usize) {
        self.data_offset += count;
    }

    pub(crate) fn peek(&self) -> u8 {
        self.data_buffer[self.data_offset]
    }

    pub(crate) fn read_u8(&mut self, pos: Option<usize>) -> u8 {
        match pos {
            Some(pos) => self.data_buffer[pos],
            None => {
                let res = self.data_buffer[self.data_offset];
                self.data_offset += 1;
                res
            }
        }
    }

    pub(crate) fn read_i8(&mut self, pos: Option<usize>) -> i8 {
        match pos {
            Some(pos) => self.data_buffer[pos] as i8,
            None => {
                let res = self.data_buffer[self.data_offset] as i8;
                self.data_offset += 1;
                res
            }
        }
    }

    pub(crate) fn read_u16(&mut self, pos: Option<usize>) -> u16 {
        let pos = pos.unwrap_or(self.data_offset);
        let val = NetworkEndian::read_u16(&self.data_buffer[pos..pos + 2]);
        if pos == self.data_offset {
            self.data_offset += 2;
        }
        val
    }

    pub(crate) fn read_i16(&mut self, pos: Option<usize>) -> i16 {
        self.read_u16(pos) as i16
    }

    pub(crate) fn read_u32(&mut self, pos: Option<usize>) -> u32 {
        let pos = pos.unwrap_or(self.data_offset);
        let val = NetworkEndian::read_u32(&self.data_buffer[pos..pos + 4]);
        if pos == self.data_offset {
            self.data_offset += 4;
        }
        val
    }

    pub(crate) fn read_i32(&mut self, pos: Option<usize>) -> i32 {
        self.read_u32(pos) as i32
    }

    pub(crate) fn read_u64(&mut self, pos: Option<usize>) -> u64 {
        let pos = pos.unwrap_or(self.data_offset);
        let val = NetworkEndian::read_u64(&self.data_buffer[pos..pos + 8]);
        if pos == self.data_offset {
            self.data_offset += 8;
        }
        val
    }

    pub(crate) fn read_le_u64(&mut self, pos: Option<usize>) -> u64 {
        let pos = pos.unwrap_or(self.data_offset);
        let val = LittleEndian::read_u64(&self.data_buffer[pos..pos + 8]);
        if pos == self.data_offset {
            self.data_offset += 8;
        }
        val
    }

    pub(crate) fn read_i64(&mut self, pos: Option<usize>) -> i64 {
        self.read_u64(pos) as i64
    }

    pub(crate) fn read_msg_size(&mut self, pos: Option<usize>) -> usize {
        let size = self.read_i64(pos);
        (size & 0xFFFF_FFFF_FFFF) as usize
    }

    pub(crate) fn read_f32(&mut self, pos: Option<usize>) -> f32 {
        let pos = pos.unwrap_or(self.data_offset);
        let val = NetworkEndian::read_f32(&self.data_buffer[pos..pos + 4]);
        if pos == self.data_offset {
            self.data_offset += 4;
        }
        val
    }

    pub(crate) fn read_f64(&mut self, pos: Option<usize>) -> f64 {
        let pos = pos.unwrap_or(self.data_offset);
        let val = NetworkEndian::read_f64(&self.data_buffer[pos..pos + 8]);
        if pos == self.data_offset {
            self.data_offset += 8;
        }
        val
    }

    pub(crate) fn read_str(&mut self, len: usize) -> Result<String> {
        let slice = self.read_slice(len);
        let val = str::from_utf8(slice)?.to_owned();
        Ok(val)
    }

    pub(crate) fn read_str_until(&mut self, sep: u8, max_len: usize) -> Result<String> {
        let start = self.data_offset;
        let mut len = 0;
        while self.data_offset < self.data_buffer.len() && len < max_len {
            if self.data_buffer[self.data_offset] == sep {
                let val = str::from_utf8(&self.data_buffer[start..self.data_offset])?.to_owned();
                self.data_offset += 1;
                return Ok(val);
            }
            self.data_offset += 1;
            len += 1;
        }
        Err(Error::BadResponse("separator not found".to_string()))
    }

    pub(crate) fn read_slice(&mut self, count: usize) -> &[u8] {
        let slice = &self.data_buffer[self.data_offset..self.data_offset + count];
        self.data_offset += count;
        slice
    }

    pub(crate) fn read_blob(&mut self, len: usize) -> Vec<u8> {
        self.read_slice(len).to_vec()
    }

    pub(crate) fn read_bool(&mut self, len: usize) -> bool {
        if len == 0 {
            return false;
        }
        self.read_u8(None) != 0
    }

    pub(crate) fn write_u8(&mut self, val: u8) -> usize {
        self.data_buffer[self.data_offset] = val;
        self.data_offset += 1;
        1
    }

    pub(crate) fn write_i8(&mut self, val: i8) -> usize {
        self.write_u8(val as u8)
    }

    pub(crate) fn write_u16(&mut self, val: u16) -> usize {
        NetworkEndian::write_u16(
            &mut self.data_buffer[self.data_offset..self.data_offset + 2],
            val,
        );
        self.data_offset += 2;
        2
    }

    pub(crate) fn write_u64_little_endian(&mut self, val: u64) -> usize {
        LittleEndian::write_u64(
            &mut self.data_buffer[self.data_offset..self.data_offset + 8],
            val,
        );
        self.data_offset += 8;
        8
    }

    pub(crate) fn write_u16_little_endian(&mut self, val: u16) -> usize {
        LittleEndian::write_u16(
            &mut self.data_buffer[self.data_offset..self.data_offset + 2],
            val,
        );
        self.data_offset += 2;
        2
    }

    pub(crate) fn write_i16(&mut self, val: i16) -> usize {
        self.write_u16(val as u16)
    }

    pub(crate) fn write_u32(&mut self, val: u32) -> usize {
        NetworkEndian::write_u32(
            &mut self.data_buffer[self.data_offset..self.data_offset + 4],
            val,
        );
        self.data_offset += 4;
        4
    }

    pub(crate) fn write_i32(&mut self, val: i32) -> usize {
        self.write_u32(val as u32)
    }

    pub(crate) fn write_u64(&mut self, val: u64) -> usize {
        NetworkEndian::write_u64(
            &mut self.data_buffer[self.data_offset..self.data_offset + 8],
            val,
        );
        self.data_offset += 8;
        8
    }

    pub(crate) fn write_i64(&mut self, val: i64) -> usize {
        self.write_u64(val as u64)
    }

    pub(crate) fn write_bool(&mut self, val: bool) -> usize {
        let val = u8::from(val);
        self.write_u8(val)
    }

    pub(crate) fn write_f32(&mut self, val: f32) -> usize {
        NetworkEndian::write_f32(
            &mut self.data_buffer[self.data_offset..self.data_offset + 4],
            val,
        );
        self.data_offset += 4;
        4
    }

    pub(crate) fn write_f64(&mut self, val: f64) -> usize {
        NetworkEndian::write_f64(
            &mut self.data_buffer[self.data_offset..self.data_offset + 8],
            val,
        );
        self.data_offset += 8;
        8
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) -> usize {
        for b in bytes {
            self.write_u8(*b);
        }
        bytes.len()
    }

    pub(crate) fn write_str(&mut self, val: &str) -> usize {
        self.write_bytes(val.as_bytes())
    }

    pub(crate) fn write_geo(&mut self, value: &str) -> usize {
        self.write_bytes(value.as_bytes())
    }

    pub(crate) fn write_timeout(&mut self, val: Option<Duration>) {
        if let Some(val) = val {
            let millis: u32 = (val.as_secs() * 1_000) as u32 + val.subsec_millis();
            NetworkEndian::write_u32(&mut self.data_buffer[22..26], millis);
        }
    }

    #[allow(dead_code)]
    pub(crate) fn dump_buffer(&self) {
        rhexdump::rhexdump!(&self.data_buffer);
        println!();
    }
}
