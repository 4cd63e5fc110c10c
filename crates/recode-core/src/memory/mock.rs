//! In-memory module image for tests.

use std::ops::Range;

use super::ProcessMemory;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct MockMemory {
    base: usize,
    bytes: Vec<u8>,
    executable: Option<Range<usize>>,
    writes: Vec<(usize, Vec<u8>)>,
}

impl MockMemory {
    /// An image of `bytes` mapped at `base`; every address in it is executable.
    pub fn new(base: usize, bytes: Vec<u8>) -> Self {
        Self {
            base,
            bytes,
            executable: None,
            writes: Vec::new(),
        }
    }

    /// Restrict executable addresses to `range` (absolute addresses).
    pub fn with_executable(mut self, range: Range<usize>) -> Self {
        self.executable = Some(range);
        self
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn writes(&self) -> &[(usize, Vec<u8>)] {
        &self.writes
    }

    fn offset(&self, address: usize, len: usize) -> Result<usize> {
        address
            .checked_sub(self.base)
            .filter(|offset| offset + len <= self.bytes.len())
            .ok_or_else(|| Error::MemoryReadFailed {
                address,
                message: format!("{} bytes outside mock image", len),
            })
    }
}

impl ProcessMemory for MockMemory {
    fn view(&self, address: usize, len: usize) -> Result<&[u8]> {
        let offset = self.offset(address, len)?;
        Ok(&self.bytes[offset..offset + len])
    }

    fn write(&mut self, address: usize, bytes: &[u8]) -> Result<()> {
        let offset = self.offset(address, bytes.len()).map_err(|e| Error::PatchFailed {
            address,
            reason: e.to_string(),
        })?;
        self.bytes[offset..offset + bytes.len()].copy_from_slice(bytes);
        self.writes.push((address, bytes.to_vec()));
        Ok(())
    }

    fn is_executable(&self, address: usize) -> bool {
        match &self.executable {
            Some(range) => range.contains(&address),
            None => self.offset(address, 1).is_ok(),
        }
    }
}
