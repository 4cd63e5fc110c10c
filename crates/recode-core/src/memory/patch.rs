//! Direct byte patches. There is no rollback: a patch lives as long as the
//! module it was written into.

use super::ProcessMemory;
use crate::error::{Error, Result};

/// What a patch replaced, kept for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPatch {
    pub address: usize,
    pub original: Vec<u8>,
    pub payload: Vec<u8>,
}

/// Overwrite `payload.len()` bytes at `address` and verify the write landed.
pub fn apply_patch<M: ProcessMemory + ?Sized>(
    memory: &mut M,
    address: usize,
    payload: &[u8],
) -> Result<AppliedPatch> {
    if payload.is_empty() {
        return Err(Error::PatchFailed {
            address,
            reason: "empty payload".to_string(),
        });
    }

    let original = memory.view(address, payload.len())?.to_vec();
    memory.write(address, payload)?;

    if memory.view(address, payload.len())? != payload {
        return Err(Error::PatchFailed {
            address,
            reason: "bytes read back differ from payload".to_string(),
        });
    }

    Ok(AppliedPatch {
        address,
        original,
        payload: payload.to_vec(),
    })
}
