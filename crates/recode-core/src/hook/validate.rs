//! Pre-install checks on a hook address.

use iced_x86::{Decoder, DecoderError, DecoderOptions};

use crate::error::{Error, Result};
use crate::memory::ProcessMemory;
use crate::module::ModuleInfo;

/// Bytes overwritten by an x86-64 absolute jump (`jmp [rip+0]` + address).
pub const DETOUR_LEN: usize = 14;

/// Longest x86 instruction
const MAX_INSTRUCTION_LEN: usize = 15;

/// Check that `address` can take a detour: it lies in `module`'s image on an
/// executable page, and the instructions starting there decode cleanly for at
/// least [`DETOUR_LEN`] bytes without running off the image.
///
/// Returns the number of bytes the detour will displace.
pub fn validate_target<M: ProcessMemory + ?Sized>(
    memory: &M,
    module: &ModuleInfo,
    address: usize,
) -> Result<usize> {
    let reject = |reason: String| Error::HookInstall { address, reason };

    if !module.contains(address) {
        return Err(reject(format!(
            "outside {} image {:#x}..{:#x}",
            module.name,
            module.base,
            module.end()
        )));
    }
    if !memory.is_executable(address) {
        return Err(reject("page is not executable".to_string()));
    }

    let window = (module.end() - address).min(DETOUR_LEN + MAX_INSTRUCTION_LEN);
    let bytes = memory
        .view(address, window)
        .map_err(|e| reject(e.to_string()))?;

    let mut decoder = Decoder::with_ip(64, bytes, address as u64, DecoderOptions::NONE);
    let mut covered = 0usize;
    while covered < DETOUR_LEN {
        let instruction = decoder.decode();
        if instruction.is_invalid() {
            return Err(match decoder.last_error() {
                DecoderError::NoMoreBytes => reject("detour runs past the module image".to_string()),
                error => reject(format!("{:?} at +{:#x}", error, covered)),
            });
        }
        covered += instruction.len();
    }

    Ok(covered)
}
