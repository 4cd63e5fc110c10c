//! The current process's address space, accessed directly.

use std::ffi::c_void;

use tracing::warn;
use windows::Win32::System::Diagnostics::Debug::FlushInstructionCache;
use windows::Win32::System::Memory::{
    MEM_COMMIT, MEMORY_BASIC_INFORMATION, PAGE_EXECUTE, PAGE_EXECUTE_READ,
    PAGE_EXECUTE_READWRITE, PAGE_EXECUTE_WRITECOPY, PAGE_PROTECTION_FLAGS, VirtualProtect,
    VirtualQuery,
};
use windows::Win32::System::Threading::GetCurrentProcess;

use super::ProcessMemory;
use crate::error::{Error, Result};

/// Relaxes the protection of a range and restores the previous protection
/// when dropped.
pub struct ProtectionGuard {
    address: usize,
    len: usize,
    previous: PAGE_PROTECTION_FLAGS,
}

impl ProtectionGuard {
    pub fn new(address: usize, len: usize, protection: PAGE_PROTECTION_FLAGS) -> Result<Self> {
        let mut previous = PAGE_PROTECTION_FLAGS(0);
        // SAFETY: VirtualProtect only changes page attributes of our own process;
        // the range is a resolved address inside a loaded module.
        unsafe {
            VirtualProtect(address as *const c_void, len, protection, &mut previous).map_err(
                |e| Error::PatchFailed {
                    address,
                    reason: format!("VirtualProtect failed: {e}"),
                },
            )?;
        }
        Ok(Self {
            address,
            len,
            previous,
        })
    }
}

impl Drop for ProtectionGuard {
    fn drop(&mut self) {
        let mut ignored = PAGE_PROTECTION_FLAGS(0);
        // SAFETY: restores the attributes captured in `new` on the same range.
        let restored = unsafe {
            VirtualProtect(
                self.address as *const c_void,
                self.len,
                self.previous,
                &mut ignored,
            )
        };
        if let Err(e) = restored {
            warn!(
                "Failed to restore protection at {:#x} ({} bytes): {}",
                self.address, self.len, e
            );
        }
    }
}

/// The memory of the process this library is loaded into.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalMemory;

impl LocalMemory {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessMemory for LocalMemory {
    fn view(&self, address: usize, len: usize) -> Result<&[u8]> {
        if address == 0 {
            return Err(Error::MemoryReadFailed {
                address,
                message: "null address".to_string(),
            });
        }
        // SAFETY: callers only pass ranges derived from a module's base and
        // SizeOfImage, which stay mapped while the module is loaded.
        Ok(unsafe { std::slice::from_raw_parts(address as *const u8, len) })
    }

    fn write(&mut self, address: usize, bytes: &[u8]) -> Result<()> {
        {
            let _guard = ProtectionGuard::new(address, bytes.len(), PAGE_EXECUTE_READWRITE)?;
            // SAFETY: the range is writable while the guard is alive.
            unsafe {
                std::ptr::copy_nonoverlapping(bytes.as_ptr(), address as *mut u8, bytes.len());
            }
        }

        // SAFETY: flushing our own process's instruction cache for the range just written.
        unsafe {
            FlushInstructionCache(
                GetCurrentProcess(),
                Some(address as *const c_void),
                bytes.len(),
            )
        }
        .map_err(|e| Error::PatchFailed {
            address,
            reason: format!("FlushInstructionCache failed: {e}"),
        })
    }

    fn is_executable(&self, address: usize) -> bool {
        let mut info = MEMORY_BASIC_INFORMATION::default();
        // SAFETY: VirtualQuery fills `info` for any address and fails cleanly otherwise.
        let written = unsafe {
            VirtualQuery(
                Some(address as *const c_void),
                &mut info,
                std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
            )
        };
        if written == 0 || info.State != MEM_COMMIT {
            return false;
        }

        let executable =
            PAGE_EXECUTE | PAGE_EXECUTE_READ | PAGE_EXECUTE_READWRITE | PAGE_EXECUTE_WRITECOPY;
        info.Protect.0 & executable.0 != 0
    }
}
