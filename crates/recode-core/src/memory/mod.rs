//! Access to the host process's own memory.
//!
//! Everything the fix routines read (module images) or overwrite (patches)
//! goes through [`ProcessMemory`], so the routines can be exercised against an
//! in-memory image in tests.

pub mod layout;
#[cfg(target_os = "windows")]
mod local;
mod patch;

#[cfg(test)]
pub mod mock;

#[cfg(target_os = "windows")]
pub use local::{LocalMemory, ProtectionGuard};
pub use patch::{AppliedPatch, apply_patch};

#[cfg(test)]
pub use mock::MockMemory;

use crate::error::Result;

pub trait ProcessMemory {
    /// Borrow `len` bytes starting at `address`.
    ///
    /// The caller guarantees the range lies inside a mapped module image.
    fn view(&self, address: usize, len: usize) -> Result<&[u8]>;

    /// Overwrite `bytes.len()` bytes at `address`, relaxing page protection
    /// for the duration of the write.
    fn write(&mut self, address: usize, bytes: &[u8]) -> Result<()>;

    /// Whether the page containing `address` is committed and executable.
    fn is_executable(&self, _address: usize) -> bool {
        true
    }
}
