use std::fmt;
use std::mem::ManuallyDrop;

use super::engine::{Attachment, HookCallback, HookEngine};
use crate::error::Result;
use crate::fixes::FixId;

/// Identity of one installed hook: which fix, which of its hook points, and
/// in which load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookKey {
    pub fix: FixId,
    pub point: usize,
    pub cycle: u64,
}

/// One installed interception.
///
/// The attachment is never dropped: once the owning module unloads, the
/// trampoline targets unmapped code, and restoring its bytes would fault.
pub struct HookHandle {
    key: HookKey,
    address: usize,
    _attachment: ManuallyDrop<Attachment>,
}

impl HookHandle {
    pub fn key(&self) -> HookKey {
        self.key
    }

    pub fn address(&self) -> usize {
        self.address
    }
}

impl fmt::Debug for HookHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookHandle")
            .field("key", &self.key)
            .field("address", &format_args!("{:#x}", self.address))
            .finish()
    }
}

/// Append-only arena of every hook installed during the process lifetime.
///
/// Nothing is removed, not even hooks whose module has unloaded. Each cycle
/// adds at most [`HookRegistry::HOOKS_PER_CYCLE`] entries and cycles follow
/// the player's area transitions, so [`HookRegistry::retained_bound`] gives
/// the memory ceiling for a session.
#[derive(Debug, Default)]
pub struct HookRegistry {
    handles: Vec<HookHandle>,
}

impl HookRegistry {
    /// Upper bound on hooks installed in one cycle
    pub const HOOKS_PER_CYCLE: usize = FixId::total_hook_points();

    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `callback` at `address` and retain the handle forever.
    ///
    /// Reinstalling the same fix in a later cycle always creates a new handle.
    pub fn install<E: HookEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        key: HookKey,
        address: usize,
        callback: HookCallback,
    ) -> Result<&HookHandle> {
        let attachment = engine.attach(address, callback)?;
        self.handles.push(HookHandle {
            key,
            address,
            _attachment: ManuallyDrop::new(attachment),
        });
        Ok(&self.handles[self.handles.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handles(&self) -> &[HookHandle] {
        &self.handles
    }

    pub fn in_cycle(&self, cycle: u64) -> impl Iterator<Item = &HookHandle> {
        self.handles.iter().filter(move |h| h.key.cycle == cycle)
    }

    /// Most handles the arena can hold after `cycles` load cycles.
    pub fn retained_bound(cycles: u64) -> usize {
        Self::HOOKS_PER_CYCLE.saturating_mul(usize::try_from(cycles).unwrap_or(usize::MAX))
    }
}
