use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use super::HookContext;
use crate::error::Result;

/// Code run when execution reaches a hooked address.
///
/// Callbacks execute on whatever host thread hit the hook. They must not
/// block, lock, log or allocate.
pub type HookCallback = Box<dyn Fn(&mut HookContext) + Send + Sync + 'static>;

/// Backend state that keeps one interception alive.
///
/// Dropping it would tear down the trampoline. The registry never does.
pub struct Attachment(Box<dyn Any>);

impl Attachment {
    pub fn new<T: 'static>(state: T) -> Self {
        Self(Box::new(state))
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Attachment")
    }
}

/// Installs mid-function hooks.
pub trait HookEngine {
    /// Route execution at `address` through `callback`, then resume with the
    /// original instruction.
    ///
    /// `address` has already been checked to start a decodable instruction
    /// sequence inside an executable module image.
    fn attach(&mut self, address: usize, callback: HookCallback) -> Result<Attachment>;
}

impl<E: HookEngine + ?Sized> HookEngine for &mut E {
    fn attach(&mut self, address: usize, callback: HookCallback) -> Result<Attachment> {
        (**self).attach(address, callback)
    }
}

/// Run `callback` on a copy of `ctx` and commit the copy only if the callback
/// returned normally.
///
/// A panic must never unwind into host frames; the registers of a panicking
/// invocation are left exactly as the host had them.
pub fn run_guarded(callback: &(dyn Fn(&mut HookContext) + Send + Sync), ctx: &mut HookContext) -> bool {
    let mut scratch = *ctx;
    let completed = panic::catch_unwind(AssertUnwindSafe(|| callback(&mut scratch))).is_ok();
    if completed {
        *ctx = scratch;
    }
    completed
}
