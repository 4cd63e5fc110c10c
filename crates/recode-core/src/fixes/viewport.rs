//! Widens the 3D viewport to the configured width.

use std::sync::Arc;

use super::{Fix, FixContext, FixId};
use crate::config::FixConfig;
use crate::hook::{HookCallback, HookContext};

/// `sar r8d, 1; mov eax, r8d; shr eax, 1Fh`; r8 holds twice the viewport width
pub(super) const PATTERN: &str = "41 D1 F8 41 8B C0 C1 E8 1F";

pub struct Viewport;

impl Fix for Viewport {
    fn id(&self) -> FixId {
        FixId::Viewport
    }

    fn apply(&self, cx: &mut FixContext<'_, '_>) {
        let callback = widen(Arc::clone(cx.config()));
        cx.hook_pattern(0, PATTERN, callback);
    }
}

fn widen(config: Arc<FixConfig>) -> HookCallback {
    Box::new(move |ctx: &mut HookContext| {
        ctx.r8 = u64::from(config.width) * 2;
    })
}
