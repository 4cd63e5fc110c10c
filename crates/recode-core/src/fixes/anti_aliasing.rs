//! Caps the anti-aliasing level. HIGH breaks rendering once the viewport is
//! widened, so it is clamped to MEDIUM whenever the settings block is read.

use super::{Fix, FixContext, FixId};
use crate::hook::{HookContext, read_at, write_at};
use crate::memory::layout::graphics;

/// `movsx r9d, byte [rdx+10h]; movsx r10d, byte [rdx+11h]`
pub(super) const PATTERN: &str = "44 0F BE 4A 10 44 0F BE 52 11";

pub struct AntiAliasing;

impl Fix for AntiAliasing {
    fn id(&self) -> FixId {
        FixId::AntiAliasing
    }

    fn apply(&self, cx: &mut FixContext<'_, '_>) {
        cx.hook_pattern(0, PATTERN, Box::new(clamp_level));
    }
}

fn clamp_level(ctx: &mut HookContext) {
    // SAFETY: the hooked movsx reads the same byte through rdx.
    unsafe {
        let level: u8 = read_at(ctx.rdx, graphics::ANTI_ALIASING);
        if level > graphics::MAX_ANTI_ALIASING {
            write_at(ctx.rdx, graphics::ANTI_ALIASING, graphics::MAX_ANTI_ALIASING);
        }
    }
}
