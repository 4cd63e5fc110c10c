//! Stretches the red combat tint over the whole screen instead of the
//! centered 16:9 frame.

use std::sync::Arc;

use super::{Fix, FixContext, FixId};
use crate::config::FixConfig;
use crate::hook::{HookCallback, HookContext, write_at};
use crate::memory::layout::combat_overlay;

/// `mov eax, [rdx+280h]; lea r9, [rcx+0E0h]`
pub(super) const PATTERN: &str = "8B 82 80 02 00 00 4C 8D 89 E0 00 00 00";

pub struct CombatOverlay;

impl Fix for CombatOverlay {
    fn id(&self) -> FixId {
        FixId::CombatOverlay
    }

    fn apply(&self, cx: &mut FixContext<'_, '_>) {
        let callback = stretch_overlay(Arc::clone(cx.config()));
        cx.hook_pattern(0, PATTERN, callback);
    }
}

fn stretch_overlay(config: Arc<FixConfig>) -> HookCallback {
    // The host stores the integer conversion of the reciprocal half-width,
    // which truncates to zero at any real resolution.
    let scale = (1.0 / (config.width as f32 / 2.0)) as u32;

    Box::new(move |ctx: &mut HookContext| {
        if ctx.r13 != combat_overlay::OBJECT_ID || ctx.r14 != 0 {
            return;
        }
        // SAFETY: the hooked `mov eax, [rdx+280h]` reads the same object.
        unsafe {
            write_at(ctx.rdx, combat_overlay::SCALE, scale);
            write_at(ctx.rdx, combat_overlay::ORIGIN, combat_overlay::ORIGIN_VALUE);
        }
    })
}
