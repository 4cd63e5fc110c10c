//! Widens the in-engine cutscene frustum.

use std::sync::Arc;

use super::{Fix, FixContext, FixId};
use crate::config::FixConfig;
use crate::hook::{HookCallback, HookContext, read_at, write_at};
use crate::memory::layout::cutscene;

/// `movaps xmm1, xmm2; mulss xmm1, [rcx+3A4h]`
pub(super) const PATTERN: &str = "0F 28 CA F3 0F 59 89 A4 03 00 00";

pub struct Cutscene;

impl Fix for Cutscene {
    fn id(&self) -> FixId {
        FixId::Cutscene
    }

    fn apply(&self, cx: &mut FixContext<'_, '_>) {
        let callback = widen_frustum(Arc::clone(cx.config()));
        cx.hook_pattern(0, PATTERN, callback);
    }
}

fn widen_frustum(config: Arc<FixConfig>) -> HookCallback {
    Box::new(move |ctx: &mut HookContext| {
        let factor = config.width_scaling_factor;
        // SAFETY: both bounds are locals of the hooked frame.
        unsafe {
            for offset in [cutscene::LEFT, cutscene::RIGHT] {
                let bound: f32 = read_at(ctx.rsp, offset);
                write_at(ctx.rsp, offset, bound * factor);
            }
        }
    })
}
