//! Keeps the HUD inside a centered 16:9 frame.
//!
//! The width fed to the UI layout is stretched by the width scaling factor;
//! the layout code then derives its placement scale from it.

use std::sync::Arc;

use super::{Fix, FixContext, FixId};
use crate::config::FixConfig;
use crate::hook::{HookCallback, HookContext};

/// `mov dword [rdi+disp32], imm32; subss xmm0, xmm9`
pub(super) const PATTERN: &str = "C7 87 ?? ?? ?? ?? ?? ?? ?? ?? F3 41 0F 5C C1";

pub struct CenterUi;

impl Fix for CenterUi {
    fn id(&self) -> FixId {
        FixId::CenterUi
    }

    fn apply(&self, cx: &mut FixContext<'_, '_>) {
        let callback = scale_layout_width(Arc::clone(cx.config()));
        cx.hook_pattern(0, PATTERN, callback);
    }
}

fn scale_layout_width(config: Arc<FixConfig>) -> HookCallback {
    Box::new(move |ctx: &mut HookContext| {
        ctx.xmm0
            .set_f32(0, config.width as f32 * config.width_scaling_factor);
    })
}
