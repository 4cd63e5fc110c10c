//! Keeps speech bubbles anchored to the speaker.
//!
//! The projection divides by the aspect ratio; a later step derives the
//! bubble's horizontal scale from that quotient. The first hook captures the
//! projection term while the aspect ratio operand is the configured one, and
//! the second hook swaps the derived scale for one computed against 16:9.
//! Both hooks share a [`ScalerSlot`]; the host runs the producer before the
//! consumer on every bubble update.

use std::sync::Arc;

use super::{Fix, FixContext, FixId};
use crate::config::FixConfig;
use crate::hook::{HookCallback, HookContext, ScalerSlot, read_at};
use crate::memory::layout::text_bubble;

/// `divss xmm1, [rbx+4]; mov [rdi+4], rax`
pub(super) const PRODUCER_PATTERN: &str = "F3 0F 5E 4B 04 48 89 47 04";
/// `movss xmm1, [r8+8]; shufps xmm0, xmm0, 0`
pub(super) const CONSUMER_PATTERN: &str = "F3 41 0F 10 48 08 0F C6 C0 00";

pub struct TextBubble;

impl Fix for TextBubble {
    fn id(&self) -> FixId {
        FixId::TextBubble
    }

    fn apply(&self, cx: &mut FixContext<'_, '_>) {
        let slot = Arc::new(ScalerSlot::new());
        let config = cx.config();
        let (producer, consumer) = (
            capture_scaler(Arc::clone(config), Arc::clone(&slot)),
            rescale_bubble(Arc::clone(config), slot),
        );

        cx.hook_pattern(0, PRODUCER_PATTERN, producer);
        cx.hook_pattern(1, CONSUMER_PATTERN, consumer);
    }
}

fn capture_scaler(config: Arc<FixConfig>, slot: Arc<ScalerSlot>) -> HookCallback {
    Box::new(move |ctx: &mut HookContext| {
        // SAFETY: the hooked divss reads its divisor from [rbx+4].
        let divisor: f32 = unsafe { read_at(ctx.rbx, text_bubble::ASPECT_RATIO) };
        if divisor == config.aspect_ratio {
            slot.store(ctx.xmm1.f32(0));
        }
    })
}

fn rescale_bubble(config: Arc<FixConfig>, slot: Arc<ScalerSlot>) -> HookCallback {
    let stock_aspect = f32::from_bits(text_bubble::STOCK_ASPECT_BITS);

    Box::new(move |ctx: &mut HookContext| {
        let scaler = slot.load();
        if ctx.xmm0.f32(0) == scaler / config.aspect_ratio {
            ctx.xmm0.set_f32(0, scaler / stock_aspect);
        }
    })
}
