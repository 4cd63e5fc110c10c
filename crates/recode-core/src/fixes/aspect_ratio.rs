//! Replaces the game's 16:9 aspect ratio constant.

use super::{Fix, FixContext, FixId};

/// 1.7777778f32, little-endian
pub(super) const PATTERN: &str = "39 8E E3 3F";

pub struct AspectRatio;

impl Fix for AspectRatio {
    fn id(&self) -> FixId {
        FixId::AspectRatio
    }

    fn apply(&self, cx: &mut FixContext<'_, '_>) {
        let payload = cx.config().aspect_ratio.to_le_bytes();
        cx.patch_pattern(PATTERN, &payload);
    }
}
