//! Re-centers full-width UI components (menus, the minimap frame) into the
//! 16:9 frame.
//!
//! Components whose X offset equals the stock minimap inset are moved to the
//! inset of the centered frame. Every other component is stretched back to
//! the full screen width from the left edge.

use std::sync::Arc;

use super::{Fix, FixContext, FixId};
use crate::config::FixConfig;
use crate::hook::{HookCallback, HookContext, read_at, write_at};
use crate::memory::layout::ui_element;

/// Epilogue `mov rsi, [rsp+38h]; mov rbx, [rsp+40h]; add rsp, 20h; pop rdi; ret`
/// followed by `lea rax, [rcx+388h]`
pub(super) const PATTERN: &str =
    "48 8B 74 24 38 48 8B 5C 24 40 48 83 C4 20 5F C3 48 8D 81 88 03 00 00";

pub struct UiElements;

impl Fix for UiElements {
    fn id(&self) -> FixId {
        FixId::UiElements
    }

    fn apply(&self, cx: &mut FixContext<'_, '_>) {
        let callback = place_component(MapInsets::new(cx.config()));
        cx.hook_pattern(0, PATTERN, callback);
    }
}

/// Pixel insets of the minimap, derived once from the resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MapInsets {
    /// Inset the game computes at the configured width
    stock: u32,
    /// Alternate inset some areas use
    stock_alt: u32,
    /// Offset the component should start at inside the centered frame
    centered: u32,
    width: u32,
}

impl MapInsets {
    fn new(config: &Arc<FixConfig>) -> Self {
        let width = config.width as f32;
        let normalized = config.normalized_width as f32;
        let inset_alt = f32::from_bits(ui_element::MAP_INSET_ALT_BITS);
        let centered_inset = scale_inset(normalized, ui_element::MAP_INSET);

        Self {
            stock: scale_inset(width, ui_element::MAP_INSET),
            stock_alt: scale_inset(width, inset_alt),
            centered: config.normalized_offset.wrapping_add(centered_inset as i32) as u32,
            width: config.width,
        }
    }
}

/// Inset at `width`, rounded half up.
fn scale_inset(width: f32, inset: f32) -> u32 {
    ((width / ui_element::MAP_REFERENCE_WIDTH) * inset + 0.5) as u32
}

fn place_component(insets: MapInsets) -> HookCallback {
    Box::new(move |ctx: &mut HookContext| {
        // SAFETY: rbx holds the component being laid out; the following
        // `lea rax, [rcx+388h]` addresses the same structure.
        unsafe {
            let x_offset: u32 = read_at(ctx.rbx, ui_element::X_OFFSET);
            if x_offset == insets.stock || x_offset == insets.stock_alt {
                let extent: u32 = read_at(ctx.rbx, ui_element::X_EXTENT_SOURCE);
                write_at(ctx.rbx, ui_element::X_OFFSET, insets.centered);
                write_at(ctx.rbx, ui_element::X_EXTENT, extent);
            } else {
                write_at(ctx.rbx, ui_element::X_OFFSET, 0u32);
                write_at(ctx.rbx, ui_element::X_EXTENT, insets.width);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixes::testing::{Harness, hook_site};

    struct Component([u8; 0x3A0]);

    impl Component {
        fn new(x_offset: u32, extent: u32, extent_source: u32) -> Self {
            let mut bytes = [0u8; 0x3A0];
            bytes[0x388..0x38C].copy_from_slice(&x_offset.to_le_bytes());
            bytes[0x390..0x394].copy_from_slice(&extent.to_le_bytes());
            bytes[0x394..0x398].copy_from_slice(&extent_source.to_le_bytes());
            Self(bytes)
        }

        fn u32_at(&self, offset: usize) -> u32 {
            u32::from_le_bytes(self.0[offset..offset + 4].try_into().unwrap())
        }
    }

    fn fire(harness: &Harness, component: &mut Component) {
        let mut ctx = HookContext {
            rbx: component.0.as_mut_ptr() as u64,
            ..Default::default()
        };
        harness.fire(0, &mut ctx);
    }

    #[test]
    fn test_insets_at_ultrawide() {
        let harness = Harness::new(&[]);
        let insets = MapInsets::new(&harness.config);
        // 3440 / 682 * 40 = 201.76
        assert_eq!(insets.stock, 202);
        // 3440 / 682 * 41.869 = 211.19
        assert_eq!(insets.stock_alt, 211);
        // 440 + round(2560 / 682 * 40 = 150.15)
        assert_eq!(insets.centered, 590);
        assert_eq!(insets.width, 3440);
    }

    #[test]
    fn test_minimap_moves_into_centered_frame() {
        let mut harness = Harness::new(&[hook_site(0x10, PATTERN)]);
        assert_eq!(harness.run_fix(&UiElements).hooks, 1);

        let mut component = Component::new(202, 0, 512);
        fire(&harness, &mut component);
        assert_eq!(component.u32_at(0x388), 590);
        assert_eq!(component.u32_at(0x390), 512);

        let mut alt = Component::new(211, 0, 300);
        fire(&harness, &mut alt);
        assert_eq!(alt.u32_at(0x388), 590);
        assert_eq!(alt.u32_at(0x390), 300);
    }

    #[test]
    fn test_other_components_span_full_width() {
        let mut harness = Harness::new(&[hook_site(0x10, PATTERN)]);
        harness.run_fix(&UiElements);

        let mut component = Component::new(440, 2560, 2560);
        fire(&harness, &mut component);
        assert_eq!(component.u32_at(0x388), 0);
        assert_eq!(component.u32_at(0x390), 3440);
    }

    #[test]
    fn test_narrow_screen_offset_wraps_like_host_arithmetic() {
        // 16:10 has a negative centering offset
        let harness = Harness::new(&[]).resolution(1920, 1200);
        let insets = MapInsets::new(&harness.config);
        // -106 + round(2133 / 682 * 40 = 125.10)
        assert_eq!(insets.centered as i32, 19);
    }
}
