//! The fixes applied to each freshly loaded game module.
//!
//! Every fix owns its byte patterns and the payload it hooks or patches in.
//! [`FixSet::apply`] runs them in a fixed order; a fix that cannot find its
//! pattern or cannot install its hook only affects its own report.

mod anti_aliasing;
mod aspect_ratio;
mod center_ui;
mod combat_overlay;
mod context;
mod cutscene;
mod text_bubble;
mod ui_elements;
mod viewport;

#[cfg(test)]
pub(crate) mod testing;

pub use anti_aliasing::AntiAliasing;
pub use aspect_ratio::AspectRatio;
pub use center_ui::CenterUi;
pub use combat_overlay::CombatOverlay;
pub use context::{FixContext, FixTarget};
pub use cutscene::Cutscene;
pub use text_bubble::TextBubble;
pub use ui_elements::UiElements;
pub use viewport::Viewport;

use strum::{Display, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FixId {
    AntiAliasing,
    Viewport,
    AspectRatio,
    CenterUi,
    UiElements,
    CombatOverlay,
    TextBubble,
    Cutscene,
}

impl FixId {
    /// Run order
    pub const ALL: [FixId; 8] = [
        FixId::AntiAliasing,
        FixId::Viewport,
        FixId::AspectRatio,
        FixId::CenterUi,
        FixId::UiElements,
        FixId::CombatOverlay,
        FixId::TextBubble,
        FixId::Cutscene,
    ];

    /// Hooks one application of this fix installs when every pattern is found
    pub const fn hook_points(self) -> usize {
        match self {
            FixId::AspectRatio => 0,
            FixId::TextBubble => 2,
            _ => 1,
        }
    }

    pub const fn total_hook_points() -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < Self::ALL.len() {
            total += Self::ALL[i].hook_points();
            i += 1;
        }
        total
    }
}

/// One behavioral change to the game module.
pub trait Fix {
    fn id(&self) -> FixId;

    /// Scan for this fix's patterns and hook or patch every match site.
    ///
    /// Only called when the fix is enabled. Outcomes are recorded through
    /// `cx`; nothing here returns an error.
    fn apply(&self, cx: &mut FixContext<'_, '_>);
}

/// Outcome of one fix in one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixReport {
    pub fix: FixId,
    pub enabled: bool,
    pub hooks: usize,
    pub patches: usize,
    /// Patterns that matched nothing
    pub missing: Vec<String>,
    /// Hooks or patches that could not be installed at a found address
    pub failures: Vec<String>,
}

impl FixReport {
    pub fn new(fix: FixId, enabled: bool) -> Self {
        Self {
            fix,
            enabled,
            hooks: 0,
            patches: 0,
            missing: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Whether everything this fix looked for was found and applied
    pub fn is_complete(&self) -> bool {
        self.enabled && self.missing.is_empty() && self.failures.is_empty()
    }
}

/// Ordered list of fixes run once per load cycle.
pub struct FixSet {
    fixes: Vec<Box<dyn Fix>>,
}

impl FixSet {
    pub fn new(fixes: Vec<Box<dyn Fix>>) -> Self {
        Self { fixes }
    }

    /// Every fix, in [`FixId::ALL`] order.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(AntiAliasing),
            Box::new(Viewport),
            Box::new(AspectRatio),
            Box::new(CenterUi),
            Box::new(UiElements),
            Box::new(CombatOverlay),
            Box::new(TextBubble),
            Box::new(Cutscene),
        ])
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = FixId> + '_ {
        self.fixes.iter().map(|fix| fix.id())
    }

    pub fn apply(&self, target: &mut FixTarget<'_>) -> Vec<FixReport> {
        self.fixes.iter().map(|fix| target.run(fix.as_ref())).collect()
    }
}

impl Default for FixSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Harness, hook_site};
    use super::*;
    use crate::config::Features;

    #[test]
    fn test_standard_order_matches_ids() {
        let ids: Vec<_> = FixSet::standard().ids().collect();
        assert_eq!(ids, FixId::ALL.to_vec());
    }

    #[test]
    fn test_fix_id_names() {
        assert_eq!(FixId::CombatOverlay.to_string(), "combat_overlay");
        let name: &'static str = FixId::CenterUi.into();
        assert_eq!(name, "center_ui");
    }

    #[test]
    fn test_total_hook_points() {
        assert_eq!(FixId::total_hook_points(), 8);
    }

    #[test]
    fn test_disabled_fix_installs_nothing() {
        let mut features = Features::default();
        features.viewport.enable = false;
        let mut harness = Harness::new(&[
            hook_site(0x100, anti_aliasing::PATTERN),
            hook_site(0x200, viewport::PATTERN),
        ])
        .with_features(features);

        let reports = harness.run(&FixSet::new(vec![Box::new(AntiAliasing), Box::new(Viewport)]));

        assert!(reports[0].enabled);
        assert_eq!(reports[0].hooks, 1);
        assert!(!reports[1].enabled);
        assert_eq!(reports[1].hooks, 0);
        assert_eq!(harness.engine.addresses(), vec![harness.base + 0x100]);
    }

    #[test]
    fn test_master_disable_skips_every_fix() {
        let mut harness = Harness::new(&[hook_site(0x100, anti_aliasing::PATTERN)]).master(false);

        let reports = harness.run(&FixSet::standard());

        assert_eq!(reports.len(), 8);
        assert!(reports.iter().all(|r| !r.enabled && r.hooks == 0 && r.patches == 0));
        assert!(harness.registry.is_empty());
    }

    #[test]
    fn test_missing_pattern_does_not_block_later_fixes() {
        // Only the last fix in the run order has its pattern in the image
        let mut harness = Harness::new(&[hook_site(0x300, cutscene::PATTERN)]);

        let reports = harness.run(&FixSet::standard());

        for report in &reports[..7] {
            assert!(!report.missing.is_empty(), "{} should miss", report.fix);
            assert!(report.failures.is_empty());
        }
        assert!(reports[7].is_complete());
        assert_eq!(reports[7].hooks, 1);
    }

    #[test]
    fn test_hook_failure_is_reported_apart_from_missing() {
        let mut harness = Harness::new(&[hook_site(0x100, viewport::PATTERN)]);
        harness.refuse(0x100);

        let reports = harness.run(&FixSet::new(vec![Box::new(Viewport)]));

        assert!(reports[0].missing.is_empty());
        assert_eq!(reports[0].failures.len(), 1);
        assert_eq!(reports[0].hooks, 0);
        assert!(harness.registry.is_empty());
    }

    struct FindOnly(&'static str);

    impl Fix for FindOnly {
        fn id(&self) -> FixId {
            FixId::Viewport
        }

        fn apply(&self, cx: &mut FixContext<'_, '_>) {
            cx.find(self.0);
        }
    }

    #[test]
    fn test_missing_pattern_and_bad_pattern_are_filed_apart() {
        let mut harness = Harness::new(&[]);

        let missing = harness.run_fix(&FindOnly("41 D1 F8 ?? 8B"));
        let malformed = harness.run_fix(&FindOnly("41 ZZ F8"));

        assert_eq!(missing.missing, vec!["41 D1 F8 ?? 8B".to_string()]);
        assert!(missing.failures.is_empty());
        assert!(malformed.missing.is_empty());
        assert_eq!(malformed.failures.len(), 1);
        assert!(malformed.failures[0].contains("ZZ"));
    }

    #[test]
    fn test_repeat_run_on_frozen_image_is_deterministic() {
        let mut harness = Harness::new(&[
            hook_site(0x100, anti_aliasing::PATTERN),
            hook_site(0x200, viewport::PATTERN),
            hook_site(0x300, cutscene::PATTERN),
        ]);
        let fixes = FixSet::standard();

        let first = harness.run(&fixes);
        let after_first = harness.registry.len();
        harness.cycle += 1;
        let second = harness.run(&fixes);

        assert_eq!(after_first, 3);
        assert_eq!(harness.registry.len(), 6);
        let hooks = |reports: &[FixReport]| reports.iter().map(|r| r.hooks).collect::<Vec<_>>();
        assert_eq!(hooks(&first), hooks(&second));
        assert_eq!(harness.registry.in_cycle(harness.cycle).count(), 3);
    }
}
