//! The monitor loop: wait for a game module, fix it, wait for it to go.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use recode_core::prelude::*;
//!
//! let settings = Settings::load("RecodeFix.toml")?;
//! let config = Arc::new(FixConfig::resolve(&settings, &PrimaryDisplay)?);
//! let monitor = ModuleMonitor::with_retry(Win32Modules, GAME_MODULES, settings.monitor.backoff());
//! let mut agent = Agent::new(monitor, LocalMemory, IlhookEngine, config);
//! agent.run();
//! ```

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::FixConfig;
use crate::fixes::{FixReport, FixSet, FixTarget};
use crate::hook::{HookEngine, HookRegistry};
use crate::memory::ProcessMemory;
use crate::module::{ModuleInfo, ModuleMonitor, ModuleProvider};
use crate::retry::{ExponentialBackoff, RetryStrategy};

/// What one load cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub module: ModuleInfo,
    pub fixes: Vec<FixReport>,
}

impl CycleReport {
    pub fn hooks(&self) -> usize {
        self.fixes.iter().map(|r| r.hooks).sum()
    }

    pub fn patches(&self) -> usize {
        self.fixes.iter().map(|r| r.patches).sum()
    }

    pub fn missing(&self) -> usize {
        self.fixes.iter().map(|r| r.missing.len()).sum()
    }

    pub fn failures(&self) -> usize {
        self.fixes.iter().map(|r| r.failures.len()).sum()
    }
}

/// Owns everything the monitor thread needs for the life of the process.
pub struct Agent<P, M, E, R = ExponentialBackoff> {
    monitor: ModuleMonitor<P, R>,
    memory: M,
    engine: E,
    registry: HookRegistry,
    fixes: FixSet,
    config: Arc<FixConfig>,
    cycle: u64,
}

impl<P, M, E, R> Agent<P, M, E, R>
where
    P: ModuleProvider,
    M: ProcessMemory,
    E: HookEngine,
    R: RetryStrategy,
{
    pub fn new(monitor: ModuleMonitor<P, R>, memory: M, engine: E, config: Arc<FixConfig>) -> Self {
        Self {
            monitor,
            memory,
            engine,
            registry: HookRegistry::new(),
            fixes: FixSet::standard(),
            config,
            cycle: 0,
        }
    }

    /// Replace the standard fix list
    pub fn with_fixes(mut self, fixes: FixSet) -> Self {
        self.fixes = fixes;
        self
    }

    pub fn config(&self) -> &Arc<FixConfig> {
        &self.config
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    pub fn monitor(&self) -> &ModuleMonitor<P, R> {
        &self.monitor
    }

    /// Completed or in-progress load cycles
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Block until a game module loads, then apply every fix to it.
    pub fn load_and_fix(&mut self) -> CycleReport {
        let module = self.monitor.wait_for_load();
        self.cycle += 1;

        let mut target = FixTarget {
            module: &module,
            memory: &mut self.memory,
            engine: &mut self.engine,
            registry: &mut self.registry,
            config: &self.config,
            cycle: self.cycle,
        };
        let fixes = self.fixes.apply(&mut target);

        let report = CycleReport {
            cycle: self.cycle,
            module,
            fixes,
        };
        info!(
            "Cycle {} on {}: {} hooks, {} patches, {} missing, {} failed ({} hooks retained)",
            report.cycle,
            report.module.name,
            report.hooks(),
            report.patches(),
            report.missing(),
            report.failures(),
            self.registry.len()
        );
        if report.failures() > 0 {
            warn!("{} fix sites could not be applied", report.failures());
        }
        report
    }

    /// One full load, fix, unload cycle.
    pub fn run_cycle(&mut self) -> CycleReport {
        let report = self.load_and_fix();
        self.monitor.wait_for_unload();
        report
    }

    /// Cycle forever. Only process exit stops this thread.
    pub fn run(&mut self) -> ! {
        loop {
            self.run_cycle();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixes::testing::{BASE, hook_site, settings};
    use crate::fixes::{FixId, Viewport};
    use crate::hook::RecordingEngine;
    use crate::memory::MockMemory;
    use crate::module::{GAME_MODULES, ScriptedModules};
    use crate::retry::NoDelay;
    use crate::config::FixedDisplay;

    const SIZE: usize = 0x800;

    fn image() -> MockMemory {
        let mut bytes = vec![0x90; SIZE];
        for (offset, site) in [
            hook_site(0x100, "44 0F BE 4A 10 44 0F BE 52 11"),
            hook_site(0x200, "41 D1 F8 41 8B C0 C1 E8 1F"),
            hook_site(0x300, "39 8E E3 3F"),
        ] {
            bytes[offset..offset + site.len()].copy_from_slice(&site);
        }
        MockMemory::new(BASE, bytes)
    }

    fn agent(
        script: ScriptedModules,
    ) -> Agent<ScriptedModules, MockMemory, RecordingEngine, NoDelay> {
        let config = FixConfig::resolve(&settings(3440, 1440), &FixedDisplay { width: 1, height: 1 }).unwrap();
        Agent::new(
            ModuleMonitor::with_retry(script, GAME_MODULES, NoDelay),
            image(),
            RecordingEngine::new(),
            Arc::new(config),
        )
    }

    fn vol1() -> ModuleInfo {
        ModuleInfo::new(r"C:\Games\hackGU\hackGU_vol1.dll", BASE, SIZE)
    }

    #[test]
    fn test_cycle_applies_fixes_then_waits_for_unload() {
        let script = ScriptedModules::of(vec![vec![], vec![vol1()], vec![vol1()], vec![]]);
        let mut agent = agent(script);

        let report = agent.run_cycle();

        assert_eq!(report.cycle, 1);
        assert_eq!(report.module.name, "hackGU_vol1.dll");
        assert_eq!(report.hooks(), 2);
        assert_eq!(report.patches(), 1);
        assert_eq!(report.fixes.len(), 8);
        assert_eq!(agent.monitor().provider().polls(), 4);
        assert!(agent.monitor().current().is_none());
    }

    #[test]
    fn test_reload_installs_fresh_hooks_and_keeps_old_ones() {
        let script = ScriptedModules::of(vec![
            vec![vol1()],
            vec![],
            vec![vol1()],
            vec![],
        ]);
        let mut agent = agent(script).with_fixes(FixSet::new(vec![Box::new(Viewport)]));

        let first = agent.run_cycle();
        let second = agent.run_cycle();

        assert_eq!((first.cycle, second.cycle), (1, 2));
        assert_eq!(first.hooks(), 1);
        assert_eq!(second.hooks(), 1);
        assert_eq!(agent.registry().len(), 2);
        let cycles: Vec<_> = agent.registry().handles().iter().map(|h| h.key().cycle).collect();
        assert_eq!(cycles, vec![1, 2]);
        assert!(agent.registry().handles().iter().all(|h| h.key().fix == FixId::Viewport));
        assert!(agent.registry().len() <= HookRegistry::retained_bound(agent.cycle()));
    }

    #[test]
    fn test_disabled_master_still_completes_cycle() {
        let script = ScriptedModules::of(vec![vec![vol1()], vec![]]);
        let mut raw = settings(3440, 1440);
        raw.master_enable = false;
        let config = FixConfig::resolve(&raw, &FixedDisplay { width: 1, height: 1 }).unwrap();
        let mut agent = Agent::new(
            ModuleMonitor::with_retry(script, GAME_MODULES, NoDelay),
            image(),
            RecordingEngine::new(),
            Arc::new(config),
        );

        let report = agent.run_cycle();
        assert_eq!(report.hooks() + report.patches(), 0);
        assert!(agent.registry().is_empty());
    }
}
