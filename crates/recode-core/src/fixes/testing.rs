//! A frozen module image plus recording engine for driving fixes in tests.

use std::sync::Arc;

use super::{Fix, FixReport, FixSet, FixTarget};
use crate::config::{
    Features, FixConfig, FixedDisplay, LogSettings, MonitorSettings, Resolution, Settings,
};
use crate::hook::{HookContext, HookRegistry, RecordingEngine};
use crate::memory::MockMemory;
use crate::module::ModuleInfo;
use crate::pattern::BytePattern;

pub const BASE: usize = 0x1_8000_0000;
const IMAGE_SIZE: usize = 0x1000;

/// Bytes matching `pattern` placed at `offset`; wildcards become zero.
pub fn hook_site(offset: usize, pattern: &str) -> (usize, Vec<u8>) {
    let bytes = BytePattern::parse(pattern)
        .unwrap()
        .tokens()
        .iter()
        .map(|token| token.unwrap_or(0))
        .collect();
    (offset, bytes)
}

pub fn settings(width: u32, height: u32) -> Settings {
    Settings {
        name: "test".to_string(),
        master_enable: true,
        resolution: Resolution { width, height },
        features: Features::default(),
        monitor: MonitorSettings::default(),
        log: LogSettings::default(),
    }
}

pub struct Harness {
    pub base: usize,
    pub module: ModuleInfo,
    pub memory: MockMemory,
    pub engine: RecordingEngine,
    pub registry: HookRegistry,
    pub settings: Settings,
    pub config: Arc<FixConfig>,
    pub cycle: u64,
}

impl Harness {
    /// A nop-filled image with `sites` written into it, configured for 3440x1440.
    pub fn new(sites: &[(usize, Vec<u8>)]) -> Self {
        let mut bytes = vec![0x90; IMAGE_SIZE];
        for (offset, site) in sites {
            bytes[*offset..*offset + site.len()].copy_from_slice(site);
        }
        let settings = settings(3440, 1440);
        Self {
            base: BASE,
            module: ModuleInfo::new("hackGU_vol1.dll", BASE, IMAGE_SIZE),
            memory: MockMemory::new(BASE, bytes),
            engine: RecordingEngine::new(),
            registry: HookRegistry::new(),
            config: Arc::new(resolve(&settings)),
            settings,
            cycle: 1,
        }
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.settings.features = features;
        self.config = Arc::new(resolve(&self.settings));
        self
    }

    pub fn master(mut self, enable: bool) -> Self {
        self.settings.master_enable = enable;
        self.config = Arc::new(resolve(&self.settings));
        self
    }

    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.settings.resolution = Resolution { width, height };
        self.config = Arc::new(resolve(&self.settings));
        self
    }

    /// Make the engine refuse the hook at image offset `offset`.
    pub fn refuse(&mut self, offset: usize) {
        self.engine = std::mem::take(&mut self.engine).refusing(self.base + offset);
    }

    pub fn run(&mut self, fixes: &FixSet) -> Vec<FixReport> {
        fixes.apply(&mut self.target())
    }

    pub fn run_fix(&mut self, fix: &dyn Fix) -> FixReport {
        self.target().run(fix)
    }

    /// Simulate the host reaching the `index`-th installed hook.
    pub fn fire(&self, index: usize, ctx: &mut HookContext) {
        assert!(self.engine.fire(index, ctx), "callback panicked");
    }

    fn target(&mut self) -> FixTarget<'_> {
        FixTarget {
            module: &self.module,
            memory: &mut self.memory,
            engine: &mut self.engine,
            registry: &mut self.registry,
            config: &self.config,
            cycle: self.cycle,
        }
    }
}

fn resolve(settings: &Settings) -> FixConfig {
    FixConfig::resolve(settings, &FixedDisplay { width: 1, height: 1 }).unwrap()
}
