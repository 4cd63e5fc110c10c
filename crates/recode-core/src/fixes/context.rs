use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::{Fix, FixId, FixReport};
use crate::config::FixConfig;
use crate::error::Error;
use crate::hook::{HookCallback, HookEngine, HookKey, HookRegistry, validate_target};
use crate::memory::{ProcessMemory, apply_patch};
use crate::module::ModuleInfo;
use crate::pattern::{BytePattern, format_bytes, scan};

/// Everything one load cycle's fixes work against.
pub struct FixTarget<'a> {
    pub module: &'a ModuleInfo,
    pub memory: &'a mut dyn ProcessMemory,
    pub engine: &'a mut dyn HookEngine,
    pub registry: &'a mut HookRegistry,
    pub config: &'a Arc<FixConfig>,
    pub cycle: u64,
}

impl FixTarget<'_> {
    /// Run `fix` if enabled and return what it did.
    pub fn run(&mut self, fix: &dyn Fix) -> FixReport {
        let id = fix.id();
        let enabled = self.config.is_enabled(id);
        info!("Fix {} {}", id, if enabled { "Enabled" } else { "Disabled" });

        let mut cx = FixContext {
            target: self,
            report: FixReport::new(id, enabled),
        };
        if enabled {
            fix.apply(&mut cx);
        }
        cx.report
    }
}

/// Scan, hook and patch helpers for one fix, logging and recording every
/// outcome into the fix's report.
pub struct FixContext<'t, 'a> {
    target: &'t mut FixTarget<'a>,
    report: FixReport,
}

impl FixContext<'_, '_> {
    pub fn id(&self) -> FixId {
        self.report.fix
    }

    pub fn config(&self) -> &Arc<FixConfig> {
        self.target.config
    }

    pub fn module(&self) -> &ModuleInfo {
        self.target.module
    }

    pub fn report(&self) -> &FixReport {
        &self.report
    }

    /// Log `e` and file it in the report. An absent pattern is expected on
    /// other game builds; anything else means a site was found but unusable.
    fn record(&mut self, e: Error) {
        if let Some(pattern) = e.missing_pattern() {
            info!("{}", e);
            self.report.missing.push(pattern.to_string());
        } else {
            error!("{}", e);
            self.report.failures.push(e.to_string());
        }
    }

    /// First address in the module image matching `pattern`.
    pub fn find(&mut self, pattern: &str) -> Option<usize> {
        let module = self.target.module;
        let parsed = match BytePattern::parse(pattern) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.record(e);
                return None;
            }
        };

        let found = match self.target.memory.view(module.base, module.size) {
            Ok(image) => scan(image, module.base, &parsed).next(),
            Err(e) => {
                warn!("Cannot read {} image", module.name);
                self.record(e);
                return None;
            }
        };

        match found {
            Some(address) => {
                info!(
                    "Found '{}' @ {}+{:x}",
                    parsed,
                    module.name,
                    module.relative(address)
                );
                Some(address)
            }
            None => {
                self.record(Error::PatternNotFound {
                    pattern: parsed.to_string(),
                });
                None
            }
        }
    }

    /// Install hook point `point` of this fix at `address`.
    pub fn hook(&mut self, point: usize, address: usize, callback: HookCallback) -> bool {
        let target = &mut *self.target;
        let module = target.module;
        let key = HookKey {
            fix: self.report.fix,
            point,
            cycle: target.cycle,
        };

        let installed = validate_target(&*target.memory, module, address).and_then(|displaced| {
            debug!("Detour at {:#x} displaces {} bytes", address, displaced);
            target
                .registry
                .install(&mut *target.engine, key, address, callback)
                .map(|_| ())
        });

        match installed {
            Ok(()) => {
                info!("Hooked @ {}+{:x}", module.name, module.relative(address));
                self.report.hooks += 1;
                true
            }
            Err(e) => {
                error!("Hook site {}+{:x}", module.name, module.relative(address));
                self.record(e);
                false
            }
        }
    }

    /// Find `pattern` and hook its first match.
    pub fn hook_pattern(&mut self, point: usize, pattern: &str, callback: HookCallback) -> bool {
        match self.find(pattern) {
            Some(address) => self.hook(point, address, callback),
            None => false,
        }
    }

    /// Find `pattern` and overwrite its first match with `payload`.
    pub fn patch_pattern(&mut self, pattern: &str, payload: &[u8]) -> bool {
        let Some(address) = self.find(pattern) else {
            return false;
        };
        let module = self.target.module;

        match apply_patch(&mut *self.target.memory, address, payload) {
            Ok(applied) => {
                info!(
                    "Patched '{}' with '{}' @ {}+{:x}",
                    format_bytes(&applied.original),
                    format_bytes(&applied.payload),
                    module.name,
                    module.relative(address)
                );
                self.report.patches += 1;
                true
            }
            Err(e) => {
                self.record(e);
                false
            }
        }
    }
}
