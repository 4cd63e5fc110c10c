use std::thread;

use tracing::{debug, info, warn};

use super::{ModuleInfo, ModuleProvider, is_module_named};
use crate::retry::{ExponentialBackoff, RetryStrategy};

/// Which game module, if any, the monitor is tracking.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MonitorState {
    #[default]
    NoModuleLoaded,
    ModuleLoaded(ModuleInfo),
}

/// Polls the module list for allow-listed game modules.
///
/// Both waits block with no timeout and no cancellation; the host process's
/// own module swaps are the only clock. Enumeration failures are logged and
/// the poll is retried.
pub struct ModuleMonitor<P, R = ExponentialBackoff> {
    provider: P,
    allow_list: Vec<String>,
    retry: R,
    state: MonitorState,
}

impl<P: ModuleProvider> ModuleMonitor<P> {
    pub fn new<I, S>(provider: P, allow_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_retry(provider, allow_list, ExponentialBackoff::default())
    }
}

impl<P: ModuleProvider, R: RetryStrategy> ModuleMonitor<P, R> {
    pub fn with_retry<I, S>(provider: P, allow_list: I, retry: R) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            provider,
            allow_list: allow_list.into_iter().map(Into::into).collect(),
            retry,
            state: MonitorState::NoModuleLoaded,
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn current(&self) -> Option<&ModuleInfo> {
        match &self.state {
            MonitorState::ModuleLoaded(module) => Some(module),
            MonitorState::NoModuleLoaded => None,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Pick the highest-priority allow-listed module out of an enumeration.
    ///
    /// The returned module carries the allow-listed name rather than the
    /// enumerated path.
    pub fn select(&self, modules: &[ModuleInfo]) -> Option<ModuleInfo> {
        self.allow_list.iter().find_map(|name| {
            modules
                .iter()
                .find(|m| is_module_named(&m.name, name))
                .map(|m| ModuleInfo::new(name.clone(), m.base, m.size))
        })
    }

    /// Block until an allow-listed module is present and start tracking it.
    pub fn wait_for_load(&mut self) -> ModuleInfo {
        if let Some(module) = self.current() {
            debug!("{} already tracked", module.name);
            return module.clone();
        }

        let mut attempt = 0u32;
        loop {
            match self.provider.modules() {
                Ok(modules) => {
                    if let Some(module) = self.select(&modules) {
                        info!(
                            "{} Loaded (base: {:#x}, size: {:#x})",
                            module.name, module.base, module.size
                        );
                        self.state = MonitorState::ModuleLoaded(module.clone());
                        return module;
                    }
                }
                Err(e) => warn!("Failed to enumerate modules: {}", e),
            }

            thread::sleep(self.retry.delay(attempt));
            attempt = attempt.saturating_add(1);
        }
    }

    /// Block until the tracked module is gone and stop tracking it.
    ///
    /// A module that resolves at a different base than the one recorded was
    /// swapped out between polls and counts as unloaded.
    pub fn wait_for_unload(&mut self) {
        let Some(tracked) = self.current().cloned() else {
            debug!("No module tracked, nothing to wait for");
            return;
        };

        let mut attempt = 0u32;
        loop {
            match self.provider.resolve(&tracked.name) {
                Ok(None) => {
                    info!("{} Dropped", tracked.name);
                    break;
                }
                Ok(Some(module)) if module.base != tracked.base => {
                    info!(
                        "{} Dropped (reloaded at {:#x}, was {:#x})",
                        tracked.name, module.base, tracked.base
                    );
                    break;
                }
                Ok(Some(_)) => {}
                Err(e) => warn!("Failed to resolve {}: {}", tracked.name, e),
            }

            thread::sleep(self.retry.delay(attempt));
            attempt = attempt.saturating_add(1);
        }

        self.state = MonitorState::NoModuleLoaded;
    }
}
