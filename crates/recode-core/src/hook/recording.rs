//! Hook engine that records installs instead of patching code.

use super::HookContext;
use super::engine::{Attachment, HookCallback, HookEngine, run_guarded};
use crate::error::{Error, Result};

#[derive(Default)]
pub struct RecordingEngine {
    installs: Vec<(usize, HookCallback)>,
    refuse: Vec<usize>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every attach at `address`.
    pub fn refusing(mut self, address: usize) -> Self {
        self.refuse.push(address);
        self
    }

    pub fn addresses(&self) -> Vec<usize> {
        self.installs.iter().map(|(address, _)| *address).collect()
    }

    pub fn len(&self) -> usize {
        self.installs.len()
    }

    /// Simulate execution reaching the `index`-th installed hook.
    pub fn fire(&self, index: usize, ctx: &mut HookContext) -> bool {
        run_guarded(self.installs[index].1.as_ref(), ctx)
    }
}

impl HookEngine for RecordingEngine {
    fn attach(&mut self, address: usize, callback: HookCallback) -> Result<Attachment> {
        if self.refuse.contains(&address) {
            return Err(Error::HookInstall {
                address,
                reason: "refused by recording engine".to_string(),
            });
        }
        self.installs.push((address, callback));
        Ok(Attachment::new(address))
    }
}
