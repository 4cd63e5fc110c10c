//! Module list that changes on a script, for monitor tests.

use std::cell::Cell;

use super::{ModuleInfo, ModuleProvider, is_module_named};
use crate::error::{Error, Result};

/// Each poll (a call to `modules` or `resolve`) observes the next snapshot;
/// the last snapshot repeats forever. `None` snapshots fail enumeration.
#[derive(Debug)]
pub struct ScriptedModules {
    snapshots: Vec<Option<Vec<ModuleInfo>>>,
    polls: Cell<usize>,
}

impl ScriptedModules {
    pub fn new(snapshots: Vec<Option<Vec<ModuleInfo>>>) -> Self {
        assert!(!snapshots.is_empty(), "script needs at least one snapshot");
        Self {
            snapshots,
            polls: Cell::new(0),
        }
    }

    /// Shorthand for a script of successful snapshots.
    pub fn of(snapshots: Vec<Vec<ModuleInfo>>) -> Self {
        Self::new(snapshots.into_iter().map(Some).collect())
    }

    /// Number of polls observed so far
    pub fn polls(&self) -> usize {
        self.polls.get()
    }

    fn next_snapshot(&self) -> Result<&[ModuleInfo]> {
        let poll = self.polls.get();
        self.polls.set(poll + 1);
        let index = poll.min(self.snapshots.len() - 1);
        self.snapshots[index]
            .as_deref()
            .ok_or_else(|| Error::ModuleEnumeration(format!("scripted failure at poll {}", poll)))
    }
}

impl ModuleProvider for ScriptedModules {
    fn modules(&self) -> Result<Vec<ModuleInfo>> {
        self.next_snapshot().map(<[ModuleInfo]>::to_vec)
    }

    fn resolve(&self, name: &str) -> Result<Option<ModuleInfo>> {
        Ok(self
            .next_snapshot()?
            .iter()
            .find(|m| is_module_named(&m.name, name))
            .cloned())
    }
}
