//! Prelude module for convenient imports
//!
//! ```ignore
//! use recode_core::prelude::*;
//! ```
//!
//! Brings the agent, its collaborators and the error types into scope.

// Monitor loop
pub use crate::agent::{Agent, CycleReport};
pub use crate::module::{GAME_MODULES, ModuleInfo, ModuleMonitor, ModuleProvider};

// Configuration
pub use crate::config::{DisplaySize, FixConfig, PrimaryDisplay, Settings};

// Fixes
pub use crate::fixes::{FixId, FixReport, FixSet};

// Platform backends
#[cfg(all(target_os = "windows", target_arch = "x86_64"))]
pub use crate::hook::IlhookEngine;
#[cfg(target_os = "windows")]
pub use crate::memory::LocalMemory;
#[cfg(target_os = "windows")]
pub use crate::module::Win32Modules;

// Error handling
pub use crate::error::{Error, Result};
