//! # recode-core
//!
//! Core library for the Hack GU Last Recode widescreen fix.
//!
//! The game keeps its code in one of several DLLs that it swaps as the player
//! moves between areas. This crate provides:
//! - A module monitor that follows those DLLs in and out of the process
//! - A wildcard byte-pattern scanner over a module's loaded image
//! - Byte patching and mid-function hooking of the matches
//! - The fix payloads and the per-cycle orchestrator that applies them
//! - The settings file and the derived configuration snapshot

pub mod agent;
pub mod config;
pub mod error;
pub mod fixes;
pub mod hook;
pub mod memory;
pub mod module;
pub mod pattern;
pub mod prelude;
pub mod retry;

pub use agent::{Agent, CycleReport};
pub use config::{DisplaySize, FixConfig, FixedDisplay, PrimaryDisplay, Settings};
pub use error::{Error, Result};
pub use fixes::{Fix, FixContext, FixId, FixReport, FixSet, FixTarget};
#[cfg(all(target_os = "windows", target_arch = "x86_64"))]
pub use hook::IlhookEngine;
pub use hook::{HookCallback, HookContext, HookEngine, HookKey, HookRegistry, ScalerSlot};
#[cfg(target_os = "windows")]
pub use memory::LocalMemory;
pub use memory::{ProcessMemory, apply_patch};
#[cfg(target_os = "windows")]
pub use module::{Win32Modules, host_module};
pub use module::{GAME_MODULES, ModuleInfo, ModuleMonitor, ModuleProvider, MonitorState};
pub use pattern::{BytePattern, format_bytes, scan};
pub use retry::{ExponentialBackoff, FixedDelay, NoDelay, RetryStrategy};
