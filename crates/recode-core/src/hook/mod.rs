//! Mid-function hooks: register context, engine backends, address validation
//! and the process-lifetime registry.

mod context;
mod engine;
#[cfg(all(target_os = "windows", target_arch = "x86_64"))]
mod detour;
#[cfg(test)]
mod recording;
mod registry;
mod slot;
mod validate;

pub use context::{HookContext, Xmm, read_at, write_at};
pub use engine::{Attachment, HookCallback, HookEngine, run_guarded};
#[cfg(all(target_os = "windows", target_arch = "x86_64"))]
pub use detour::IlhookEngine;
#[cfg(test)]
pub use recording::RecordingEngine;
pub use registry::{HookHandle, HookKey, HookRegistry};
pub use slot::ScalerSlot;
pub use validate::{DETOUR_LEN, validate_target};
