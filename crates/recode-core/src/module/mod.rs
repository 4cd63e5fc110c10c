//! Game code modules and the monitor that follows them in and out of the
//! process.
//!
//! The game executable is only a shell: the actual game code lives in one of
//! several DLLs that are swapped as the player moves between the title screen,
//! the terminal and the four volumes.

mod monitor;
#[cfg(test)]
pub mod scripted;
#[cfg(target_os = "windows")]
mod win32;

pub use monitor::{ModuleMonitor, MonitorState};
#[cfg(test)]
pub use scripted::ScriptedModules;
#[cfg(target_os = "windows")]
pub use win32::{Win32Modules, host_module};

use crate::error::Result;

/// Every game DLL, in the priority order used when more than one is loaded.
pub const GAME_MODULES: [&str; 6] = [
    "hackGU_terminal.dll",
    "hackGU_title.dll",
    "hackGU_vol1.dll",
    "hackGU_vol2.dll",
    "hackGU_vol3.dll",
    "hackGU_vol4.dll",
];

/// A loaded module: identity plus the extent of its in-memory image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// File name (or full path, as enumerated)
    pub name: String,
    pub base: usize,
    /// Size of the whole loaded image, not just the code section
    pub size: usize,
}

impl ModuleInfo {
    pub fn new(name: impl Into<String>, base: usize, size: usize) -> Self {
        Self {
            name: name.into(),
            base,
            size,
        }
    }

    /// File-name component of `name`
    pub fn file_name(&self) -> &str {
        file_name(&self.name)
    }

    pub fn contains(&self, address: usize) -> bool {
        address >= self.base && address - self.base < self.size
    }

    /// Module-relative offset of `address`
    pub fn relative(&self, address: usize) -> usize {
        address.wrapping_sub(self.base)
    }

    pub fn end(&self) -> usize {
        self.base.saturating_add(self.size)
    }
}

/// Source of the host process's module list.
pub trait ModuleProvider {
    /// Every module currently loaded in the process.
    fn modules(&self) -> Result<Vec<ModuleInfo>>;

    /// The module loaded under `name`, if any.
    fn resolve(&self, name: &str) -> Result<Option<ModuleInfo>>;
}

impl<P: ModuleProvider + ?Sized> ModuleProvider for &P {
    fn modules(&self) -> Result<Vec<ModuleInfo>> {
        (**self).modules()
    }

    fn resolve(&self, name: &str) -> Result<Option<ModuleInfo>> {
        (**self).resolve(name)
    }
}

/// Last component of a Windows or POSIX path.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

/// Whether an enumerated module path refers to the allow-listed `name`.
pub fn is_module_named(path: &str, name: &str) -> bool {
    file_name(path).eq_ignore_ascii_case(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_strips_directories() {
        assert_eq!(
            file_name(r"C:\Games\hackGU\hackGU_vol1.dll"),
            "hackGU_vol1.dll"
        );
        assert_eq!(file_name("/opt/game/hackGU_vol2.dll"), "hackGU_vol2.dll");
        assert_eq!(file_name("hackGU_title.dll"), "hackGU_title.dll");
    }

    #[test]
    fn test_is_module_named_is_case_insensitive() {
        assert!(is_module_named(r"C:\x\HACKGU_VOL3.DLL", "hackGU_vol3.dll"));
        assert!(!is_module_named(r"C:\x\hackGU_vol3.dll.bak", "hackGU_vol3.dll"));
        assert!(!is_module_named(r"C:\hackGU_vol1.dll\other.dll", "hackGU_vol1.dll"));
    }

    #[test]
    fn test_module_info_bounds() {
        let module = ModuleInfo::new("hackGU_vol1.dll", 0x1000, 0x200);
        assert!(module.contains(0x1000));
        assert!(module.contains(0x11FF));
        assert!(!module.contains(0x1200));
        assert!(!module.contains(0xFFF));
        assert_eq!(module.relative(0x1010), 0x10);
        assert_eq!(module.end(), 0x1200);
    }
}
