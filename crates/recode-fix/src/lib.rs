//! # recode-fix
//!
//! The agent DLL injected into the game. On process attach it starts one
//! monitor thread which sets up logging, loads `RecodeFix.toml` from the
//! DLL's directory and then applies the fixes to every game module the
//! host loads, for as long as the process lives.

pub mod logging;

use std::path::Path;

use recode_core::config::{DEFAULT_CONFIG_FILE, DisplaySize, FixConfig, LogSettings, Settings};
use tracing::info;

/// Upper bound for a module path, the longest path Windows accepts.
const MAX_MODULE_PATH: usize = 32_768;

/// Read the settings file next to the DLL.
pub fn load_settings(dir: &Path) -> recode_core::Result<Settings> {
    Settings::load(dir.join(DEFAULT_CONFIG_FILE))
}

/// Resolve loaded settings against the display.
pub fn load_config(settings: &Settings, display: &dyn DisplaySize) -> recode_core::Result<FixConfig> {
    FixConfig::resolve(settings, display)
}

/// Log settings from the loaded file, or the defaults when it failed to load.
pub fn log_settings(settings: Option<&Settings>) -> LogSettings {
    settings.map(|s| s.log.clone()).unwrap_or_default()
}

pub fn banner(dir: &Path, log_file: Option<&Path>) {
    info!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    info!("Target: {}-{}", std::env::consts::ARCH, std::env::consts::OS);
    info!("Agent Dir: {}", dir.display());
    match log_file {
        Some(path) => info!("Log File: {}", path.display()),
        None => info!("Log File: none"),
    }
}

/// Call `fill` with a growing UTF-16 buffer until the result fits.
///
/// `fill` returns the number of units written; a result that fills the
/// whole buffer is treated as truncated.
#[cfg_attr(not(all(target_os = "windows", target_arch = "x86_64")), allow(dead_code))]
fn read_wide(mut fill: impl FnMut(&mut [u16]) -> usize) -> String {
    let mut buffer = vec![0u16; 260];
    loop {
        let len = fill(&mut buffer).min(buffer.len());
        if len < buffer.len() || buffer.len() >= MAX_MODULE_PATH {
            return String::from_utf16_lossy(&buffer[..len]);
        }
        buffer.resize(buffer.len() * 2, 0);
    }
}

#[cfg(all(target_os = "windows", target_arch = "x86_64"))]
mod entry {
    use std::ffi::c_void;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;

    use recode_core::host_module;
    use recode_core::prelude::*;
    use tracing::{error, info, warn};
    use windows::Win32::Foundation::{BOOL, HINSTANCE, HMODULE, TRUE};
    use windows::Win32::System::Diagnostics::Debug::OutputDebugStringW;
    use windows::Win32::System::LibraryLoader::GetModuleFileNameW;
    use windows::Win32::System::SystemServices::DLL_PROCESS_ATTACH;
    use windows::Win32::System::Threading::{
        GetCurrentThread, SetThreadPriority, THREAD_PRIORITY_HIGHEST,
    };
    use windows::core::HSTRING;

    #[unsafe(no_mangle)]
    #[allow(non_snake_case)]
    pub extern "system" fn DllMain(instance: HINSTANCE, reason: u32, _reserved: *mut c_void) -> BOOL {
        if reason == DLL_PROCESS_ATTACH {
            let dir = agent_dir(instance);
            // Starts running once the loader lock is released
            let spawned = thread::Builder::new()
                .name("recode-fix".to_string())
                .spawn(move || monitor_thread(dir));
            if let Err(e) = spawned {
                debug_output(&format!("recode-fix: failed to start monitor thread: {}", e));
            }
        }
        TRUE
    }

    /// Report to an attached debugger; used before or without a log file.
    fn debug_output(message: &str) {
        // SAFETY: the string is NUL terminated and outlives the call.
        unsafe { OutputDebugStringW(&HSTRING::from(message)) };
    }

    fn agent_dir(instance: HINSTANCE) -> PathBuf {
        let module = HMODULE(instance.0);
        // SAFETY: writes at most buffer.len() UTF-16 units.
        let path = super::read_wide(|buffer| unsafe { GetModuleFileNameW(module, buffer) } as usize);
        PathBuf::from(path)
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn monitor_thread(dir: PathBuf) {
        let settings = super::load_settings(&dir);
        let log_settings = super::log_settings(settings.as_ref().ok());
        let log_file = match super::logging::init(&dir, &log_settings) {
            Ok(path) => Some(path),
            Err(e) => {
                debug_output(&format!("recode-fix: continuing without a log file: {:#}", e));
                None
            }
        };
        super::banner(&dir, log_file.as_deref());

        // SAFETY: pseudo handle to the calling thread.
        if let Err(e) = unsafe { SetThreadPriority(GetCurrentThread(), THREAD_PRIORITY_HIGHEST) } {
            warn!("Failed to raise monitor thread priority: {}", e);
        }
        match host_module() {
            Ok(host) => {
                info!("Module Name: {}", host.file_name());
                info!("Module Path: {}", host.name);
                info!("Module Addr: {:#x}", host.base);
            }
            Err(e) => warn!("Failed to query host module: {}", e),
        }

        let resolved = settings.and_then(|settings| {
            super::load_config(&settings, &PrimaryDisplay).map(|config| (settings, config))
        });
        let (settings, config) = match resolved {
            Ok(loaded) => loaded,
            Err(e) => {
                error!("{}", e);
                error!("No fixes will be applied");
                debug_output(&format!("recode-fix: {}", e));
                return;
            }
        };
        config.log_summary();

        let monitor =
            ModuleMonitor::with_retry(Win32Modules, GAME_MODULES, settings.monitor.backoff());
        let mut agent = Agent::new(monitor, LocalMemory, IlhookEngine, Arc::new(config));
        agent.run();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recode_core::{Error, FixedDisplay};
    use std::fs;

    const DISPLAY: FixedDisplay = FixedDisplay {
        width: 2560,
        height: 1440,
    };

    #[test]
    fn test_settings_loaded_once_feed_log_and_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "master_enable = true\n[resolution]\nwidth = 0\nheight = 0\n[log]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(log_settings(Some(&settings)).level, "debug");
        let config = load_config(&settings, &DISPLAY).unwrap();
        assert_eq!((config.width, config.height), (2560, 1440));
    }

    #[test]
    fn test_missing_config_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid(_)));
    }

    #[test]
    fn test_log_settings_fall_back_when_config_is_broken() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "not toml [").unwrap();
        let settings = load_settings(dir.path());
        assert!(settings.is_err());
        assert_eq!(log_settings(settings.as_ref().ok()), LogSettings::default());
    }

    #[test]
    fn test_read_wide_grows_until_path_fits() {
        let path: Vec<u16> = format!(r"C:\Games\{}\scripts\RecodeFix.dll", "x".repeat(400))
            .encode_utf16()
            .collect();
        let mut calls = 0;

        let read = read_wide(|buffer| {
            calls += 1;
            let len = path.len().min(buffer.len());
            buffer[..len].copy_from_slice(&path[..len]);
            len
        });

        assert_eq!(read, String::from_utf16_lossy(&path));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_read_wide_short_path_needs_one_call() {
        let mut calls = 0;
        let read = read_wide(|buffer| {
            calls += 1;
            buffer[..3].copy_from_slice(&[b'a' as u16, b':' as u16, b'\\' as u16]);
            3
        });
        assert_eq!(read, "a:\\");
        assert_eq!(calls, 1);
    }
}
