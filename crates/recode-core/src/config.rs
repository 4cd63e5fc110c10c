//! User settings and the derived snapshot every fix reads.
//!
//! [`Settings`] is the raw `RecodeFix.toml` contents. [`FixConfig`] is built
//! from it once at startup and never mutated afterwards; hook callbacks hold
//! an `Arc<FixConfig>` captured when they were installed.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::fixes::FixId;
use crate::memory::layout::timing;
use crate::retry::ExponentialBackoff;

pub const DEFAULT_CONFIG_FILE: &str = "RecodeFix.toml";
pub const DEFAULT_LOG_FILE: &str = "RecodeFix.log";

/// Width of the 16:9 frame the game lays its UI out in, per unit of height.
const STOCK_ASPECT_WIDTH: u64 = 16;
const STOCK_ASPECT_HEIGHT: u64 = 9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_name")]
    pub name: String,
    pub master_enable: bool,
    pub resolution: Resolution,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub log: LogSettings,
}

/// Target resolution; 0 in either field selects the native display size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn is_native(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default = "enabled")]
    pub enable: bool,
}

impl Default for Feature {
    fn default() -> Self {
        Self { enable: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub anti_aliasing: Feature,
    pub viewport: Feature,
    pub aspect_ratio: Feature,
    pub center_ui: Feature,
    pub ui_elements: Feature,
    pub combat_overlay: Feature,
    pub text_bubble: Feature,
    pub cutscene: Feature,
}

impl Features {
    pub fn get(&self, fix: FixId) -> Feature {
        match fix {
            FixId::AntiAliasing => self.anti_aliasing,
            FixId::Viewport => self.viewport,
            FixId::AspectRatio => self.aspect_ratio,
            FixId::CenterUi => self.center_ui,
            FixId::UiElements => self.ui_elements,
            FixId::CombatOverlay => self.combat_overlay,
            FixId::TextBubble => self.text_bubble,
            FixId::Cutscene => self.cutscene,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub poll_interval_ms: u64,
    pub max_poll_interval_ms: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: timing::MODULE_POLL_INTERVAL_MS,
            max_poll_interval_ms: timing::MAX_MODULE_POLL_INTERVAL_MS,
        }
    }
}

impl MonitorSettings {
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_millis(self.max_poll_interval_ms),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub file: PathBuf,
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_LOG_FILE),
            level: "info".to_string(),
        }
    }
}

fn default_name() -> String {
    "Hack GU Last Recode Fix".to_string()
}

fn enabled() -> bool {
    true
}

impl Settings {
    /// Read and parse a settings file.
    ///
    /// Every failure, including a missing file, is reported as
    /// [`Error::ConfigInvalid`] so the caller can stop before touching the host.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::ConfigInvalid(format!("{}: {}", path.display(), e)))?;
        content
            .parse()
            .map_err(|e: Error| Error::ConfigInvalid(format!("{}: {}", path.display(), e)))
    }
}

impl FromStr for Settings {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// Source of the primary display's size, consulted when the configured
/// resolution is 0.
pub trait DisplaySize {
    fn native_size(&self) -> Result<(u32, u32)>;
}

/// The primary monitor as reported by the system.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrimaryDisplay;

#[cfg(target_os = "windows")]
impl DisplaySize for PrimaryDisplay {
    fn native_size(&self) -> Result<(u32, u32)> {
        use windows::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN};

        // SAFETY: GetSystemMetrics has no preconditions.
        let (width, height) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
            _ => Err(Error::ConfigInvalid(format!(
                "primary display reported {}x{}",
                width, height
            ))),
        }
    }
}

#[cfg(not(target_os = "windows"))]
impl DisplaySize for PrimaryDisplay {
    fn native_size(&self) -> Result<(u32, u32)> {
        Err(Error::ConfigInvalid(
            "native display size is only available on Windows".to_string(),
        ))
    }
}

/// A display of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDisplay {
    pub width: u32,
    pub height: u32,
}

impl DisplaySize for FixedDisplay {
    fn native_size(&self) -> Result<(u32, u32)> {
        Ok((self.width, self.height))
    }
}

/// Immutable configuration snapshot with the derived scalars.
#[derive(Debug, Clone, PartialEq)]
pub struct FixConfig {
    pub name: String,
    pub master_enable: bool,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f32,
    /// Height scaled to a 16:9 width, truncated
    pub normalized_width: u32,
    /// Left edge of a centered 16:9 frame; negative when narrower than 16:9
    pub normalized_offset: i32,
    pub width_scaling_factor: f32,
    features: Features,
}

impl FixConfig {
    pub fn resolve(settings: &Settings, display: &dyn DisplaySize) -> Result<Self> {
        let (width, height) = if settings.resolution.is_native() {
            display.native_size()?
        } else {
            (settings.resolution.width, settings.resolution.height)
        };
        if width == 0 || height == 0 {
            return Err(Error::ConfigInvalid(format!(
                "resolved resolution {}x{} is empty",
                width, height
            )));
        }

        let normalized_width =
            (u64::from(height) * STOCK_ASPECT_WIDTH / STOCK_ASPECT_HEIGHT) as u32;
        let normalized_offset = ((i64::from(width) - i64::from(normalized_width)) / 2) as i32;

        Ok(Self {
            name: settings.name.clone(),
            master_enable: settings.master_enable,
            width,
            height,
            aspect_ratio: width as f32 / height as f32,
            normalized_width,
            normalized_offset,
            width_scaling_factor: width as f32 / normalized_width as f32,
            features: settings.features,
        })
    }

    pub fn is_enabled(&self, fix: FixId) -> bool {
        self.master_enable && self.features.get(fix).enable
    }

    pub fn log_summary(&self) {
        info!("Name: {}", self.name);
        info!("MasterEnable: {}", self.master_enable);
        info!("Resolution: {}x{}", self.width, self.height);
        info!("Aspect Ratio: {}", self.aspect_ratio);
        info!("Normalized Width: {}", self.normalized_width);
        info!("Normalized Offset: {}", self.normalized_offset);
        info!("Width Scaling Factor: {}", self.width_scaling_factor);
        for fix in FixId::ALL {
            info!("Feature {}: {}", fix, self.features.get(fix).enable);
        }
    }
}
