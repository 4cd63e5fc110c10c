use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Did not find '{pattern}'")]
    PatternNotFound { pattern: String },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Failed to enumerate modules: {0}")]
    ModuleEnumeration(String),

    #[error("Failed to install hook at address {address:#x}: {reason}")]
    HookInstall { address: usize, reason: String },

    #[error("Failed to read process memory at address {address:#x}: {message}")]
    MemoryReadFailed { address: usize, message: String },

    #[error("Failed to patch memory at address {address:#x}: {reason}")]
    PatchFailed { address: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The pattern text when this error only means the target bytes are
    /// absent from the module
    pub fn missing_pattern(&self) -> Option<&str> {
        match self {
            Error::PatternNotFound { pattern } => Some(pattern),
            _ => None,
        }
    }
}
