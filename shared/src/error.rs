use serde::{Serialize, Deserialize};

/// Why a result file could not be loaded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileError {
    #[error("cannot read '{path}': {error}")]
    Io { path: String, error: String },
    #[error("file '{path}' is incomplete")]
    Incomplete { path: String },
    #[error("unsupported file type: '{path}'")]
    Unsupported { path: String },
    #[error("loading of '{path}' was cancelled")]
    Cancelled { path: String },
}

impl FileError {
    pub fn path(&self) -> &str {
        match self {
            FileError::Io { path, .. }
            | FileError::Incomplete { path }
            | FileError::Unsupported { path }
            | FileError::Cancelled { path } => path,
        }
    }

    /// Short text suitable for a status line or tooltip.
    pub fn user_friendly_message(&self) -> String {
        match self {
            FileError::Io { error, .. } => format!("File could not be read ({error})"),
            FileError::Incomplete { .. } => {
                "Simulation did not finish, the file is incomplete".to_string()
            }
            FileError::Unsupported { .. } => "Not a supported result file".to_string(),
            FileError::Cancelled { .. } => "Loading was cancelled".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot access configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("configuration cannot be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("no usable configuration directory on this platform")]
    NoConfigDir,
}
