use serde::{Serialize, Deserialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub mod config;
pub mod error;
pub mod header;
pub mod units;
pub mod variable;

pub use config::{AppConfig, AppSection, MigrationStrategy, UnitsSection, ViewSection};
pub use error::{ConfigError, FileError};
pub use header::FileHeader;
pub use units::{UnitsSettings, UnitsSystem};
pub use variable::{HeaderVariable, Interval, ProxyVariable, Variable};

// ===== MESSAGE TYPES =====

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum LoadEvent {
    Started { file_id: String, name: String },
    Progress { file_id: String, status: LoadingStatus },
    Loaded { file_id: String, file: Box<LoadedFile> },
    Failed { file_id: String, error: FileError },
}

impl LoadEvent {
    pub fn file_id(&self) -> &str {
        match self {
            LoadEvent::Started { file_id, .. }
            | LoadEvent::Progress { file_id, .. }
            | LoadEvent::Loaded { file_id, .. }
            | LoadEvent::Failed { file_id, .. } => file_id,
        }
    }
}

// ===== CORE DATA TYPES =====

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum LoadingStatus {
    Starting,
    Preprocessing,
    Parsing { step: u32, total_steps: u32 },
    Completed,
    Error(String),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum FileState {
    Loading(LoadingStatus),
    Loaded(Box<LoadedFile>),
    Failed(FileError),
}

impl FileState {
    /// Terminal states do not change on further progress events.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FileState::Loaded(_) | FileState::Failed(_))
    }
}

/// A fully processed result file: the standard header plus the derived
/// building-totals header. Both datasets share the file id; which one a view
/// reads is decided per rebuild.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoadedFile {
    pub file_id: String,
    pub name: String,
    pub standard: FileHeader,
    pub totals: FileHeader,
}

impl LoadedFile {
    /// Pick the dataset a view reads. The flag travels with every rebuild
    /// request instead of living in a shared toggle.
    pub fn header(&self, totals: bool) -> &FileHeader {
        if totals { &self.totals } else { &self.standard }
    }
}

// ===== UTILITY FUNCTIONS =====

pub fn generate_file_id(file_path: &str) -> String {
    let mut hasher = DefaultHasher::new();
    file_path.hash(&mut hasher);
    format!("file_{:x}", hasher.finish())
}

/// Disambiguate a display name against already used ones by appending an
/// index: "eplusout", "eplusout (1)", "eplusout (2)", ...
pub fn unique_name(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|name| name == base) {
        return base.to_string();
    }
    let mut i = 1;
    loop {
        let candidate = format!("{base} ({i})");
        if !taken.iter().any(|name| *name == candidate) {
            return candidate;
        }
        i += 1;
    }
}

pub fn is_eso_file(path: &str) -> bool {
    match std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) => extension.eq_ignore_ascii_case("eso"),
        None => false,
    }
}

pub fn file_stem(path: &str) -> String {
    std::path::Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(path)
        .to_string()
}
