use indexmap::IndexMap;
use serde::{Serialize, Deserialize};
use shared::{FileState, LoadEvent, LoadingStatus, unique_name};

/// One file known to the application, whatever its loading state.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TrackedFile {
    pub file_id: String,
    pub name: String,
    pub path: String,
    pub state: FileState,
}

impl TrackedFile {
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, FileState::Loaded(_))
    }
}

/// Ordered registry of tracked files, keyed by file id.
///
/// Load events mutate the matching entry; events for unknown or already
/// terminal files are ignored, which makes late progress reports after a
/// failure harmless. Display names are made unique here when a file
/// finishes loading.
#[derive(Debug, Clone, Default)]
pub struct FileRegistry {
    files: IndexMap<String, TrackedFile>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path about to be loaded. Re-tracking the same path resets
    /// the existing entry to its initial loading state instead of creating
    /// a duplicate.
    pub fn track(&mut self, file_id: &str, path: &str) -> &TrackedFile {
        let entry = self.files.entry(file_id.to_string()).or_insert_with(|| TrackedFile {
            file_id: file_id.to_string(),
            name: shared::file_stem(path),
            path: path.to_string(),
            state: FileState::Loading(LoadingStatus::Starting),
        });
        entry.state = FileState::Loading(LoadingStatus::Starting);
        entry
    }

    pub fn apply(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Started { file_id, name } => {
                if let Some(file) = self.files.get_mut(&file_id) {
                    file.name = name;
                    file.state = FileState::Loading(LoadingStatus::Starting);
                }
            }
            LoadEvent::Progress { file_id, status } => {
                if let Some(file) = self.files.get_mut(&file_id) {
                    if !file.state.is_terminal() {
                        file.state = FileState::Loading(status);
                    }
                }
            }
            LoadEvent::Loaded { file_id, file: loaded } => {
                let taken: Vec<String> = self
                    .files
                    .values()
                    .filter(|file| file.file_id != file_id && file.is_loaded())
                    .map(|file| file.name.clone())
                    .collect();
                if let Some(file) = self.files.get_mut(&file_id) {
                    let mut loaded = loaded;
                    loaded.name = unique_name(&loaded.name, &taken);
                    file.name = loaded.name.clone();
                    file.state = FileState::Loaded(loaded);
                }
            }
            LoadEvent::Failed { file_id, error } => {
                if let Some(file) = self.files.get_mut(&file_id) {
                    file.state = FileState::Failed(error);
                }
            }
        }
    }

    pub fn remove(&mut self, file_id: &str) -> Option<TrackedFile> {
        self.files.shift_remove(file_id)
    }

    pub fn get(&self, file_id: &str) -> Option<&TrackedFile> {
        self.files.get(file_id)
    }

    pub fn files(&self) -> impl Iterator<Item = &TrackedFile> {
        self.files.values()
    }

    pub fn loaded_files(&self) -> impl Iterator<Item = &TrackedFile> {
        self.files.values().filter(|file| file.is_loaded())
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// All files are settled when none is still loading.
    pub fn all_settled(&self) -> bool {
        self.files.values().all(|file| file.state.is_terminal())
    }
}
