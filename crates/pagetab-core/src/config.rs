use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_HISTORY_CAPACITY, PREFERENCES_FILE, SHORTCUT_COUNT};

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    /// Bound for each tab's navigation history and for the closed-tab stack
    pub history_capacity: usize,
    pub shortcut_count: usize,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            shortcut_count: SHORTCUT_COUNT,
        }
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_FILE)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join("pagetab"))
            .unwrap_or_else(|| PathBuf::from("pagetab_data"));
        Self::new(data_dir)
    }
}
