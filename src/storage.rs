use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Registry of known data files
const DATA_FILES: &[&str] = &["saved_profiles.json"];

/// Manages the application data directory and data file operations
#[derive(Clone)]
pub struct StorageManager {
    pub(crate) data_dir: PathBuf,
}

impl StorageManager {
    /// Create a StorageManager with a custom data directory (primarily for testing)
    pub fn with_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Create a new StorageManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| eyre!("Could not determine data directory"))?
            .join(app_name);

        Ok(Self { data_dir })
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get path to a specific data file
    pub fn data_file(&self, filename: &str) -> PathBuf {
        self.data_dir.join(filename)
    }

    /// Ensure the data directory exists
    pub fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)?;
        }
        Ok(())
    }

    /// Clear all registered data files
    pub fn clear_all(&self) -> Result<()> {
        for filename in DATA_FILES {
            let file_path = self.data_file(filename);
            if file_path.exists() {
                if let Err(e) = fs::remove_file(&file_path) {
                    eprintln!("Warning: Could not remove data file {}: {}", filename, e);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_data_file_path() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::with_dir(dir.path().to_path_buf());
        assert_eq!(
            storage.data_file("saved_profiles.json"),
            dir.path().join("saved_profiles.json")
        );
    }

    #[test]
    fn test_clear_all_removes_registered_files() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::with_dir(dir.path().to_path_buf());
        storage.ensure_data_dir().unwrap();
        fs::write(storage.data_file("saved_profiles.json"), "[]").unwrap();
        storage.clear_all().unwrap();
        assert!(!storage.data_file("saved_profiles.json").exists());
    }
}
