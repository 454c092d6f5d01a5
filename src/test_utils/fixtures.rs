use std::path::PathBuf;

use tempfile::TempDir;

use crate::config::RemoteConfig;
use crate::storage::local::{DEFAULT_DB_NAME, LocalStore};

/// Isolated scratch directory holding a local store file.
pub struct StoreFixture {
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
}

impl Default for StoreFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreFixture {
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("data").join(DEFAULT_DB_NAME);

        println!("[FIXTURE] Created temp directory: {:?}", temp_dir.path());

        Self { temp_dir, db_path }
    }

    /// Open the store without touching its schema.
    #[must_use]
    pub fn open(&self) -> LocalStore {
        LocalStore::open(&self.db_path).expect("Failed to open local store")
    }

    /// Open the store and reset it to the bootstrap rows.
    #[must_use]
    pub fn seeded(&self) -> LocalStore {
        let mut store = self.open();
        store.reset_and_seed().expect("Failed to seed local store");
        store
    }

    /// Write a file under the fixture root.
    #[must_use]
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.temp_dir.path().join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }
}

/// Remote settings that pass validation; pair with
/// [`crate::test_utils::memory_remote::MemoryDriver`].
#[must_use]
pub fn remote_config() -> RemoteConfig {
    RemoteConfig {
        host: Some("db.test".to_string()),
        user: Some("tester".to_string()),
        password: Some("secret".to_string()),
        ..RemoteConfig::default()
    }
}
