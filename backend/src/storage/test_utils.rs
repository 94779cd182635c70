//! Temporary directories for storage tests, removed when dropped even if a
//! test panics.

use std::path::PathBuf;

use anyhow::Result;
use tempfile::TempDir;

use super::json::JsonBillRepository;

pub struct TestEnvironment {
    pub base_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        Ok(Self {
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }

    pub fn json_path(&self) -> PathBuf {
        self.base_path.join("bills.json")
    }

    pub fn json_repository(&self) -> JsonBillRepository {
        JsonBillRepository::new(self.json_path())
    }
}
