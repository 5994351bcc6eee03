use crate::domain::{Record, RecordKind, RunSummary};
use crate::error::Result;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

pub struct StorageKeys;

impl StorageKeys {
    pub const RUN_SUMMARY: &'static str = "run-summary.json";
}

/// Persists Year Batches as pretty-printed JSON arrays under one directory.
#[derive(Clone)]
pub struct FileSystemStore {
    data_dir: PathBuf,
}

impl FileSystemStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)?;
        }
        Ok(())
    }

    fn write_json_file<T: serde::Serialize + ?Sized>(
        &self,
        file_name: &str,
        data: &T,
    ) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.path_for(file_name);
        let content = serde_json::to_string_pretty(data)?;
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Replaces whatever was stored under `file_name` with this batch.
    pub fn write_batch(&self, file_name: &str, records: &[Record]) -> Result<PathBuf> {
        self.write_json_file(file_name, records)
    }

    pub fn read_batch(&self, file_name: &str, kind: RecordKind) -> Result<Option<Vec<Record>>> {
        let path = self.path_for(file_name);
        if !path.exists() {
            return Ok(None);
        }
        let values: Vec<Value> = serde_json::from_str(&fs::read_to_string(path)?)?;
        let records = values
            .into_iter()
            .map(|value| kind.from_value(value))
            .collect::<serde_json::Result<Vec<_>>>()?;
        Ok(Some(records))
    }

    pub fn save_summary(&self, summary: &RunSummary) -> Result<PathBuf> {
        self.write_json_file(StorageKeys::RUN_SUMMARY, summary)
    }
}
