use std::io::ErrorKind;
use std::path::PathBuf;

use crate::constants::DATASET_SUFFIX;
use crate::error::{ParcelError, Result};

/// Maps county identifiers to parcel CSV files under one data directory.
#[derive(Debug, Clone)]
pub struct DatasetCatalog {
    dir: PathBuf,
}

impl DatasetCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Identifiers are plain tokens; anything that could name another path is refused.
    pub fn is_valid_id(id: &str) -> bool {
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    pub fn path_for(&self, id: &str) -> Option<PathBuf> {
        Self::is_valid_id(id).then(|| self.dir.join(format!("{}{}", id, DATASET_SUFFIX)))
    }

    /// Opens the dataset for reading, or `DatasetNotFound` if there is no such file.
    pub async fn open(&self, id: &str) -> Result<tokio::fs::File> {
        let not_found = || ParcelError::DatasetNotFound(id.to_string());
        let path = self.path_for(id).ok_or_else(not_found)?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(not_found()),
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        }

        tokio::fs::File::open(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => not_found(),
            _ => ParcelError::Io(e),
        })
    }

    /// Identifiers of every dataset file present, sorted. A missing directory is empty.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(id) = name.to_str().and_then(|n| n.strip_suffix(DATASET_SUFFIX)) else {
                continue;
            };
            if Self::is_valid_id(id) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_identifier_rules() {
        assert!(DatasetCatalog::is_valid_id("lake"));
        assert!(DatasetCatalog::is_valid_id("st_louis-2024"));
        assert!(!DatasetCatalog::is_valid_id(""));
        assert!(!DatasetCatalog::is_valid_id(".."));
        assert!(!DatasetCatalog::is_valid_id("a/b"));
        assert!(!DatasetCatalog::is_valid_id("lake county"));
    }

    #[tokio::test]
    async fn test_open_and_list() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("lake_parcels.csv"), "a\n1\n").unwrap();
        std::fs::write(dir.path().join("cook_parcels.csv"), "a\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("dir_parcels.csv")).unwrap();

        let catalog = DatasetCatalog::new(dir.path());
        assert!(catalog.open("lake").await.is_ok());
        assert_eq!(catalog.list().await.unwrap(), vec!["cook", "lake"]);
    }

    #[tokio::test]
    async fn test_missing_dataset() {
        let dir = tempdir().unwrap();
        let catalog = DatasetCatalog::new(dir.path());

        for id in ["nowhere", "../etc", "dir"] {
            assert!(matches!(
                catalog.open(id).await,
                Err(ParcelError::DatasetNotFound(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_empty() {
        let catalog = DatasetCatalog::new("/definitely/not/here");
        assert!(catalog.list().await.unwrap().is_empty());
    }
}
