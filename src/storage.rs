use crate::model::Department;
use crate::request::ChangeRequest;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Clé du document contenant tous les départements.
pub const DEPARTMENTS_KEY: &str = "timetable_scheduler_departments";
/// Clé de la liste des demandes de changement.
pub const REQUESTS_KEY: &str = "timetable_scheduler_requests";

/// Port de persistance : le moteur n'en dépend pas, seul l'appelant l'utilise.
pub trait Storage {
    /// `Ok(None)` si aucun document n'a encore été enregistré.
    fn load_departments(&self) -> anyhow::Result<Option<Vec<Department>>>;
    /// Sauvegarde de manière atomique.
    fn save_departments(&self, departments: &[Department]) -> anyhow::Result<()>;
    fn load_requests(&self) -> anyhow::Result<Option<Vec<ChangeRequest>>>;
    fn save_requests(&self, requests: &[ChangeRequest]) -> anyhow::Result<()>;
}

/// Un fichier `<clé>.json` par clé, dans un répertoire.
pub struct JsonStorage {
    dir: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(dir: P) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read_key<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        let value = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(value))
    }

    fn write_key<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let path = self.path_for(key);
        let json = serde_json::to_vec_pretty(value)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).with_context(|| "atomic rename")?;
        tracing::info!(path = %path.display(), "document saved");
        Ok(())
    }
}

impl Storage for JsonStorage {
    fn load_departments(&self) -> anyhow::Result<Option<Vec<Department>>> {
        self.read_key(DEPARTMENTS_KEY)
    }

    fn save_departments(&self, departments: &[Department]) -> anyhow::Result<()> {
        self.write_key(DEPARTMENTS_KEY, departments)
    }

    fn load_requests(&self) -> anyhow::Result<Option<Vec<ChangeRequest>>> {
        self.read_key(REQUESTS_KEY)
    }

    fn save_requests(&self, requests: &[ChangeRequest]) -> anyhow::Result<()> {
        self.write_key(REQUESTS_KEY, requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_departments;
    use tempfile::tempdir;

    #[test]
    fn missing_documents_load_as_absent() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::open(dir.path()).unwrap();
        assert!(storage.load_departments().unwrap().is_none());
        assert!(storage.load_requests().unwrap().is_none());
    }

    #[test]
    fn departments_roundtrip_under_well_known_key() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::open(dir.path()).unwrap();
        let departments = sample_departments();
        storage.save_departments(&departments).unwrap();

        assert!(dir.path().join("timetable_scheduler_departments.json").exists());
        let loaded = storage.load_departments().unwrap().unwrap();
        assert_eq!(loaded, departments);
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::open(dir.path()).unwrap();
        fs::write(storage.path_for(REQUESTS_KEY), b"{not json").unwrap();
        assert!(storage.load_requests().is_err());
    }
}
