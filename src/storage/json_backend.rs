use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    errors::{FinanceError, Result},
    utils::paths,
};

use super::KeyValueStore;

const SLOT_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// File-backed slots: each key maps to `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = root.unwrap_or_else(paths::app_data_dir);
        paths::ensure_dir(&root)?;
        Ok(Self { root })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    /// File backing `key`. Empty keys name no slot.
    pub fn slot_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(FinanceError::InvalidInput(
                "storage key cannot be empty".into(),
            ));
        }
        Ok(self
            .root
            .join(format!("{}.{}", encode_key(key), SLOT_EXTENSION)))
    }
}

impl KeyValueStore for JsonStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(slot = %path.display(), bytes = value.len(), "slot written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(slot = %path.display(), "slot removed");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Encodes a key as a file stem. Lowercase ASCII letters, digits and `-`
/// pass through; every other byte becomes `%XX`, so distinct keys never
/// share a file and no key can escape the root.
fn encode_key(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'-' => stem.push(char::from(byte)),
            other => stem.push_str(&format!("%{:02X}", other)),
        }
    }
    stem
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        paths::ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonStorage::new(Some(temp.path().to_path_buf())).expect("json storage");
        (storage, temp)
    }

    #[test]
    fn missing_slot_reads_as_none() {
        let (storage, _guard) = storage_with_temp_dir();
        assert_eq!(storage.get("fintrack-transactions").unwrap(), None);
        assert!(!storage.contains("fintrack-transactions").unwrap());
    }

    #[test]
    fn set_replaces_slot_contents() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.set("fintrack-transactions", "[1]").unwrap();
        storage.set("fintrack-transactions", "[2]").unwrap();
        assert_eq!(
            storage.get("fintrack-transactions").unwrap().as_deref(),
            Some("[2]")
        );
        let tmp = tmp_path(&storage.slot_path("fintrack-transactions").unwrap());
        assert!(!tmp.exists(), "staging file must be renamed away");
    }

    #[test]
    fn remove_deletes_file_and_tolerates_missing_slot() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.set("fintrack-config", "{}").unwrap();
        storage.remove("fintrack-config").unwrap();
        assert!(!storage.slot_path("fintrack-config").unwrap().exists());
        storage.remove("fintrack-config").expect("second remove is a no-op");
    }

    #[test]
    fn keys_map_to_distinct_files_inside_the_root() {
        let (storage, _guard) = storage_with_temp_dir();
        let path = storage.slot_path("../My Slot").unwrap();
        assert_eq!(path.parent(), Some(storage.base_dir()));
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("%2E%2E%2F%4Dy%20%53lot.json")
        );
        let default_slot = storage.slot_path("fintrack-transactions").unwrap();
        assert_eq!(
            default_slot.file_name().and_then(|name| name.to_str()),
            Some("fintrack-transactions.json")
        );
        assert!(storage.slot_path("").is_err());
    }

    #[test]
    fn keys_differing_in_case_or_spacing_stay_separate() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.set("Ledger A", "[1]").unwrap();
        assert_eq!(storage.get("ledger_a").unwrap(), None);
        assert_eq!(storage.get("ledger a").unwrap(), None);
        storage.set("ledger_a", "[2]").unwrap();
        assert_eq!(storage.get("Ledger A").unwrap().as_deref(), Some("[1]"));
        assert_eq!(storage.get("ledger_a").unwrap().as_deref(), Some("[2]"));
    }
}
