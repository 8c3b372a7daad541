//! Durable storage of the entry collection.
//!
//! A store only knows how to read and replace one serialized payload. Decoding,
//! encoding and the id migration live in the trait's provided methods so every
//! backend degrades the same way on damaged data.

use crate::entry::{Entry, EntryId};
use crate::error::{StorageReadError, StorageWriteError};
use serde::Deserialize;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

pub const STORE_FILE_NAME: &str = "entries.json";

pub trait EntryStore {
    /// Raw persisted payload, `None` if nothing has been stored yet.
    fn read_raw(&self) -> Result<Option<String>, StorageReadError>;

    /// Replaces the persisted payload as a whole.
    fn write_raw(&self, payload: &str) -> Result<(), StorageWriteError>;

    /// Short description of where entries live, for logs and messages.
    fn location(&self) -> String;

    /// Loads the journal. Missing or unreadable data yields an empty journal.
    fn load(&self) -> Vec<Entry> {
        let raw = match self.read_raw() {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(location = %self.location(), "Failed to read journal: {e}");
                return Vec::new();
            }
        };
        match decode_entries(&raw) {
            Ok(entries) => {
                info!(count = entries.len(), location = %self.location(), "Loaded journal");
                entries
            }
            Err(e) => {
                warn!(location = %self.location(), "Ignoring stored journal: {e}");
                Vec::new()
            }
        }
    }

    /// Replaces the stored entries.
    ///
    /// Records in the current payload that never decoded as entries are
    /// written back unchanged after `entries`.
    fn save(&self, entries: &[Entry]) -> Result<(), StorageWriteError> {
        let mut records = entries
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()?;
        let kept = self.unreadable_records();
        let kept_count = kept.len();
        records.extend(kept);

        let payload = serde_json::to_string_pretty(&records)?;
        self.write_raw(&payload)?;
        info!(
            count = entries.len(),
            unreadable = kept_count,
            location = %self.location(),
            "Saved journal"
        );
        Ok(())
    }

    /// Stored records that do not decode as entries, verbatim.
    fn unreadable_records(&self) -> Vec<Value> {
        match self.read_raw() {
            Ok(Some(raw)) => split_records(&raw)
                .map(|(_, unreadable)| unreadable)
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Gives every stored entry a usable unique id.
    ///
    /// Writes back only when something changed, so it is cheap to run on every
    /// start. Returns the number of ids assigned.
    fn ensure_identifiers(&self) -> Result<usize, StorageWriteError> {
        let mut entries = self.load();
        let assigned = assign_missing_ids(&mut entries);
        if assigned > 0 {
            self.save(&entries)?;
            info!(assigned, "Assigned ids to stored entries");
        }
        Ok(assigned)
    }
}

/// Decodes a stored payload, skipping individual records that are not entries.
pub fn decode_entries(raw: &str) -> Result<Vec<Entry>, StorageReadError> {
    let (entries, unreadable) = split_records(raw)?;
    for record in &unreadable {
        if let Err(e) = Entry::deserialize(record) {
            let id = record.get("id").unwrap_or(&Value::Null);
            warn!(%id, "Skipping unreadable journal record: {e}");
        }
    }
    Ok(entries)
}

/// Splits a stored payload into decodable entries and the raw records that
/// are not entries.
pub fn split_records(raw: &str) -> Result<(Vec<Entry>, Vec<Value>), StorageReadError> {
    if raw.trim().is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }
    let Value::Array(records) = serde_json::from_str::<Value>(raw)? else {
        return Err(StorageReadError::NotAList);
    };

    let mut entries = Vec::with_capacity(records.len());
    let mut unreadable = Vec::new();
    for record in records {
        match Entry::deserialize(&record) {
            Ok(entry) => entries.push(entry),
            Err(_) => unreadable.push(record),
        }
    }
    Ok((entries, unreadable))
}

/// Replaces empty or repeated ids with fresh ones, keeping the first holder of
/// each id.
pub fn assign_missing_ids(entries: &mut [Entry]) -> usize {
    let mut seen = HashSet::new();
    let mut assigned = 0;
    for entry in entries.iter_mut() {
        if entry.id.is_empty() || seen.contains(&entry.id) {
            let mut fresh = EntryId::new();
            while seen.contains(&fresh) {
                fresh = EntryId::new();
            }
            entry.id = fresh;
            assigned += 1;
        }
        seen.insert(entry.id.clone());
    }
    assigned
}

/// Journal kept in a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    /// Store at `entries.json` inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EntryStore for JsonFileStore {
    fn read_raw(&self) -> Result<Option<String>, StorageReadError> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    fn write_raw(&self, payload: &str) -> Result<(), StorageWriteError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        // Readers only ever see the old file or the complete new one.
        let tmp = dir.join(format!(".entries-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, payload)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process store, used by tests and as a scratch journal.
#[derive(Default)]
pub struct MemoryStore {
    payload: RefCell<Option<String>>,
    reject_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: impl Into<String>) -> Self {
        MemoryStore {
            payload: RefCell::new(Some(payload.into())),
            reject_writes: Cell::new(false),
        }
    }

    /// Makes every following write fail, as a full disk would.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    pub fn payload(&self) -> Option<String> {
        self.payload.borrow().clone()
    }
}

impl EntryStore for MemoryStore {
    fn read_raw(&self) -> Result<Option<String>, StorageReadError> {
        Ok(self.payload.borrow().clone())
    }

    fn write_raw(&self, payload: &str) -> Result<(), StorageWriteError> {
        if self.reject_writes.get() {
            return Err(StorageWriteError::Rejected("quota exceeded".to_string()));
        }
        *self.payload.borrow_mut() = Some(payload.to_string());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::entry::{Background, Font};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    pub(crate) fn entry(id: &str, title: &str, date: &str, mood: &str, tags: &[&str]) -> Entry {
        Entry {
            id: EntryId::from(id),
            title: title.to_string(),
            date: date.to_string(),
            mood: mood.to_string(),
            content: format!("{title} content"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            background: Background::Default,
            font: Font::Default,
            weather: None,
        }
    }

    fn setup() -> (TempDir, JsonFileStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        (dir, store)
    }

    fn by_id(entries: Vec<Entry>) -> HashMap<EntryId, Entry> {
        entries.into_iter().map(|e| (e.id.clone(), e)).collect()
    }

    #[test]
    fn absent_file_loads_empty() {
        let (_dir, store) = setup();
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_payloads_load_empty() {
        for payload in ["{not json", "{\"title\": \"x\"}", "42", "null", ""] {
            let store = MemoryStore::with_payload(payload);
            assert!(store.load().is_empty(), "payload {payload:?}");
        }
    }

    #[test]
    fn unreadable_records_are_skipped_individually() {
        let store = MemoryStore::with_payload(
            r#"[{"id": "a", "title": "kept"}, 7, {"id": "b", "title": ["bad"]}, {"id": "c"}]"#,
        );
        let ids: Vec<String> = store.load().into_iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn save_keeps_unreadable_records_verbatim() {
        let store = MemoryStore::with_payload(
            r#"[{"id": "a", "title": "first"}, {"id": "legacy", "title": "Old", "tags": "beach"}, {"id": "b", "title": "second"}]"#,
        );
        let entries = store.load();
        assert_eq!(entries.len(), 2);

        store.save(&entries[1..]).unwrap();

        let stored: Value = serde_json::from_str(&store.payload().unwrap()).unwrap();
        assert_eq!(
            stored,
            serde_json::json!([
                serde_json::to_value(&entries[1]).unwrap(),
                {"id": "legacy", "title": "Old", "tags": "beach"},
            ])
        );
        let ids: Vec<String> = store.load().into_iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn ensure_identifiers_keeps_unreadable_records() {
        let store = MemoryStore::with_payload(r#"[{"title": "no id"}, {"id": "z", "title": 5}]"#);
        assert_eq!(store.ensure_identifiers().unwrap(), 1);
        let payload = store.payload().unwrap();
        assert!(payload.contains(r#""id": "z""#), "payload: {payload}");
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = setup();
        let entries = vec![
            entry("1", "Rain day", "2024-01-01", "sad", &[]),
            entry("2", "Sunny", "2024-06-01", "happy", &["beach"]),
        ];
        store.save(&entries).unwrap();
        assert_eq!(by_id(store.load()), by_id(entries));
    }

    #[test]
    fn save_leaves_no_temporary_files() {
        let (dir, store) = setup();
        store.save(&[entry("1", "a", "2024-01-01", "ok", &[])]).unwrap();
        store.save(&[]).unwrap();
        for item in fs::read_dir(dir.path()).unwrap() {
            let name = item.unwrap().file_name().to_string_lossy().to_string();
            assert!(!name.ends_with(".tmp"), "leftover tmp file: {name}");
        }
        assert!(store.load().is_empty());
    }

    #[test]
    fn failed_write_keeps_previous_journal() {
        let store = MemoryStore::new();
        let first = vec![entry("1", "a", "2024-01-01", "ok", &[])];
        store.save(&first).unwrap();

        store.reject_writes(true);
        let err = store.save(&[]).unwrap_err();
        assert!(matches!(err, StorageWriteError::Rejected(_)));
        assert_eq!(store.load(), first);
    }

    #[test]
    fn unwritable_location_reports_write_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let store = JsonFileStore::new(blocker.join("entries.json"));
        assert!(matches!(
            store.save(&[]),
            Err(StorageWriteError::Io(_))
        ));
    }

    #[test]
    fn ensure_identifiers_fills_missing_and_duplicate_ids() {
        let store = MemoryStore::with_payload(
            r#"[{"title": "no id"}, {"id": "x", "title": "one"}, {"id": "x", "title": "two"}, {"id": "", "title": "blank"}]"#,
        );
        assert_eq!(store.ensure_identifiers().unwrap(), 3);

        let entries = store.load();
        let ids: HashSet<EntryId> = entries.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids.len(), 4);
        assert!(entries.iter().all(|e| !e.id.is_empty()));
        assert_eq!(entries[1].id.as_str(), "x");
    }

    #[test]
    fn ensure_identifiers_is_idempotent() {
        let store = MemoryStore::with_payload(r#"[{"title": "a"}, {"title": "b"}]"#);
        store.ensure_identifiers().unwrap();
        let once: Vec<EntryId> = store.load().into_iter().map(|e| e.id).collect();
        let payload = store.payload();

        assert_eq!(store.ensure_identifiers().unwrap(), 0);
        let twice: Vec<EntryId> = store.load().into_iter().map(|e| e.id).collect();
        assert_eq!(once, twice);
        assert_eq!(store.payload(), payload);
    }

    #[test]
    fn ensure_identifiers_does_not_write_migrated_journal() {
        let store = MemoryStore::new();
        store.save(&[entry("1", "a", "2024-01-01", "ok", &[])]).unwrap();
        store.reject_writes(true);
        assert_eq!(store.ensure_identifiers().unwrap(), 0);
    }
}
