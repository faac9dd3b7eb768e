use std::collections::HashMap;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use crate::model::Entity;

/// Raw key-value persistence under the store. Each entity type serializes
/// its entire collection as one JSON array under a fixed key, mirroring
/// the layout the UI's local storage used.
pub trait Backend {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn put(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn open(workspace: &Path) -> anyhow::Result<SqliteBackend> {
        std::fs::create_dir_all(workspace)?;
        let db_path = workspace.join("schooldesk.sqlite3");
        let conn = Connection::open(db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS collections(
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(SqliteBackend { conn })
    }
}

impl Backend for SqliteBackend {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM collections WHERE key = ?", [key], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.conn.execute(
            "INSERT INTO collections(key, value) VALUES(?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )?;
        Ok(())
    }
}

/// Test substitute with the same contract as the SQLite backend.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The sole owner of persisted collections. Every mutation is a full
/// read-modify-write of one collection; there is no partial update and
/// no locking across processes.
pub struct Store {
    backend: Box<dyn Backend>,
}

impl Store {
    pub fn open(workspace: &Path) -> anyhow::Result<Store> {
        Ok(Store {
            backend: Box::new(SqliteBackend::open(workspace)?),
        })
    }

    #[allow(dead_code)]
    pub fn in_memory() -> Store {
        Store {
            backend: Box::new(MemoryBackend::default()),
        }
    }

    /// Returns the full persisted collection, or empty if nothing has been
    /// written yet. A stored value that fails to deserialize fails the
    /// whole read.
    pub fn list<T: Entity>(&self) -> anyhow::Result<Vec<T>> {
        match self.backend.get(T::COLLECTION_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Serializes and overwrites the entire collection for T.
    pub fn replace_all<T: Entity>(&mut self, records: &[T]) -> anyhow::Result<()> {
        let raw = serde_json::to_string(records)?;
        self.backend.put(T::COLLECTION_KEY, &raw)
    }

    pub fn add<T: Entity>(&mut self, record: T) -> anyhow::Result<()> {
        let mut records = self.list::<T>()?;
        records.push(record);
        self.replace_all(&records)
    }

    /// Whole-record overwrite in place. An unknown id leaves the
    /// collection unchanged; no error is surfaced.
    pub fn update_by_id<T: Entity>(&mut self, id: &str, record: T) -> anyhow::Result<()> {
        let mut records = self.list::<T>()?;
        if let Some(slot) = records.iter_mut().find(|r| r.id() == id) {
            *slot = record;
        }
        self.replace_all(&records)
    }

    /// Removes every record matching `id` (at most one in practice).
    pub fn delete_by_id<T: Entity>(&mut self, id: &str) -> anyhow::Result<()> {
        let mut records = self.list::<T>()?;
        records.retain(|r| r.id() != id);
        self.replace_all(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Student;

    fn student(id: &str, first: &str) -> Student {
        Student {
            id: id.to_string(),
            first_name: first.to_string(),
            last_name: "Lee".to_string(),
            email: format!("{}@example.org", first.to_ascii_lowercase()),
            phone: String::new(),
            date_of_birth: String::new(),
            grade: "9".to_string(),
            class_id: String::new(),
            enrollment_date: "2026-01-15".to_string(),
            guardian_name: String::new(),
            guardian_phone: String::new(),
            address: String::new(),
        }
    }

    #[test]
    fn list_on_fresh_store_is_empty() {
        let store = Store::in_memory();
        let students = store.list::<Student>().expect("list");
        assert!(students.is_empty());
    }

    #[test]
    fn replace_all_round_trips() {
        let mut store = Store::in_memory();
        let records = vec![student("s1", "Ana"), student("s2", "Ben")];
        store.replace_all(&records).expect("replace");
        assert_eq!(store.list::<Student>().expect("list"), records);
    }

    #[test]
    fn add_appends_one_record() {
        let mut store = Store::in_memory();
        store.add(student("s1", "Ana")).expect("add");
        store.add(student("s2", "Ben")).expect("add");
        let listed = store.list::<Student>().expect("list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].first_name, "Ben");
    }

    #[test]
    fn update_replaces_in_place_and_keeps_position() {
        let mut store = Store::in_memory();
        store.add(student("s1", "Ana")).expect("add");
        store.add(student("s2", "Ben")).expect("add");
        store.add(student("s3", "Cleo")).expect("add");

        let mut replacement = student("s2", "Bennett");
        replacement.grade = "10".to_string();
        store.update_by_id("s2", replacement).expect("update");

        let listed = store.list::<Student>().expect("list");
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[1].id, "s2");
        assert_eq!(listed[1].first_name, "Bennett");
        assert_eq!(listed[1].grade, "10");
    }

    #[test]
    fn update_with_unknown_id_changes_nothing() {
        let mut store = Store::in_memory();
        store.add(student("s1", "Ana")).expect("add");
        let before = store.list::<Student>().expect("list");

        store
            .update_by_id("missing", student("missing", "Nobody"))
            .expect("update");

        assert_eq!(store.list::<Student>().expect("list"), before);
    }

    #[test]
    fn delete_removes_only_matching_records() {
        let mut store = Store::in_memory();
        store.add(student("s1", "Ana")).expect("add");
        store.add(student("s2", "Ben")).expect("add");

        store.delete_by_id::<Student>("s1").expect("delete");

        let listed = store.list::<Student>().expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "s2");

        // Unknown id is a no-op, not an error.
        store.delete_by_id::<Student>("s1").expect("delete again");
        assert_eq!(store.list::<Student>().expect("list").len(), 1);
    }

    #[test]
    fn malformed_stored_value_fails_the_read() {
        let mut store = Store::in_memory();
        store
            .backend
            .put(Student::COLLECTION_KEY, "{not json")
            .expect("put");
        assert!(store.list::<Student>().is_err());
    }

    #[test]
    fn records_missing_newer_fields_still_deserialize() {
        let mut store = Store::in_memory();
        // A record persisted before optional fields existed.
        store
            .backend
            .put(
                Student::COLLECTION_KEY,
                r#"[{"id":"s1","firstName":"Ana","lastName":"Lee"}]"#,
            )
            .expect("put");
        let listed = store.list::<Student>().expect("list");
        assert_eq!(listed[0].email, "");
        assert_eq!(listed[0].enrollment_date, "");
    }

    #[test]
    fn sqlite_backend_persists_across_reopen() {
        let dir = std::env::temp_dir().join(format!(
            "schooldesk-store-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));

        {
            let mut store = Store::open(&dir).expect("open");
            store.add(student("s1", "Ana")).expect("add");
        }
        {
            let store = Store::open(&dir).expect("reopen");
            let listed = store.list::<Student>().expect("list");
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].first_name, "Ana");
        }

        let _ = std::fs::remove_dir_all(dir);
    }
}
