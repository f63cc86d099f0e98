//! SQLite-backed key/value storage.

use crate::Result;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

/// A durable string-keyed record store in a single SQLite file.
///
/// Each key maps to one text value; writes replace the previous value in
/// full.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens (or creates) the database at `path` and ensures the schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AiNotesError::Database`] if the file cannot be opened
    /// or is not a SQLite database.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Opens a private in-memory database. Nothing survives the drop.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    /// Returns the value stored under `key`, or `None` if there is none.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Stores `value` under `key`, overwriting any previous value.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    /// Deletes the record under `key`. Missing keys are not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?", [key])?;
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_create_storage() {
        let temp = NamedTempFile::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();

        let tables: Vec<String> = storage
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();

        assert!(tables.contains(&"kv_store".to_string()));
    }

    #[test]
    fn test_set_get_overwrite_remove() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "one").unwrap();
        storage.set("k", "two").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("two"));

        let rows: i64 = storage
            .connection()
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);

        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
        storage.remove("k").unwrap();
    }

    #[test]
    fn test_values_persist_across_open() {
        let temp = NamedTempFile::new().unwrap();
        {
            let storage = Storage::open(temp.path()).unwrap();
            storage.set("k", "v").unwrap();
        }
        let storage = Storage::open(temp.path()).unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_open_invalid_database() {
        let temp = NamedTempFile::new().unwrap();

        // Create a file that is not a SQLite database
        std::fs::write(temp.path(), "not a database, just some text that is long enough").unwrap();

        let result = Storage::open(temp.path());
        assert!(result.is_err());
    }
}
