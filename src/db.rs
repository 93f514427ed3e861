use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs::create_dir_all;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};

pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.is_dir() {
                create_dir_all(dir).map_err(|e| {
                    Error::Config(format!("Could not build storage directory {:?}: {}", dir, e))
                })?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            (),
        )?;
        Ok(SqliteStorage {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Config("storage connection lock poisoned".to_string()))
    }
}

impl LocalStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let db = self.lock()?;
        let value = db
            .query_row("SELECT value FROM storage WHERE key = ?1", (key,), |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.execute(
            "INSERT INTO storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )?;
        log::debug!("Stored {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.lock()?
            .execute("DELETE FROM storage WHERE key = ?1", (key,))?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| Error::Config("memory storage lock poisoned".to_string()))
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(storage: &dyn LocalStorage) {
        assert_eq!(storage.get_item("theme").unwrap(), None);
        storage.set_item("theme", "dark").unwrap();
        assert_eq!(storage.get_item("theme").unwrap().as_deref(), Some("dark"));
        storage.set_item("theme", "light").unwrap();
        assert_eq!(storage.get_item("theme").unwrap().as_deref(), Some("light"));
        storage.remove_item("theme").unwrap();
        assert_eq!(storage.get_item("theme").unwrap(), None);
    }

    #[test]
    fn sqlite_round_trips() {
        exercise(&SqliteStorage::open_in_memory().unwrap());
    }

    #[test]
    fn memory_round_trips() {
        exercise(&MemoryStorage::new());
    }

    #[test]
    fn sqlite_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.db");
        {
            let storage = SqliteStorage::open(&path).unwrap();
            storage.set_item("recipe_hub_bookmarks_v1", "[]").unwrap();
        }
        let storage = SqliteStorage::open(&path).unwrap();
        assert_eq!(
            storage.get_item("recipe_hub_bookmarks_v1").unwrap().as_deref(),
            Some("[]")
        );
    }
}
