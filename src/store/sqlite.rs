//! SQLite item store
//!
//! One `items` table with an `AUTOINCREMENT` key, so SQLite itself never
//! hands out an id twice. Reset clears the table's `sqlite_sequence` row to
//! start over at 1.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Item, ItemFields, ItemStore, StoreError};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL
    );
";

/// Item store backed by a SQLite database
pub struct SqliteItemStore {
    /// `None` once disposed
    conn: Mutex<Option<Connection>>,
}

impl SqliteItemStore {
    /// Open (or create) a database file and make sure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init_with_connection(conn)
    }

    /// Private in-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let mut guard = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let conn = guard.as_mut().ok_or(StoreError::Disposed)?;
        Ok(f(conn)?)
    }
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn select_item(conn: &Connection, id: i64) -> rusqlite::Result<Option<Item>> {
    conn.query_row(
        "SELECT id, name, description FROM items WHERE id = ?1",
        params![id],
        row_to_item,
    )
    .optional()
}

impl ItemStore for SqliteItemStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn list_all(&self) -> Result<Vec<Item>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, description FROM items ORDER BY id")?;
            let items = stmt
                .query_map([], row_to_item)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(items)
        })
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Item>, StoreError> {
        self.with_conn(|conn| select_item(conn, id))
    }

    fn insert(&self, fields: ItemFields) -> Result<Item, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO items (name, description) VALUES (?1, ?2)",
                params![fields.name, fields.description],
            )?;
            Ok(fields.into_item(conn.last_insert_rowid()))
        })
    }

    fn update(&self, id: i64, fields: ItemFields) -> Result<Option<Item>, StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE items SET name = ?1, description = ?2 WHERE id = ?3",
                params![fields.name, fields.description, id],
            )?;
            Ok((changed > 0).then(|| fields.into_item(id)))
        })
    }

    fn delete_by_id(&self, id: i64) -> Result<Option<Item>, StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let item = select_item(&tx, id)?;
            if item.is_some() {
                tx.execute("DELETE FROM items WHERE id = ?1", params![id])?;
            }
            tx.commit()?;
            Ok(item)
        })
    }

    fn reset_all(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "BEGIN;
                 DELETE FROM items;
                 DELETE FROM sqlite_sequence WHERE name = 'items';
                 COMMIT;",
            )
        })
    }

    fn dispose(&self) -> Result<(), StoreError> {
        let mut guard = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        match guard.take() {
            Some(conn) => conn.close().map_err(|(_, e)| StoreError::Sqlite(e)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, description: &str) -> ItemFields {
        ItemFields {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let store = SqliteItemStore::open_in_memory().unwrap();
        let item = store.insert(fields("Lamp", "Desk lamp")).unwrap();
        assert_eq!(item.id, 1);
        assert_eq!(store.get_by_id(1).unwrap(), Some(item));
        assert_eq!(store.get_by_id(2).unwrap(), None);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let store = SqliteItemStore::open_in_memory().unwrap();
        store.insert(fields("a", "x")).unwrap();
        let b = store.insert(fields("b", "x")).unwrap();
        assert_eq!(store.delete_by_id(b.id).unwrap(), Some(b));
        // the highest id was deleted; plain rowid tables would hand out 2 again
        assert_eq!(store.insert(fields("c", "x")).unwrap().id, 3);
    }

    #[test]
    fn test_delete_middle_preserves_order() {
        let store = SqliteItemStore::open_in_memory().unwrap();
        let a = store.insert(fields("a", "x")).unwrap();
        let b = store.insert(fields("b", "x")).unwrap();
        let c = store.insert(fields("c", "x")).unwrap();

        store.delete_by_id(b.id).unwrap();
        assert_eq!(store.list_all().unwrap(), vec![a, c]);
        assert_eq!(store.delete_by_id(b.id).unwrap(), None);
    }

    #[test]
    fn test_update() {
        let store = SqliteItemStore::open_in_memory().unwrap();
        let a = store.insert(fields("a", "x")).unwrap();

        let updated = store.update(a.id, fields("b", "y")).unwrap();
        assert_eq!(updated, Some(fields("b", "y").into_item(a.id)));
        assert_eq!(store.get_by_id(a.id).unwrap(), updated);
        assert_eq!(store.update(42, fields("b", "y")).unwrap(), None);
    }

    #[test]
    fn test_reset_restarts_ids() {
        let store = SqliteItemStore::open_in_memory().unwrap();
        store.insert(fields("a", "x")).unwrap();
        store.insert(fields("b", "x")).unwrap();

        store.reset_all().unwrap();
        assert!(store.list_all().unwrap().is_empty());
        assert_eq!(store.insert(fields("c", "x")).unwrap().id, 1);
    }

    #[test]
    fn test_reset_on_fresh_database() {
        let store = SqliteItemStore::open_in_memory().unwrap();
        store.reset_all().unwrap();
        assert_eq!(store.insert(fields("a", "x")).unwrap().id, 1);
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.db");

        let store = SqliteItemStore::open(&path).unwrap();
        store.insert(fields("a", "x")).unwrap();
        let b = store.insert(fields("b", "y")).unwrap();
        store.delete_by_id(b.id).unwrap();
        store.dispose().unwrap();

        let store = SqliteItemStore::open(&path).unwrap();
        let items = store.list_all().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "a");
        assert_eq!(store.insert(fields("c", "z")).unwrap().id, 3);
    }

    #[test]
    fn test_dispose_rejects_further_use() {
        let store = SqliteItemStore::open_in_memory().unwrap();
        store.dispose().unwrap();
        assert!(matches!(store.list_all(), Err(StoreError::Disposed)));
        store.dispose().unwrap();
    }
}
