//! DDL for the `tree_items` table and connection setup.

use rusqlite::Connection;

use crate::storage::error::StorageResult;

/// Name of the single parent-pointer table.
pub const TABLE_NAME: &str = "tree_items";

const CREATE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS tree_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        data TEXT,
        parent_id INTEGER REFERENCES tree_items(id)
    );
    CREATE INDEX IF NOT EXISTS ix_tree_items_name ON tree_items(name);
    CREATE INDEX IF NOT EXISTS ix_tree_items_parent_id ON tree_items(parent_id);
";

const DROP_SCHEMA: &str = "
    DROP INDEX IF EXISTS ix_tree_items_parent_id;
    DROP INDEX IF EXISTS ix_tree_items_name;
    DROP TABLE IF EXISTS tree_items;
";

/// Per-connection pragmas. Foreign keys are off by default in SQLite.
pub(crate) fn configure(conn: &Connection, on_disk: bool) -> StorageResult<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    if on_disk {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
    }
    Ok(())
}

/// Create the table and indexes if they are missing.
pub(crate) fn create(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(CREATE_SCHEMA)?;
    Ok(())
}

/// Drop and recreate the table. Destroys all rows and restarts id assignment.
pub(crate) fn reset(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(DROP_SCHEMA)?;
    create(conn)
}
