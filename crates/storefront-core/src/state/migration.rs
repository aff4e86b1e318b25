use rusqlite::Connection;

use crate::error::{Result, StorefrontError};

use super::SqliteStateStore;

const MIGRATION_SCHEMA_SQL: &str = r"
    PRAGMA journal_mode = WAL;
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS attribute_type (
        type_key TEXT PRIMARY KEY,
        description TEXT NOT NULL,
        architecture INTEGER NOT NULL DEFAULT 0,
        allow_multiple INTEGER NOT NULL DEFAULT 0,
        important INTEGER NOT NULL DEFAULT 0,
        required INTEGER NOT NULL DEFAULT 0,
        visible INTEGER NOT NULL DEFAULT 1,
        active_status TEXT NOT NULL,
        create_user TEXT NOT NULL,
        update_user TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS attribute_code (
        type_key TEXT NOT NULL,
        code TEXT NOT NULL,
        label TEXT NOT NULL,
        description TEXT NOT NULL,
        detail_url TEXT,
        active_status TEXT NOT NULL,
        create_user TEXT NOT NULL,
        update_user TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (type_key, code),
        FOREIGN KEY (type_key) REFERENCES attribute_type(type_key)
    );

    CREATE TABLE IF NOT EXISTS system_kv (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_attribute_type_status
    ON attribute_type(active_status);
    CREATE INDEX IF NOT EXISTS idx_attribute_code_type_status
    ON attribute_code(type_key, active_status);
";

impl SqliteStateStore {
    pub fn migrate(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StorefrontError::mutex_poisoned("sqlite"))?;
        conn.execute_batch(MIGRATION_SCHEMA_SQL)?;
        ensure_required_column(
            &conn,
            "attribute_code",
            "detail_url",
            "unsupported attribute_code schema: detail_url is missing; reset catalog state database",
        )?;
        ensure_required_column(
            &conn,
            "attribute_type",
            "architecture",
            "unsupported attribute_type schema: architecture is missing; reset catalog state database",
        )?;
        drop(conn);
        Ok(())
    }
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names.iter().any(|name| name == column))
}

fn ensure_required_column(
    conn: &Connection,
    table: &str,
    column: &str,
    message: &str,
) -> Result<()> {
    if has_column(conn, table, column)? {
        return Ok(());
    }
    Err(StorefrontError::Internal(message.to_string()))
}
