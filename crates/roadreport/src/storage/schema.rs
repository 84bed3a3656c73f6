//! `SQLite` schema definitions for the key-value backend.

/// SQL statement to create the key-value table.
pub const CREATE_KV_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_KV_TABLE, CREATE_METADATA_TABLE];

/// Read a value.
pub const SELECT_VALUE: &str = "SELECT value FROM kv_store WHERE key = ?1";

/// Insert or replace a value, bumping its update time.
pub const UPSERT_VALUE: &str = r"
INSERT INTO kv_store (key, value, updated_at)
VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ','now'))
ON CONFLICT(key) DO UPDATE SET
    value = excluded.value,
    updated_at = excluded.updated_at
";

/// Remove a value.
pub const DELETE_VALUE: &str = "DELETE FROM kv_store WHERE key = ?1";
