//! SQL DDL for the dashboard store.
//! SQLite-first design; can be adapted for other RDBMS.

/// Credential table, created once and left alone afterwards.
/// - `username` TEXT PRIMARY KEY
/// - `password_hash` lowercase hex SHA-256 digest
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS admin (
    username TEXT PRIMARY KEY,
    password_hash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sales (
    sales_id INTEGER NOT NULL,
    country TEXT NOT NULL,
    customer_id TEXT NOT NULL,
    date TEXT NOT NULL DEFAULT '',
    cost REAL NOT NULL
)
"#;

/// Fixed sales layout. No primary key on `sales_id`: uploads may repeat ids
/// and are stored as given; `rowid` keeps CSV order.
pub const SALES_RESET: &str = r#"
DROP TABLE IF EXISTS sales;

CREATE TABLE sales (
    sales_id INTEGER NOT NULL,
    country TEXT NOT NULL,
    customer_id TEXT NOT NULL,
    date TEXT NOT NULL DEFAULT '',
    cost REAL NOT NULL
)
"#;

/// Split a bundled DDL script into individual statements
/// (sqlx::query runs one statement at a time).
pub fn statements(script: &str) -> impl Iterator<Item = &str> {
    script.split(';').map(str::trim).filter(|s| !s.is_empty())
}
