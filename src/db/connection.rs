use anyhow::{Context, Result};
use rusqlite::Connection;

/// Open the in-memory database that plays the role of the directory backend
/// and create its schema. Nothing is written to disk, so every session starts
/// from the seed data again.
pub fn open_store() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory SQLite store")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create the `companies` table if it is missing. `ordinal` carries the source
/// ordering: newly added companies receive a smaller ordinal than everything
/// already present so they come back first.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS companies (
            id INTEGER PRIMARY KEY,
            ordinal INTEGER NOT NULL,
            name TEXT NOT NULL,
            industry TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            location TEXT NOT NULL,
            employees INTEGER NOT NULL DEFAULT 0,
            founded_year INTEGER NOT NULL,
            logo TEXT NOT NULL DEFAULT ''
        )",
        [],
    )
    .context("failed to create companies table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS companies_ordinal ON companies (ordinal)",
        [],
    )
    .context("failed to create ordinal index")?;

    Ok(())
}
