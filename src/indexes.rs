//! Index maintenance for the vector table.
//!
//! A covering index on `id` serves point reads and deletes without
//! touching row storage. `refresh_statistics` feeds the SQLite query
//! planner fresh cardinality data; worth running after large batch loads
//! and periodically thereafter.

use rusqlite::Connection;

use crate::error::Result;

/// Name of the covering index on the primary key.
pub(crate) const ID_INDEX: &str = "idx_vectors_id";

/// Create the covering index if missing. Idempotent.
pub(crate) fn create_indexes(conn: &Connection, table: &str) -> Result<()> {
    conn.execute(
        &format!("CREATE INDEX IF NOT EXISTS {ID_INDEX} ON {table} (id)"),
        [],
    )?;
    Ok(())
}

/// Refresh planner statistics for the whole database.
pub(crate) fn refresh_statistics(conn: &Connection) -> Result<()> {
    conn.execute_batch("ANALYZE; PRAGMA optimize;")?;
    Ok(())
}

/// List index names defined on `table`.
pub(crate) fn list_indexes(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1")?;
    let names = stmt
        .query_map([table], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_table() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE vectors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                vector BLOB NOT NULL,
                norm REAL NOT NULL,
                metadata TEXT
            )",
            [],
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_create_indexes_idempotent() {
        let conn = scratch_table();
        create_indexes(&conn, "vectors").unwrap();
        create_indexes(&conn, "vectors").unwrap();

        let names = list_indexes(&conn, "vectors").unwrap();
        assert!(names.iter().any(|n| n == ID_INDEX));
    }

    #[test]
    fn test_refresh_statistics() {
        let conn = scratch_table();
        create_indexes(&conn, "vectors").unwrap();
        refresh_statistics(&conn).unwrap();
    }
}
