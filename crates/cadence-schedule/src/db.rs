use rusqlite::Connection;

use crate::error::Result;

/// Initialise the job registry schema in `conn`.
///
/// Creates the `scheduled_jobs` table (one row per named job) and the
/// `job_runs` history table. Idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS scheduled_jobs (
            job_name    TEXT    NOT NULL PRIMARY KEY,
            expression  TEXT    NOT NULL,   -- canonical schedule expression, UTC
            active      INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT    NOT NULL,
            updated_at  TEXT    NOT NULL
        ) STRICT;

        CREATE TABLE IF NOT EXISTS job_runs (
            id          TEXT    NOT NULL PRIMARY KEY,
            job_name    TEXT    NOT NULL,
            status      TEXT    NOT NULL,   -- 'succeeded' | 'failed'
            start_time  TEXT    NOT NULL,   -- ISO-8601
            end_time    TEXT    NOT NULL    -- ISO-8601
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_job_runs_job_name ON job_runs (job_name);
        ",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        init_db(&conn).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('scheduled_jobs', 'job_runs')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }
}
