//! Database schema definitions
//!
//! Both backends share the same five-column `jobs` table; `job_url` is the
//! identity key and carries the uniqueness constraint.

/// SQLite schema
pub const SQLITE_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    vacancy_name TEXT NOT NULL,
    company_name TEXT NOT NULL,
    published TEXT NOT NULL,
    deadline TEXT NOT NULL,
    job_url TEXT NOT NULL PRIMARY KEY
);
"#;

/// PostgreSQL schema
pub const POSTGRES_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    vacancy_name TEXT NOT NULL,
    company_name TEXT NOT NULL,
    published TEXT NOT NULL,
    deadline TEXT NOT NULL,
    job_url TEXT NOT NULL PRIMARY KEY
)
"#;

pub const SELECT_JOB_URLS_SQL: &str = "SELECT job_url FROM jobs";

pub const COUNT_JOBS_SQL: &str = "SELECT COUNT(*) FROM jobs";

/// Initializes the SQLite schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SQLITE_SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        let result = initialize_schema(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_jobs_table_columns() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let mut stmt = conn.prepare("PRAGMA table_info(jobs)").unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(1))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            columns,
            vec![
                "vacancy_name",
                "company_name",
                "published",
                "deadline",
                "job_url"
            ]
        );
    }
}
