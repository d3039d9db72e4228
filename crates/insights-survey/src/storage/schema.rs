//! `SQLite` schema definitions for insights-survey.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the responses table.
pub const CREATE_RESPONSES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS responses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    respondent_id TEXT NOT NULL,
    submitted_at TEXT NOT NULL,
    name TEXT NOT NULL,
    age INTEGER NOT NULL,
    occupation TEXT NOT NULL,
    q1 TEXT NOT NULL,
    q2 TEXT NOT NULL,
    q3 TEXT NOT NULL,
    q4 TEXT NOT NULL,
    q5 TEXT NOT NULL,
    q6 TEXT NOT NULL,
    q7 TEXT NOT NULL,
    q8 TEXT NOT NULL,
    q9 TEXT NOT NULL,
    q10 TEXT NOT NULL,
    q11 TEXT NOT NULL,
    q12 TEXT NOT NULL,
    q13 TEXT NOT NULL,
    q14 TEXT NOT NULL,
    q15 TEXT NOT NULL,
    q16 TEXT NOT NULL
)
";

/// SQL statement to create an index on `respondent_id` for lookups.
pub const CREATE_RESPONDENT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_responses_respondent ON responses(respondent_id)
";

/// SQL statement to create an index on `submitted_at` for statistics.
pub const CREATE_SUBMITTED_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_responses_submitted ON responses(submitted_at)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_RESPONSES_TABLE,
    CREATE_RESPONDENT_INDEX,
    CREATE_SUBMITTED_INDEX,
    CREATE_METADATA_TABLE,
];

/// Insert statement covering every column except the generated id.
pub const INSERT_RESPONSE: &str = r"
INSERT INTO responses (
    respondent_id, submitted_at, name, age, occupation,
    q1, q2, q3, q4, q5, q6, q7, q8,
    q9, q10, q11, q12, q13, q14, q15, q16
)
VALUES (
    ?1, ?2, ?3, ?4, ?5,
    ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
    ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21
)
";

/// Select statement returning every column in insertion order.
pub const SELECT_ALL_RESPONSES: &str = r"
SELECT id, respondent_id, submitted_at, name, age, occupation,
       q1, q2, q3, q4, q5, q6, q7, q8,
       q9, q10, q11, q12, q13, q14, q15, q16
FROM responses ORDER BY id ASC
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::COLUMNS;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_responses_table_has_every_column() {
        assert!(CREATE_RESPONSES_TABLE.contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
        for column in &COLUMNS[1..] {
            assert!(
                CREATE_RESPONSES_TABLE.contains(&format!("    {column} ")),
                "missing column {column}"
            );
        }
    }

    #[test]
    fn test_insert_binds_twenty_one_values() {
        assert!(INSERT_RESPONSE.contains("?21"));
        assert!(!INSERT_RESPONSE.contains("?22"));
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}
