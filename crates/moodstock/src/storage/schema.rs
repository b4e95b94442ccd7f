use crate::dimension::Dimension;
use rusqlite::Connection;

/// Table name shared with the interchange file tooling
pub const TABLE: &str = "emotions";

/// Create the `emotions` table if it does not exist yet. Existing rows are left alone.
pub fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    let value_columns: Vec<String> = Dimension::ALL
        .iter()
        .map(|d| format!("{} REAL", d.name()))
        .collect();

    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {TABLE} (\n    timestamp TEXT,\n    {}\n);",
        value_columns.join(",\n    ")
    ))
}

/// Column names in storage order; also the interchange file header
pub fn columns() -> Vec<&'static str> {
    let mut columns = vec!["timestamp"];
    columns.extend(Dimension::ALL.iter().map(|d| d.name()));
    columns
}

/// `timestamp, happy, sad, ...` for SQL
pub fn column_list() -> String {
    columns().join(", ")
}

pub fn insert_sql() -> String {
    let placeholders: Vec<String> = (1..=Dimension::COUNT + 1).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {TABLE} ({}) VALUES ({})",
        column_list(),
        placeholders.join(", ")
    )
}
