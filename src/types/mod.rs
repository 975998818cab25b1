use sqlx::{sqlite::SqliteRow, Row};

pub mod author;
pub mod book;
pub mod candidate;
pub mod statistics;

pub mod junction_tables;

/// Reads a non-negative integer column. SQLite only knows signed integers, so
/// the conversion happens here instead of on every field.
pub(crate) fn try_get_u32(row: &SqliteRow, column: &str) -> sqlx::Result<u32> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index:  column.to_string(),
        source: Box::new(e),
    })
}
