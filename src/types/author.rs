use std::fmt::{Display, Write};

use anyhow::Result;
use derives::DbTable;
use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{SqliteQueryResult, SqliteRow},
    FromRow, Row, SqliteConnection,
};

use crate::{
    config::Config,
    traits::{CreateTable, DbTable, DisplayTerminal, Insertable},
    types::try_get_u32,
};

pub type AuthorId = i64;

/// A person credited on at least one book. Authors have no external
/// identifier, they are told apart by name and years alone. A year of `0`
/// means unknown (or, for the year of death, still alive).
#[derive(Default, Debug, Clone, PartialEq, Eq, DbTable, Serialize, Deserialize)]
pub struct Author {
    /// Surrogate key, `None` until the author has been saved.
    pub id:         Option<AuthorId>,
    pub name:       String,
    pub year_birth: u32,
    pub year_death: u32,
}

impl Author {
    pub fn new(name: impl Into<String>, year_birth: u32, year_death: u32) -> Self {
        Self {
            id: None,
            name: name.into(),
            year_birth,
            year_death,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Exact comparison of the (name, birth, death) triple.
    pub fn has_identity(&self, name: &str, year_birth: u32, year_death: u32) -> bool {
        self.name == name && self.year_birth == year_birth && self.year_death == year_death
    }
}

fn fmt_year(year: u32) -> String {
    match year {
        0 => "?".to_string(),
        year => year.to_string(),
    }
}

impl FromRow<'_, SqliteRow> for Author {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id:         Some(row.try_get("id")?),
            name:       row.try_get("name")?,
            year_birth: try_get_u32(row, "year_birth")?,
            year_death: try_get_u32(row, "year_death")?,
        })
    }
}

impl CreateTable for Author {
    async fn create_table(conn: &mut SqliteConnection) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                year_birth INTEGER NOT NULL DEFAULT 0,
                year_death INTEGER NOT NULL DEFAULT 0
            );"#,
            Self::TABLE_NAME
        ))
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

impl Insertable for Author {
    async fn insert(&self, conn: &mut SqliteConnection) -> Result<SqliteQueryResult> {
        Ok(sqlx::query(&format!(
            r#"
                    INSERT INTO {} ( name, year_birth, year_death )
                    VALUES ( ?1, ?2, ?3 )
                    "#,
            Self::TABLE_NAME
        ))
        .bind(&self.name)
        .bind(i64::from(self.year_birth))
        .bind(i64::from(self.year_death))
        .execute(&mut *conn)
        .await?)
    }
}

impl Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}-{})",
            self.name,
            fmt_year(self.year_birth),
            fmt_year(self.year_death)
        )
    }
}

impl DisplayTerminal for Author {
    fn fmt(&self, f: &mut String, config: &Config) -> Result<()> {
        writeln!(f, "{}", config.output_author.format_str(&self.name))?;
        writeln!(f, "{}", config.output_born.format_str(fmt_year(self.year_birth)))?;
        write!(f, "{}", config.output_died.format_str(fmt_year(self.year_death)))?;
        Ok(())
    }
}
