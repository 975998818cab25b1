use anyhow::Result;
use sqlx::{sqlite::SqliteQueryResult, SqliteConnection};

use crate::config::Config;

/// Naming of a table backing a persisted entity, usually derived with
/// `#[derive(DbTable)]`.
pub trait DbTable {
    const NAME_SINGULAR: &'static str;
    const NAME_PLURAL: &'static str;
    const TABLE_NAME: &'static str = Self::NAME_PLURAL;
}

/// Table holding the many side of a relation owned by `A`, named
/// `{a}_{b}` after the singular names involved.
pub trait JunctionTable<A: DbTable> {
    const TABLE_NAME: &'static str;
}

pub trait CreateTable {
    async fn create_table(conn: &mut SqliteConnection) -> Result<()>;
}

pub trait Insertable {
    async fn insert(&self, conn: &mut SqliteConnection) -> Result<SqliteQueryResult>;
}

/// Styled rendering for the terminal, driven by the output sections of [Config].
pub trait DisplayTerminal {
    fn fmt(&self, f: &mut String, config: &Config) -> Result<()>;

    fn fmt_to_string(&self, config: &Config) -> Result<String> {
        let mut s = String::new();
        DisplayTerminal::fmt(self, &mut s, config)?;
        Ok(s)
    }
}

