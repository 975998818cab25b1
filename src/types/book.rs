use std::{
    collections::BTreeSet,
    fmt::{Display, Write},
};

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
    types::{author::Author, candidate::RawBookRecord, try_get_u32},
};

/// Identifier assigned by the bibliographic source, used as primary key.
pub type BookId = i64;

#[derive(Default, Debug, Clone, PartialEq, Eq, DbTable, Serialize, Deserialize)]
pub struct Book {
    pub id:               BookId,
    pub title:            String,
    /// Language codes, sorted and free of duplicates.
    pub languages:        Vec<String>,
    pub total_downloads:  u32,
    pub publication_date: Option<String>,
    pub genre:            Option<String>,
    pub synopsis:         Option<String>,
    pub publisher:        Option<String>,
    pub authors:          Vec<Author>,
}

impl Book {
    pub fn from_candidate(candidate: RawBookRecord, authors: Vec<Author>) -> Self {
        Self {
            id: candidate.id,
            title: candidate.title.trim().to_string(),
            languages: normalize_languages(&candidate.languages),
            total_downloads: candidate.total_downloads,
            publication_date: candidate.publication_date,
            genre: candidate.genre,
            synopsis: candidate.synopsis,
            publisher: candidate.publisher,
            authors,
        }
    }

    pub fn author_names(&self) -> Vec<&str> {
        self.authors.iter().map(|x| x.name.as_str()).collect()
    }
}

fn normalize_languages(languages: &[String]) -> Vec<String> {
    languages
        .iter()
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

impl FromRow<'_, SqliteRow> for Book {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id:               row.try_get("id")?,
            title:            row.try_get("title")?,
            languages:        vec![],
            total_downloads:  try_get_u32(row, "total_downloads")?,
            publication_date: row.try_get("publication_date")?,
            genre:            row.try_get("genre")?,
            synopsis:         row.try_get("synopsis")?,
            publisher:        row.try_get("publisher")?,
            authors:          vec![],
        })
    }
}

impl CreateTable for Book {
    async fn create_table(conn: &mut SqliteConnection) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY NOT NULL,
                title TEXT NOT NULL,
                total_downloads INTEGER NOT NULL DEFAULT 0,
                publication_date TEXT,
                genre TEXT,
                synopsis TEXT,
                publisher TEXT
            );"#,
            Self::TABLE_NAME
        ))
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

impl Insertable for Book {
    async fn insert(&self, conn: &mut SqliteConnection) -> Result<SqliteQueryResult> {
        Ok(sqlx::query(&format!(
            r#"
                    INSERT INTO {} ( id, title, total_downloads, publication_date, genre, synopsis, publisher )
                    VALUES ( ?1, ?2, ?3, ?4, ?5, ?6, ?7 )
                    "#,
            Self::TABLE_NAME
        ))
        .bind(self.id)
        .bind(&self.title)
        .bind(i64::from(self.total_downloads))
        .bind(&self.publication_date)
        .bind(&self.genre)
        .bind(&self.synopsis)
        .bind(&self.publisher)
        .execute(&mut *conn)
        .await?)
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} by {} [{}] ({} downloads)",
            self.title,
            self.author_names().join(" and "),
            self.languages.join(", "),
            self.total_downloads
        )
    }
}

impl DisplayTerminal for Book {
    fn fmt(&self, f: &mut String, config: &Config) -> Result<()> {
        writeln!(f, "{}", config.output_book.format_str(&self.title))?;
        writeln!(f, "{}", config.output_author.format_vec(&self.author_names()))?;
        writeln!(f, "{}", config.output_language.format_vec(&self.languages))?;
        write!(f, "{}", config.output_downloads.format_str(self.total_downloads))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::candidate::RawAuthor;
    use pretty_assertions::assert_eq;

    #[test]
    fn candidate_languages_become_a_set() {
        let candidate = RawBookRecord {
            id: 84,
            title: " Frankenstein ".into(),
            languages: vec!["fr".into(), "en".into(), "fr".into(), " ".into()],
            total_downloads: 1200,
            authors: vec![RawAuthor {
                name:       "Mary Wollstonecraft Shelley".into(),
                birth_year: 1797,
                death_year: 1851,
            }],
            ..RawBookRecord::default()
        };
        let book = Book::from_candidate(candidate, vec![]);
        assert_eq!(book.title, "Frankenstein");
        assert_eq!(book.languages, vec!["en".to_string(), "fr".to_string()]);
        assert_eq!(book.total_downloads, 1200);
    }

    #[test]
    fn display_joins_authors() {
        let book = Book {
            id: 1,
            title: "Good Omens".into(),
            languages: vec!["en".into()],
            total_downloads: 3,
            authors: vec![
                Author::new("Terry Pratchett", 1948, 2015),
                Author::new("Neil Gaiman", 1960, 0),
            ],
            ..Book::default()
        };
        assert_eq!(
            book.to_string(),
            "Good Omens by Terry Pratchett and Neil Gaiman [en] (3 downloads)"
        );
        assert_eq!(Book::TABLE_NAME, "books");
    }
}
