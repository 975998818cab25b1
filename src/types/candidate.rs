use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::types::{author::Author, book::Book, book::BookId};

/// A book description coming from a bibliographic search. Nothing about it
/// has been checked yet.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBookRecord {
    pub id:               BookId,
    pub title:            String,
    pub languages:        Vec<String>,
    pub total_downloads:  u32,
    pub authors:          Vec<RawAuthor>,
    pub publication_date: Option<String>,
    pub genre:            Option<String>,
    pub synopsis:         Option<String>,
    pub publisher:        Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAuthor {
    pub name:       String,
    pub birth_year: u32,
    pub death_year: u32,
}

/// Why a candidate record was turned away before touching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyTitle,
    NoLanguages,
    NoAuthors,
    UnnamedAuthor,
}

impl Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::EmptyTitle => write!(f, "the record has no title"),
            Rejection::NoLanguages => write!(f, "the record lists no languages"),
            Rejection::NoAuthors => write!(f, "the record lists no authors"),
            Rejection::UnnamedAuthor => write!(f, "the record lists an author without a name"),
        }
    }
}

impl RawBookRecord {
    pub fn validate(&self) -> Result<(), Rejection> {
        if self.title.trim().is_empty() {
            return Err(Rejection::EmptyTitle);
        }
        if self.languages.iter().all(|x| x.trim().is_empty()) {
            return Err(Rejection::NoLanguages);
        }
        if self.authors.is_empty() {
            return Err(Rejection::NoAuthors);
        }
        if self.authors.iter().any(|x| x.name.trim().is_empty()) {
            return Err(Rejection::UnnamedAuthor);
        }
        Ok(())
    }
}

impl From<&Author> for RawAuthor {
    fn from(author: &Author) -> Self {
        Self {
            name:       author.name.clone(),
            birth_year: author.year_birth,
            death_year: author.year_death,
        }
    }
}

/// Turns a stored book back into a candidate, used when replaying a backup.
impl From<Book> for RawBookRecord {
    fn from(book: Book) -> Self {
        Self {
            id:               book.id,
            authors:          book.authors.iter().map(RawAuthor::from).collect(),
            title:            book.title,
            languages:        book.languages,
            total_downloads:  book.total_downloads,
            publication_date: book.publication_date,
            genre:            book.genre,
            synopsis:         book.synopsis,
            publisher:        book.publisher,
        }
    }
}
