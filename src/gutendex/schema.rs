use serde::{Deserialize, Serialize};

use crate::types::candidate::{RawAuthor, RawBookRecord};

/// Response of `GET /books/?search=...`. Only the first page is ever read.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub count:   u64,
    pub next:    Option<String>,
    #[serde(default)]
    pub results: Vec<Book>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id:             i64,
    #[serde(default)]
    pub title:          String,
    #[serde(default)]
    pub authors:        Vec<Person>,
    #[serde(default)]
    pub languages:      Vec<String>,
    #[serde(default)]
    pub subjects:       Vec<String>,
    #[serde(default)]
    pub summaries:      Vec<String>,
    #[serde(default)]
    pub download_count: u32,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub name:       String,
    pub birth_year: Option<i64>,
    pub death_year: Option<i64>,
}

/// Missing or negative (BCE) years are kept as unknown.
fn year(year: Option<i64>) -> u32 {
    year.and_then(|x| u32::try_from(x).ok()).unwrap_or(0)
}

impl From<Person> for RawAuthor {
    fn from(person: Person) -> Self {
        Self {
            name:       person.name,
            birth_year: year(person.birth_year),
            death_year: year(person.death_year),
        }
    }
}

impl From<Book> for RawBookRecord {
    fn from(book: Book) -> Self {
        Self {
            id:               book.id,
            title:            book.title,
            languages:        book.languages,
            total_downloads:  book.download_count,
            authors:          book.authors.into_iter().map(RawAuthor::from).collect(),
            publication_date: None,
            genre:            book.subjects.into_iter().next(),
            synopsis:         book.summaries.into_iter().next(),
            publisher:        None,
        }
    }
}
