use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::{service::CatalogService, types::book::Book};

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Export {
    #[serde(rename = "Book Id")]
    book_id:   i64,
    #[serde(rename = "Title")]
    title:     String,
    #[serde(rename = "Authors")]
    authors:   String,
    #[serde(rename = "Languages")]
    languages: String,
    #[serde(rename = "Downloads")]
    downloads: u32,
    #[serde(rename = "Genre")]
    genre:     Option<String>,
}

impl From<&Book> for Export {
    fn from(book: &Book) -> Self {
        Self {
            book_id:   book.id,
            title:     book.title.clone(),
            authors:   book.author_names().join(" and "),
            languages: book.languages.join(","),
            downloads: book.total_downloads,
            genre:     book.genre.clone(),
        }
    }
}

impl Export {
    pub async fn new(service: &CatalogService) -> Result<Vec<Self>> {
        Ok(service.all_books().await?.iter().map(Self::from).collect())
    }

    pub fn export(data: Vec<Self>, writer: impl Write) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for record in data {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
