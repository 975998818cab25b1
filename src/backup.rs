use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    service::{CatalogService, IngestOutcome},
    types::{book::Book, candidate::RawBookRecord},
};

/// Contains the entire state of the catalog
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    books: Vec<Book>,
}

/// What happened when replaying a [State].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub created:  usize,
    pub skipped:  usize,
    pub rejected: usize,
}

impl State {
    /// Generate [State] struct from database
    pub async fn load(service: &CatalogService) -> Result<Self> {
        Ok(Self {
            books: service.all_books().await?,
        })
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Serialize the state to a string
    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from a string to state
    pub fn deserialize(s: &str) -> Result<State> {
        Ok(serde_json::from_str(s)?)
    }

    /// Replays every book through the regular ingest path, so books already
    /// in the catalog are skipped and authors are shared the usual way.
    pub async fn restore(&self, service: &CatalogService) -> Result<RestoreReport> {
        let mut report = RestoreReport::default();
        for book in &self.books {
            match service.ingest(RawBookRecord::from(book.clone())).await? {
                IngestOutcome::Created(_) => report.created += 1,
                IngestOutcome::AlreadyExists(_) => report.skipped += 1,
                IngestOutcome::InvalidCandidate(_) => report.rejected += 1,
            }
        }
        info!(
            "Restored {} books, skipped {}, rejected {}",
            report.created, report.skipped, report.rejected
        );
        Ok(report)
    }
}
