use std::collections::BTreeSet;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::{
    gutendex::BookSource,
    store::{CatalogStore, CatalogTransaction},
    types::{
        author::Author,
        book::Book,
        candidate::{RawAuthor, RawBookRecord, Rejection},
        statistics::DownloadStatistics,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Created(Book),
    /// A book with the same id is already stored. Carries its title.
    AlreadyExists(String),
    InvalidCandidate(Rejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    NoMatch,
    Ingested(IngestOutcome),
}

/// Entry point for the interaction layer. Holds no state of its own besides
/// the store handle.
#[derive(Debug, Clone)]
pub struct CatalogService {
    store: CatalogStore,
}

impl CatalogService {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }

    /// Validates `candidate`, then stores it unless its id is already known.
    /// The existence check, author resolution and save share one transaction.
    pub async fn ingest(&self, candidate: RawBookRecord) -> Result<IngestOutcome> {
        if let Err(rejection) = candidate.validate() {
            warn!("Rejected candidate {}: {}", candidate.id, rejection);
            return Ok(IngestOutcome::InvalidCandidate(rejection));
        }
        let mut tx = self.store.begin().await?;
        if let Some(existing) = tx.find_book_by_id(candidate.id).await? {
            warn!("Book {} is already in the catalog", existing.title);
            return Ok(IngestOutcome::AlreadyExists(existing.title));
        }
        let authors = resolve_authors(&mut tx, &candidate.authors).await?;
        let book = tx.save(Book::from_candidate(candidate, authors)).await?;
        tx.commit().await?;
        info!("Saved book {} ({})", book.title, book.id);
        Ok(IngestOutcome::Created(book))
    }

    /// Searches `source` for `title` and ingests the best hit. Further hits
    /// are ignored.
    pub async fn search_and_ingest<S: BookSource>(
        &self,
        source: &S,
        title: &str,
    ) -> Result<SearchOutcome> {
        let title = title.trim();
        if title.is_empty() {
            anyhow::bail!("Search title can't be empty");
        }
        let mut records = source.fetch_by_title(title).await?;
        debug!("Search for {title:?} returned {} records", records.len());
        if records.is_empty() {
            return Ok(SearchOutcome::NoMatch);
        }
        let first = records.swap_remove(0);
        Ok(SearchOutcome::Ingested(self.ingest(first).await?))
    }

    pub async fn all_books(&self) -> Result<Vec<Book>> {
        self.store.all_books().await
    }

    pub async fn all_authors(&self) -> Result<Vec<Author>> {
        self.store.all_authors_across_books().await
    }

    pub async fn authors_alive_since(&self, year: i64) -> Result<Vec<Author>> {
        self.store.authors_alive_since(year).await
    }

    /// Authors born and deceased within `[from, to]`. An inverted range yields
    /// nothing; it is up to the caller to report it.
    pub async fn authors_alive_during_range(&self, from: i64, to: i64) -> Result<Vec<Author>> {
        if from > to {
            debug!("Inverted year range {from}..{to}");
            return Ok(vec![]);
        }
        self.store.authors_alive_during_range(from, to).await
    }

    pub async fn languages(&self) -> Result<BTreeSet<String>> {
        self.store.distinct_languages().await
    }

    pub async fn books_by_language(&self, code: &str) -> Result<Vec<Book>> {
        self.store.books_by_language(code).await
    }

    pub async fn top_books(&self, n: u32) -> Result<Vec<Book>> {
        self.store.top_books_by_downloads(n).await
    }

    pub async fn statistics(&self) -> Result<DownloadStatistics> {
        let counts = self.store.download_counts().await?;
        Ok(DownloadStatistics::from_counts(&counts))
    }

    /// First author whose name starts with `name_prefix`. A blank prefix
    /// finds nobody.
    pub async fn author_by_name(&self, name_prefix: &str) -> Result<Option<Author>> {
        if name_prefix.trim().is_empty() {
            return Ok(None);
        }
        self.store.find_author_by_name(name_prefix.trim()).await
    }

    pub async fn author_books(&self, author: &Author) -> Result<Vec<String>> {
        match author.id {
            Some(id) => self.store.book_titles_of(id).await,
            None => Ok(vec![]),
        }
    }
}

/// Looks up every credited author, reusing stored rows and creating the rest
/// in memory. The name is matched as a prefix, which makes this a best-effort
/// deduplication rather than a uniqueness guarantee. An author credited twice
/// on the same record is only kept once.
async fn resolve_authors(tx: &mut CatalogTransaction, raw: &[RawAuthor]) -> Result<Vec<Author>> {
    let mut authors: Vec<Author> = Vec::with_capacity(raw.len());
    for a in raw {
        let name = a.name.trim();
        if authors
            .iter()
            .any(|x| x.has_identity(name, a.birth_year, a.death_year))
        {
            continue;
        }
        let author = match tx
            .find_author_by_name_years(name, a.birth_year, a.death_year)
            .await?
        {
            Some(author) => {
                debug!("Reusing author {author}");
                author
            }
            None => Author::new(name, a.birth_year, a.death_year),
        };
        if author.id.is_some() && authors.iter().any(|x| x.id == author.id) {
            continue;
        }
        authors.push(author);
    }
    Ok(authors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct StaticSource(Vec<RawBookRecord>);

    impl BookSource for StaticSource {
        async fn fetch_by_title(&self, _title: &str) -> Result<Vec<RawBookRecord>> {
            Ok(self.0.clone())
        }
    }

    fn record(id: i64, title: &str, downloads: u32, authors: &[(&str, u32, u32)]) -> RawBookRecord {
        RawBookRecord {
            id,
            title: title.into(),
            languages: vec!["en".into()],
            total_downloads: downloads,
            authors: authors
                .iter()
                .map(|(name, birth_year, death_year)| RawAuthor {
                    name:       name.to_string(),
                    birth_year: *birth_year,
                    death_year: *death_year,
                })
                .collect(),
            ..RawBookRecord::default()
        }
    }

    async fn service() -> CatalogService {
        CatalogService::new(CatalogStore::in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn ingesting_twice_is_a_no_op() {
        let service = service().await;
        let moby = record(1, "Moby Dick", 500, &[("Herman Melville", 1819, 1891)]);

        let first = service.ingest(moby.clone()).await.unwrap();
        assert!(matches!(first, IngestOutcome::Created(_)));
        let second = service.ingest(moby).await.unwrap();
        assert_eq!(second, IngestOutcome::AlreadyExists("Moby Dick".into()));
        assert_eq!(service.all_books().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_candidates_never_reach_the_store() {
        let service = service().await;
        let no_authors = record(1, "Moby Dick", 500, &[]);
        assert_eq!(
            service.ingest(no_authors).await.unwrap(),
            IngestOutcome::InvalidCandidate(Rejection::NoAuthors)
        );
        let no_title = record(2, "", 500, &[("Herman Melville", 1819, 1891)]);
        assert_eq!(
            service.ingest(no_title).await.unwrap(),
            IngestOutcome::InvalidCandidate(Rejection::EmptyTitle)
        );
        assert!(service.all_books().await.unwrap().is_empty());
        assert!(service.all_authors().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn shared_authors_are_reused() {
        let service = service().await;
        service
            .ingest(record(1, "Moby Dick", 500, &[("Herman Melville", 1819, 1891)]))
            .await
            .unwrap();
        service
            .ingest(record(2, "Typee", 50, &[("Herman Melville", 1819, 1891)]))
            .await
            .unwrap();

        let authors = service.all_authors().await.unwrap();
        assert_eq!(authors.len(), 1);
        assert_eq!(
            service.author_books(&authors[0]).await.unwrap(),
            vec!["Moby Dick".to_string(), "Typee".to_string()]
        );
        let books = service.all_books().await.unwrap();
        assert_eq!(books[0].authors[0].id, books[1].authors[0].id);
    }

    #[tokio::test]
    async fn different_years_make_a_different_author() {
        let service = service().await;
        service
            .ingest(record(1, "A", 1, &[("John Smith", 1800, 1870)]))
            .await
            .unwrap();
        service
            .ingest(record(2, "B", 1, &[("John Smith", 1900, 1970)]))
            .await
            .unwrap();
        assert_eq!(service.all_authors().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_credit_on_one_record_is_collapsed() {
        let service = service().await;
        let outcome = service
            .ingest(record(
                1,
                "Twice",
                1,
                &[("Jane Doe", 1900, 1950), ("Jane Doe", 1900, 1950)],
            ))
            .await
            .unwrap();
        let IngestOutcome::Created(book) = outcome else {
            panic!("expected a created book, got {outcome:?}");
        };
        assert_eq!(book.authors.len(), 1);
    }

    #[tokio::test]
    async fn statistics_on_empty_catalog() {
        let service = service().await;
        let stats = service.statistics().await.unwrap();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.max, 0);
        assert_eq!(stats.min, 0);
    }

    #[tokio::test]
    async fn statistics_over_catalog() {
        let service = service().await;
        service
            .ingest(record(1, "A", 100, &[("X", 0, 0)]))
            .await
            .unwrap();
        service
            .ingest(record(2, "B", 300, &[("Y", 0, 0)]))
            .await
            .unwrap();
        let stats = service.statistics().await.unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 200.0);
        assert_eq!(stats.max, 300);
        assert_eq!(stats.min, 100);
    }

    #[tokio::test]
    async fn inverted_range_is_empty() {
        let service = service().await;
        service
            .ingest(record(1, "A", 1, &[("X", 1850, 1880)]))
            .await
            .unwrap();
        assert_eq!(service.authors_alive_during_range(1800, 1900).await.unwrap().len(), 1);
        assert!(service
            .authors_alive_during_range(1900, 1800)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn author_lookup_by_prefix() {
        let service = service().await;
        service
            .ingest(record(1, "Moby Dick", 500, &[("Herman Melville", 1819, 1891)]))
            .await
            .unwrap();
        let found = service.author_by_name("Herman").await.unwrap().unwrap();
        assert_eq!(found.name, "Herman Melville");
        assert_eq!(service.author_by_name("Jane").await.unwrap(), None);
        assert_eq!(service.author_by_name("  ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn search_keeps_only_the_first_hit() {
        let service = service().await;
        let source = StaticSource(vec![
            record(1, "Moby Dick", 500, &[("Herman Melville", 1819, 1891)]),
            record(2, "Moby Dick; Or, The Whale", 400, &[("Herman Melville", 1819, 1891)]),
        ]);
        let outcome = service.search_and_ingest(&source, "moby").await.unwrap();
        assert!(matches!(
            outcome,
            SearchOutcome::Ingested(IngestOutcome::Created(ref book)) if book.id == 1
        ));
        assert_eq!(service.all_books().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn search_without_results() {
        let service = service().await;
        let outcome = service
            .search_and_ingest(&StaticSource(vec![]), "nothing")
            .await
            .unwrap();
        assert_eq!(outcome, SearchOutcome::NoMatch);
        assert!(service
            .search_and_ingest(&StaticSource(vec![]), " ")
            .await
            .is_err());
    }
}
