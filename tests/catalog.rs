use std::path::PathBuf;

use pretty_assertions::assert_eq;

use libris::{
    backup::State,
    service::{CatalogService, IngestOutcome},
    store::CatalogStore,
    types::{
        author::Author,
        candidate::{RawAuthor, RawBookRecord},
    },
};

fn author(name: &str, birth_year: u32, death_year: u32) -> RawAuthor {
    RawAuthor {
        name: name.into(),
        birth_year,
        death_year,
    }
}

fn record(id: i64, title: &str, languages: &[&str], downloads: u32, authors: Vec<RawAuthor>) -> RawBookRecord {
    RawBookRecord {
        id,
        title: title.into(),
        languages: languages.iter().map(|x| x.to_string()).collect(),
        total_downloads: downloads,
        authors,
        ..RawBookRecord::default()
    }
}

fn moby_dick() -> RawBookRecord {
    record(
        1,
        "Moby Dick",
        &["en"],
        500,
        vec![author("Herman Melville", 1819, 1891)],
    )
}

async fn catalog() -> CatalogService {
    CatalogService::new(CatalogStore::in_memory().await.unwrap())
}

async fn seeded() -> CatalogService {
    let service = catalog().await;
    let records = vec![
        moby_dick(),
        record(
            2,
            "Pride and Prejudice",
            &["en"],
            900,
            vec![author("Jane Austen", 1775, 1817)],
        ),
        record(
            3,
            "Don Quijote",
            &["es", "en"],
            300,
            vec![author("Miguel de Cervantes Saavedra", 1547, 1616)],
        ),
        record(
            4,
            "Le Petit Prince",
            &["fr"],
            700,
            vec![author("Antoine de Saint-Exupéry", 1900, 1944)],
        ),
        record(
            5,
            "Typee",
            &["en"],
            50,
            vec![author("Herman Melville", 1819, 1891)],
        ),
    ];
    for r in records {
        let outcome = service.ingest(r).await.unwrap();
        assert!(matches!(outcome, IngestOutcome::Created(_)));
    }
    service
}

fn names(authors: &[Author]) -> Vec<&str> {
    authors.iter().map(|x| x.name.as_str()).collect()
}

#[tokio::test]
async fn moby_dick_scenario() {
    let service = catalog().await;

    let IngestOutcome::Created(book) = service.ingest(moby_dick()).await.unwrap() else {
        panic!("first ingest must create the book");
    };
    assert_eq!(book.id, 1);
    assert_eq!(book.authors.len(), 1);
    assert!(book.authors[0].id.is_some());

    assert_eq!(service.all_books().await.unwrap().len(), 1);
    assert_eq!(
        names(&service.authors_alive_since(1890).await.unwrap()),
        vec!["Herman Melville"]
    );
    assert!(service.authors_alive_since(1892).await.unwrap().is_empty());

    assert_eq!(
        service.ingest(moby_dick()).await.unwrap(),
        IngestOutcome::AlreadyExists("Moby Dick".into())
    );
    assert_eq!(service.all_books().await.unwrap().len(), 1);
}

#[tokio::test]
async fn shared_author_is_stored_once() {
    let service = seeded().await;
    let authors = service.all_authors().await.unwrap();
    let melvilles: Vec<&Author> = authors
        .iter()
        .filter(|x| x.name == "Herman Melville")
        .collect();
    assert_eq!(melvilles.len(), 1);
    assert_eq!(
        service.author_books(melvilles[0]).await.unwrap(),
        vec!["Moby Dick".to_string(), "Typee".to_string()]
    );
}

fn homer() -> RawBookRecord {
    record(6, "The Iliad", &["en"], 80, vec![author("Homer", 0, 0)])
}

#[tokio::test]
async fn unknown_death_year_only_matches_year_zero_or_before() {
    let service = seeded().await;
    service.ingest(homer()).await.unwrap();

    let since_one = service.authors_alive_since(1).await.unwrap();
    assert!(!names(&since_one).contains(&"Homer"));
    let since_zero = service.authors_alive_since(0).await.unwrap();
    assert!(names(&since_zero).contains(&"Homer"));
    assert_eq!(since_zero.len(), 5);
}

#[tokio::test]
async fn alive_since_is_monotonic() {
    let service = seeded().await;
    service.ingest(homer()).await.unwrap();
    let years = [-100, 0, 1, 1500, 1600, 1817, 1818, 1891, 1892, 1944, 2000];
    for pair in years.windows(2) {
        let earlier = service.authors_alive_since(pair[0]).await.unwrap();
        let later = service.authors_alive_since(pair[1]).await.unwrap();
        for a in &later {
            assert!(
                earlier.contains(a),
                "{} alive since {} but not since {}",
                a.name,
                pair[1],
                pair[0]
            );
        }
    }
}

#[tokio::test]
async fn range_requires_birth_and_death_inside() {
    let service = seeded().await;
    service
        .ingest(record(
            6,
            "Later Work",
            &["en"],
            10,
            vec![author("Long Lived", 1850, 1950)],
        ))
        .await
        .unwrap();

    let found = service.authors_alive_during_range(1800, 1900).await.unwrap();
    assert_eq!(names(&found), vec!["Herman Melville"]);
}

#[tokio::test]
async fn top_books_are_bounded_and_ordered() {
    let service = seeded().await;
    let top = service.top_books(3).await.unwrap();
    let downloads: Vec<u32> = top.iter().map(|x| x.total_downloads).collect();
    assert_eq!(downloads, vec![900, 700, 500]);

    let all = service.top_books(10).await.unwrap();
    assert_eq!(all.len(), 5);
    assert!(all
        .windows(2)
        .all(|x| x[0].total_downloads >= x[1].total_downloads));
}

#[tokio::test]
async fn books_by_language_and_distinct_languages() {
    let service = seeded().await;
    let spanish: Vec<String> = service
        .books_by_language("es")
        .await
        .unwrap()
        .into_iter()
        .map(|x| x.title)
        .collect();
    assert_eq!(spanish, vec!["Don Quijote".to_string()]);
    assert_eq!(service.books_by_language("en").await.unwrap().len(), 4);
    assert!(service.books_by_language("de").await.unwrap().is_empty());
    assert_eq!(
        service.languages().await.unwrap().into_iter().collect::<Vec<String>>(),
        vec!["en".to_string(), "es".to_string(), "fr".to_string()]
    );
}

#[tokio::test]
async fn statistics_match_stored_downloads() {
    let empty = catalog().await.statistics().await.unwrap();
    assert_eq!(empty.count, 0);
    assert_eq!(empty.mean, 0.0);

    let stats = seeded().await.statistics().await.unwrap();
    assert_eq!(stats.count, 5);
    assert_eq!(stats.max, 900);
    assert_eq!(stats.min, 50);
    assert_eq!(stats.mean, 490.0);
}

#[tokio::test]
async fn backup_restores_into_a_fresh_catalog() {
    let service = seeded().await;
    let json = State::load(&service).await.unwrap().serialize().unwrap();

    let fresh = catalog().await;
    let report = State::deserialize(&json)
        .unwrap()
        .restore(&fresh)
        .await
        .unwrap();
    assert_eq!(report.created, 5);
    assert_eq!(report.skipped, 0);
    assert_eq!(fresh.all_authors().await.unwrap().len(), 4);

    let again = State::deserialize(&json)
        .unwrap()
        .restore(&fresh)
        .await
        .unwrap();
    assert_eq!(again.created, 0);
    assert_eq!(again.skipped, 5);
}

struct TempCatalog(PathBuf);

impl TempCatalog {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("libris-{name}-{}.db", std::process::id()));
        let catalog = Self(path);
        catalog.remove();
        catalog
    }

    fn remove(&self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.0.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

impl Drop for TempCatalog {
    fn drop(&mut self) {
        self.remove();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ingests_on_a_file_catalog() {
    let file = TempCatalog::new("concurrent");
    let service = CatalogService::new(CatalogStore::connect(&file.0).await.unwrap());
    let shared = || vec![author("Herman Melville", 1819, 1891)];

    for id in 1..=20 {
        let a = tokio::spawn({
            let service = service.clone();
            let r = record(id, "Same", &["en"], 1, shared());
            async move { service.ingest(r).await }
        });
        let b = tokio::spawn({
            let service = service.clone();
            let r = record(id, "Same", &["en"], 1, shared());
            async move { service.ingest(r).await }
        });
        let outcomes = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];
        let created = outcomes
            .iter()
            .filter(|x| matches!(x, IngestOutcome::Created(_)))
            .count();
        assert_eq!(created, 1, "round {id}: {outcomes:?}");
        assert!(outcomes.contains(&IngestOutcome::AlreadyExists("Same".into())));
    }

    for id in (21..=60).step_by(2) {
        let a = tokio::spawn({
            let service = service.clone();
            let r = record(id, "First", &["en"], 1, shared());
            async move { service.ingest(r).await }
        });
        let b = tokio::spawn({
            let service = service.clone();
            let r = record(id + 1, "Second", &["en"], 1, shared());
            async move { service.ingest(r).await }
        });
        assert!(matches!(a.await.unwrap().unwrap(), IngestOutcome::Created(_)));
        assert!(matches!(b.await.unwrap().unwrap(), IngestOutcome::Created(_)));
    }

    assert_eq!(service.all_books().await.unwrap().len(), 60);
    let authors = service.all_authors().await.unwrap();
    assert_eq!(names(&authors), vec!["Herman Melville"]);
}

#[tokio::test]
async fn connect_creates_missing_directories() {
    let dir = std::env::temp_dir().join(format!("libris-nested-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let location = dir.join("data").join("catalog.db");

    let service = CatalogService::new(CatalogStore::connect(&location).await.unwrap());
    service.ingest(moby_dick()).await.unwrap();
    assert!(location.exists());
    assert_eq!(service.all_books().await.unwrap().len(), 1);

    drop(service);
    let _ = std::fs::remove_dir_all(&dir);
}
