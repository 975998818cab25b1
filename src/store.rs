//! SQLite backed storage for books, authors and the relations between them.
//!
//! Reads go through [CatalogStore], which checks a connection out of the pool
//! per call. Everything that writes goes through a [CatalogTransaction]. Only
//! one of those is open at a time, so a lookup followed by a save is never
//! interleaved with another writer and never has to upgrade a stale snapshot.

use std::{collections::BTreeSet, path::Path, str::FromStr, sync::Arc};

use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite, SqliteConnection, SqlitePool, Transaction,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::{
    traits::*,
    types::{
        author::{Author, AuthorId},
        book::{Book, BookId},
        junction_tables::{book_author::BookAuthor, book_language::BookLanguage},
    },
};

const BOOKS: &str = Book::TABLE_NAME;
const AUTHORS: &str = Author::TABLE_NAME;
const BOOK_AUTHOR: &str = <BookAuthor as JunctionTable<Book>>::TABLE_NAME;
const BOOK_LANGUAGE: &str = <BookLanguage as JunctionTable<Book>>::TABLE_NAME;

const BOOK_COLUMNS: &str =
    "b.id, b.title, b.total_downloads, b.publication_date, b.genre, b.synopsis, b.publisher";
const AUTHOR_COLUMNS: &str = "a.id, a.name, a.year_birth, a.year_death";

/// Default size of the download ranking.
pub const DEFAULT_TOP_COUNT: u32 = 10;

#[derive(Debug, Clone)]
pub struct CatalogStore {
    pool:   SqlitePool,
    /// Held by the open [CatalogTransaction], if any.
    writer: Arc<Mutex<()>>,
}

impl CatalogStore {
    /// Opens (creating if needed) the database file at `location`.
    pub async fn connect(location: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = location.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let pool = Pool::connect_with(
            SqliteConnectOptions::new()
                .filename(location)
                .journal_mode(SqliteJournalMode::Wal)
                .create_if_missing(true),
        )
        .await?;
        Self::from_pool(pool).await
    }

    /// Private database living as long as the store. Backed by a single
    /// connection, since every connection to `:memory:` sees its own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        let store = Self {
            pool,
            writer: Arc::new(Mutex::new(())),
        };
        store.create_tables().await?;
        Ok(store)
    }

    async fn create_tables(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        Book::create_table(&mut conn).await?;
        Author::create_table(&mut conn).await?;
        BookAuthor::create_table(&mut conn).await?;
        BookLanguage::create_table(&mut conn).await?;
        Ok(())
    }

    /// Waits for any other open transaction to finish, then starts a new one.
    pub async fn begin(&self) -> Result<CatalogTransaction> {
        let guard = self.writer.clone().lock_owned().await;
        Ok(CatalogTransaction {
            tx:     self.pool.begin().await?,
            _guard: guard,
        })
    }

    pub async fn find_book_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let mut conn = self.pool.acquire().await?;
        find_book_by_id(&mut conn, id).await
    }

    pub async fn find_author_by_name_years(
        &self,
        name_prefix: &str,
        year_birth: u32,
        year_death: u32,
    ) -> Result<Option<Author>> {
        let mut conn = self.pool.acquire().await?;
        find_author_by_name_years(&mut conn, name_prefix, year_birth, year_death).await
    }

    /// First author, in store order, whose name starts with `name_prefix`.
    pub async fn find_author_by_name(&self, name_prefix: &str) -> Result<Option<Author>> {
        let mut conn = self.pool.acquire().await?;
        debug!("Looking up author by prefix {name_prefix:?}");
        Ok(sqlx::query_as::<_, Author>(&format!(
            r#"
            SELECT {AUTHOR_COLUMNS} FROM {AUTHORS} a
            WHERE substr(a.name, 1, length(?1)) = ?1
            ORDER BY a.id
            LIMIT 1;"#
        ))
        .bind(name_prefix)
        .fetch_optional(&mut *conn)
        .await?)
    }

    pub async fn all_books(&self) -> Result<Vec<Book>> {
        let mut conn = self.pool.acquire().await?;
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM {BOOKS} b ORDER BY b.id;"
        ))
        .fetch_all(&mut *conn)
        .await?;
        hydrate_all(&mut conn, books).await
    }

    /// Authors credited on at least one stored book, each listed once.
    pub async fn all_authors_across_books(&self) -> Result<Vec<Author>> {
        let mut conn = self.pool.acquire().await?;
        Ok(sqlx::query_as::<_, Author>(&format!(
            r#"
            SELECT DISTINCT {AUTHOR_COLUMNS} FROM {AUTHORS} a
            JOIN {BOOK_AUTHOR} ba ON ba.author_id = a.id
            ORDER BY a.id;"#
        ))
        .fetch_all(&mut *conn)
        .await?)
    }

    /// Authors whose year of death is `year` or later. An unknown year of
    /// death is stored as `0`, so those authors only match for `year <= 0`.
    pub async fn authors_alive_since(&self, year: i64) -> Result<Vec<Author>> {
        let mut conn = self.pool.acquire().await?;
        Ok(sqlx::query_as::<_, Author>(&format!(
            r#"
            SELECT DISTINCT {AUTHOR_COLUMNS} FROM {AUTHORS} a
            JOIN {BOOK_AUTHOR} ba ON ba.author_id = a.id
            WHERE a.year_death >= ?1
            ORDER BY a.id;"#
        ))
        .bind(year)
        .fetch_all(&mut *conn)
        .await?)
    }

    /// Authors both born and deceased within `[from, to]`.
    pub async fn authors_alive_during_range(&self, from: i64, to: i64) -> Result<Vec<Author>> {
        let mut conn = self.pool.acquire().await?;
        Ok(sqlx::query_as::<_, Author>(&format!(
            r#"
            SELECT DISTINCT {AUTHOR_COLUMNS} FROM {AUTHORS} a
            JOIN {BOOK_AUTHOR} ba ON ba.author_id = a.id
            WHERE a.year_birth BETWEEN ?1 AND ?2
              AND a.year_death BETWEEN ?1 AND ?2
            ORDER BY a.id;"#
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&mut *conn)
        .await?)
    }

    pub async fn distinct_languages(&self) -> Result<BTreeSet<String>> {
        let mut conn = self.pool.acquire().await?;
        let languages = sqlx::query_scalar::<_, String>(&format!(
            "SELECT DISTINCT language FROM {BOOK_LANGUAGE};"
        ))
        .fetch_all(&mut *conn)
        .await?;
        Ok(languages.into_iter().collect())
    }

    /// Books available in `code`. Matching is exact and case-sensitive.
    pub async fn books_by_language(&self, code: &str) -> Result<Vec<Book>> {
        let mut conn = self.pool.acquire().await?;
        let books = sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT {BOOK_COLUMNS} FROM {BOOKS} b
            WHERE EXISTS (
                SELECT 1 FROM {BOOK_LANGUAGE} l
                WHERE l.book_id = b.id AND l.language = ?1
            )
            ORDER BY b.id;"#
        ))
        .bind(code)
        .fetch_all(&mut *conn)
        .await?;
        hydrate_all(&mut conn, books).await
    }

    /// At most `n` books, most downloaded first. Ties keep store order.
    pub async fn top_books_by_downloads(&self, n: u32) -> Result<Vec<Book>> {
        let mut conn = self.pool.acquire().await?;
        let books = sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT {BOOK_COLUMNS} FROM {BOOKS} b
            ORDER BY b.total_downloads DESC, b.id ASC
            LIMIT ?1;"#
        ))
        .bind(i64::from(n))
        .fetch_all(&mut *conn)
        .await?;
        hydrate_all(&mut conn, books).await
    }

    pub async fn download_counts(&self) -> Result<Vec<u32>> {
        let mut conn = self.pool.acquire().await?;
        let counts = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT total_downloads FROM {BOOKS} ORDER BY id;"
        ))
        .fetch_all(&mut *conn)
        .await?;
        Ok(counts
            .into_iter()
            .map(u32::try_from)
            .collect::<Result<Vec<u32>, _>>()?)
    }

    /// Titles of the books crediting `author_id`, in store order.
    pub async fn book_titles_of(&self, author_id: AuthorId) -> Result<Vec<String>> {
        let mut conn = self.pool.acquire().await?;
        Ok(sqlx::query_scalar::<_, String>(&format!(
            r#"
            SELECT b.title FROM {BOOKS} b
            JOIN {BOOK_AUTHOR} ba ON ba.book_id = b.id
            WHERE ba.author_id = ?1
            ORDER BY b.id;"#
        ))
        .bind(author_id)
        .fetch_all(&mut *conn)
        .await?)
    }
}

/// Unit of work over the catalog. Dropping it without [commit] discards
/// every write made through it.
///
/// [commit]: CatalogTransaction::commit
pub struct CatalogTransaction {
    tx:     Transaction<'static, Sqlite>,
    // released after `tx` is dropped
    _guard: OwnedMutexGuard<()>,
}

impl CatalogTransaction {
    pub async fn find_book_by_id(&mut self, id: BookId) -> Result<Option<Book>> {
        find_book_by_id(&mut self.tx, id).await
    }

    pub async fn find_author_by_name_years(
        &mut self,
        name_prefix: &str,
        year_birth: u32,
        year_death: u32,
    ) -> Result<Option<Author>> {
        find_author_by_name_years(&mut self.tx, name_prefix, year_birth, year_death).await
    }

    /// Writes a new book together with its languages and authorship links.
    /// Authors without an id are inserted first and come back with the id
    /// they were given.
    pub async fn save(&mut self, mut book: Book) -> Result<Book> {
        let conn: &mut SqliteConnection = &mut self.tx;
        book.insert(conn).await?;
        for language in &book.languages {
            BookLanguage {
                book_id:  book.id,
                language: language.clone(),
            }
            .insert(conn)
            .await?;
        }
        for (position, author) in book.authors.iter_mut().enumerate() {
            let author_id = match author.id {
                Some(id) => id,
                None => {
                    let id = author.insert(conn).await?.last_insert_rowid();
                    debug!("Created author {} with id {}", author.name, id);
                    author.id = Some(id);
                    id
                }
            };
            BookAuthor {
                book_id: book.id,
                author_id,
                position: i64::try_from(position)?,
            }
            .insert(conn)
            .await?;
        }
        debug!("Saved book {} ({})", book.title, book.id);
        Ok(book)
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

async fn find_book_by_id(conn: &mut SqliteConnection, id: BookId) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>(&format!(
        "SELECT {BOOK_COLUMNS} FROM {BOOKS} b WHERE b.id = ?1;"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    match book {
        Some(book) => Ok(Some(hydrate(conn, book).await?)),
        None => Ok(None),
    }
}

/// Prefix match on the name, exact match on both years. Returns the oldest
/// row when several qualify.
async fn find_author_by_name_years(
    conn: &mut SqliteConnection,
    name_prefix: &str,
    year_birth: u32,
    year_death: u32,
) -> Result<Option<Author>> {
    Ok(sqlx::query_as::<_, Author>(&format!(
        r#"
        SELECT {AUTHOR_COLUMNS} FROM {AUTHORS} a
        WHERE substr(a.name, 1, length(?1)) = ?1
          AND a.year_birth = ?2
          AND a.year_death = ?3
        ORDER BY a.id
        LIMIT 1;"#
    ))
    .bind(name_prefix)
    .bind(i64::from(year_birth))
    .bind(i64::from(year_death))
    .fetch_optional(&mut *conn)
    .await?)
}

async fn hydrate(conn: &mut SqliteConnection, mut book: Book) -> Result<Book> {
    book.languages = sqlx::query_scalar::<_, String>(&format!(
        "SELECT language FROM {BOOK_LANGUAGE} WHERE book_id = ?1 ORDER BY language;"
    ))
    .bind(book.id)
    .fetch_all(&mut *conn)
    .await?;
    book.authors = sqlx::query_as::<_, Author>(&format!(
        r#"
        SELECT {AUTHOR_COLUMNS} FROM {AUTHORS} a
        JOIN {BOOK_AUTHOR} ba ON ba.author_id = a.id
        WHERE ba.book_id = ?1
        ORDER BY ba.position;"#
    ))
    .bind(book.id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(book)
}

async fn hydrate_all(conn: &mut SqliteConnection, books: Vec<Book>) -> Result<Vec<Book>> {
    let mut result = Vec::with_capacity(books.len());
    for book in books {
        result.push(hydrate(conn, book).await?);
    }
    Ok(result)
}
