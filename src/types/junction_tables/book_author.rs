use anyhow::Result;
use const_format::formatcp;
use sqlx::{sqlite::SqliteQueryResult, FromRow, SqliteConnection};

use crate::{
    traits::*,
    types::{
        author::{Author, AuthorId},
        book::{Book, BookId},
    },
};

/// Authorship link. `position` keeps the order in which the source credited
/// the authors.
#[derive(Default, Debug, Clone, PartialEq, Eq, FromRow)]
pub struct BookAuthor {
    pub book_id:   BookId,
    pub author_id: AuthorId,
    pub position:  i64,
}

impl JunctionTable<Book> for BookAuthor {
    const TABLE_NAME: &'static str = formatcp!("{}_{}", Book::NAME_SINGULAR, Author::NAME_SINGULAR);
}

impl CreateTable for BookAuthor {
    async fn create_table(conn: &mut SqliteConnection) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                book_id INTEGER NOT NULL REFERENCES {}(id) ON DELETE CASCADE,
                author_id INTEGER NOT NULL REFERENCES {}(id) ON DELETE CASCADE,
                position INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (book_id, author_id)
            );"#,
            <Self as JunctionTable<Book>>::TABLE_NAME,
            Book::TABLE_NAME,
            Author::TABLE_NAME
        ))
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

impl Insertable for BookAuthor {
    async fn insert(&self, conn: &mut SqliteConnection) -> Result<SqliteQueryResult> {
        Ok(sqlx::query(&format!(
            r#"
                    INSERT INTO {} ( book_id, author_id, position )
                    VALUES ( ?1, ?2, ?3 )
                    "#,
            <Self as JunctionTable<Book>>::TABLE_NAME
        ))
        .bind(self.book_id)
        .bind(self.author_id)
        .bind(self.position)
        .execute(&mut *conn)
        .await?)
    }
}
