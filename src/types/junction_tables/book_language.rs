use anyhow::Result;
use const_format::formatcp;
use sqlx::{sqlite::SqliteQueryResult, FromRow, SqliteConnection};

use crate::{
    traits::*,
    types::book::{Book, BookId},
};

#[derive(Default, Debug, Clone, PartialEq, Eq, FromRow)]
pub struct BookLanguage {
    pub book_id:  BookId,
    pub language: String,
}

impl JunctionTable<Book> for BookLanguage {
    const TABLE_NAME: &'static str = formatcp!("{}_language", Book::NAME_SINGULAR);
}

impl CreateTable for BookLanguage {
    async fn create_table(conn: &mut SqliteConnection) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                book_id INTEGER NOT NULL REFERENCES {}(id) ON DELETE CASCADE,
                language TEXT NOT NULL,
                PRIMARY KEY (book_id, language)
            );"#,
            <Self as JunctionTable<Book>>::TABLE_NAME,
            Book::TABLE_NAME
        ))
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

impl Insertable for BookLanguage {
    async fn insert(&self, conn: &mut SqliteConnection) -> Result<SqliteQueryResult> {
        Ok(sqlx::query(&format!(
            r#"
                    INSERT INTO {} ( book_id, language )
                    VALUES ( ?1, ?2 )
                    "#,
            <Self as JunctionTable<Book>>::TABLE_NAME
        ))
        .bind(self.book_id)
        .bind(&self.language)
        .execute(&mut *conn)
        .await?)
    }
}
