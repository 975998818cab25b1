pub mod book_author;
pub mod book_language;
