//! Data models for the library catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;

use serde::Serialize;

// Re-export commonly used types
pub use author::{Author, AuthorDetail};
pub use book::{Book, BookDetail, BookSummary};
pub use book_instance::{BookInstance, BookInstanceDetail, BookInstanceStatus};
pub use genre::{Genre, GenreDetail};

/// Record counts shown on the catalog home page
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogCounts {
    pub book_count: i64,
    pub book_instance_count: i64,
    pub book_instance_available_count: i64,
    pub author_count: i64,
    pub genre_count: i64,
}
