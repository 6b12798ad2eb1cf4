//! Book model

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Author, BookInstance, Genre};

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    /// Always set on stored books; a rejected form may carry no author
    pub author: Option<Uuid>,
    pub summary: String,
    pub isbn: String,
    /// Selected genres, in submission order
    #[serde(default)]
    pub genre: IndexSet<Uuid>,
}

impl Book {
    /// Canonical location of the book detail page
    pub fn url(&self) -> String {
        format!("/catalog/book/{}", self.id)
    }
}

/// Book with its author resolved (list view)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSummary {
    pub book: Book,
    pub author: Option<Author>,
}

/// Book with all cross-references resolved (detail view)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookDetail {
    pub book: Book,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
    pub instances: Vec<BookInstance>,
}
