//! Genre model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Book;

/// Genre record, unique by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

impl Genre {
    /// Canonical location of the genre detail page
    pub fn url(&self) -> String {
        format!("/catalog/genre/{}", self.id)
    }
}

/// Genre with the books filed under it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreDetail {
    pub genre: Genre,
    pub books: Vec<Book>,
}
