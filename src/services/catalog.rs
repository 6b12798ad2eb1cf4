//! Catalog overview service

use crate::{
    error::AppResult,
    models::{Author, Book, BookInstance, BookInstanceStatus, CatalogCounts, Genre},
    repository::{Filter, Repository},
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Record counts for the home page
    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        let all = Filter::all();
        let available = Filter::eq("status", BookInstanceStatus::Available.as_str());
        let (
            book_count,
            book_instance_count,
            book_instance_available_count,
            author_count,
            genre_count,
        ) = tokio::try_join!(
            self.repository.count::<Book>(&all),
            self.repository.count::<BookInstance>(&all),
            self.repository.count::<BookInstance>(&available),
            self.repository.count::<Author>(&all),
            self.repository.count::<Genre>(&all),
        )?;

        Ok(CatalogCounts {
            book_count,
            book_instance_count,
            book_instance_available_count,
            author_count,
            genre_count,
        })
    }
}
