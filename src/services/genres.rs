//! Genre management service

use async_trait::async_trait;
use uuid::Uuid;

use super::{workflow::FormSpec, Mode, Removal};
use crate::{
    error::{AppError, AppResult},
    forms::{FieldRules, FieldSanitizers, SanitizedInput},
    models::{Book, Genre, GenreDetail},
    repository::{Filter, Repository},
};

#[derive(Clone)]
pub struct GenresService {
    repository: Repository,
}

impl GenresService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All genres sorted by name
    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        self.repository
            .find_sorted::<Genre>(&Filter::all(), "name")
            .await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Genre> {
        self.repository
            .find_by_id::<Genre>(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Genre not found".to_string()))
    }

    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        self.repository
            .find_first::<Genre>(&Filter::eq("name", name))
            .await
    }

    /// Genre with the books filed under it, none when the genre does not exist
    pub async fn find_detail(&self, id: Uuid) -> AppResult<Option<GenreDetail>> {
        let filed_under = Filter::contains("genre", id.to_string());
        let (genre, books) = tokio::try_join!(
            self.repository.find_by_id::<Genre>(id),
            self.repository.find::<Book>(&filed_under),
        )?;
        Ok(genre.map(|genre| GenreDetail { genre, books }))
    }

    pub async fn detail(&self, id: Uuid) -> AppResult<GenreDetail> {
        self.find_detail(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Genre not found".to_string()))
    }

    /// Delete a genre no book refers to; an unknown id is a no-op
    pub async fn delete(&self, id: Uuid) -> AppResult<Removal<GenreDetail>> {
        if let Some(detail) = self.find_detail(id).await? {
            if !detail.books.is_empty() {
                return Ok(Removal::Blocked(detail));
            }
            self.repository.delete::<Genre>(id).await?;
            tracing::info!("Deleted genre {}", id);
        }
        Ok(Removal::Removed)
    }

    /// Insert unless the name is taken; either way return where the genre lives
    async fn create(&self, genre: Genre) -> AppResult<String> {
        if let Some(existing) = self.find_by_name(&genre.name).await? {
            tracing::debug!("Genre {:?} already exists as {}", genre.name, existing.id);
            return Ok(existing.url());
        }

        match self.repository.insert(&genre).await {
            Ok(()) => Ok(genre.url()),
            // lost a race against a concurrent insert of the same name
            Err(AppError::Conflict(_)) => self
                .find_by_name(&genre.name)
                .await?
                .map(|existing| existing.url())
                .ok_or_else(|| AppError::Conflict(format!("Genre {} already exists", genre.name))),
            Err(e) => Err(e),
        }
    }

    async fn update(&self, genre: Genre) -> AppResult<String> {
        if let Some(existing) = self.find_by_name(&genre.name).await? {
            if existing.id != genre.id {
                return Err(AppError::Conflict(format!(
                    "Genre {} already exists",
                    genre.name
                )));
            }
        }
        if !self.repository.replace(&genre).await? {
            return Err(AppError::NotFound("Genre not found".to_string()));
        }
        Ok(genre.url())
    }
}

#[async_trait]
impl FormSpec for GenresService {
    type Record = Genre;

    const TEMPLATE: &'static str = "genre_form.html";
    const RECORD_KEY: &'static str = "genre";

    fn title(&self, mode: Mode) -> &'static str {
        match mode {
            Mode::Create => "Create Genre",
            Mode::Update(_) => "Update Genre",
        }
    }

    fn rules(&self) -> Vec<FieldRules> {
        vec![FieldRules::new("name").required("Genre name required")]
    }

    fn sanitizers(&self) -> Vec<FieldSanitizers> {
        vec![FieldSanitizers::field("name").trim().escape()]
    }

    fn build(&self, input: &SanitizedInput, id: Uuid) -> Genre {
        Genre {
            id,
            name: input.text("name"),
        }
    }

    async fn persist(&self, genre: Genre, mode: Mode) -> AppResult<String> {
        match mode {
            Mode::Create => self.create(genre).await,
            Mode::Update(_) => self.update(genre).await,
        }
    }
}
