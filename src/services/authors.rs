//! Author management service

use async_trait::async_trait;
use uuid::Uuid;

use super::{workflow::FormSpec, Mode, Removal};
use crate::{
    error::{AppError, AppResult},
    forms::{FieldRules, FieldSanitizers, SanitizedInput},
    models::{Author, AuthorDetail, Book},
    repository::{Filter, Repository},
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All authors sorted by family name
    pub async fn list(&self) -> AppResult<Vec<Author>> {
        self.repository
            .find_sorted::<Author>(&Filter::all(), "family_name")
            .await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Author> {
        self.repository
            .find_by_id::<Author>(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Author not found".to_string()))
    }

    /// Author with their books, none when the author does not exist
    pub async fn find_detail(&self, id: Uuid) -> AppResult<Option<AuthorDetail>> {
        let (author, books) = tokio::try_join!(
            self.repository.find_by_id::<Author>(id),
            self.books_by(id),
        )?;
        Ok(author.map(|author| AuthorDetail { author, books }))
    }

    pub async fn detail(&self, id: Uuid) -> AppResult<AuthorDetail> {
        self.find_detail(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Author not found".to_string()))
    }

    async fn books_by(&self, id: Uuid) -> AppResult<Vec<Book>> {
        self.repository
            .find::<Book>(&Filter::eq("author", id.to_string()))
            .await
    }

    /// Delete an author who has no books; an unknown id is a no-op
    pub async fn delete(&self, id: Uuid) -> AppResult<Removal<AuthorDetail>> {
        if let Some(detail) = self.find_detail(id).await? {
            if !detail.books.is_empty() {
                tracing::debug!("Author {} still has {} book(s)", id, detail.books.len());
                return Ok(Removal::Blocked(detail));
            }
            self.repository.delete::<Author>(id).await?;
            tracing::info!("Deleted author {}", id);
        }
        Ok(Removal::Removed)
    }
}

#[async_trait]
impl FormSpec for AuthorsService {
    type Record = Author;

    const TEMPLATE: &'static str = "author_form.html";
    const RECORD_KEY: &'static str = "author";

    fn title(&self, mode: Mode) -> &'static str {
        match mode {
            Mode::Create => "Create Author",
            Mode::Update(_) => "Update Author",
        }
    }

    fn rules(&self) -> Vec<FieldRules> {
        vec![
            FieldRules::new("first_name")
                .required("First name must be specified")
                .alphanumeric("First name has non-alphanumeric characters"),
            FieldRules::new("family_name")
                .required("Family name must be specified")
                .alphanumeric("Family name has non-alphanumeric characters"),
            FieldRules::new("date_of_birth")
                .optional()
                .date("Invalid date of birth"),
            FieldRules::new("date_of_death")
                .optional()
                .date("Invalid date of death"),
        ]
    }

    fn sanitizers(&self) -> Vec<FieldSanitizers> {
        vec![
            FieldSanitizers::field("first_name").trim().escape(),
            FieldSanitizers::field("family_name").trim().escape(),
            FieldSanitizers::field("date_of_birth").to_date(),
            FieldSanitizers::field("date_of_death").to_date(),
        ]
    }

    fn build(&self, input: &SanitizedInput, id: Uuid) -> Author {
        Author {
            id,
            first_name: input.text("first_name"),
            family_name: input.text("family_name"),
            date_of_birth: input.date("date_of_birth"),
            date_of_death: input.date("date_of_death"),
        }
    }

    async fn persist(&self, author: Author, mode: Mode) -> AppResult<String> {
        match mode {
            Mode::Create => self.repository.insert(&author).await?,
            Mode::Update(_) => {
                if !self.repository.replace(&author).await? {
                    return Err(AppError::NotFound("Author not found".to_string()));
                }
            }
        }
        Ok(author.url())
    }
}
