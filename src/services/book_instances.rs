//! Book instance (physical copy) service

use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use super::{reference, workflow::FormSpec, Mode};
use crate::{
    error::{AppError, AppResult},
    forms::{FieldRules, FieldSanitizers, SanitizedInput},
    models::{Book, BookInstance, BookInstanceDetail, BookInstanceStatus},
    repository::{Filter, Repository},
    views::Page,
};

#[derive(Clone)]
pub struct BookInstancesService {
    repository: Repository,
}

impl BookInstancesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All copies with their books, in store order
    pub async fn list(&self) -> AppResult<Vec<BookInstanceDetail>> {
        let all = Filter::all();
        let (instances, books) = tokio::try_join!(
            self.repository.find::<BookInstance>(&all),
            self.repository.find::<Book>(&all),
        )?;
        let books: HashMap<Uuid, Book> = books.into_iter().map(|b| (b.id, b)).collect();

        Ok(instances
            .into_iter()
            .map(|instance| {
                let book = instance.book.and_then(|id| books.get(&id).cloned());
                BookInstanceDetail { instance, book }
            })
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<BookInstance> {
        self.repository
            .find_by_id::<BookInstance>(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book copy not found".to_string()))
    }

    pub async fn find_detail(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>> {
        let Some(instance) = self.repository.find_by_id::<BookInstance>(id).await? else {
            return Ok(None);
        };
        let book = match instance.book {
            Some(book_id) => self.repository.find_by_id::<Book>(book_id).await?,
            None => None,
        };
        Ok(Some(BookInstanceDetail { instance, book }))
    }

    pub async fn detail(&self, id: Uuid) -> AppResult<BookInstanceDetail> {
        self.find_detail(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book copy not found".to_string()))
    }

    /// Copies have no dependents. Returns false when nothing was deleted.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let removed = self.repository.delete::<BookInstance>(id).await?;
        if removed {
            tracing::info!("Deleted book instance {}", id);
        }
        Ok(removed)
    }
}

fn is_status(value: &str) -> bool {
    value.parse::<BookInstanceStatus>().is_ok()
}

#[async_trait]
impl FormSpec for BookInstancesService {
    type Record = BookInstance;

    const TEMPLATE: &'static str = "bookinstance_form.html";
    const RECORD_KEY: &'static str = "bookinstance";

    fn title(&self, mode: Mode) -> &'static str {
        match mode {
            Mode::Create => "Create BookInstance",
            Mode::Update(_) => "Update BookInstance",
        }
    }

    fn rules(&self) -> Vec<FieldRules> {
        vec![
            FieldRules::new("book").required("Book must be specified"),
            FieldRules::new("book")
                .optional()
                .reference("Book must be chosen from the list"),
            FieldRules::new("imprint").required("Imprint must be specified"),
            FieldRules::new("due_back").optional().date("Invalid date"),
            FieldRules::new("status")
                .optional()
                .custom(is_status, "Invalid status"),
        ]
    }

    fn sanitizers(&self) -> Vec<FieldSanitizers> {
        vec![
            FieldSanitizers::field("book").trim().escape(),
            FieldSanitizers::field("imprint").trim().escape(),
            FieldSanitizers::field("status").trim().escape(),
            FieldSanitizers::field("due_back").to_date(),
        ]
    }

    fn build(&self, input: &SanitizedInput, id: Uuid) -> BookInstance {
        BookInstance {
            id,
            book: input.reference("book"),
            imprint: input.text("imprint"),
            status: input.text("status").parse().unwrap_or_default(),
            due_back: input.date("due_back"),
        }
    }

    async fn reference_data(
        &self,
        instance: Option<&BookInstance>,
        page: &mut Page,
    ) -> AppResult<()> {
        let books = reference::books(&self.repository, instance.and_then(|i| i.book)).await?;
        let status = instance.map(|i| i.status).unwrap_or_default();
        page.insert("books", &books);
        page.insert("statuses", &reference::statuses(status));
        Ok(())
    }

    async fn persist(&self, instance: BookInstance, mode: Mode) -> AppResult<String> {
        match mode {
            Mode::Create => self.repository.insert(&instance).await?,
            Mode::Update(_) => {
                if !self.repository.replace(&instance).await? {
                    return Err(AppError::NotFound("Book copy not found".to_string()));
                }
            }
        }
        Ok(instance.url())
    }
}
