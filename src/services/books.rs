//! Book management service

use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use super::{reference, workflow::FormSpec, Mode, Removal};
use crate::{
    error::{AppError, AppResult},
    forms::{FieldRules, FieldSanitizers, FormData, SanitizedInput},
    models::{Author, Book, BookDetail, BookInstance, BookSummary, Genre},
    repository::{Filter, Repository},
    views::Page,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All books with their authors, in store order
    pub async fn list(&self) -> AppResult<Vec<BookSummary>> {
        let all = Filter::all();
        let (books, authors) = tokio::try_join!(
            self.repository.find::<Book>(&all),
            self.repository.find::<Author>(&all),
        )?;
        let authors: HashMap<Uuid, Author> = authors.into_iter().map(|a| (a.id, a)).collect();

        Ok(books
            .into_iter()
            .map(|book| {
                let author = book.author.and_then(|id| authors.get(&id).cloned());
                BookSummary { book, author }
            })
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Book> {
        self.repository
            .find_by_id::<Book>(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Book with author, genres and copies resolved, none when absent
    pub async fn find_detail(&self, id: Uuid) -> AppResult<Option<BookDetail>> {
        let copies = Filter::eq("book", id.to_string());
        let (book, instances) = tokio::try_join!(
            self.repository.find_by_id::<Book>(id),
            self.repository.find::<BookInstance>(&copies),
        )?;
        let Some(book) = book else {
            return Ok(None);
        };

        let author = match book.author {
            Some(author_id) => self.repository.find_by_id::<Author>(author_id).await?,
            None => None,
        };
        let genres = self.repository.find_by_ids::<Genre, _>(&book.genre).await?;

        Ok(Some(BookDetail {
            book,
            author,
            genres,
            instances,
        }))
    }

    pub async fn detail(&self, id: Uuid) -> AppResult<BookDetail> {
        self.find_detail(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Delete a book without copies; an unknown id is a no-op
    pub async fn delete(&self, id: Uuid) -> AppResult<Removal<BookDetail>> {
        if let Some(detail) = self.find_detail(id).await? {
            if !detail.instances.is_empty() {
                return Ok(Removal::Blocked(detail));
            }
            self.repository.delete::<Book>(id).await?;
            tracing::info!("Deleted book {}", id);
        }
        Ok(Removal::Removed)
    }
}

#[async_trait]
impl FormSpec for BooksService {
    type Record = Book;

    const TEMPLATE: &'static str = "book_form.html";
    const RECORD_KEY: &'static str = "book";

    fn title(&self, mode: Mode) -> &'static str {
        match mode {
            Mode::Create => "Create Book",
            Mode::Update(_) => "Update Book",
        }
    }

    fn rules(&self) -> Vec<FieldRules> {
        vec![
            FieldRules::new("title").required("Title must not be empty."),
            FieldRules::new("author").required("Author must not be empty."),
            FieldRules::new("author")
                .optional()
                .reference("Author must be chosen from the list."),
            FieldRules::new("summary").required("Summary must not be empty."),
            FieldRules::new("isbn").required("ISBN must not be empty"),
            FieldRules::new("genre")
                .optional()
                .reference("Genre must be chosen from the list."),
        ]
    }

    fn sanitizers(&self) -> Vec<FieldSanitizers> {
        vec![FieldSanitizers::all().trim().escape()]
    }

    /// Checkbox groups submit nothing, one value or several
    fn prepare(&self, form: &mut FormData) {
        form.normalize_list("genre");
    }

    fn build(&self, input: &SanitizedInput, id: Uuid) -> Book {
        Book {
            id,
            title: input.text("title"),
            author: input.reference("author"),
            summary: input.text("summary"),
            isbn: input.text("isbn"),
            genre: input.references("genre"),
        }
    }

    async fn reference_data(&self, book: Option<&Book>, page: &mut Page) -> AppResult<()> {
        let selected_genres = book.map(|b| b.genre.clone()).unwrap_or_default();
        let (authors, genres) = tokio::try_join!(
            reference::authors(&self.repository, book.and_then(|b| b.author)),
            reference::genres(&self.repository, &selected_genres),
        )?;
        page.insert("authors", &authors);
        page.insert("genres", &genres);
        Ok(())
    }

    async fn persist(&self, book: Book, mode: Mode) -> AppResult<String> {
        match mode {
            Mode::Create => self.repository.insert(&book).await?,
            Mode::Update(_) => {
                if !self.repository.replace(&book).await? {
                    return Err(AppError::NotFound("Book not found".to_string()));
                }
            }
        }
        Ok(book.url())
    }
}
