//! Book pages

use axum::{extract::State, response::Response, Form};

use super::{respond, RecordId};
use crate::{
    error::AppResult,
    forms::FormData,
    models::BookDetail,
    services::{
        workflow::{form_page, submit},
        Mode, Removal,
    },
    views::{Outcome, Page},
    AppState,
};

const LIST: &str = "/catalog/books";

fn detail_page(template: &'static str, title: &str, detail: &BookDetail) -> Page {
    Page::new(template, title)
        .with("book", &detail.book)
        .with("author", &detail.author)
        .with("genres", &detail.genres)
        .with("book_instances", &detail.instances)
}

/// All books with their authors
pub async fn list(State(state): State<AppState>) -> AppResult<Response> {
    let books = state.services.books.list().await?;
    respond(&state, Page::new("book_list.html", "Book List").with("book_list", &books))
}

pub async fn detail(State(state): State<AppState>, RecordId(id): RecordId) -> AppResult<Response> {
    let detail = state.services.books.detail(id).await?;
    respond(&state, detail_page("book_detail.html", "Book Detail", &detail))
}

pub async fn create_get(State(state): State<AppState>) -> AppResult<Response> {
    let page = form_page(&state.services.books, Mode::Create, None).await?;
    respond(&state, page)
}

pub async fn create_post(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let outcome = submit(&state.services.books, Mode::Create, FormData::from_pairs(pairs)).await?;
    respond(&state, outcome)
}

pub async fn delete_get(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> AppResult<Response> {
    match state.services.books.find_detail(id).await? {
        Some(detail) => respond(&state, detail_page("book_delete.html", "Delete Book", &detail)),
        None => respond(&state, Outcome::redirect(LIST)),
    }
}

pub async fn delete_post(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> AppResult<Response> {
    match state.services.books.delete(id).await? {
        Removal::Removed => respond(&state, Outcome::redirect(LIST)),
        Removal::Blocked(detail) => {
            respond(&state, detail_page("book_delete.html", "Delete Book", &detail))
        }
    }
}

/// Update form prefilled, with the book's author and genres marked
pub async fn update_get(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> AppResult<Response> {
    let book = state.services.books.get(id).await?;
    let page = form_page(&state.services.books, Mode::Update(id), Some(&book)).await?;
    respond(&state, page)
}

pub async fn update_post(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let outcome =
        submit(&state.services.books, Mode::Update(id), FormData::from_pairs(pairs)).await?;
    respond(&state, outcome)
}
