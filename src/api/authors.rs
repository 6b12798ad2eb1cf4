//! Author pages

use axum::{
    extract::State,
    response::Response,
    Form,
};

use super::{respond, RecordId};
use crate::{
    error::AppResult,
    forms::FormData,
    models::AuthorDetail,
    services::{
        workflow::{form_page, submit},
        Mode, Removal,
    },
    views::{Outcome, Page},
    AppState,
};

const LIST: &str = "/catalog/authors";

fn delete_page(detail: &AuthorDetail) -> Page {
    Page::new("author_delete.html", "Delete Author")
        .with("author", &detail.author)
        .with("author_books", &detail.books)
}

/// All authors
pub async fn list(State(state): State<AppState>) -> AppResult<Response> {
    let authors = state.services.authors.list().await?;
    let page = Page::new("author_list.html", "Author List").with("author_list", &authors);
    respond(&state, page)
}

/// One author and their books
pub async fn detail(State(state): State<AppState>, RecordId(id): RecordId) -> AppResult<Response> {
    let detail = state.services.authors.detail(id).await?;
    let page = Page::new("author_detail.html", "Author Detail")
        .with("author", &detail.author)
        .with("author_books", &detail.books);
    respond(&state, page)
}

pub async fn create_get(State(state): State<AppState>) -> AppResult<Response> {
    let page = form_page(&state.services.authors, Mode::Create, None).await?;
    respond(&state, page)
}

pub async fn create_post(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let outcome = submit(&state.services.authors, Mode::Create, FormData::from_pairs(pairs)).await?;
    respond(&state, outcome)
}

/// Delete confirmation; an unknown author goes back to the list
pub async fn delete_get(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> AppResult<Response> {
    match state.services.authors.find_detail(id).await? {
        Some(detail) => respond(&state, delete_page(&detail)),
        None => respond(&state, Outcome::redirect(LIST)),
    }
}

pub async fn delete_post(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> AppResult<Response> {
    match state.services.authors.delete(id).await? {
        Removal::Removed => respond(&state, Outcome::redirect(LIST)),
        Removal::Blocked(detail) => respond(&state, delete_page(&detail)),
    }
}

pub async fn update_get(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> AppResult<Response> {
    let author = state.services.authors.get(id).await?;
    let page = form_page(&state.services.authors, Mode::Update(id), Some(&author)).await?;
    respond(&state, page)
}

pub async fn update_post(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let outcome =
        submit(&state.services.authors, Mode::Update(id), FormData::from_pairs(pairs)).await?;
    respond(&state, outcome)
}
