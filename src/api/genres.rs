//! Genre pages

use axum::{extract::State, response::Response, Form};

use super::{respond, RecordId};
use crate::{
    error::AppResult,
    forms::FormData,
    models::GenreDetail,
    services::{
        workflow::{form_page, submit},
        Mode, Removal,
    },
    views::{Outcome, Page},
    AppState,
};

const LIST: &str = "/catalog/genres";

fn delete_page(detail: &GenreDetail) -> Page {
    Page::new("genre_delete.html", "Delete Genre")
        .with("genre", &detail.genre)
        .with("genre_books", &detail.books)
}

pub async fn list(State(state): State<AppState>) -> AppResult<Response> {
    let genres = state.services.genres.list().await?;
    respond(&state, Page::new("genre_list.html", "Genre List").with("genre_list", &genres))
}

pub async fn detail(State(state): State<AppState>, RecordId(id): RecordId) -> AppResult<Response> {
    let detail = state.services.genres.detail(id).await?;
    let page = Page::new("genre_detail.html", "Genre Detail")
        .with("genre", &detail.genre)
        .with("genre_books", &detail.books);
    respond(&state, page)
}

pub async fn create_get(State(state): State<AppState>) -> AppResult<Response> {
    let page = form_page(&state.services.genres, Mode::Create, None).await?;
    respond(&state, page)
}

pub async fn create_post(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let outcome = submit(&state.services.genres, Mode::Create, FormData::from_pairs(pairs)).await?;
    respond(&state, outcome)
}

pub async fn delete_get(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> AppResult<Response> {
    match state.services.genres.find_detail(id).await? {
        Some(detail) => respond(&state, delete_page(&detail)),
        None => respond(&state, Outcome::redirect(LIST)),
    }
}

pub async fn delete_post(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> AppResult<Response> {
    match state.services.genres.delete(id).await? {
        Removal::Removed => respond(&state, Outcome::redirect(LIST)),
        Removal::Blocked(detail) => respond(&state, delete_page(&detail)),
    }
}

pub async fn update_get(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> AppResult<Response> {
    let genre = state.services.genres.get(id).await?;
    let page = form_page(&state.services.genres, Mode::Update(id), Some(&genre)).await?;
    respond(&state, page)
}

pub async fn update_post(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let outcome =
        submit(&state.services.genres, Mode::Update(id), FormData::from_pairs(pairs)).await?;
    respond(&state, outcome)
}
