//! Book instance pages

use axum::{extract::State, response::Response, Form};

use super::{respond, RecordId};
use crate::{
    error::AppResult,
    forms::FormData,
    models::BookInstanceDetail,
    services::workflow::{form_page, submit},
    services::Mode,
    views::{Outcome, Page},
    AppState,
};

const LIST: &str = "/catalog/bookinstances";

fn with_detail(page: Page, detail: &BookInstanceDetail) -> Page {
    page.with("bookinstance", &detail.instance)
        .with("book", &detail.book)
}

pub async fn list(State(state): State<AppState>) -> AppResult<Response> {
    let instances = state.services.book_instances.list().await?;
    let page = Page::new("bookinstance_list.html", "Book Instance List")
        .with("bookinstance_list", &instances);
    respond(&state, page)
}

pub async fn detail(State(state): State<AppState>, RecordId(id): RecordId) -> AppResult<Response> {
    let detail = state.services.book_instances.detail(id).await?;
    let page = with_detail(Page::new("bookinstance_detail.html", "Book Instance"), &detail);
    respond(&state, page)
}

pub async fn create_get(State(state): State<AppState>) -> AppResult<Response> {
    let page = form_page(&state.services.book_instances, Mode::Create, None).await?;
    respond(&state, page)
}

pub async fn create_post(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let form = FormData::from_pairs(pairs);
    let outcome = submit(&state.services.book_instances, Mode::Create, form).await?;
    respond(&state, outcome)
}

pub async fn delete_get(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> AppResult<Response> {
    match state.services.book_instances.find_detail(id).await? {
        Some(detail) => {
            let page = Page::new("bookinstance_delete.html", "Delete BookInstance");
            respond(&state, with_detail(page, &detail))
        }
        None => respond(&state, Outcome::redirect(LIST)),
    }
}

/// Copies are never blocked from deletion
pub async fn delete_post(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> AppResult<Response> {
    state.services.book_instances.delete(id).await?;
    respond(&state, Outcome::redirect(LIST))
}

pub async fn update_get(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> AppResult<Response> {
    let instance = state.services.book_instances.get(id).await?;
    let page = form_page(&state.services.book_instances, Mode::Update(id), Some(&instance)).await?;
    respond(&state, page)
}

pub async fn update_post(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let form = FormData::from_pairs(pairs);
    let outcome = submit(&state.services.book_instances, Mode::Update(id), form).await?;
    respond(&state, outcome)
}
