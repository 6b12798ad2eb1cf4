//! Catalog home page

use axum::{extract::State, response::Response};

use crate::{error::AppResult, views::Page, AppState};

/// Site welcome page with record counts
pub async fn index(State(state): State<AppState>) -> AppResult<Response> {
    let counts = state.services.catalog.counts().await?;
    let page = Page::new("index.html", "Local Library Home").with("counts", &counts);
    super::respond(&state, page)
}
