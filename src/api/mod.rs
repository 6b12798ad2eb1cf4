//! HTTP handlers for the catalog pages

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod health;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Request, State},
    http::request::Parts,
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, ErrorPage},
    views::{Outcome, Page},
    AppState,
};

/// Record id taken from the path; a malformed id names no record
pub struct RecordId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        Uuid::parse_str(&raw)
            .map(RecordId)
            .map_err(|_| AppError::NotFound(format!("No record with id {}", raw)))
    }
}

/// Turn a handler outcome into a response: a rendered page or a 303 redirect
pub fn respond(state: &AppState, outcome: impl Into<Outcome>) -> AppResult<Response> {
    match outcome.into() {
        Outcome::Render(page) => Ok(Html(state.views.render(&page)?).into_response()),
        Outcome::Redirect(location) => Ok(Redirect::to(&location).into_response()),
    }
}

/// Render `error.html` for responses produced from an [`AppError`]
async fn render_error_pages(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let Some(error) = response.extensions().get::<ErrorPage>().cloned() else {
        return response;
    };

    let page = Page::new("error.html", "Error")
        .with("message", &error.message)
        .with("status", &error.status.as_u16());
    match state.views.render(&page) {
        Ok(body) => (error.status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            response
        }
    }
}

async fn not_found() -> AppError {
    AppError::NotFound("Page not found".to_string())
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let catalog_routes = Router::new()
        .route("/", get(catalog::index))
        // Books
        .route("/book/create", get(books::create_get).post(books::create_post))
        .route("/book/:id/delete", get(books::delete_get).post(books::delete_post))
        .route("/book/:id/update", get(books::update_get).post(books::update_post))
        .route("/book/:id", get(books::detail))
        .route("/books", get(books::list))
        // Authors
        .route("/author/create", get(authors::create_get).post(authors::create_post))
        .route("/author/:id/delete", get(authors::delete_get).post(authors::delete_post))
        .route("/author/:id/update", get(authors::update_get).post(authors::update_post))
        .route("/author/:id", get(authors::detail))
        .route("/authors", get(authors::list))
        // Genres
        .route("/genre/create", get(genres::create_get).post(genres::create_post))
        .route("/genre/:id/delete", get(genres::delete_get).post(genres::delete_post))
        .route("/genre/:id/update", get(genres::update_get).post(genres::update_post))
        .route("/genre/:id", get(genres::detail))
        .route("/genres", get(genres::list))
        // Book instances
        .route(
            "/bookinstance/create",
            get(book_instances::create_get).post(book_instances::create_post),
        )
        .route(
            "/bookinstance/:id/delete",
            get(book_instances::delete_get).post(book_instances::delete_post),
        )
        .route(
            "/bookinstance/:id/update",
            get(book_instances::update_get).post(book_instances::update_post),
        )
        .route("/bookinstance/:id", get(book_instances::detail))
        .route("/bookinstances", get(book_instances::list));

    Router::new()
        .route("/", get(|| async { Redirect::to("/catalog") }))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/catalog", catalog_routes)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), render_error_pages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
