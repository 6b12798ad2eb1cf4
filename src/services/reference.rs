//! Reference data for form selection widgets

use indexmap::IndexSet;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Author, Book, BookInstanceStatus, Genre},
    repository::{Filter, Record, Repository},
};

/// A reference record annotated with whether the form had it selected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selectable<T> {
    #[serde(flatten)]
    pub item: T,
    pub selected: bool,
}

/// Mark `items` found in `selected`, keeping the order of `items`
pub fn mark_selected<T: Record>(items: Vec<T>, selected: &IndexSet<Uuid>) -> Vec<Selectable<T>> {
    items
        .into_iter()
        .map(|item| {
            let selected = selected.contains(&item.id());
            Selectable { item, selected }
        })
        .collect()
}

fn selection(id: Option<Uuid>) -> IndexSet<Uuid> {
    id.into_iter().collect()
}

/// All authors in store order
pub async fn authors(
    repository: &Repository,
    selected: Option<Uuid>,
) -> AppResult<Vec<Selectable<Author>>> {
    let authors = repository.find::<Author>(&Filter::all()).await?;
    Ok(mark_selected(authors, &selection(selected)))
}

/// All genres in store order
pub async fn genres(
    repository: &Repository,
    selected: &IndexSet<Uuid>,
) -> AppResult<Vec<Selectable<Genre>>> {
    let genres = repository.find::<Genre>(&Filter::all()).await?;
    Ok(mark_selected(genres, selected))
}

/// All books in store order
pub async fn books(
    repository: &Repository,
    selected: Option<Uuid>,
) -> AppResult<Vec<Selectable<Book>>> {
    let books = repository.find::<Book>(&Filter::all()).await?;
    Ok(mark_selected(books, &selection(selected)))
}

/// Choice of a copy status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChoice {
    pub value: &'static str,
    pub selected: bool,
}

pub fn statuses(selected: BookInstanceStatus) -> Vec<StatusChoice> {
    BookInstanceStatus::ALL
        .iter()
        .map(|status| StatusChoice {
            value: status.as_str(),
            selected: *status == selected,
        })
        .collect()
}
