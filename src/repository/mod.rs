//! Repository layer for the catalog record store
//!
//! Records are stored as JSON documents, one collection per record type.
//! Backends implement [`DocumentStore`]; [`Repository`] wraps a backend with
//! typed helpers that (de)serialize catalog records.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Author, Book, BookInstance, Genre},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Document collections of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Authors,
    Books,
    BookInstances,
    Genres,
}

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Authors => "authors",
            Collection::Books => "books",
            Collection::BookInstances => "book_instances",
            Collection::Genres => "genres",
        }
    }

    /// Top-level field whose value must be unique within the collection
    pub fn unique_field(&self) -> Option<&'static str> {
        match self {
            Collection::Genres => Some("name"),
            _ => None,
        }
    }
}

/// A catalog record stored in one collection
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> Uuid;
}

impl Record for Author {
    const COLLECTION: Collection = Collection::Authors;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Book {
    const COLLECTION: Collection = Collection::Books;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for BookInstance {
    const COLLECTION: Collection = Collection::BookInstances;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Genre {
    const COLLECTION: Collection = Collection::Genres;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Containment filter on top-level document fields.
///
/// A document matches when it contains every field of the filter, with the
/// same semantics as the PostgreSQL `@>` operator on `jsonb`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Map<String, Value>);

impl Filter {
    /// Matches every document
    pub fn all() -> Self {
        Self::default()
    }

    /// `field` equals `value`
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::all().and_eq(field, value)
    }

    /// Array `field` contains `value`
    pub fn contains(field: &str, value: impl Into<Value>) -> Self {
        let mut filter = Self::all();
        filter
            .0
            .insert(field.to_string(), Value::Array(vec![value.into()]));
        filter
    }

    pub fn and_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn matches(&self, doc: &Value) -> bool {
        json_contains(doc, &Value::Object(self.0.clone()))
    }
}

/// `jsonb @> jsonb` containment
pub(crate) fn json_contains(doc: &Value, pattern: &Value) -> bool {
    match (doc, pattern) {
        (Value::Object(doc), Value::Object(pattern)) => pattern
            .iter()
            .all(|(key, p)| doc.get(key).is_some_and(|d| json_contains(d, p))),
        (Value::Array(doc), Value::Array(pattern)) => pattern
            .iter()
            .all(|p| doc.iter().any(|d| json_contains(d, p))),
        (doc, pattern) => doc == pattern,
    }
}

/// Storage backend holding JSON documents keyed by id.
///
/// `find_many` returns documents in insertion order unless `sort` names a
/// top-level string field, in which case they are sorted ascending by it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(&self, collection: Collection, id: Uuid) -> AppResult<Option<Value>>;

    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
        sort: Option<&'static str>,
    ) -> AppResult<Vec<Value>>;

    async fn count(&self, collection: Collection, filter: &Filter) -> AppResult<i64>;

    /// Fails with `AppError::Conflict` when the id or a unique field is taken
    async fn insert(&self, collection: Collection, id: Uuid, doc: Value) -> AppResult<()>;

    /// Returns false when no document has this id
    async fn replace(&self, collection: Collection, id: Uuid, doc: Value) -> AppResult<bool>;

    /// Returns false when no document has this id
    async fn delete(&self, collection: Collection, id: Uuid) -> AppResult<bool>;

    async fn ping(&self) -> AppResult<()>;
}

/// Typed access to the record store
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn DocumentStore>,
}

impl Repository {
    /// Create a new repository over the given store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Repository over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    pub async fn find_by_id<R: Record>(&self, id: Uuid) -> AppResult<Option<R>> {
        match self.store.find_one(R::COLLECTION, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Resolve a list of references, skipping dangling ones
    pub async fn find_by_ids<'a, R, I>(&self, ids: I) -> AppResult<Vec<R>>
    where
        R: Record,
        I: IntoIterator<Item = &'a Uuid>,
    {
        let mut records = Vec::new();
        for id in ids {
            if let Some(record) = self.find_by_id(*id).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Matching records in insertion order
    pub async fn find<R: Record>(&self, filter: &Filter) -> AppResult<Vec<R>> {
        self.find_many(filter, None).await
    }

    /// Matching records sorted ascending by `field`
    pub async fn find_sorted<R: Record>(
        &self,
        filter: &Filter,
        field: &'static str,
    ) -> AppResult<Vec<R>> {
        self.find_many(filter, Some(field)).await
    }

    /// First matching record in insertion order
    pub async fn find_first<R: Record>(&self, filter: &Filter) -> AppResult<Option<R>> {
        Ok(self.find::<R>(filter).await?.into_iter().next())
    }

    async fn find_many<R: Record>(
        &self,
        filter: &Filter,
        sort: Option<&'static str>,
    ) -> AppResult<Vec<R>> {
        self.store
            .find_many(R::COLLECTION, filter, sort)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(Into::into))
            .collect()
    }

    pub async fn count<R: Record>(&self, filter: &Filter) -> AppResult<i64> {
        self.store.count(R::COLLECTION, filter).await
    }

    pub async fn insert<R: Record>(&self, record: &R) -> AppResult<()> {
        let doc = serde_json::to_value(record)?;
        self.store.insert(R::COLLECTION, record.id(), doc).await
    }

    /// Replace the stored record with the same id
    pub async fn replace<R: Record>(&self, record: &R) -> AppResult<bool> {
        let doc = serde_json::to_value(record)?;
        self.store.replace(R::COLLECTION, record.id(), doc).await
    }

    pub async fn delete<R: Record>(&self, id: Uuid) -> AppResult<bool> {
        self.store.delete(R::COLLECTION, id).await
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
