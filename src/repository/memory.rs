//! In-process document store

use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use uuid::Uuid;

use super::{Collection, DocumentStore, Filter};
use crate::error::{AppError, AppResult};

type Documents = HashMap<Collection, Vec<(Uuid, Value)>>;

/// Document store kept in memory, in insertion order per collection.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Documents>,
}

impl MemoryStore {
    fn read(&self) -> AppResult<RwLockReadGuard<'_, Documents>> {
        self.collections
            .read()
            .map_err(|_| AppError::Internal("Memory store lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Documents>> {
        self.collections
            .write()
            .map_err(|_| AppError::Internal("Memory store lock poisoned".to_string()))
    }
}

fn check_unique(
    collection: Collection,
    docs: &[(Uuid, Value)],
    id: Uuid,
    doc: &Value,
) -> AppResult<()> {
    let Some(field) = collection.unique_field() else {
        return Ok(());
    };
    let value = doc.get(field);
    let taken = docs
        .iter()
        .any(|(other, existing)| *other != id && existing.get(field) == value);
    if taken {
        return Err(AppError::Conflict(format!(
            "Duplicate {} in {}",
            field,
            collection.table()
        )));
    }
    Ok(())
}

fn sort_key<'a>(doc: &'a Value, field: &str) -> &'a str {
    doc.get(field).and_then(Value::as_str).unwrap_or("")
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(&self, collection: Collection, id: Uuid) -> AppResult<Option<Value>> {
        let collections = self.read()?;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| *doc_id == id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
        sort: Option<&'static str>,
    ) -> AppResult<Vec<Value>> {
        let collections = self.read()?;
        let mut found: Vec<Value> = collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| filter.matches(doc))
                    .map(|(_, doc)| doc.clone())
                    .collect()
            })
            .unwrap_or_default();
        if let Some(field) = sort {
            // stable, so ties keep insertion order
            found.sort_by(|a, b| sort_key(a, field).cmp(sort_key(b, field)));
        }
        Ok(found)
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> AppResult<i64> {
        let collections = self.read()?;
        let count = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|(_, doc)| filter.matches(doc)).count())
            .unwrap_or(0);
        Ok(count as i64)
    }

    async fn insert(&self, collection: Collection, id: Uuid, doc: Value) -> AppResult<()> {
        let mut collections = self.write()?;
        let docs = collections.entry(collection).or_default();
        if docs.iter().any(|(doc_id, _)| *doc_id == id) {
            return Err(AppError::Conflict(format!(
                "Duplicate id {} in {}",
                id,
                collection.table()
            )));
        }
        check_unique(collection, docs, id, &doc)?;
        docs.push((id, doc));
        Ok(())
    }

    async fn replace(&self, collection: Collection, id: Uuid, doc: Value) -> AppResult<bool> {
        let mut collections = self.write()?;
        let docs = collections.entry(collection).or_default();
        check_unique(collection, docs, id, &doc)?;
        match docs.iter_mut().find(|(doc_id, _)| *doc_id == id) {
            Some((_, existing)) => {
                *existing = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> AppResult<bool> {
        let mut collections = self.write()?;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|(doc_id, _)| *doc_id != id);
        Ok(docs.len() != before)
    }

    async fn ping(&self) -> AppResult<()> {
        self.read().map(|_| ())
    }
}
