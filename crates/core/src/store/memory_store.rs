//! In-process [`DocumentStore`], used for dry runs and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use super::store_model::Selector;
use super::store_paths::{
    matches_selector, matches_unique_keys, strip_id, validate_selector, with_id,
};
use super::store_traits::DocumentStore;
use crate::errors::{DatabaseError, Error};
use crate::Result;

#[derive(Debug, Clone)]
struct Document {
    id: String,
    body: Value,
}

impl Document {
    fn to_value(&self) -> Value {
        with_id(self.body.clone(), &self.id)
    }
}

/// Collections kept in memory, insertion-ordered.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every document of a collection with its `_id`.
    pub fn documents(&self, collection: &str) -> Vec<Value> {
        self.collections
            .read()
            .map(|c| {
                c.get(collection)
                    .map(|docs| docs.iter().map(Document::to_value).collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    pub fn count(&self, collection: &str) -> usize {
        self.documents(collection).len()
    }
}

fn poisoned() -> Error {
    Error::Database(DatabaseError::Internal(
        "memory store lock poisoned".to_string(),
    ))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn upsert(
        &self,
        collection: &str,
        records: Vec<Value>,
        unique_keys: &[&str],
    ) -> Result<Vec<Value>> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let docs = collections.entry(collection.to_string()).or_default();
        let mut stored = Vec::with_capacity(records.len());

        for record in records {
            let existing = docs
                .iter_mut()
                .find(|d| matches_unique_keys(&d.id, &d.body, &record, unique_keys));
            match existing {
                Some(doc) => {
                    doc.body = strip_id(record);
                    stored.push(doc.to_value());
                }
                None => {
                    let doc = Document {
                        id: uuid::Uuid::new_v4().to_string(),
                        body: strip_id(record),
                    };
                    stored.push(doc.to_value());
                    docs.push(doc);
                }
            }
        }
        Ok(stored)
    }

    async fn append(&self, collection: &str, records: Vec<Value>) -> Result<Vec<Value>> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let docs = collections.entry(collection.to_string()).or_default();
        Ok(records
            .into_iter()
            .map(|record| {
                let doc = Document {
                    id: uuid::Uuid::new_v4().to_string(),
                    body: strip_id(record),
                };
                let value = doc.to_value();
                docs.push(doc);
                value
            })
            .collect())
    }

    async fn indexed_query(
        &self,
        collection: &str,
        index_fields: &[&str],
        selector: &Selector,
        limit: usize,
    ) -> Result<Vec<Value>> {
        validate_selector(index_fields, selector)?;
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches_selector(&d.id, &d.body, selector))
                    .take(limit)
                    .map(Document::to_value)
                    .collect()
            })
            .unwrap_or_default())
    }
}
