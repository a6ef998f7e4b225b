use async_trait::async_trait;
use serde_json::Value;

use super::store_model::Selector;
use crate::Result;

/// Abstract persistence for scraped records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Replaces the documents matching every `unique_keys` field of a record,
    /// inserting the record when nothing matches. Returns the stored records
    /// with their `_id`.
    async fn upsert(
        &self,
        collection: &str,
        records: Vec<Value>,
        unique_keys: &[&str],
    ) -> Result<Vec<Value>>;

    /// Inserts every record under a fresh identity.
    async fn append(&self, collection: &str, records: Vec<Value>) -> Result<Vec<Value>>;

    /// Equality lookup restricted to the declared index fields.
    ///
    /// A selector key outside `index_fields` is a validation error.
    async fn indexed_query(
        &self,
        collection: &str,
        index_fields: &[&str],
        selector: &Selector,
        limit: usize,
    ) -> Result<Vec<Value>>;
}
