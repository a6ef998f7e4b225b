use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use log::debug;
use serde_json::Value;

use super::model::DocumentDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::documents;
use bankfetch_core::store::{
    matches_selector, matches_unique_keys, validate_selector, with_id, DocumentStore, Selector,
};
use bankfetch_core::Result;

/// [`DocumentStore`] over the `documents` table.
///
/// Reads go through the pool; writes through the single writer, one
/// immediate transaction per call. Key matching happens on the decoded
/// bodies of the target collection.
pub struct SqliteDocumentStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SqliteDocumentStore {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    fn load_collection(conn: &mut SqliteConnection, name: &str) -> Result<Vec<DocumentDB>> {
        documents::table
            .filter(documents::collection.eq(name))
            .order(documents::created_at.asc())
            .select(DocumentDB::as_select())
            .load::<DocumentDB>(conn)
            .into_core()
    }

    /// Number of documents in a collection.
    pub fn count(&self, name: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        documents::table
            .filter(documents::collection.eq(name))
            .count()
            .get_result(&mut conn)
            .into_core()
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn upsert(
        &self,
        collection_name: &str,
        records: Vec<Value>,
        unique_keys: &[&str],
    ) -> Result<Vec<Value>> {
        let collection_name = collection_name.to_string();
        let keys: Vec<String> = unique_keys.iter().map(|k| k.to_string()).collect();

        self.writer
            .exec(move |conn| {
                let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
                let mut existing = Self::load_collection(conn, &collection_name)?;
                let mut bodies = existing
                    .iter()
                    .map(|d| d.parsed_body().map_err(Into::into))
                    .collect::<Result<Vec<Value>>>()?;
                let mut stored = Vec::with_capacity(records.len());

                for record in records {
                    let position = existing.iter().zip(bodies.iter()).position(|(doc, parsed)| {
                        matches_unique_keys(&doc.id, parsed, &record, &keys)
                    });

                    match position {
                        Some(index) => {
                            let doc = &mut existing[index];
                            doc.replace_body(record)?;
                            diesel::update(documents::table.find(&doc.id))
                                .set((
                                    documents::body.eq(&doc.body),
                                    documents::updated_at.eq(doc.updated_at),
                                ))
                                .execute(conn)
                                .into_core()?;
                            bodies[index] = doc.parsed_body()?;
                            stored.push(doc.to_record()?);
                        }
                        None => {
                            let doc = DocumentDB::new(&collection_name, record)?;
                            diesel::insert_into(documents::table)
                                .values(&doc)
                                .execute(conn)
                                .into_core()?;
                            stored.push(doc.to_record()?);
                            bodies.push(doc.parsed_body()?);
                            existing.push(doc);
                        }
                    }
                }
                debug!("Upserted {} documents into {}", stored.len(), collection_name);
                Ok(stored)
            })
            .await
    }

    async fn append(&self, collection_name: &str, records: Vec<Value>) -> Result<Vec<Value>> {
        let collection_name = collection_name.to_string();
        self.writer
            .exec(move |conn| {
                let docs = records
                    .into_iter()
                    .map(|record| DocumentDB::new(&collection_name, record))
                    .collect::<Result<Vec<_>>>()?;
                diesel::insert_into(documents::table)
                    .values(&docs)
                    .execute(conn)
                    .into_core()?;
                debug!("Appended {} documents to {}", docs.len(), collection_name);
                docs.iter().map(DocumentDB::to_record).collect()
            })
            .await
    }

    async fn indexed_query(
        &self,
        collection_name: &str,
        index_fields: &[&str],
        selector: &Selector,
        limit: usize,
    ) -> Result<Vec<Value>> {
        validate_selector(index_fields, selector)?;
        let mut conn = get_connection(&self.pool)?;

        let mut found = Vec::new();
        for doc in Self::load_collection(&mut conn, collection_name)? {
            if found.len() >= limit {
                break;
            }
            let parsed = doc.parsed_body()?;
            if matches_selector(&doc.id, &parsed, selector) {
                found.push(with_id(parsed, &doc.id));
            }
        }
        Ok(found)
    }
}
