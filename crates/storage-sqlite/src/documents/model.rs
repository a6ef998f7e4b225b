//! Database model for stored documents.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde_json::Value;

use crate::errors::{IntoCore, StorageError};
use bankfetch_core::store::{strip_id, with_id};
use bankfetch_core::Result;

/// One JSON document of a collection. The body never contains `_id`.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DocumentDB {
    pub id: String,
    pub collection: String,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl DocumentDB {
    pub fn new(collection: &str, record: Value) -> Result<Self> {
        let now = chrono::Utc::now().naive_utc();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            collection: collection.to_string(),
            body: serde_json::to_string(&strip_id(record)).into_core()?,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn parsed_body(&self) -> std::result::Result<Value, StorageError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Replaces the body, keeping identity and creation time.
    pub fn replace_body(&mut self, record: Value) -> Result<()> {
        self.body = serde_json::to_string(&strip_id(record)).into_core()?;
        self.updated_at = chrono::Utc::now().naive_utc();
        Ok(())
    }

    /// Body with `_id`, as handed back to callers.
    pub fn to_record(&self) -> Result<Value> {
        Ok(with_id(self.parsed_body()?, &self.id))
    }
}
