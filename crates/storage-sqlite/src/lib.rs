//! SQLite storage for bankfetch.
//!
//! Scraped records are kept as JSON documents in a single `documents`
//! table, partitioned by collection name. This crate implements the
//! [`DocumentStore`](bankfetch_core::DocumentStore) contract of
//! `bankfetch-core` and is the only place where Diesel is used.
//!
//! ```text
//! core (contracts)       connect (pipeline)
//!       │                      │
//!       └──────────┬───────────┘
//!                  ▼
//!          storage-sqlite (this crate)
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod documents;
pub mod errors;
pub mod schema;

pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};
pub use documents::SqliteDocumentStore;
pub use errors::{IntoCore, StorageError};

pub use bankfetch_core::errors::{DatabaseError, Error, Result};

/// Opens (creating if needed) the database at `db_path`, applies pending
/// migrations and starts the writer.
///
/// Must be called from within a Tokio runtime.
pub fn open_store(db_path: &str) -> Result<SqliteDocumentStore> {
    let db_path = init(db_path)?;
    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer(pool.as_ref().clone());
    Ok(SqliteDocumentStore::new(pool, writer))
}
