//! Document store contract.
//!
//! Records are persisted as JSON documents grouped in named collections.
//! The store assigns the `_id` identity; everything else is the record body.

mod memory_store;
mod store_model;
mod store_paths;
mod store_traits;

pub use memory_store::MemoryDocumentStore;
pub use store_model::{decode_records, encode_records, selector, Selector, Stored};
pub use store_paths::{
    matches_selector, matches_unique_keys, strip_id, validate_selector, value_at_path, with_id,
};
pub use store_traits::DocumentStore;
