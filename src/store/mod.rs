//! Document storage layer
//!
//! All durable state lives in an external collection-keyed document store.
//! The `DocumentStore` trait is the seam: `FirestoreStore` talks to the
//! hosted database over REST, `MemoryStore` backs tests and local dev.

mod firestore;
mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Document;

/// Collection holding property listings.
pub const PROPERTIES: &str = "properties";
/// Collection holding advisor requests.
pub const ADVISOR_REQUESTS: &str = "advisor_requests";
/// Collection holding user records (read-only for this service).
pub const USERS: &str = "users";

/// Collection-based document CRUD with store-generated identifiers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in the collection, in store-defined order.
    async fn list(&self, collection: &str) -> Result<Vec<Document>>;

    /// A single document by id, or `None` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Persist a new document. The store generates the id and embeds it in
    /// the stored document under `id`; the id is returned.
    async fn create(&self, collection: &str, doc: Document) -> Result<String>;

    /// Merge the supplied fields into an existing document, leaving fields
    /// not present in the patch untouched. A nonexistent id surfaces the
    /// store's own error.
    async fn update(&self, collection: &str, id: &str, patch: Document) -> Result<()>;
}
