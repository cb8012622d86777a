//! In-memory document store for tests and local development

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::types::Document;

use super::DocumentStore;

/// Per-collection documents behind an RwLock. Ids are uuid v4; iteration
/// order is the id order, which callers must treat as store-defined.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn create(&self, collection: &str, mut doc: Document) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        doc.insert("id".to_string(), Value::String(id.clone()));

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), doc);

        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, patch: Document) -> Result<()> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| Error::NotFound(format!("{}/{}", collection, id)))?;

        for (key, value) in patch {
            doc.insert(key, value);
        }

        Ok(())
    }
}
