use std::{collections::HashMap, sync::Arc};

use bson::{Document, oid::ObjectId};
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::dao::{
    storage::{StorageError, StorageResult},
    store::{DocumentStore, matches},
};

/// In-process [`DocumentStore`] keeping every collection in insertion order.
///
/// Nothing survives a restart. Used by the test-suite and for local runs
/// without a database.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<&'static str, Vec<Document>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn find_one(&self, collection: &'static str, filter: Document) -> Option<Document> {
        let guard = self.collections.read().await;
        guard
            .get(collection)
            .and_then(|documents| documents.iter().find(|doc| matches(doc, &filter)))
            .cloned()
    }

    async fn find_many(&self, collection: &'static str, filter: Document) -> Vec<Document> {
        let guard = self.collections.read().await;
        guard
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|doc| matches(doc, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn insert_one(&self, collection: &'static str, mut document: Document) -> StorageResult<()> {
        let mut guard = self.collections.write().await;
        let documents = guard.entry(collection).or_default();

        match document.get_object_id("_id") {
            Ok(id) => {
                if documents
                    .iter()
                    .any(|existing| existing.get_object_id("_id").ok() == Some(id))
                {
                    return Err(StorageError::DuplicateKey { collection });
                }
            }
            Err(_) => {
                document.insert("_id", ObjectId::new());
            }
        }

        documents.push(document);
        Ok(())
    }

    async fn update_one(&self, collection: &'static str, filter: Document, patch: Document) -> bool {
        let mut guard = self.collections.write().await;
        let Some(target) = guard
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|doc| matches(doc, &filter)))
        else {
            return false;
        };

        for (key, value) in patch {
            target.insert(key, value);
        }
        true
    }

    async fn update_many(&self, collection: &'static str, filter: Document, patch: Document) -> u64 {
        let mut guard = self.collections.write().await;
        let Some(documents) = guard.get_mut(collection) else {
            return 0;
        };
        let mut matched = 0;
        for target in documents.iter_mut().filter(|doc| matches(doc, &filter)) {
            for (key, value) in &patch {
                target.insert(key.clone(), value.clone());
            }
            matched += 1;
        }
        matched
    }

    async fn delete_one(&self, collection: &'static str, filter: Document) -> bool {
        let mut guard = self.collections.write().await;
        let Some(documents) = guard.get_mut(collection) else {
            return false;
        };
        match documents.iter().position(|doc| matches(doc, &filter)) {
            Some(index) => {
                documents.remove(index);
                true
            }
            None => false,
        }
    }

    async fn delete_many(&self, collection: &'static str, filter: Document) -> u64 {
        let mut guard = self.collections.write().await;
        let Some(documents) = guard.get_mut(collection) else {
            return 0;
        };
        let before = documents.len();
        documents.retain(|doc| !matches(doc, &filter));
        (before - documents.len()) as u64
    }
}

impl DocumentStore for MemoryStore {
    fn find_one(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<Option<Document>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.find_one(collection, filter).await) })
    }

    fn find_many(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<Vec<Document>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.find_many(collection, filter).await) })
    }

    fn insert_one(
        &self,
        collection: &'static str,
        document: Document,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_one(collection, document).await })
    }

    fn update_one(
        &self,
        collection: &'static str,
        filter: Document,
        patch: Document,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.update_one(collection, filter, patch).await) })
    }

    fn update_many(
        &self,
        collection: &'static str,
        filter: Document,
        patch: Document,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.update_many(collection, filter, patch).await) })
    }

    fn delete_one(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.delete_one(collection, filter).await) })
    }

    fn delete_many(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.delete_many(collection, filter).await) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
