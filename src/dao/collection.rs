use std::{marker::PhantomData, sync::Arc};

use bson::{Document, doc, oid::ObjectId};

use crate::dao::{
    models::Entity,
    storage::{StorageError, StorageResult},
    store::DocumentStore,
};

/// Typed view of one collection of a [`DocumentStore`].
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Collection<T> {
    /// Wrap a store for the collection of `T`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// First record matching `filter`, if any.
    pub async fn find_one(&self, filter: Document) -> StorageResult<Option<T>> {
        self.store
            .find_one(T::COLLECTION, filter)
            .await?
            .map(decode::<T>)
            .transpose()
    }

    /// First record matching `filter`, or [`StorageError::NotFound`].
    pub async fn find_one_or_fail(&self, filter: Document) -> StorageResult<T> {
        self.find_one(filter)
            .await?
            .ok_or(StorageError::NotFound {
                collection: T::COLLECTION,
            })
    }

    /// Record with the given identifier, or [`StorageError::NotFound`].
    pub async fn find_by_id(&self, id: ObjectId) -> StorageResult<T> {
        self.find_one_or_fail(doc! {"_id": id}).await
    }

    /// Every record matching `filter`.
    pub async fn find_many(&self, filter: Document) -> StorageResult<Vec<T>> {
        self.store
            .find_many(T::COLLECTION, filter)
            .await?
            .into_iter()
            .map(decode::<T>)
            .collect()
    }

    /// Persist a new record.
    pub async fn insert_one(&self, entity: &T) -> StorageResult<()> {
        let document = encode(entity)?;
        self.store.insert_one(T::COLLECTION, document).await
    }

    /// Apply a `$set` patch to the first match.
    pub async fn update_one(&self, filter: Document, patch: Document) -> StorageResult<bool> {
        self.store.update_one(T::COLLECTION, filter, patch).await
    }

    /// Apply a `$set` patch to every match.
    pub async fn update_many(&self, filter: Document, patch: Document) -> StorageResult<u64> {
        self.store.update_many(T::COLLECTION, filter, patch).await
    }

    /// Replace every non-id field of the stored record with the values of `entity`.
    pub async fn replace_fields(&self, entity: &T) -> StorageResult<bool> {
        let mut patch = encode(entity)?;
        patch.remove("_id");
        self.update_one(doc! {"_id": entity.id()}, patch).await
    }

    /// Remove the first match.
    pub async fn delete_one(&self, filter: Document) -> StorageResult<bool> {
        self.store.delete_one(T::COLLECTION, filter).await
    }

    /// Remove every match.
    pub async fn delete_many(&self, filter: Document) -> StorageResult<u64> {
        self.store.delete_many(T::COLLECTION, filter).await
    }
}

/// Convert a record into its stored document form.
pub fn encode<T: Entity>(entity: &T) -> StorageResult<Document> {
    bson::to_document(entity).map_err(|source| StorageError::Encode {
        collection: T::COLLECTION,
        source,
    })
}

fn decode<T: Entity>(document: Document) -> StorageResult<T> {
    bson::from_document(document).map_err(|source| StorageError::Decode {
        collection: T::COLLECTION,
        source,
    })
}
