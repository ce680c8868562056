use std::sync::Arc;

use bson::{DateTime, Document, oid::ObjectId};
use tracing::debug;

use crate::dao::{
    collection::{Collection, encode},
    models::{ArchiveEntity, CategoryEntity, Entity, ScoreEntity},
    storage::StorageResult,
    store::DocumentStore,
};

/// Builder for one archive snapshot.
pub struct Snapshot {
    entity: ArchiveEntity,
}

impl Snapshot {
    /// Start a snapshot of `entity` as currently stored.
    pub fn of<T: Entity>(entity: &T) -> StorageResult<Self> {
        Ok(Self {
            entity: ArchiveEntity {
                id: ObjectId::new(),
                source: T::COLLECTION.to_owned(),
                archived_at: DateTime::now(),
                document: encode(entity)?,
                categories: Vec::new(),
                scores: Vec::new(),
            },
        })
    }

    /// Embed the categories removed along with the entity.
    pub fn with_categories(mut self, categories: &[CategoryEntity]) -> StorageResult<Self> {
        self.entity.categories = encode_all(categories)?;
        Ok(self)
    }

    /// Embed the scores removed along with the entity.
    pub fn with_scores(mut self, scores: &[ScoreEntity]) -> StorageResult<Self> {
        self.entity.scores = encode_all(scores)?;
        Ok(self)
    }
}

/// Append-only sink receiving snapshots before live documents are deleted.
#[derive(Clone)]
pub struct Archive {
    collection: Collection<ArchiveEntity>,
}

impl Archive {
    /// Archive backed by the given store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            collection: Collection::new(store),
        }
    }

    /// Persist a snapshot.
    pub async fn store(&self, snapshot: Snapshot) -> StorageResult<()> {
        let entity = snapshot.entity;
        debug!(
            source = %entity.source,
            categories = entity.categories.len(),
            scores = entity.scores.len(),
            "archiving snapshot"
        );
        self.collection.insert_one(&entity).await
    }
}

fn encode_all<T: Entity>(entities: &[T]) -> StorageResult<Vec<Document>> {
    entities.iter().map(encode).collect()
}
