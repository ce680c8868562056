use bson::{Document, doc};
use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Collection, Database, IndexModel, options::IndexOptions};
use tracing::info;

use super::{
    connection::{establish_connection, parse_options},
    error::{MongoDaoError, MongoResult},
};
use crate::dao::{
    models::{CategoryEntity, Entity, GameEntity, PlayerEntity, ScoreEntity, UserEntity},
    storage::StorageResult,
    store::DocumentStore,
};

/// Lookup indexes created at startup. None of them is unique: name uniqueness
/// is checked by the services before each write.
const INDEXES: &[(&str, &str, &[&str])] = &[
    (UserEntity::COLLECTION, "user_username_idx", &["username"]),
    (GameEntity::COLLECTION, "game_name_idx", &["name"]),
    (CategoryEntity::COLLECTION, "category_game_name_idx", &["game_id", "name"]),
    (PlayerEntity::COLLECTION, "player_name_idx", &["name"]),
    (ScoreEntity::COLLECTION, "score_board_idx", &["game_id", "category_id"]),
    (ScoreEntity::COLLECTION, "score_player_idx", &["player_id"]),
];

/// MongoDB-backed [`DocumentStore`] implementation.
///
/// The driver's [`mongodb::Client`] is itself a connection pool; one store is
/// created at startup and shared by every request.
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(uri: &str, database_name: &str) -> MongoResult<Self> {
        let options = parse_options(uri).await?;
        let (_client, database) = establish_connection(&options, database_name).await?;
        info!(database = database_name, "connected to MongoDB");

        let store = Self { database };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        for (collection, index, keys) in INDEXES {
            let mut key_doc = Document::new();
            for key in keys.iter() {
                key_doc.insert(*key, 1);
            }
            let model = IndexModel::builder()
                .keys(key_doc)
                .options(IndexOptions::builder().name(Some((*index).to_owned())).build())
                .build();

            self.collection(collection)
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: *collection,
                    index: *index,
                    source,
                })?;
        }
        Ok(())
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }

    async fn ping(&self) -> MongoResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn find_one(&self, collection: &'static str, filter: Document) -> MongoResult<Option<Document>> {
        self.collection(collection)
            .find_one(filter)
            .await
            .map_err(operation_error(collection, "find_one"))
    }

    async fn find_many(&self, collection: &'static str, filter: Document) -> MongoResult<Vec<Document>> {
        self.collection(collection)
            .find(filter)
            .await
            .map_err(operation_error(collection, "find"))?
            .try_collect()
            .await
            .map_err(operation_error(collection, "find"))
    }

    async fn insert_one(&self, collection: &'static str, document: Document) -> MongoResult<()> {
        self.collection(collection)
            .insert_one(document)
            .await
            .map_err(operation_error(collection, "insert_one"))?;
        Ok(())
    }

    async fn update_one(
        &self,
        collection: &'static str,
        filter: Document,
        patch: Document,
    ) -> MongoResult<bool> {
        let result = self
            .collection(collection)
            .update_one(filter, doc! { "$set": patch })
            .await
            .map_err(operation_error(collection, "update_one"))?;
        Ok(result.matched_count > 0)
    }

    async fn update_many(
        &self,
        collection: &'static str,
        filter: Document,
        patch: Document,
    ) -> MongoResult<u64> {
        let result = self
            .collection(collection)
            .update_many(filter, doc! { "$set": patch })
            .await
            .map_err(operation_error(collection, "update_many"))?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, collection: &'static str, filter: Document) -> MongoResult<bool> {
        let result = self
            .collection(collection)
            .delete_one(filter)
            .await
            .map_err(operation_error(collection, "delete_one"))?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_many(&self, collection: &'static str, filter: Document) -> MongoResult<u64> {
        let result = self
            .collection(collection)
            .delete_many(filter)
            .await
            .map_err(operation_error(collection, "delete_many"))?;
        Ok(result.deleted_count)
    }
}

fn operation_error(
    collection: &'static str,
    operation: &'static str,
) -> impl FnOnce(mongodb::error::Error) -> MongoDaoError {
    move |source| MongoDaoError::Operation {
        collection,
        operation,
        source,
    }
}

impl DocumentStore for MongoStore {
    fn find_one(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<Option<Document>>> {
        let store = self.clone();
        Box::pin(async move { store.find_one(collection, filter).await.map_err(Into::into) })
    }

    fn find_many(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<Vec<Document>>> {
        let store = self.clone();
        Box::pin(async move { store.find_many(collection, filter).await.map_err(Into::into) })
    }

    fn insert_one(
        &self,
        collection: &'static str,
        document: Document,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_one(collection, document).await.map_err(Into::into) })
    }

    fn update_one(
        &self,
        collection: &'static str,
        filter: Document,
        patch: Document,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_one(collection, filter, patch)
                .await
                .map_err(Into::into)
        })
    }

    fn update_many(
        &self,
        collection: &'static str,
        filter: Document,
        patch: Document,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_many(collection, filter, patch)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_one(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_one(collection, filter).await.map_err(Into::into) })
    }

    fn delete_many(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.delete_many(collection, filter).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
