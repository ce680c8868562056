mod connection;
mod error;
mod store;

pub use error::MongoDaoError;
pub use store::MongoStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        if let MongoDaoError::Operation { collection, .. } = &err {
            if err.is_duplicate_key() {
                return StorageError::DuplicateKey {
                    collection: *collection,
                };
            }
        }
        StorageError::unavailable(err.to_string(), err)
    }
}
