use bson::{Bson, Document};
use futures::future::BoxFuture;

use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer.
///
/// Every call names a collection and an exact-match filter: each key of the
/// filter must equal the field of the same name in a stored document. There are
/// no multi-document transactions; each call is a single document operation or
/// a single bulk update or delete.
pub trait DocumentStore: Send + Sync {
    /// First document matching `filter`, in natural order.
    fn find_one(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<Option<Document>>>;
    /// Every document matching `filter`, in natural order.
    fn find_many(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<Vec<Document>>>;
    /// Store a new document. The document must carry its own `_id`.
    fn insert_one(
        &self,
        collection: &'static str,
        document: Document,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Overwrite the fields present in `patch` on the first match (`$set`
    /// semantics, no deep merge). Returns whether a document matched.
    fn update_one(
        &self,
        collection: &'static str,
        filter: Document,
        patch: Document,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Overwrite the fields present in `patch` on every match. Returns the
    /// number of matched documents.
    fn update_many(
        &self,
        collection: &'static str,
        filter: Document,
        patch: Document,
    ) -> BoxFuture<'static, StorageResult<u64>>;
    /// Remove the first match. Returns whether a document was removed.
    fn delete_one(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Remove every match. Returns the number of removed documents.
    fn delete_many(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<u64>>;
    /// Check that the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Whether `document` satisfies the exact-match `filter`.
pub fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key).is_some_and(|value| same_value(value, expected)))
}

fn same_value(value: &Bson, expected: &Bson) -> bool {
    match (value, expected) {
        (Bson::Int32(a), Bson::Int64(b)) | (Bson::Int64(b), Bson::Int32(a)) => i64::from(*a) == *b,
        _ => value == expected,
    }
}

#[cfg(test)]
mod tests {
    use bson::{doc, oid::ObjectId};

    use super::*;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(matches(&doc! {"name": "x"}, &doc! {}));
    }

    #[test]
    fn every_filter_key_must_match() {
        let game_id = ObjectId::new();
        let document = doc! {"name": "Any%", "game_id": game_id};

        assert!(matches(&document, &doc! {"name": "Any%", "game_id": game_id}));
        assert!(!matches(&document, &doc! {"name": "Any%", "game_id": ObjectId::new()}));
        assert!(!matches(&document, &doc! {"missing": "field"}));
    }

    #[test]
    fn integer_widths_compare_by_value() {
        assert!(matches(&doc! {"score": 12_i32}, &doc! {"score": 12_i64}));
        assert!(!matches(&doc! {"score": 12_i32}, &doc! {"score": 13_i64}));
    }
}
