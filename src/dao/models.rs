use bson::{DateTime, Document, oid::ObjectId};
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

/// Record type persisted in its own collection.
pub trait Entity: Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static {
    /// Name of the backing collection.
    const COLLECTION: &'static str;

    /// Store-assigned identifier.
    fn id(&self) -> ObjectId;
}

/// Login credential. Usernames are stored lowercase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Lowercase login name.
    pub username: String,
    /// PHC-formatted password hash; the plaintext is never stored.
    #[serde(rename = "password")]
    pub password_hash: String,
}

/// A game, named in slug form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Slug form, unique among games.
    pub name: String,
}

/// A rule set within a game under which scores are compared.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryEntity {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Owning game.
    pub game_id: ObjectId,
    /// Slug form, unique within the owning game.
    pub name: String,
    /// Free-text rules shown above the leaderboard.
    #[serde(rename = "desc", default)]
    #[serde_as(as = "DefaultOnNull")]
    pub description: String,
}

/// A runner who can hold scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Display name, unique among players.
    pub name: String,
    /// External pages.
    #[serde(default)]
    pub links: PlayerLinks,
}

/// Optional external pages of a player, stored as full URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerLinks {
    /// Twitch channel URL.
    #[serde(default)]
    pub twitch: Option<String>,
    /// YouTube channel URL.
    #[serde(default)]
    pub youtube: Option<String>,
    /// Any other page.
    #[serde(default)]
    pub link: Option<String>,
}

impl PlayerLinks {
    /// Labelled links that actually carry a value.
    pub fn present(&self) -> Vec<(&'static str, &str)> {
        [
            ("Twitch", &self.twitch),
            ("YouTube", &self.youtube),
            ("Link", &self.link),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .filter(|url| !url.is_empty())
                .map(|url| (label, url))
        })
        .collect()
    }
}

/// A single submitted run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreEntity {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Game of the category the run was submitted to.
    pub game_id: ObjectId,
    /// Category the run was submitted to.
    pub category_id: ObjectId,
    /// Player who submitted the run.
    pub player_id: ObjectId,
    /// Run time in centiseconds.
    pub score: u64,
}

/// Snapshot of a deleted entity together with the children deleted with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiveEntity {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Collection the snapshot was taken from.
    pub source: String,
    /// When the entity was deleted.
    pub archived_at: DateTime,
    /// The deleted document as it was stored.
    pub document: Document,
    /// Categories deleted along with a game.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Document>,
    /// Scores deleted along with the entity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scores: Vec<Document>,
}

macro_rules! entity {
    ($ty:ty, $collection:literal) => {
        impl Entity for $ty {
            const COLLECTION: &'static str = $collection;

            fn id(&self) -> ObjectId {
                self.id
            }
        }
    };
}

entity!(UserEntity, "users");
entity!(GameEntity, "games");
entity!(CategoryEntity, "categories");
entity!(PlayerEntity, "players");
entity!(ScoreEntity, "scores");
entity!(ArchiveEntity, "archive");

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    #[test]
    fn category_reads_null_or_missing_description() {
        let id = ObjectId::new();
        let game_id = ObjectId::new();

        let with_null: CategoryEntity =
            bson::from_document(doc! {"_id": id, "game_id": game_id, "name": "Any%", "desc": null})
                .unwrap();
        assert_eq!(with_null.description, "");

        let missing: CategoryEntity =
            bson::from_document(doc! {"_id": id, "game_id": game_id, "name": "Any%"}).unwrap();
        assert_eq!(missing.description, "");
    }

    #[test]
    fn score_reads_int32_values() {
        let score: ScoreEntity = bson::from_document(doc! {
            "_id": ObjectId::new(),
            "game_id": ObjectId::new(),
            "category_id": ObjectId::new(),
            "player_id": ObjectId::new(),
            "score": 12_345_i32,
        })
        .unwrap();
        assert_eq!(score.score, 12_345);
    }

    #[test]
    fn present_links_skip_empty_values() {
        let links = PlayerLinks {
            twitch: Some("https://www.twitch.tv/runner".into()),
            youtube: Some(String::new()),
            link: None,
        };
        assert_eq!(links.present(), vec![("Twitch", "https://www.twitch.tv/runner")]);
    }
}
