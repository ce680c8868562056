use bson::{doc, oid::ObjectId};
use tracing::{info, warn};
use validator::Validate;

use crate::{
    codec::time,
    dao::{
        archive::Snapshot,
        models::{CategoryEntity, GameEntity, PlayerEntity, ScoreEntity},
    },
    dto::forms::ScoreForm,
    error::ServiceError,
    services::{category_service, parse_id, player_service},
    state::SharedState,
};

/// Notice shown when the submitted time fields do not form a time.
pub const INVALID_TIME: &str = "Please enter a valid time.";

/// Everything the score entry form needs.
#[derive(Debug, Clone)]
pub struct ScoreFormData {
    /// Game of the category.
    pub game: GameEntity,
    /// Category the run is submitted to.
    pub category: CategoryEntity,
    /// Players to choose from, sorted by name.
    pub players: Vec<PlayerEntity>,
}

async fn category_with_game(
    state: &SharedState,
    category_id: &str,
) -> Result<(GameEntity, CategoryEntity), ServiceError> {
    let category = category_service::find(state, category_id).await?;
    let game = state
        .collection::<GameEntity>()
        .find_by_id(category.game_id)
        .await?;
    Ok((game, category))
}

/// Category, game and selectable players for the score entry form.
pub async fn form_data(
    state: &SharedState,
    category_id: &str,
) -> Result<ScoreFormData, ServiceError> {
    let (game, category) = category_with_game(state, category_id).await?;
    let players = player_service::list(state).await?;
    Ok(ScoreFormData {
        game,
        category,
        players,
    })
}

/// Record a run for a category.
///
/// Nothing is written when the time fields do not decode.
pub async fn add(
    state: &SharedState,
    category_id: &str,
    form: ScoreForm,
) -> Result<ScoreEntity, ServiceError> {
    let (game, category) = category_with_game(state, category_id).await?;
    form.validate()?;

    let score = time::decode(&form.time_text()).map_err(|err| {
        warn!(error = %err, category_id = %category.id, "rejected score with malformed time");
        ServiceError::InvalidInput(INVALID_TIME.into())
    })?;

    let player_id = parse_id(&form.player_name, "player")?;
    let player = state
        .collection::<PlayerEntity>()
        .find_by_id(player_id)
        .await?;

    let entity = ScoreEntity {
        id: ObjectId::new(),
        game_id: game.id,
        category_id: category.id,
        player_id: player.id,
        score,
    };
    state.collection::<ScoreEntity>().insert_one(&entity).await?;

    info!(
        score_id = %entity.id,
        category_id = %category.id,
        player_id = %player.id,
        score = entity.score,
        "score added"
    );
    Ok(entity)
}

/// Archive a single score, then remove it.
pub async fn delete(state: &SharedState, score_id: &str) -> Result<ScoreEntity, ServiceError> {
    let id = parse_id(score_id, "score")?;
    let scores = state.collection::<ScoreEntity>();
    let score = scores.find_by_id(id).await?;

    state.archive().store(Snapshot::of(&score)?).await?;
    scores.delete_one(doc! {"_id": score.id}).await?;

    info!(score_id = %score.id, category_id = %score.category_id, "score deleted");
    Ok(score)
}

#[cfg(all(test, feature = "memory-store"))]
mod tests {
    use super::*;
    use crate::{
        dao::models::{ArchiveEntity, PlayerLinks},
        state::memory_state,
    };

    async fn fixture(state: &SharedState) -> (CategoryEntity, PlayerEntity) {
        let game = GameEntity {
            id: ObjectId::new(),
            name: "Mario".into(),
        };
        let category = CategoryEntity {
            id: ObjectId::new(),
            game_id: game.id,
            name: "Any%".into(),
            description: String::new(),
        };
        let player = PlayerEntity {
            id: ObjectId::new(),
            name: "runner".into(),
            links: PlayerLinks::default(),
        };
        state.collection().insert_one(&game).await.unwrap();
        state.collection().insert_one(&category).await.unwrap();
        state.collection().insert_one(&player).await.unwrap();
        (category, player)
    }

    fn form(player: &PlayerEntity, time: [&str; 4]) -> ScoreForm {
        let [hours, minutes, seconds, centiseconds] = time.map(String::from);
        ScoreForm {
            player_name: player.id.to_hex(),
            hours,
            minutes,
            seconds,
            centiseconds,
        }
    }

    #[tokio::test]
    async fn stores_decoded_centiseconds() {
        let state = memory_state(&[]);
        let (category, player) = fixture(&state).await;

        let score = add(&state, &category.id.to_hex(), form(&player, ["1", "02", "03", "45"]))
            .await
            .unwrap();
        assert_eq!(score.score, 372_345);
        assert_eq!(score.game_id, category.game_id);
    }

    #[tokio::test]
    async fn malformed_time_writes_nothing() {
        let state = memory_state(&[]);
        let (category, player) = fixture(&state).await;

        let err = add(&state, &category.id.to_hex(), form(&player, ["a", "b", "c", ""]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(ref notice) if notice == INVALID_TIME));
        assert!(state.collection::<ScoreEntity>().find_many(doc! {}).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_player_is_not_found() {
        let state = memory_state(&[]);
        let (category, _) = fixture(&state).await;
        let ghost = PlayerEntity {
            id: ObjectId::new(),
            name: "ghost".into(),
            links: PlayerLinks::default(),
        };

        let err = add(&state, &category.id.to_hex(), form(&ghost, ["0", "1", "2", "3"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_archives_the_score() {
        let state = memory_state(&[]);
        let (category, player) = fixture(&state).await;
        let score = add(&state, &category.id.to_hex(), form(&player, ["0", "1", "2", "3"]))
            .await
            .unwrap();

        delete(&state, &score.id.to_hex()).await.unwrap();

        assert!(state.collection::<ScoreEntity>().find_many(doc! {}).await.unwrap().is_empty());
        let archived = state.collection::<ArchiveEntity>().find_many(doc! {}).await.unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].source, "scores");
        assert_eq!(archived[0].document.get_object_id("_id").unwrap(), score.id);
    }
}
