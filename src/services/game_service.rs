//! Game management, including the cascading delete of categories and scores.

use bson::{doc, oid::ObjectId};
use tracing::info;
use validator::Validate;

use crate::{
    codec::slug,
    dao::{
        archive::Snapshot,
        models::{CategoryEntity, GameEntity, ScoreEntity},
    },
    dto::forms::GameForm,
    error::ServiceError,
    services::{by_lowercase_name, parse_id},
    state::SharedState,
};

/// A game together with its categories, for the admin panel.
#[derive(Debug, Clone)]
pub struct GameOverview {
    /// The game.
    pub game: GameEntity,
    /// Its categories in store order.
    pub categories: Vec<CategoryEntity>,
}

/// Every game, ordered by name.
pub async fn list(state: &SharedState) -> Result<Vec<GameEntity>, ServiceError> {
    let mut games = state.collection::<GameEntity>().find_many(doc! {}).await?;
    games.sort_by(|a, b| by_lowercase_name(&a.name, &b.name));
    Ok(games)
}

/// Every game with its categories, both ordered by name.
pub async fn overview(state: &SharedState) -> Result<Vec<GameOverview>, ServiceError> {
    let games = list(state).await?;
    let mut categories = state.collection::<CategoryEntity>().find_many(doc! {}).await?;
    categories.sort_by(|a, b| by_lowercase_name(&a.name, &b.name));

    Ok(games
        .into_iter()
        .map(|game| GameOverview {
            categories: categories
                .iter()
                .filter(|category| category.game_id == game.id)
                .cloned()
                .collect(),
            game,
        })
        .collect())
}

/// Load one game by identifier.
pub async fn find(state: &SharedState, game_id: &str) -> Result<GameEntity, ServiceError> {
    let id = parse_id(game_id, "game")?;
    Ok(state.collection::<GameEntity>().find_by_id(id).await?)
}

/// Create a game; the name is stored in slug form.
pub async fn add(state: &SharedState, form: GameForm) -> Result<GameEntity, ServiceError> {
    form.validate()?;
    let name = slug::to_slug(&form.name);

    let games = state.collection::<GameEntity>();
    if games.find_one(doc! {"name": &name}).await?.is_some() {
        return Err(ServiceError::Duplicate(
            "The submitted game name is already in use. Please try again.".into(),
        ));
    }

    let game = GameEntity {
        id: ObjectId::new(),
        name,
    };
    games.insert_one(&game).await?;

    info!(game_id = %game.id, name = %game.name, "game added");
    Ok(game)
}

/// Rename a game. The duplicate check only runs when the name changed.
pub async fn edit(
    state: &SharedState,
    game_id: &str,
    form: GameForm,
) -> Result<GameEntity, ServiceError> {
    let mut game = find(state, game_id).await?;
    form.validate()?;
    let name = slug::to_slug(&form.name);

    let games = state.collection::<GameEntity>();
    if name != game.name && games.find_one(doc! {"name": &name}).await?.is_some() {
        return Err(ServiceError::Duplicate("Duplicate name. Please try again.".into()));
    }

    game.name = name;
    games.replace_fields(&game).await?;

    info!(game_id = %game.id, name = %game.name, "game updated");
    Ok(game)
}

/// Archive a game with its categories and scores, then remove all of them.
///
/// The steps are independent store operations; an interruption can leave a
/// partial cascade behind.
pub async fn delete(state: &SharedState, game_id: &str) -> Result<(), ServiceError> {
    let game = find(state, game_id).await?;
    let categories = state.collection::<CategoryEntity>();
    let scores = state.collection::<ScoreEntity>();

    let child_categories = categories.find_many(doc! {"game_id": game.id}).await?;
    let child_scores = scores.find_many(doc! {"game_id": game.id}).await?;

    let snapshot = Snapshot::of(&game)?
        .with_categories(&child_categories)?
        .with_scores(&child_scores)?;
    state.archive().store(snapshot).await?;

    let removed_scores = scores.delete_many(doc! {"game_id": game.id}).await?;
    let removed_categories = categories.delete_many(doc! {"game_id": game.id}).await?;
    state
        .collection::<GameEntity>()
        .delete_one(doc! {"_id": game.id})
        .await?;

    info!(
        game_id = %game.id,
        categories = removed_categories,
        scores = removed_scores,
        "game deleted"
    );
    Ok(())
}
