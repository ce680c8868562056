//! Leaderboard aggregation: each player's best run in a category, fastest first.

use std::collections::HashMap;

use bson::{doc, oid::ObjectId};
use indexmap::{IndexMap, map::Entry};

use crate::{
    dao::models::{CategoryEntity, GameEntity, PlayerEntity, ScoreEntity},
    error::ServiceError,
    services::parse_id,
    state::SharedState,
};

/// One leaderboard line: a player and their best time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// Owner of the best run.
    pub player: PlayerEntity,
    /// Best time in centiseconds.
    pub score: u64,
}

/// One stored run joined to its player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLine {
    /// The stored run.
    pub score: ScoreEntity,
    /// Who ran it.
    pub player: PlayerEntity,
}

/// Rendered leaderboard for one category.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    /// Game the board belongs to.
    pub game: GameEntity,
    /// Category being ranked.
    pub category: CategoryEntity,
    /// Fastest first.
    pub standings: Vec<Standing>,
}

/// Every run of one category, for the score removal page.
#[derive(Debug, Clone)]
pub struct CategoryScores {
    /// Game of the category.
    pub game: GameEntity,
    /// The category.
    pub category: CategoryEntity,
    /// Every run, fastest first.
    pub lines: Vec<ScoreLine>,
}

/// Keep the lowest score per player and order the result fastest first.
///
/// Scores whose player no longer exists are skipped. Equal times keep the
/// order in which each player's first score appears in `scores`.
pub fn rank(scores: &[ScoreEntity], players: &[PlayerEntity]) -> Vec<Standing> {
    let players: HashMap<ObjectId, &PlayerEntity> =
        players.iter().map(|player| (player.id, player)).collect();

    let mut best: IndexMap<ObjectId, Standing> = IndexMap::new();
    for score in scores {
        let Some(player) = players.get(&score.player_id) else {
            continue;
        };
        match best.entry(score.player_id) {
            Entry::Occupied(mut entry) => {
                let standing = entry.get_mut();
                standing.score = standing.score.min(score.score);
            }
            Entry::Vacant(entry) => {
                entry.insert(Standing {
                    player: (*player).clone(),
                    score: score.score,
                });
            }
        }
    }

    let mut standings: Vec<Standing> = best.into_values().collect();
    standings.sort_by_key(|standing| standing.score);
    standings
}

/// Join every score to its player, fastest first, skipping orphaned scores.
pub fn join_players(scores: Vec<ScoreEntity>, players: &[PlayerEntity]) -> Vec<ScoreLine> {
    let players: HashMap<ObjectId, &PlayerEntity> =
        players.iter().map(|player| (player.id, player)).collect();

    let mut lines: Vec<ScoreLine> = scores
        .into_iter()
        .filter_map(|score| {
            players.get(&score.player_id).map(|player| ScoreLine {
                player: (*player).clone(),
                score,
            })
        })
        .collect();
    lines.sort_by_key(|line| line.score.score);
    lines
}

/// Leaderboard addressed by game and category slugs.
pub async fn show(
    state: &SharedState,
    game_slug: &str,
    category_slug: &str,
) -> Result<Leaderboard, ServiceError> {
    let game = state
        .collection::<GameEntity>()
        .find_one(doc! {"name": game_slug})
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{game_slug}` not found")))?;
    let category = state
        .collection::<CategoryEntity>()
        .find_one(doc! {"name": category_slug, "game_id": game.id})
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "category `{category_slug}` of game `{game_slug}` not found"
            ))
        })?;

    let scores = scores_of(state, &category).await?;
    let players = state.collection::<PlayerEntity>().find_many(doc! {}).await?;
    let standings = rank(&scores, &players);

    Ok(Leaderboard {
        game,
        category,
        standings,
    })
}

/// Game and category shown by the home route.
///
/// Configured identifiers win; without them the first stored game and its
/// first category are used. `None` when nothing has been created yet.
pub async fn default_board(
    state: &SharedState,
) -> Result<Option<(GameEntity, CategoryEntity)>, ServiceError> {
    let games = state.collection::<GameEntity>();
    let categories = state.collection::<CategoryEntity>();
    let config = state.config();

    let configured_category = match config.default_category_id {
        Some(id) => Some(categories.find_by_id(id).await?),
        None => None,
    };

    let game = match (config.default_game_id, &configured_category) {
        (Some(id), _) => games.find_by_id(id).await?,
        (None, Some(category)) => games.find_by_id(category.game_id).await?,
        (None, None) => match games.find_many(doc! {}).await?.into_iter().next() {
            Some(game) => game,
            None => return Ok(None),
        },
    };

    let category = match configured_category {
        Some(category) => category,
        None => match categories
            .find_many(doc! {"game_id": game.id})
            .await?
            .into_iter()
            .next()
        {
            Some(category) => category,
            None => return Ok(None),
        },
    };

    Ok(Some((game, category)))
}

/// Every run of a category, joined to players, for the score removal page.
pub async fn category_scores(
    state: &SharedState,
    category_id: &str,
) -> Result<CategoryScores, ServiceError> {
    let category_id = parse_id(category_id, "category")?;
    let category = state
        .collection::<CategoryEntity>()
        .find_by_id(category_id)
        .await?;
    let game = state
        .collection::<GameEntity>()
        .find_by_id(category.game_id)
        .await?;

    let scores = scores_of(state, &category).await?;
    let players = state.collection::<PlayerEntity>().find_many(doc! {}).await?;
    let lines = join_players(scores, &players);

    Ok(CategoryScores {
        game,
        category,
        lines,
    })
}

async fn scores_of(
    state: &SharedState,
    category: &CategoryEntity,
) -> Result<Vec<ScoreEntity>, ServiceError> {
    Ok(state
        .collection::<ScoreEntity>()
        .find_many(doc! {"game_id": category.game_id, "category_id": category.id})
        .await?)
}
