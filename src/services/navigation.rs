use std::collections::HashMap;

use bson::doc;
use indexmap::IndexMap;

use crate::{
    dao::models::{CategoryEntity, GameEntity},
    error::ServiceError,
    state::SharedState,
};

/// Games keyed by slug name, in store order, each with its categories.
pub type NavLinks = IndexMap<String, Vec<CategoryEntity>>;

/// Build the menu data rendered on every page.
pub async fn nav_links(state: &SharedState) -> Result<NavLinks, ServiceError> {
    let games = state.collection::<GameEntity>().find_many(doc! {}).await?;
    let categories = state.collection::<CategoryEntity>().find_many(doc! {}).await?;
    Ok(group(games, categories))
}

fn group(games: Vec<GameEntity>, categories: Vec<CategoryEntity>) -> NavLinks {
    let mut by_game: HashMap<_, Vec<CategoryEntity>> = HashMap::new();
    for category in categories {
        by_game.entry(category.game_id).or_default().push(category);
    }

    let mut links = NavLinks::with_capacity(games.len());
    for game in games {
        let categories = by_game.remove(&game.id).unwrap_or_default();
        links.entry(game.name).or_default().extend(categories);
    }
    links
}
