use bson::{doc, oid::ObjectId};
use tracing::info;
use validator::Validate;

use crate::{
    dao::{
        archive::Snapshot,
        models::{PlayerEntity, PlayerLinks, ScoreEntity},
    },
    dto::forms::PlayerForm,
    error::ServiceError,
    services::{by_lowercase_name, parse_id},
    state::SharedState,
};

/// Prefix turning a Twitch handle into a channel URL.
pub const TWITCH_PREFIX: &str = "https://www.twitch.tv/";
/// Prefix turning a YouTube handle into a channel URL.
pub const YOUTUBE_PREFIX: &str = "https://www.youtube.com/c/";

/// Every player, ordered case-insensitively by name.
pub async fn list(state: &SharedState) -> Result<Vec<PlayerEntity>, ServiceError> {
    let mut players = state.collection::<PlayerEntity>().find_many(doc! {}).await?;
    players.sort_by(|a, b| by_lowercase_name(&a.name, &b.name));
    Ok(players)
}

/// Load one player by identifier.
pub async fn find(state: &SharedState, player_id: &str) -> Result<PlayerEntity, ServiceError> {
    let id = parse_id(player_id, "player")?;
    Ok(state.collection::<PlayerEntity>().find_by_id(id).await?)
}

/// Expand the submitted handles into stored links. Blank values are stored as null.
pub fn links_from(form: &PlayerForm) -> PlayerLinks {
    PlayerLinks {
        twitch: non_blank(&form.twitch).map(|handle| prefixed(TWITCH_PREFIX, handle)),
        youtube: non_blank(&form.youtube).map(|handle| prefixed(YOUTUBE_PREFIX, handle)),
        link: non_blank(&form.link).map(str::to_owned),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn prefixed(prefix: &str, handle: &str) -> String {
    if handle.starts_with(prefix) {
        handle.to_owned()
    } else {
        format!("{prefix}{handle}")
    }
}

/// Create a player.
pub async fn add(state: &SharedState, form: PlayerForm) -> Result<PlayerEntity, ServiceError> {
    form.validate()?;

    let players = state.collection::<PlayerEntity>();
    if players.find_one(doc! {"name": &form.name}).await?.is_some() {
        return Err(ServiceError::Duplicate(
            "That name is already in use. Please try again with a different name.".into(),
        ));
    }

    let player = PlayerEntity {
        id: ObjectId::new(),
        links: links_from(&form),
        name: form.name,
    };
    players.insert_one(&player).await?;

    info!(player_id = %player.id, name = %player.name, "player added");
    Ok(player)
}

/// Update a player's name and links. The duplicate check only runs when the name changed.
pub async fn edit(
    state: &SharedState,
    player_id: &str,
    form: PlayerForm,
) -> Result<PlayerEntity, ServiceError> {
    let mut player = find(state, player_id).await?;
    form.validate()?;

    let players = state.collection::<PlayerEntity>();
    if form.name != player.name && players.find_one(doc! {"name": &form.name}).await?.is_some() {
        return Err(ServiceError::Duplicate("Duplicate name. Please try again.".into()));
    }

    player.links = links_from(&form);
    player.name = form.name;
    players.replace_fields(&player).await?;

    info!(player_id = %player.id, name = %player.name, "player updated");
    Ok(player)
}

/// Archive a player with their scores, then remove them.
pub async fn delete(state: &SharedState, player_id: &str) -> Result<(), ServiceError> {
    let player = find(state, player_id).await?;
    let scores = state.collection::<ScoreEntity>();

    let child_scores = scores.find_many(doc! {"player_id": player.id}).await?;
    let snapshot = Snapshot::of(&player)?.with_scores(&child_scores)?;
    state.archive().store(snapshot).await?;

    let removed = scores.delete_many(doc! {"player_id": player.id}).await?;
    state
        .collection::<PlayerEntity>()
        .delete_one(doc! {"_id": player.id})
        .await?;

    info!(player_id = %player.id, scores = removed, "player deleted");
    Ok(())
}
