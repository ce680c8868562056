use bson::{doc, oid::ObjectId};
use tracing::info;
use validator::Validate;

use crate::{
    codec::slug,
    dao::{
        archive::Snapshot,
        models::{CategoryEntity, GameEntity, ScoreEntity},
    },
    dto::forms::CategoryForm,
    error::ServiceError,
    services::parse_id,
    state::SharedState,
};

const DUPLICATE: &str = "Duplicate category name. Please try again.";

/// Load one category by identifier.
pub async fn find(state: &SharedState, category_id: &str) -> Result<CategoryEntity, ServiceError> {
    let id = parse_id(category_id, "category")?;
    Ok(state.collection::<CategoryEntity>().find_by_id(id).await?)
}

/// Load a category addressed through its game; both must exist.
pub async fn find_in_game(
    state: &SharedState,
    game_id: &str,
    category_id: &str,
) -> Result<(GameEntity, CategoryEntity), ServiceError> {
    let game_id = parse_id(game_id, "game")?;
    let game = state.collection::<GameEntity>().find_by_id(game_id).await?;
    let category = find(state, category_id).await?;
    Ok((game, category))
}

/// Resolve the game chosen in a category form.
async fn chosen_game(state: &SharedState, raw: &str) -> Result<GameEntity, ServiceError> {
    let unknown = || ServiceError::InvalidInput("Please choose a game.".into());
    let id = ObjectId::parse_str(raw).map_err(|_| unknown())?;
    state
        .collection::<GameEntity>()
        .find_one(doc! {"_id": id})
        .await?
        .ok_or_else(unknown)
}

/// Create a category in the chosen game; the name is stored in slug form.
pub async fn add(state: &SharedState, form: CategoryForm) -> Result<CategoryEntity, ServiceError> {
    form.validate()?;
    let game = chosen_game(state, &form.game_id).await?;
    let name = slug::to_slug(&form.name);

    let categories = state.collection::<CategoryEntity>();
    if categories
        .find_one(doc! {"name": &name, "game_id": game.id})
        .await?
        .is_some()
    {
        return Err(ServiceError::Duplicate(DUPLICATE.into()));
    }

    let category = CategoryEntity {
        id: ObjectId::new(),
        game_id: game.id,
        name,
        description: form.desc,
    };
    categories.insert_one(&category).await?;

    info!(category_id = %category.id, game_id = %game.id, name = %category.name, "category added");
    Ok(category)
}

/// Update a category, possibly moving it to another game.
///
/// The duplicate check only runs when the name or the owning game changed.
pub async fn edit(
    state: &SharedState,
    game_id: &str,
    category_id: &str,
    form: CategoryForm,
) -> Result<CategoryEntity, ServiceError> {
    let (_, mut category) = find_in_game(state, game_id, category_id).await?;
    form.validate()?;
    let game = chosen_game(state, &form.game_id).await?;
    let name = slug::to_slug(&form.name);

    let categories = state.collection::<CategoryEntity>();
    if (name != category.name || game.id != category.game_id)
        && categories
            .find_one(doc! {"name": &name, "game_id": game.id})
            .await?
            .is_some()
    {
        return Err(ServiceError::Duplicate(DUPLICATE.into()));
    }

    let moved = game.id != category.game_id;
    category.game_id = game.id;
    category.name = name;
    category.description = form.desc;
    categories.replace_fields(&category).await?;

    if moved {
        let rehomed = state
            .collection::<ScoreEntity>()
            .update_many(doc! {"category_id": category.id}, doc! {"game_id": game.id})
            .await?;
        info!(category_id = %category.id, game_id = %game.id, scores = rehomed, "category moved");
    }

    info!(category_id = %category.id, game_id = %game.id, name = %category.name, "category updated");
    Ok(category)
}

/// Archive a category with its scores, then remove them.
pub async fn delete(state: &SharedState, category_id: &str) -> Result<(), ServiceError> {
    let category = find(state, category_id).await?;
    let scores = state.collection::<ScoreEntity>();

    let child_scores = scores.find_many(doc! {"category_id": category.id}).await?;
    let snapshot = Snapshot::of(&category)?.with_scores(&child_scores)?;
    state.archive().store(snapshot).await?;

    let removed = scores.delete_many(doc! {"category_id": category.id}).await?;
    state
        .collection::<CategoryEntity>()
        .delete_one(doc! {"_id": category.id})
        .await?;

    info!(category_id = %category.id, scores = removed, "category deleted");
    Ok(())
}

#[cfg(all(test, feature = "memory-store"))]
mod tests {
    use super::*;
    use crate::{
        dao::models::{ArchiveEntity, PlayerEntity, PlayerLinks},
        services::leaderboard_service,
        state::memory_state,
    };

    async fn game(state: &SharedState, name: &str) -> GameEntity {
        let game = GameEntity {
            id: ObjectId::new(),
            name: name.into(),
        };
        state.collection().insert_one(&game).await.unwrap();
        game
    }

    fn form(game: &GameEntity, name: &str) -> CategoryForm {
        CategoryForm {
            game_id: game.id.to_hex(),
            name: name.into(),
            desc: "Beat the game".into(),
        }
    }

    #[tokio::test]
    async fn names_are_unique_per_game() {
        let state = memory_state(&[]);
        let mario = game(&state, "Mario").await;
        let zelda = game(&state, "Zelda").await;

        add(&state, form(&mario, "Any%")).await.unwrap();
        add(&state, form(&zelda, "Any%")).await.unwrap();
        let err = add(&state, form(&mario, "Any%")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(_)));
    }

    #[tokio::test]
    async fn unknown_game_is_invalid_input() {
        let state = memory_state(&[]);
        let err = add(
            &state,
            CategoryForm {
                game_id: ObjectId::new().to_hex(),
                name: "Any%".into(),
                desc: String::new(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn moving_to_a_game_with_the_same_name_is_a_duplicate() {
        let state = memory_state(&[]);
        let mario = game(&state, "Mario").await;
        let zelda = game(&state, "Zelda").await;
        let moving = add(&state, form(&mario, "Any%")).await.unwrap();
        add(&state, form(&zelda, "Any%")).await.unwrap();

        let err = edit(&state, &mario.id.to_hex(), &moving.id.to_hex(), form(&zelda, "Any%"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(_)));

        let moved = edit(&state, &mario.id.to_hex(), &moving.id.to_hex(), form(&zelda, "100%"))
            .await
            .unwrap();
        assert_eq!(moved.game_id, zelda.id);
        assert_eq!(moved.name, "100%");
    }

    #[tokio::test]
    async fn moved_category_keeps_its_runs() {
        let state = memory_state(&[]);
        let mario = game(&state, "Mario").await;
        let zelda = game(&state, "Zelda").await;
        let category = add(&state, form(&mario, "Any%")).await.unwrap();

        let player = PlayerEntity {
            id: ObjectId::new(),
            name: "A".into(),
            links: PlayerLinks::default(),
        };
        state.collection().insert_one(&player).await.unwrap();
        let score = ScoreEntity {
            id: ObjectId::new(),
            game_id: mario.id,
            category_id: category.id,
            player_id: player.id,
            score: 300,
        };
        state.collection().insert_one(&score).await.unwrap();

        edit(&state, &mario.id.to_hex(), &category.id.to_hex(), form(&zelda, "Any%"))
            .await
            .unwrap();

        let board = leaderboard_service::show(&state, "Zelda", "Any%").await.unwrap();
        assert_eq!(board.standings.len(), 1);
        assert_eq!(board.standings[0].player.id, player.id);
        assert_eq!(board.standings[0].score, 300);

        let stored = state.collection::<ScoreEntity>().find_by_id(score.id).await.unwrap();
        assert_eq!(stored.game_id, zelda.id);
    }

    #[tokio::test]
    async fn delete_archives_and_removes_all_scores() {
        let state = memory_state(&[]);
        let mario = game(&state, "Mario").await;
        let category = add(&state, form(&mario, "Any%")).await.unwrap();
        let other = add(&state, form(&mario, "100%")).await.unwrap();

        for (category_id, value) in [(category.id, 1), (category.id, 2), (category.id, 3), (other.id, 4)] {
            let score = ScoreEntity {
                id: ObjectId::new(),
                game_id: mario.id,
                category_id,
                player_id: ObjectId::new(),
                score: value,
            };
            state.collection().insert_one(&score).await.unwrap();
        }

        delete(&state, &category.id.to_hex()).await.unwrap();

        let scores = state.collection::<ScoreEntity>();
        assert!(scores.find_many(doc! {"category_id": category.id}).await.unwrap().is_empty());
        assert_eq!(scores.find_many(doc! {}).await.unwrap().len(), 1);
        assert!(matches!(
            find(&state, &category.id.to_hex()).await,
            Err(ServiceError::NotFound(_))
        ));

        let archived = state.collection::<ArchiveEntity>().find_many(doc! {}).await.unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].source, "categories");
        assert_eq!(archived[0].scores.len(), 3);
    }
}
