use axum::{
    Router,
    extract::{Path, State},
    response::{Html, Redirect},
    routing::get,
};

use crate::{
    codec::slug,
    error::AppError,
    routes::page,
    services::leaderboard_service,
    session::Session,
    state::SharedState,
    views::{self, urls},
};

/// Public leaderboard routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(home))
        .route("/{game}/{category}", get(show_scores))
}

/// Redirect to the default leaderboard.
pub async fn home(State(state): State<SharedState>) -> Result<Redirect, AppError> {
    let (game, category) = leaderboard_service::default_board(&state)
        .await?
        .ok_or_else(|| AppError::NotFound("no leaderboard has been created yet".into()))?;
    Ok(Redirect::to(&urls::leaderboard(&game.name, &category.name)))
}

/// Leaderboard of one category, addressed by slugs.
pub async fn show_scores(
    State(state): State<SharedState>,
    session: Session,
    Path((game, category)): Path<(String, String)>,
) -> Result<Html<String>, AppError> {
    let board = leaderboard_service::show(&state, &game, &category).await?;
    let title = format!(
        "{} - {}",
        slug::to_display(&board.game.name),
        slug::to_display(&board.category.name)
    );
    let ctx = page(&state, &session, title).await?;
    Ok(views::leaderboard::leaderboard(&ctx, &board)?)
}
