use axum::{Router, extract::State, response::Html, routing::get};

use crate::{
    error::AppError,
    routes::page,
    services::{game_service, player_service},
    session::Session,
    state::SharedState,
    views,
};

/// Admin panel route.
pub fn router() -> Router<SharedState> {
    Router::new().route("/admin", get(panel))
}

/// Games with their categories, and players, each with management links.
pub async fn panel(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let games = game_service::overview(&state).await?;
    let players = player_service::list(&state).await?;
    let ctx = page(&state, &session, "Admin Panel").await?;
    Ok(views::admin::panel(&ctx, &games, &players)?)
}
