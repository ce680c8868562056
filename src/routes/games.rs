use axum::{
    Form, Router,
    extract::{Path, State},
    response::{Html, Redirect},
    routing::get,
};

use crate::{
    codec::slug::to_path_segment,
    dto::forms::GameForm,
    error::AppError,
    routes::{bounce, done, page},
    services::game_service,
    session::Session,
    state::SharedState,
    views,
};

/// Game management routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/add_game", get(add_game_page).post(add_game))
        .route("/edit_game/{id}", get(edit_game_page).post(edit_game))
        .route("/delete_game/{id}", get(delete_game))
}

/// Add Game form.
pub async fn add_game_page(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let ctx = page(&state, &session, "Add Game").await?;
    Ok(views::admin::game_form(&ctx, None)?)
}

/// Create a game; duplicates bounce back to the form.
pub async fn add_game(
    State(state): State<SharedState>,
    session: Session,
    Form(form): Form<GameForm>,
) -> Result<Redirect, AppError> {
    match game_service::add(&state, form).await {
        Ok(_) => Ok(done(&session, "Game added.", "/admin")),
        Err(err) => bounce(&session, err, "/add_game"),
    }
}

/// Edit Game form.
pub async fn edit_game_page(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let game = game_service::find(&state, &id).await?;
    let ctx = page(&state, &session, "Edit Game").await?;
    Ok(views::admin::game_form(&ctx, Some(&game))?)
}

/// Rename a game.
pub async fn edit_game(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<GameForm>,
) -> Result<Redirect, AppError> {
    match game_service::edit(&state, &id, form).await {
        Ok(_) => Ok(done(&session, "Game updated.", "/admin")),
        Err(err) => bounce(&session, err, &format!("/edit_game/{}", to_path_segment(&id))),
    }
}

/// Delete a game together with its categories and scores.
pub async fn delete_game(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    game_service::delete(&state, &id).await?;
    Ok(done(&session, "Game, categories and scores deleted.", "/admin"))
}
