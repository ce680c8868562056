use axum::{
    Form, Router,
    extract::{Path, State},
    response::{Html, Redirect},
    routing::get,
};

use crate::{
    codec::slug::to_path_segment,
    dto::forms::PlayerForm,
    error::AppError,
    routes::{bounce, done, page},
    services::player_service,
    session::Session,
    state::SharedState,
    views,
};

/// Player management routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/add_player", get(add_player_page).post(add_player))
        .route("/edit_player/{id}", get(edit_player_page).post(edit_player))
        .route("/delete_player/{id}", get(delete_player))
}

/// Add Player form.
pub async fn add_player_page(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let ctx = page(&state, &session, "Add Player").await?;
    Ok(views::admin::player_form(&ctx, None)?)
}

/// Create a player; duplicates bounce back to the form.
pub async fn add_player(
    State(state): State<SharedState>,
    session: Session,
    Form(form): Form<PlayerForm>,
) -> Result<Redirect, AppError> {
    match player_service::add(&state, form).await {
        Ok(_) => Ok(done(&session, "New player added.", "/admin")),
        Err(err) => bounce(&session, err, "/add_player"),
    }
}

/// Edit Player form.
pub async fn edit_player_page(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let player = player_service::find(&state, &id).await?;
    let ctx = page(&state, &session, "Edit Player").await?;
    Ok(views::admin::player_form(&ctx, Some(&player))?)
}

/// Update a player's name and links.
pub async fn edit_player(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<PlayerForm>,
) -> Result<Redirect, AppError> {
    match player_service::edit(&state, &id, form).await {
        Ok(_) => Ok(done(&session, "Player updated.", "/admin")),
        Err(err) => bounce(&session, err, &format!("/edit_player/{}", to_path_segment(&id))),
    }
}

/// Delete a player together with their scores.
pub async fn delete_player(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    player_service::delete(&state, &id).await?;
    Ok(done(&session, "Player and scores deleted.", "/admin"))
}
