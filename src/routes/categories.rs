use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::get,
};
use serde::Deserialize;

use crate::{
    codec::slug::to_path_segment,
    dto::forms::CategoryForm,
    error::AppError,
    routes::{bounce, done, page},
    services::{category_service, game_service},
    session::Session,
    state::SharedState,
    views,
};

/// Category management routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/add_category", get(add_category_page).post(add_category))
        .route(
            "/edit_category/{game_id}/{category_id}",
            get(edit_category_page).post(edit_category),
        )
        .route("/delete_category/{id}", get(delete_category))
}

/// Optional game to preselect on the add form.
#[derive(Debug, Deserialize)]
pub struct AddCategoryQuery {
    id: Option<String>,
}

/// Add Category form, optionally preselecting the game from `?id=`.
pub async fn add_category_page(
    State(state): State<SharedState>,
    session: Session,
    Query(query): Query<AddCategoryQuery>,
) -> Result<Html<String>, AppError> {
    let games = game_service::list(&state).await?;
    let ctx = page(&state, &session, "Add Category").await?;
    Ok(views::admin::category_form(&ctx, &games, query.id.as_deref(), None)?)
}

/// Create a category; duplicates bounce back to the form.
pub async fn add_category(
    State(state): State<SharedState>,
    session: Session,
    Form(form): Form<CategoryForm>,
) -> Result<Redirect, AppError> {
    let back = format!("/add_category?id={}", to_path_segment(&form.game_id));
    match category_service::add(&state, form).await {
        Ok(_) => Ok(done(&session, "Category added.", "/admin")),
        Err(err) => bounce(&session, err, &back),
    }
}

/// Edit Category form.
pub async fn edit_category_page(
    State(state): State<SharedState>,
    session: Session,
    Path((game_id, category_id)): Path<(String, String)>,
) -> Result<Html<String>, AppError> {
    let (game, category) = category_service::find_in_game(&state, &game_id, &category_id).await?;
    let games = game_service::list(&state).await?;
    let ctx = page(&state, &session, "Edit Category").await?;
    let selected = game.id.to_hex();
    Ok(views::admin::category_form(&ctx, &games, Some(&selected), Some(&category))?)
}

/// Rename a category or move it to another game.
pub async fn edit_category(
    State(state): State<SharedState>,
    session: Session,
    Path((game_id, category_id)): Path<(String, String)>,
    Form(form): Form<CategoryForm>,
) -> Result<Redirect, AppError> {
    match category_service::edit(&state, &game_id, &category_id, form).await {
        Ok(_) => Ok(done(&session, "Category updated.", "/admin")),
        Err(err) => bounce(
            &session,
            err,
            &format!(
                "/edit_category/{}/{}",
                to_path_segment(&game_id),
                to_path_segment(&category_id)
            ),
        ),
    }
}

/// Delete a category together with its scores.
pub async fn delete_category(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    category_service::delete(&state, &id).await?;
    Ok(done(&session, "Categories and scores deleted.", "/admin"))
}
