use axum::{
    Form, Router,
    extract::{Path, State},
    response::{Html, Redirect},
    routing::get,
};

use crate::{
    codec::slug::to_path_segment,
    dto::forms::ScoreForm,
    error::AppError,
    routes::{bounce, done, page},
    services::{leaderboard_service, score_service},
    session::Session,
    state::SharedState,
    views,
};

/// Score entry and removal routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/add_score/{category_id}", get(add_score_page).post(add_score))
        .route("/delete_scores/{category_id}", get(delete_scores))
        .route("/delete_score/{id}", get(delete_score))
}

/// Add Score form for one category.
pub async fn add_score_page(
    State(state): State<SharedState>,
    session: Session,
    Path(category_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let data = score_service::form_data(&state, &category_id).await?;
    let ctx = page(&state, &session, "Add Score").await?;
    Ok(views::leaderboard::add_score(&ctx, &data)?)
}

/// Record a run; a malformed time bounces back to the form.
pub async fn add_score(
    State(state): State<SharedState>,
    session: Session,
    Path(category_id): Path<String>,
    Form(form): Form<ScoreForm>,
) -> Result<Redirect, AppError> {
    match score_service::add(&state, &category_id, form).await {
        Ok(_) => Ok(done(&session, "Score added.", "/admin")),
        Err(err) => bounce(
            &session,
            err,
            &format!("/add_score/{}", to_path_segment(&category_id)),
        ),
    }
}

/// Every run of a category with delete links.
pub async fn delete_scores(
    State(state): State<SharedState>,
    session: Session,
    Path(category_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let scores = leaderboard_service::category_scores(&state, &category_id).await?;
    let ctx = page(&state, &session, "Delete Scores").await?;
    Ok(views::leaderboard::delete_scores(&ctx, &scores)?)
}

/// Archive and remove a single run.
pub async fn delete_score(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    score_service::delete(&state, &id).await?;
    Ok(done(&session, "Score deleted.", "/admin"))
}
