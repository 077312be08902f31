//! `/biographies` handlers.

use super::Data;
use crate::error::ApiError;
use crate::extract::{CurrentViewer, RequireUser, ValidQuery};
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use biography_application::ListRequest;
use biography_core::autosave::AutosaveOutcome;
use biography_core::biography::{Biography, BiographyInput, Page};
use biography_core::interaction::{BiographyStats, Comment, Follow, LikeOutcome};
use serde::{Deserialize, Serialize};

type ApiResult<T> = Result<T, ApiError>;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    ValidQuery(request): ValidQuery<ListRequest>,
) -> ApiResult<Json<Page<Biography>>> {
    Ok(Json(state.biographies.list(request, &viewer).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct FeaturedQuery {
    pub limit: Option<u32>,
}

pub async fn featured(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<FeaturedQuery>,
) -> ApiResult<Json<Data<Vec<Biography>>>> {
    let data = state.biographies.featured(query.limit).await?;
    Ok(Json(Data { data }))
}

pub async fn get_one(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(id): Path<String>,
) -> ApiResult<Json<Data<Biography>>> {
    let data = state.biographies.get(&id, &viewer).await?;
    Ok(Json(Data { data }))
}

pub async fn get_by_slug(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(slug): Path<String>,
) -> ApiResult<Json<Data<Biography>>> {
    let data = state.biographies.get_by_slug(&slug, &viewer).await?;
    Ok(Json(Data { data }))
}

pub async fn get_me(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> ApiResult<Json<Data<Option<Biography>>>> {
    let data = state.biographies.get_my(&user_id).await?;
    Ok(Json(Data { data }))
}

pub async fn create_or_update(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    payload: Result<Json<BiographyInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Data<Biography>>)> {
    let (data, created) = state
        .biographies
        .create_or_update(&user_id, body(payload)?)
        .await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(Data { data })))
}

pub async fn upsert_me(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    payload: Result<Json<BiographyInput>, JsonRejection>,
) -> ApiResult<Json<Data<Biography>>> {
    let (data, _) = state.biographies.upsert_my(&user_id, body(payload)?).await?;
    Ok(Json(Data { data }))
}

pub async fn autosave_me(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    payload: Result<Json<BiographyInput>, JsonRejection>,
) -> ApiResult<Json<AutosaveOutcome>> {
    let outcome = state.biographies.autosave(&user_id, body(payload)?).await?;
    Ok(Json(outcome))
}

pub async fn delete_me(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> ApiResult<StatusCode> {
    state.biographies.delete_my(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn follow(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<Data<Follow>>)> {
    let data = state.interactions.follow(&user_id, &id).await?;
    Ok((StatusCode::CREATED, Json(Data { data })))
}

pub async fn unfollow(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.interactions.unfollow(&user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct FollowStatus {
    pub following: bool,
}

pub async fn follow_status(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<String>,
) -> ApiResult<Json<FollowStatus>> {
    let following = state.interactions.follow_status(&user_id, &id).await?;
    Ok(Json(FollowStatus { following }))
}

pub async fn like(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<String>,
) -> ApiResult<Json<LikeOutcome>> {
    Ok(Json(state.interactions.toggle_like(&user_id, &id).await?))
}

pub async fn view(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.interactions.record_view(&viewer, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stats(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(id): Path<String>,
) -> ApiResult<Json<BiographyStats>> {
    Ok(Json(state.interactions.stats(&viewer, &id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CommentInput {
    pub content: String,
}

pub async fn list_comments(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(id): Path<String>,
) -> ApiResult<Json<Data<Vec<Comment>>>> {
    let data = state.interactions.list_comments(&viewer, &id).await?;
    Ok(Json(Data { data }))
}

pub async fn add_comment(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<String>,
    payload: Result<Json<CommentInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Data<Comment>>)> {
    let input = body(payload)?;
    let data = state.interactions.add_comment(&user_id, &id, &input.content).await?;
    Ok((StatusCode::CREATED, Json(Data { data })))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path((id, comment_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .interactions
        .delete_comment(&user_id, &id, &comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
