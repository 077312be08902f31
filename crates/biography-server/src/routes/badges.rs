use super::Data;
use crate::error::ApiError;
use crate::extract::RequireUser;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use biography_core::badge::BadgeProgress;

/// Records any newly crossed thresholds, then reports progress.
pub async fn mine(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<Data<Vec<BadgeProgress>>>, ApiError> {
    let data = state.badges.refresh(&user_id).await?;
    Ok(Json(Data { data }))
}
