//! Viewer and query extraction.
//!
//! Authentication happens upstream; the gateway forwards the verified user
//! id in a configurable header. A missing or blank header is a guest.

use crate::error::ApiError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use biography_core::Viewer;
use serde::de::DeserializeOwned;

/// The viewer of the request, possibly a guest.
#[derive(Debug, Clone)]
pub struct CurrentViewer(pub Viewer);

/// The signed-in user's id. Rejects guests with 401.
#[derive(Debug, Clone)]
pub struct RequireUser(pub String);

/// [`Query`] whose rejection is a `validation_error` JSON body.
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

fn viewer_id(parts: &Parts, header: &str) -> Option<String> {
    parts
        .headers
        .get(header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentViewer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self(Viewer::from(viewer_id(parts, &state.viewer_header))))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        viewer_id(parts, &state.viewer_header)
            .map(Self)
            .ok_or(ApiError::Unauthorized)
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
    }
}
