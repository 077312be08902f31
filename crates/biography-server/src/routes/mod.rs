mod badges;
mod biographies;

use crate::state::AppState;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use biography_core::badge::BADGE_TABLE_VERSION;
use biography_core::content::catalogue::CATALOGUE_VERSION;
use serde::Serialize;
use tower_http::trace::TraceLayer;

/// `{ "data": ... }` response envelope.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/biographies",
            get(biographies::list).post(biographies::create_or_update),
        )
        .route("/biographies/featured", get(biographies::featured))
        .route(
            "/biographies/me",
            get(biographies::get_me)
                .put(biographies::upsert_me)
                .delete(biographies::delete_me),
        )
        .route("/biographies/me/autosave", put(biographies::autosave_me))
        .route("/biographies/slug/:slug", get(biographies::get_by_slug))
        .route("/biographies/:id", get(biographies::get_one))
        .route(
            "/biographies/:id/follow",
            get(biographies::follow_status)
                .post(biographies::follow)
                .delete(biographies::unfollow),
        )
        .route("/biographies/:id/like", post(biographies::like))
        .route("/biographies/:id/view", put(biographies::view))
        .route("/biographies/:id/stats", get(biographies::stats))
        .route(
            "/biographies/:id/comments",
            get(biographies::list_comments).post(biographies::add_comment),
        )
        .route(
            "/biographies/:id/comments/:comment_id",
            delete(biographies::delete_comment),
        )
        .route("/badges/me", get(badges::mine))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    catalogue_version: u32,
    badge_table_version: u32,
}

async fn healthz() -> Json<Health> {
    Json(Health {
        status: "ok",
        catalogue_version: CATALOGUE_VERSION,
        badge_table_version: BADGE_TABLE_VERSION,
    })
}
