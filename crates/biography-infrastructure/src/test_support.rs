//! Seeding helpers for store tests.

use crate::sqlite_owner_directory::SqliteOwnerDirectory;
use biography_core::biography::OwnerProfile;
use sqlx::SqlitePool;

pub(crate) async fn insert_user(pool: &SqlitePool, id: &str, username: &str, avatar: Option<&str>) {
    SqliteOwnerDirectory::new(pool.clone())
        .upsert_profile(&OwnerProfile {
            id: id.to_string(),
            username: username.to_string(),
            display_name: None,
            avatar_url: avatar.map(str::to_string),
        })
        .await
        .unwrap();
}

/// Inserts a bare public biography row.
pub(crate) async fn insert_biography(pool: &SqlitePool, id: &str, user_id: &str, slug: &str) {
    sqlx::query(
        "INSERT INTO biographies (id, user_id, slug, name, visibility, created_at, updated_at) \
         VALUES (?, ?, ?, ?, 'public', '2025-01-01T00:00:00+00:00', '2025-01-01T00:00:00+00:00')",
    )
    .bind(id)
    .bind(user_id)
    .bind(slug)
    .bind(slug)
    .execute(pool)
    .await
    .unwrap();
}
