use super::*;
use crate::test_support::{BrokenCache, Harness, t0};
use biography_core::biography::BiographyInput;
use biography_core::cache::CacheStore;
use biography_core::content::ContentItem;
use biography_core::event::BiographyEvent;
use biography_core::{BiographyError, Viewer, Visibility};
use chrono::Duration;
use serde_json::{Value, json};
use std::sync::Arc;

fn input(value: Value) -> BiographyInput {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_create_or_update_requires_name() {
    let h = Harness::new().await;
    h.add_user("u1", "alice", None).await;

    let err = h
        .biographies
        .create_or_update("u1", input(json!({ "bio": "hi" })))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = h
        .biographies
        .create_or_update("u1", input(json!({ "name": "   " })))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_create_or_update_creates_private_then_updates() {
    let h = Harness::new().await;
    h.add_user("u1", "Alice Wang", None).await;

    let (created, was_created) = h
        .biographies
        .create_or_update("u1", input(json!({ "name": "Alice", "is_featured": true })))
        .await
        .unwrap();
    assert!(was_created);
    assert_eq!(created.visibility, Visibility::Private);
    assert_eq!(created.slug, "alice-wang");
    assert!(created.is_featured);
    assert!(created.published_at.is_none());

    let (updated, was_created) = h
        .biographies
        .create_or_update("u1", input(json!({ "name": "Alice W.", "title": "Boulderer" })))
        .await
        .unwrap();
    assert!(!was_created);
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Alice W.");
    assert_eq!(updated.title.as_deref(), Some("Boulderer"));
}

#[tokio::test]
async fn test_upsert_my_defaults_to_public_and_publishes() {
    let h = Harness::new().await;
    h.add_user("u1", "alice", Some("Alice Chen")).await;

    let (created, was_created) = h
        .biographies
        .upsert_my("u1", input(json!({ "bio": "Crimper", "is_featured": true })))
        .await
        .unwrap();

    assert!(was_created);
    assert_eq!(created.visibility, Visibility::Public);
    assert_eq!(created.name, "Alice Chen");
    assert!(!created.is_featured);
    assert_eq!(created.published_at, Some(t0()));
    assert_eq!(
        h.events.events(),
        vec![BiographyEvent::Published {
            biography_id: created.id.clone(),
            user_id: "u1".into(),
        }]
    );
}

#[tokio::test]
async fn test_upsert_my_with_nothing_to_update_keeps_record() {
    let h = Harness::new().await;
    h.add_user("u1", "alice", None).await;
    let (created, _) = h.biographies.upsert_my("u1", input(json!({}))).await.unwrap();
    assert_eq!(created.name, "alice");

    h.clock.advance(Duration::minutes(1));
    let (same, was_created) = h.biographies.upsert_my("u1", input(json!({}))).await.unwrap();
    assert!(!was_created);
    assert_eq!(same.updated_at, created.updated_at);
}

#[tokio::test]
async fn test_missing_profile_is_dependency_inconsistency() {
    let h = Harness::new().await;
    let err = h
        .biographies
        .upsert_my("ghost", input(json!({ "bio": "?" })))
        .await
        .unwrap_err();
    assert!(matches!(err, BiographyError::DependencyInconsistency(_)));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_taken_slug_gets_suffix() {
    let h = Harness::new().await;
    h.add_user("u1", "Alex Lee", None).await;
    h.add_user("u2", "alex-lee", None).await;

    let (first, _) = h.biographies.upsert_my("u1", input(json!({}))).await.unwrap();
    let (second, _) = h.biographies.upsert_my("u2", input(json!({}))).await.unwrap();

    assert_eq!(first.slug, "alex-lee");
    assert_ne!(second.slug, first.slug);
    assert!(second.slug.starts_with("alex-lee-"));
    assert_eq!(second.slug.len(), "alex-lee-".len() + 6);

    h.add_user("u3", "ALEX_LEE", None).await;
    let (third, _) = h.biographies.upsert_my("u3", input(json!({}))).await.unwrap();
    assert!(third.slug.starts_with("alex-lee-"));
    assert_ne!(third.slug, second.slug);
}

#[tokio::test]
async fn test_content_accepts_string_and_object_payloads() {
    let h = Harness::new().await;
    h.add_user("u1", "alice", None).await;

    let one_liners = json!({
        "climbing_origin": { "answer": "  A school trip  " },
        "style": { "answer": "Slab", "visibility": "private" },
    })
    .to_string();
    h.biographies
        .upsert_my(
            "u1",
            input(json!({
                "one_liners_data": one_liners,
                "stories_data": { "growth": { "memorable_moment": { "answer": "First 7a" } } },
                "tags_data": "not json {",
            })),
        )
        .await
        .unwrap();

    let mine = h.biographies.get_my("u1").await.unwrap().unwrap();
    let one_liners = mine.one_liners.unwrap();
    assert_eq!(
        one_liners["climbing_origin"],
        ContentItem {
            answer: "A school trip".into(),
            visibility: Visibility::Public,
        }
    );
    assert_eq!(one_liners["style"].visibility, Visibility::Private);
    assert_eq!(
        mine.stories.unwrap()["growth"]["memorable_moment"].answer,
        "First 7a"
    );
    assert!(mine.tags_data.is_none());
}

#[tokio::test]
async fn test_publish_stamp_is_set_once() {
    let h = Harness::new().await;
    h.add_user("u1", "alice", None).await;
    h.biographies
        .create_or_update("u1", input(json!({ "name": "Alice" })))
        .await
        .unwrap();

    h.clock.advance(Duration::hours(1));
    let (public, _) = h
        .biographies
        .upsert_my("u1", input(json!({ "visibility": "public" })))
        .await
        .unwrap();
    let stamped = public.published_at.unwrap();
    assert_eq!(stamped, t0() + Duration::hours(1));

    h.clock.advance(Duration::hours(1));
    h.biographies
        .upsert_my("u1", input(json!({ "visibility": "community" })))
        .await
        .unwrap();
    h.clock.advance(Duration::hours(1));
    let (again, _) = h
        .biographies
        .upsert_my("u1", input(json!({ "visibility": "public" })))
        .await
        .unwrap();

    assert_eq!(again.published_at, Some(stamped));
    let published = h
        .events
        .events()
        .into_iter()
        .filter(|e| matches!(e, BiographyEvent::Published { .. }))
        .count();
    assert_eq!(published, 1);
}

#[tokio::test]
async fn test_visibility_matrix_on_reads() {
    let h = Harness::new().await;
    h.add_user("owner", "owner", None).await;
    h.add_user("other", "other", None).await;

    let guest = Viewer::guest();
    let other = Viewer::user("other");
    let owner = Viewer::user("owner");

    for (visibility, guest_reads, other_reads) in [
        ("public", true, true),
        ("anonymous", true, true),
        ("community", false, true),
        ("private", false, false),
    ] {
        let (bio, _) = h
            .biographies
            .upsert_my("owner", input(json!({ "visibility": visibility })))
            .await
            .unwrap();

        for (viewer, expected) in [(&guest, guest_reads), (&other, other_reads), (&owner, true)] {
            let by_id = h.biographies.get(&bio.id, viewer).await;
            let by_slug = h.biographies.get(&bio.slug, viewer).await;
            assert_eq!(by_id.is_ok(), expected, "{visibility} by id for {viewer:?}");
            assert_eq!(by_slug.is_ok(), expected, "{visibility} by slug for {viewer:?}");
            if !expected {
                assert!(by_id.unwrap_err().is_not_found());
            }
        }
    }
}

#[tokio::test]
async fn test_anonymous_record_is_masked_for_non_owners() {
    let h = Harness::new().await;
    h.add_user("u1", "alice", Some("Alice Chen")).await;
    let (bio, _) = h
        .biographies
        .upsert_my(
            "u1",
            input(json!({
                "name": "Alice",
                "bio": "Sport climber",
                "visibility": "anonymous",
                "one_liners_data": { "climbing_origin": { "answer": "Gym" } },
            })),
        )
        .await
        .unwrap();

    let masked = h.biographies.get(&bio.id, &Viewer::guest()).await.unwrap();
    assert_eq!(masked.name, "匿名岩友");
    assert!(masked.user_id.is_none());
    assert!(masked.avatar_url.is_none());
    assert!(masked.owner_username.is_none());
    assert_eq!(masked.bio.as_deref(), Some("Sport climber"));
    assert_eq!(masked.one_liners.unwrap()["climbing_origin"].answer, "Gym");

    let own = h.biographies.get(&bio.slug, &Viewer::user("u1")).await.unwrap();
    assert_eq!(own.name, "Alice");
    assert_eq!(own.user_id.as_deref(), Some("u1"));
    assert!(own.avatar_url.is_some());
}

#[tokio::test]
async fn test_autosave_throttles_within_interval() {
    let h = Harness::new().await;
    h.add_user("u1", "alice", None).await;

    let first = h
        .biographies
        .autosave("u1", input(json!({ "tags_data": ["boulder"] })))
        .await
        .unwrap();
    assert!(!first.throttled);
    assert_eq!(first.autosave_at, Some(t0()));

    h.clock.advance(Duration::milliseconds(500));
    let second = h
        .biographies
        .autosave("u1", input(json!({ "tags_data": ["sport"] })))
        .await
        .unwrap();
    assert!(second.throttled);
    assert_eq!(second.autosave_at, Some(t0()));

    let stored = h.biographies.get_my("u1").await.unwrap().unwrap();
    assert_eq!(stored.autosave_at, Some(t0()));
    assert_eq!(stored.tags_data, Some(json!(["boulder"])));

    h.clock.set(t0() + Duration::milliseconds(2_100));
    let third = h
        .biographies
        .autosave("u1", input(json!({ "tags_data": ["trad"] })))
        .await
        .unwrap();
    assert!(!third.throttled);
    assert_eq!(third.autosave_at, Some(t0() + Duration::milliseconds(2_100)));

    let stored = h.biographies.get_my("u1").await.unwrap().unwrap();
    assert_eq!(stored.autosave_at, Some(t0() + Duration::milliseconds(2_100)));
    assert_eq!(stored.tags_data, Some(json!(["trad"])));
}

#[tokio::test]
async fn test_autosave_only_writes_allowed_columns() {
    let h = Harness::new().await;
    h.add_user("u1", "alice", None).await;
    h.biographies
        .create_or_update("u1", input(json!({ "name": "Alice" })))
        .await
        .unwrap();

    h.biographies
        .autosave(
            "u1",
            input(json!({
                "name": "Overwritten",
                "visibility": "public",
                "basic_info_data": { "years": 4 },
                "stories_data": { "dreams": { "dream_route": { "answer": "The Nose" } } },
            })),
        )
        .await
        .unwrap();

    let stored = h.biographies.get_my("u1").await.unwrap().unwrap();
    assert_eq!(stored.name, "Alice");
    assert_eq!(stored.visibility, Visibility::Private);
    assert_eq!(stored.basic_info_data, Some(json!({ "years": 4 })));
    assert_eq!(stored.stories.unwrap()["dreams"]["dream_route"].answer, "The Nose");
}

#[tokio::test]
async fn test_update_to_private_invalidates_cached_detail() {
    let h = Harness::new().await;
    h.add_user("u1", "alice", None).await;
    let (bio, _) = h
        .biographies
        .upsert_my("u1", input(json!({ "name": "Alice" })))
        .await
        .unwrap();

    h.biographies.get(&bio.slug, &Viewer::guest()).await.unwrap();
    assert!(
        h.cache
            .get(&BiographyCache::detail_key(&bio.slug))
            .await
            .unwrap()
            .is_some()
    );

    h.biographies
        .upsert_my("u1", input(json!({ "visibility": "private" })))
        .await
        .unwrap();

    let err = h.biographies.get(&bio.slug, &Viewer::guest()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_stale_public_entry_is_not_served_after_going_private() {
    let h = Harness::new().await;
    h.add_user("u1", "alice", None).await;
    let (bio, _) = h
        .biographies
        .upsert_my("u1", input(json!({ "name": "Alice" })))
        .await
        .unwrap();

    let key = BiographyCache::detail_key(&bio.slug);
    h.biographies.get_by_slug(&bio.slug, &Viewer::guest()).await.unwrap();
    let snapshot = h.cache.get(&key).await.unwrap().unwrap();

    h.biographies
        .upsert_my("u1", input(json!({ "visibility": "private" })))
        .await
        .unwrap();
    // A missed invalidation leaves the old public snapshot behind.
    h.cache
        .put(&key, snapshot, std::time::Duration::from_secs(60))
        .await
        .unwrap();

    let err = h
        .biographies
        .get_by_slug(&bio.slug, &Viewer::guest())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(h.cache.get(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn test_public_entry_is_served_from_cache() {
    let h = Harness::new().await;
    h.add_user("u1", "alice", None).await;
    let (bio, _) = h
        .biographies
        .upsert_my("u1", input(json!({ "name": "Alice" })))
        .await
        .unwrap();

    let mut cached = h.biographies.get_by_slug(&bio.slug, &Viewer::guest()).await.unwrap();
    cached.name = "Alice (cached)".into();
    h.cache
        .put(
            &BiographyCache::detail_key(&bio.slug),
            serde_json::to_string(&cached).unwrap(),
            std::time::Duration::from_secs(60),
        )
        .await
        .unwrap();

    let read = h.biographies.get_by_slug(&bio.slug, &Viewer::guest()).await.unwrap();
    assert_eq!(read.name, "Alice (cached)");
    let read = h.biographies.get_by_slug(&bio.slug, &Viewer::user("u1")).await.unwrap();
    assert_eq!(read.name, "Alice");
}

#[tokio::test]
async fn test_cache_failures_are_absorbed() {
    let h = Harness::with_cache(Some(Arc::new(BrokenCache))).await;
    h.add_user("u1", "alice", None).await;

    let (bio, _) = h
        .biographies
        .upsert_my("u1", input(json!({ "name": "Alice", "is_featured": true })))
        .await
        .unwrap();
    let read = h.biographies.get(&bio.slug, &Viewer::guest()).await.unwrap();
    assert_eq!(read.name, "Alice");
    h.biographies.featured(Some(6)).await.unwrap();
    h.biographies.delete_my("u1").await.unwrap();
}

#[tokio::test]
async fn test_featured_list_is_cached_and_invalidated() {
    let h = Harness::new().await;
    h.add_user("u1", "alice", None).await;
    let (bio, _) = h
        .biographies
        .create_or_update(
            "u1",
            input(json!({ "name": "Alice", "visibility": "public", "is_featured": true })),
        )
        .await
        .unwrap();

    let featured = h.biographies.featured(Some(3)).await.unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0].id, bio.id);
    let key = BiographyCache::featured_key(3);
    assert!(h.cache.get(&key).await.unwrap().is_some());

    h.biographies
        .create_or_update("u1", input(json!({ "name": "Alice", "is_featured": false })))
        .await
        .unwrap();
    assert!(h.cache.get(&key).await.unwrap().is_none());
    assert!(h.biographies.featured(Some(3)).await.unwrap().is_empty());

    h.biographies.featured(Some(4)).await.unwrap();
    assert!(
        h.cache
            .get(&BiographyCache::featured_key(4))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_list_filters_masks_and_paginates() {
    let h = Harness::new().await;
    for (user, visibility) in [
        ("u1", "public"),
        ("u2", "anonymous"),
        ("u3", "community"),
        ("u4", "private"),
    ] {
        h.add_user(user, user, None).await;
        h.biographies
            .upsert_my(user, input(json!({ "name": user, "visibility": visibility })))
            .await
            .unwrap();
    }

    let page = h
        .biographies
        .list(ListRequest::default(), &Viewer::guest())
        .await
        .unwrap();
    assert_eq!(page.pagination.total, 2);
    assert!(page.data.iter().all(|b| b.name != "u2"));
    assert!(page.data.iter().any(|b| b.name == "匿名岩友"));

    let page = h
        .biographies
        .list(
            ListRequest {
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            },
            &Viewer::user("u4"),
        )
        .await
        .unwrap();
    assert_eq!(page.pagination.total, 4);
    assert_eq!(page.pagination.total_pages, 2);
    assert_eq!(page.data.len(), 2);
}

#[tokio::test]
async fn test_delete_my_releases_own_images() {
    let h = Harness::new().await;
    h.add_user("u1", "alice", None).await;
    let (bio, _) = h
        .biographies
        .upsert_my(
            "u1",
            input(json!({
                "cover_image": "https://img.example/cover.png",
                "one_liners_data": { "style": { "answer": "Slab" } },
            })),
        )
        .await
        .unwrap();

    h.biographies.delete_my("u1").await.unwrap();

    assert_eq!(h.media.released(), vec!["https://img.example/cover.png".to_string()]);
    assert!(h.biographies.get_my("u1").await.unwrap().is_none());
    assert!(h.events.events().contains(&BiographyEvent::Deleted {
        biography_id: bio.id.clone(),
        user_id: "u1".into(),
    }));
    assert!(h.biographies.delete_my("u1").await.unwrap_err().is_not_found());

    let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM biography_one_liners")
        .fetch_one(&h.pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}
