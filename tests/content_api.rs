//! Content facade behaviour over the in-memory store.

use serde_json::{json, Value};
use std::sync::Arc;
use udyomx_site::content::{BlogApi, ContentApi, Post, ProjectApi, ServiceApi, Status};
use udyomx_site::store::{ContentStore, Row};
use udyomx_site::{ContentError, MemoryContentStore};

fn store() -> Arc<dyn ContentStore> {
    Arc::new(MemoryContentStore::new())
}

fn row(v: Value) -> Row {
    v.as_object().cloned().unwrap()
}

async fn seed_posts(api: &BlogApi) {
    for (slug, status) in [("first", "published"), ("second", "draft"), ("third", "published")] {
        api.create(row(json!({"title": slug, "slug": slug, "status": status, "content": "# Hi"})))
            .await
            .unwrap();
    }
}

fn ids(posts: &[Post]) -> Vec<String> {
    posts.iter().map(|p| p.id.clone()).collect()
}

#[tokio::test]
async fn get_all_is_exactly_the_published_subset_of_admin() {
    let api: BlogApi = ContentApi::new(store());
    seed_posts(&api).await;

    let public = api.get_all().await.unwrap();
    let admin = api.get_all_admin().await.unwrap();
    assert_eq!(public.len(), 2);
    assert_eq!(admin.len(), 3);
    assert!(public.iter().all(|p| p.status == Status::Published));
    let admin_ids = ids(&admin);
    assert!(ids(&public).iter().all(|id| admin_ids.contains(id)));
    let published_in_admin: Vec<_> = admin
        .iter()
        .filter(|p| p.status == Status::Published)
        .map(|p| p.id.clone())
        .collect();
    assert_eq!(ids(&public), published_in_admin);
}

#[tokio::test]
async fn cards_match_get_all_ids_and_order() {
    let api: BlogApi = ContentApi::new(store());
    seed_posts(&api).await;

    let full = api.get_all().await.unwrap();
    let cards = api.get_all_for_cards().await.unwrap();
    let card_ids: Vec<_> = cards.iter().map(|c| c.id.clone()).collect();
    assert_eq!(card_ids, ids(&full));
    assert!(cards.iter().all(|c| c.date.is_some()));
}

#[tokio::test]
async fn most_recently_updated_comes_first() {
    let api: BlogApi = ContentApi::new(store());
    seed_posts(&api).await;
    let first = api.get_by_slug("first").await.unwrap().unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    api.update(&first.id, row(json!({"excerpt": "bumped"}))).await.unwrap();

    let all = api.get_all().await.unwrap();
    assert_eq!(all[0].slug, "first");
    assert_eq!(all[0].excerpt.as_deref(), Some("bumped"));
}

#[tokio::test]
async fn unknown_slug_is_none_not_error() {
    let api: ProjectApi = ContentApi::new(store());
    assert!(api.get_by_slug("missing").await.unwrap().is_none());
    assert!(api.get_by_slug_admin("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn update_unknown_id_is_none_and_delete_is_idempotent() {
    let api: ServiceApi = ContentApi::new(store());
    let r = api.update("nope", row(json!({"title": "x"}))).await.unwrap();
    assert!(r.is_none());
    api.delete("nope").await.unwrap();

    let s = api
        .create(row(json!({"title": "SEO Audit", "status": "published"})))
        .await
        .unwrap();
    api.delete(&s.id).await.unwrap();
    api.delete(&s.id).await.unwrap();
    assert!(api.get_all_admin().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_fills_id_slug_and_defaults() {
    let api: ServiceApi = ContentApi::new(store());
    let s = api.create(row(json!({"title": "Web Design & SEO"}))).await.unwrap();
    assert_eq!(s.slug, "web-design-seo");
    assert!(uuid::Uuid::parse_str(&s.id).is_ok());
    assert_eq!(s.status, Status::Draft);
    assert!(s.indexable);
    assert!(s.tags.is_empty());

    let supplied = api
        .create(row(json!({"id": "svc-1", "title": "Hosting", "is_published": true})))
        .await
        .unwrap();
    assert_eq!(supplied.id, "svc-1");
    assert_eq!(supplied.status, Status::Published);
}

#[tokio::test]
async fn invalid_bodies_and_duplicate_slugs_are_rejected() {
    let api: BlogApi = ContentApi::new(store());
    let err = api.create(row(json!({"slug": "no-title"}))).await.unwrap_err();
    assert!(matches!(err, ContentError::Invalid(_)));

    let err = api
        .create(row(json!({"title": "x", "status": "archived"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ContentError::Invalid(_)));

    api.create(row(json!({"title": "Same"}))).await.unwrap();
    let err = api.create(row(json!({"title": "Same"}))).await.unwrap_err();
    assert!(matches!(err, ContentError::DuplicateSlug(ref s) if s == "same"));
}

#[tokio::test]
async fn draft_becomes_visible_once_published() {
    let api: BlogApi = ContentApi::new(store());
    let draft = api
        .create(row(json!({"title": "Launch notes", "status": "draft"})))
        .await
        .unwrap();
    assert!(api.get_by_slug("launch-notes").await.unwrap().is_none());
    assert!(api.get_by_slug_admin("launch-notes").await.unwrap().is_some());
    assert!(api.get_all().await.unwrap().is_empty());

    let published = api
        .update(&draft.id, row(json!({"status": "published"})))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(published.status, Status::Published);
    assert!(published.updated_at >= draft.updated_at);
    assert_eq!(api.get_by_slug("launch-notes").await.unwrap().unwrap().id, draft.id);
    assert_eq!(ids(&api.get_all().await.unwrap()), vec![draft.id]);
}

#[tokio::test]
async fn null_for_required_columns_is_rejected_and_nothing_is_stored() {
    let api: BlogApi = ContentApi::new(store());
    let err = api
        .create(row(json!({"title": "Bad", "status": null})))
        .await
        .unwrap_err();
    assert!(matches!(err, ContentError::Invalid(_)));
    assert!(api.get_all_admin().await.unwrap().is_empty());

    let ok = api.create(row(json!({"title": "Good"}))).await.unwrap();
    let err = api.update(&ok.id, row(json!({"status": null}))).await.unwrap_err();
    assert!(matches!(err, ContentError::Invalid(_)));
    assert_eq!(api.get_all_admin().await.unwrap()[0].status, Status::Draft);

    let services: ServiceApi = ContentApi::new(store());
    let err = services
        .create(row(json!({"title": "S", "indexable": null})))
        .await
        .unwrap_err();
    assert!(matches!(err, ContentError::Invalid(_)));
}

#[tokio::test]
async fn update_of_unknown_id_with_taken_slug_is_none() {
    let api: BlogApi = ContentApi::new(store());
    api.create(row(json!({"title": "Taken"}))).await.unwrap();
    let r = api.update("no-such-id", row(json!({"slug": "taken"}))).await.unwrap();
    assert!(r.is_none());
}

#[tokio::test]
async fn duplicate_client_id_is_invalid() {
    let api: ProjectApi = ContentApi::new(store());
    api.create(row(json!({"id": "p-1", "name": "One"}))).await.unwrap();
    let err = api
        .create(row(json!({"id": "p-1", "name": "Two"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ContentError::Invalid(_)));
    assert_eq!(api.get_by_id("p-1").await.unwrap().unwrap().name, "One");
    assert!(api.get_by_id("p-2").await.unwrap().is_none());
}
