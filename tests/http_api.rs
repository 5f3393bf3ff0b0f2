//! End-to-end behaviour of the router: content API, revalidation, sign-in, the admin gate, pages.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;
use serde_json::json;

async fn sign_in(app: &TestApp, state_param: &str) -> TestResponse {
    let uri = format!("/auth/google/callback?code=ok{}", state_param);
    get(&app.router, &uri).await
}

#[tokio::test]
async fn create_update_delete_round() {
    let app = test_app(ADMIN_EMAIL);
    let r = &app.router;

    let created = json_request(r, "POST", "/api/blogs", json!({"title": "Hello World", "status": "published"})).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let body = created.json();
    let id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["slug"], "hello-world");

    let missing_id = json_request(r, "PUT", "/api/blogs", json!({"title": "x"})).await;
    assert_eq!(missing_id.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_id.json()["error"], "ID is required");

    let unknown = json_request(r, "PUT", "/api/blogs", json!({"id": "nope", "title": "x"})).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let updated = json_request(r, "PUT", "/api/blogs", json!({"id": id, "excerpt": "short"})).await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["excerpt"], "short");

    let no_id = delete(r, "/api/blogs").await;
    assert_eq!(no_id.status, StatusCode::BAD_REQUEST);

    let deleted = delete(r, &format!("/api/blogs?id={}", id)).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json(), json!({"success": true}));

    let gone = get(r, "/api/blogs?slug=hello-world").await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.json()["error"], "Blog post not found");
}

#[tokio::test]
async fn get_multiplexes_on_query() {
    let app = test_app(ADMIN_EMAIL);
    let r = &app.router;
    json_request(r, "POST", "/api/projects", json!({"name": "Live", "status": "published", "tech_stack": ["rust"]})).await;
    json_request(r, "POST", "/api/projects", json!({"name": "Hidden"})).await;

    let public = get(r, "/api/projects").await.json();
    assert_eq!(public.as_array().unwrap().len(), 1);
    assert_eq!(public[0]["tech_stack"], json!(["rust"]));

    let admin = get(r, "/api/projects?admin=true").await.json();
    assert_eq!(admin.as_array().unwrap().len(), 2);

    let cards = get(r, "/api/projects?fields=card").await.json();
    assert_eq!(cards[0]["title"], "Live");
    assert!(cards[0].get("tech_stack").is_none());

    assert_eq!(get(r, "/api/projects?slug=hidden").await.status, StatusCode::NOT_FOUND);
    assert_eq!(get(r, "/api/projects?slug=hidden&admin=true").await.status, StatusCode::OK);
}

#[tokio::test]
async fn bad_bodies_are_client_errors() {
    let app = test_app(ADMIN_EMAIL);
    let req = Request::post("/api/services")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    assert_eq!(send(&app.router, req).await.status, StatusCode::BAD_REQUEST);

    let invalid = json_request(&app.router, "POST", "/api/services", json!({"title": "x", "status": "archived"})).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    json_request(&app.router, "POST", "/api/services", json!({"title": "Dup"})).await;
    let dup = json_request(&app.router, "POST", "/api/services", json!({"title": "Dup"})).await;
    assert_eq!(dup.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn revalidate_targets_path_and_listing() {
    let app = test_app(ADMIN_EMAIL);
    let res = json_request(&app.router, "POST", "/api/revalidate", json!({"path": "/blog/foo", "type": "post"})).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["revalidated"], true);
    assert!(body["now"].as_i64().unwrap() > 0);
    assert_eq!(app.revalidations.paths(), vec!["/blog/foo", "/blog", "/"]);

    let missing = json_request(&app.router, "POST", "/api/revalidate", json!({"type": "blog"})).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.json()["error"], "Path is required");
}

#[tokio::test]
async fn writes_revalidate_old_and_new_detail_pages() {
    let app = test_app(ADMIN_EMAIL);
    let created = json_request(&app.router, "POST", "/api/blogs", json!({"title": "Old", "status": "published"})).await;
    let id = created.json()["id"].as_str().unwrap().to_string();
    assert!(app.revalidations.paths().contains(&"/blog/old".to_string()));

    app.revalidations.clear();
    json_request(&app.router, "PUT", "/api/blogs", json!({"id": id, "slug": "new"})).await;
    let paths = app.revalidations.paths();
    assert!(paths.contains(&"/blog/old".to_string()));
    assert!(paths.contains(&"/blog/new".to_string()));
    assert!(paths.contains(&"/blog".to_string()));
}

#[tokio::test]
async fn start_redirects_to_provider_with_admin_state() {
    let app = test_app(ADMIN_EMAIL);
    let res = get(&app.router, "/auth/google?admin=true").await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    let location = res.location().unwrap();
    assert!(location.starts_with("https://accounts.test/auth"));
    assert!(location.contains("/auth/google/callback"));
    assert!(location.ends_with("state=admin"));
}

#[tokio::test]
async fn admin_sign_in_sets_cookie_and_lands_on_admin_dashboard() {
    let app = test_app(ADMIN_EMAIL);
    let res = sign_in(&app, "&state=admin").await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/dashboard/admin"));
    let cookie = res.set_cookie().unwrap();
    assert!(cookie.starts_with("admin-session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=604800"));

    let page = get_with_cookie(&app.router, "/dashboard/admin", &cookie_pair(cookie)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.text().contains("Signed in as Test User"));
}

#[tokio::test]
async fn non_admin_with_admin_intent_is_rejected_without_cookie() {
    let app = test_app("someone@example.com");
    let res = sign_in(&app, "&state=admin").await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/not-found"));
    assert!(res.set_cookie().is_none());
}

#[tokio::test]
async fn failed_exchanges_go_to_oauth_failed() {
    let app = test_app(ADMIN_EMAIL);
    for uri in [
        "/auth/google/callback?code=bad",
        "/auth/google/callback?error=access_denied",
        "/auth/google/callback",
    ] {
        let res = get(&app.router, uri).await;
        assert_eq!(res.location(), Some("/unauthorized?error=oauth_failed"), "{}", uri);
        assert!(res.set_cookie().is_none());
    }
}

#[tokio::test]
async fn gate_redirects_by_session_state() {
    let app = test_app("someone@example.com");

    let anonymous = get(&app.router, "/dashboard/admin").await;
    assert_eq!(anonymous.location(), Some("/auth/google?admin=true"));
    let nested = get(&app.router, "/udyomx-admin/posts").await;
    assert_eq!(nested.location(), Some("/auth/google?admin=true"));

    let garbage = get_with_cookie(&app.router, "/udyomx-admin", "admin-session=%7Bnot-json").await;
    assert_eq!(garbage.location(), Some("/unauthorized"));

    let user = sign_in(&app, "").await;
    assert_eq!(user.location(), Some("/dashboard"));
    let cookie = cookie_pair(user.set_cookie().unwrap());
    let denied = get_with_cookie(&app.router, "/dashboard/admin", &cookie).await;
    assert_eq!(denied.location(), Some("/dashboard"));

    let dashboard = get_with_cookie(&app.router, "/dashboard", &cookie).await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert!(!dashboard.text().contains("Manage content"));

    // Lookalike prefixes are not gated.
    let lookalike = get(&app.router, "/dashboard/administrator").await;
    assert_eq!(lookalike.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_and_signout() {
    let app = test_app(ADMIN_EMAIL);
    let empty = get(&app.router, "/api/auth/session").await;
    assert_eq!(empty.json(), json!({"session": null}));

    let signed = sign_in(&app, "&state=admin").await;
    let cookie = cookie_pair(signed.set_cookie().unwrap());
    let session = get_with_cookie(&app.router, "/api/auth/session", &cookie).await.json();
    assert_eq!(session["session"]["email"], ADMIN_EMAIL);
    assert_eq!(session["session"]["isAdmin"], true);

    let out = send(&app.router, Request::post("/api/auth/signout").body(Body::empty()).unwrap()).await;
    assert_eq!(out.status, StatusCode::OK);
    assert_eq!(out.json(), json!({"success": true}));
    let cleared = out.set_cookie().unwrap();
    assert!(cleared.starts_with("admin-session=;"));
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn api_write_invalidates_cached_listing() {
    let app = cached_app();
    let r = &app.router;
    json_request(r, "POST", "/api/blogs", json!({"title": "First Post", "status": "published"})).await;

    let listing = get(r, "/blog").await;
    assert_eq!(listing.status, StatusCode::OK);
    assert!(listing.text().contains("First Post"));
    assert!(app.state.pages.contains("/blog").await);

    json_request(r, "POST", "/api/blogs", json!({"title": "Second Post", "status": "published"})).await;
    assert!(!app.state.pages.contains("/blog").await);
    assert!(get(r, "/blog").await.text().contains("Second Post"));
}

#[tokio::test]
async fn detail_pages_hide_drafts_and_render_markdown() {
    let app = cached_app();
    let r = &app.router;
    json_request(
        r,
        "POST",
        "/api/services",
        json!({"title": "Audit", "status": "published", "content": "## Scope\n\nWe *check* everything."}),
    )
    .await;
    json_request(r, "POST", "/api/services", json!({"title": "Secret"})).await;

    let page = get(r, "/services/audit").await;
    assert_eq!(page.status, StatusCode::OK);
    let html = page.text();
    assert!(html.contains("<h2 id=\"scope\">Scope</h2>"));
    assert!(html.contains("<em>check</em>"));

    assert_eq!(get(r, "/services/secret").await.status, StatusCode::NOT_FOUND);
    assert_eq!(get(r, "/no/such/page").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sitemaps_list_only_indexable_published_content() {
    let app = test_app(ADMIN_EMAIL);
    let r = &app.router;
    json_request(r, "POST", "/api/services", json!({"title": "Visible", "status": "published"})).await;
    json_request(r, "POST", "/api/services", json!({"title": "Unlisted", "status": "published", "indexable": false})).await;
    json_request(r, "POST", "/api/services", json!({"title": "Draft"})).await;

    let xml = get(r, "/sitemap-services.xml").await;
    assert_eq!(xml.status, StatusCode::OK);
    let body = xml.text();
    assert!(body.contains("https://udyomx.test/services/visible"));
    assert!(!body.contains("/services/unlisted"));
    assert!(!body.contains("/services/draft"));

    let index = get(r, "/sitemap.xml").await.text();
    assert!(index.contains("https://udyomx.test/sitemap-blog.xml"));

    let robots = get(r, "/robots.txt").await.text();
    assert!(robots.contains("Sitemap: https://udyomx.test/sitemap.xml"));
}

#[tokio::test]
async fn null_status_is_a_bad_request_and_listing_still_works() {
    let app = test_app(ADMIN_EMAIL);
    let r = &app.router;
    let bad = json_request(r, "POST", "/api/blogs", json!({"title": "Bad", "status": null})).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    let created = json_request(r, "POST", "/api/blogs", json!({"title": "Fine"})).await;
    let id = created.json()["id"].as_str().unwrap().to_string();
    let bad = json_request(r, "PUT", "/api/blogs", json!({"id": id, "status": null})).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    let bad = json_request(r, "POST", "/api/services", json!({"title": "S", "indexable": null})).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    let admin = get(r, "/api/blogs?admin=true").await;
    assert_eq!(admin.status, StatusCode::OK);
    assert_eq!(admin.json().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_id_with_taken_slug_is_not_found() {
    let app = test_app(ADMIN_EMAIL);
    let r = &app.router;
    json_request(r, "POST", "/api/blogs", json!({"title": "Taken"})).await;
    let res = json_request(r, "PUT", "/api/blogs", json!({"id": "no-such-id", "slug": "taken"})).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_client_id_is_a_bad_request() {
    let app = test_app(ADMIN_EMAIL);
    let r = &app.router;
    let first = json_request(r, "POST", "/api/projects", json!({"id": "p-1", "name": "One"})).await;
    assert_eq!(first.status, StatusCode::CREATED);
    let again = json_request(r, "POST", "/api/projects", json!({"id": "p-1", "name": "Two"})).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.json()["error"], "id 'p-1' already exists");
}

#[tokio::test]
async fn session_cookie_in_a_second_cookie_header_is_honoured() {
    let app = test_app(ADMIN_EMAIL);
    let signed = sign_in(&app, "&state=admin").await;
    let cookie = cookie_pair(signed.set_cookie().unwrap());
    let req = Request::get("/dashboard/admin")
        .header(header::COOKIE, "theme=dark")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    let res = send(&app.router, req).await;
    assert_eq!(res.status, StatusCode::OK);
}
