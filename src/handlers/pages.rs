//! Server-rendered HTML pages.
//!
//! Public pages are rendered without any per-user content and served through the page cache.
//! Dashboard pages read the session and are rendered on every request.

use crate::auth::context::AuthContext;
use crate::content::{Content, ContentCard, EntitySummary, Post, Project, Service};
use crate::error::{AppError, ContentResultExt};
use crate::extractors::Session;
use crate::markdown::{self, escape_html};
use crate::response;
use crate::schema::ContentKind;
use crate::state::AppState;
use crate::store::Scope;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::fmt::Write;

const SITE_NAME: &str = "Udyomx";
const HOME_CARDS: usize = 3;

struct Meta<'a> {
    title: &'a str,
    description: Option<&'a str>,
    canonical: Option<String>,
    image: Option<&'a str>,
}

fn layout(meta: &Meta<'_>, body: &str) -> String {
    let mut head = String::new();
    let _ = write!(head, "<title>{}</title>", escape_html(meta.title));
    if let Some(d) = meta.description {
        let _ = write!(head, "<meta name=\"description\" content=\"{}\">", escape_html(d));
        let _ = write!(head, "<meta property=\"og:description\" content=\"{}\">", escape_html(d));
    }
    let _ = write!(head, "<meta property=\"og:title\" content=\"{}\">", escape_html(meta.title));
    if let Some(c) = &meta.canonical {
        let _ = write!(head, "<link rel=\"canonical\" href=\"{}\">", escape_html(c));
    }
    if let Some(i) = meta.image {
        let _ = write!(head, "<meta property=\"og:image\" content=\"{}\">", escape_html(i));
    }
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">{head}</head>\n\
         <body>\n<header><nav><a href=\"/\">{site}</a> <a href=\"/blog\">Blog</a> \
         <a href=\"/projects\">Projects</a> <a href=\"/services\">Services</a></nav></header>\n\
         <main>\n{body}</main>\n</body>\n</html>\n",
        head = head,
        site = SITE_NAME,
        body = body
    )
}

fn page_title(title: &str) -> String {
    format!("{} | {}", title, SITE_NAME)
}

fn card_grid(kind: ContentKind, cards: &[ContentCard], out: &mut String) {
    if cards.is_empty() {
        out.push_str("<p class=\"empty\">Nothing here yet.</p>\n");
        return;
    }
    out.push_str("<ul class=\"cards\">\n");
    for c in cards {
        let _ = write!(
            out,
            "<li><a href=\"{}\"><h3>{}</h3></a>",
            escape_html(&kind.detail_path(&c.slug)),
            escape_html(&c.title)
        );
        if let Some(cat) = &c.category {
            let _ = write!(out, "<span class=\"category\">{}</span>", escape_html(cat));
        }
        if let Some(d) = &c.date {
            let _ = write!(out, "<time datetime=\"{}\">{}</time>", d.to_rfc3339(), d.format("%B %-d, %Y"));
        }
        if let Some(e) = &c.excerpt {
            let _ = write!(out, "<p>{}</p>", escape_html(e));
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");
}

fn listing_heading(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Post => "Blog",
        ContentKind::Project => "Projects",
        ContentKind::Service => "Services",
    }
}

async fn render_home(state: &AppState) -> Result<String, AppError> {
    let mut body = String::from("<h1>Udyomx</h1>\n");
    for kind in ContentKind::ALL {
        let cards = match kind {
            ContentKind::Post => state.api::<Post>().get_all_for_cards().await,
            ContentKind::Project => state.api::<Project>().get_all_for_cards().await,
            ContentKind::Service => state.api::<Service>().get_all_for_cards().await,
        }
        .or_failed_to("render home page")?;
        let _ = writeln!(
            body,
            "<section><h2><a href=\"{}\">{}</a></h2>",
            kind.listing_path(),
            listing_heading(kind)
        );
        card_grid(kind, &cards[..cards.len().min(HOME_CARDS)], &mut body);
        body.push_str("</section>\n");
    }
    let meta = Meta {
        title: SITE_NAME,
        description: Some("Articles, projects and services from Udyomx."),
        canonical: Some(format!("{}/", state.settings.site_url)),
        image: None,
    };
    Ok(layout(&meta, &body))
}

async fn render_listing<T: Content>(state: &AppState) -> Result<String, AppError> {
    let kind = T::KIND;
    let cards = state
        .api::<T>()
        .get_all_for_cards()
        .await
        .or_failed_to(&format!("render {}", kind.plural()))?;
    let mut body = format!("<h1>{}</h1>\n", listing_heading(kind));
    card_grid(kind, &cards, &mut body);
    let title = page_title(listing_heading(kind));
    let meta = Meta {
        title: &title,
        description: None,
        canonical: Some(format!("{}{}", state.settings.site_url, kind.listing_path())),
        image: None,
    };
    Ok(layout(&meta, &body))
}

async fn render_detail<T: Content>(state: &AppState, slug: &str) -> Result<String, AppError> {
    let kind = T::KIND;
    let entity = state
        .api::<T>()
        .get_by_slug(slug)
        .await
        .or_failed_to(&format!("render {}", kind))?
        .ok_or_else(|| AppError::NotFound(kind.detail_path(slug)))?;
    let summary = entity.summary();
    let doc = markdown::parse(entity.body().unwrap_or_default());
    let seo = entity.seo();

    let mut body = format!("<article>\n<h1>{}</h1>\n", escape_html(&summary.title));
    let toc = doc.toc();
    if toc.len() > 1 {
        body.push_str("<nav class=\"toc\"><ol>\n");
        for t in &toc {
            let _ = writeln!(
                body,
                "<li class=\"toc-{}\"><a href=\"#{}\">{}</a></li>",
                t.level,
                escape_html(&t.id),
                escape_html(&t.title)
            );
        }
        body.push_str("</ol></nav>\n");
    }
    body.push_str(&markdown::render(&doc));
    body.push_str("</article>\n");

    let title = page_title(seo.seo_title.as_deref().unwrap_or(&summary.title));
    let fallback = doc.summary(160);
    let description = seo
        .seo_description
        .as_deref()
        .or(entity.excerpt())
        .or(fallback.as_deref());
    let meta = Meta {
        title: &title,
        description,
        canonical: Some(
            seo.canonical_url
                .clone()
                .unwrap_or_else(|| format!("{}{}", state.settings.site_url, summary.path())),
        ),
        image: seo.og_image.as_deref(),
    };
    Ok(layout(&meta, &body))
}

fn not_found_html() -> Response {
    let meta = Meta {
        title: "Page not found",
        description: None,
        canonical: None,
        image: None,
    };
    let body = "<h1>Page not found</h1>\n<p>The page you are looking for does not exist.</p>\n<a href=\"/\">Home</a>\n";
    response::html(StatusCode::NOT_FOUND, layout(&meta, body), false)
}

fn error_html(e: AppError) -> Response {
    if let AppError::NotFound(_) = e {
        return not_found_html();
    }
    // Logs the source; the body is replaced below.
    let status = e.into_response().status();
    let meta = Meta {
        title: "Something went wrong",
        description: None,
        canonical: None,
        image: None,
    };
    response::html(status, layout(&meta, "<h1>Something went wrong</h1>\n"), false)
}

async fn cached_page<F, Fut>(state: &AppState, path: &str, render: F) -> Response
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<String, AppError>>,
{
    match state.pages.get_or_render(path, render).await {
        Ok(html) => response::html(StatusCode::OK, html.as_str().to_owned(), true),
        Err(e) => error_html(e),
    }
}

pub async fn home(State(state): State<AppState>) -> Response {
    cached_page(&state, "/", || render_home(&state)).await
}

pub async fn listing<T: Content>(State(state): State<AppState>) -> Response {
    cached_page(&state, T::KIND.listing_path(), || render_listing::<T>(&state)).await
}

pub async fn detail<T: Content>(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let path = T::KIND.detail_path(&slug);
    cached_page(&state, &path, || render_detail::<T>(&state, &slug)).await
}

fn greeting(ctx: &AuthContext) -> String {
    let mut out = String::new();
    if let Some(s) = &ctx.session {
        if let Some(p) = &s.picture {
            let _ = write!(out, "<img class=\"avatar\" src=\"{}\" alt=\"\">", escape_html(markdown::safe_url(p)));
        }
        let _ = write!(
            out,
            "<p>Signed in as {}</p>",
            escape_html(ctx.display_name().unwrap_or(&s.email))
        );
    }
    out.push_str("<form method=\"post\" action=\"/api/auth/signout\"><button>Sign out</button></form>\n");
    out
}

/// `GET /dashboard`: any signed-in user.
pub async fn dashboard(State(state): State<AppState>, Session(ctx): Session) -> Response {
    if !ctx.is_signed_in() {
        return Redirect::to("/auth/google").into_response();
    }
    let mut body = String::from("<h1>Dashboard</h1>\n");
    body.push_str(&greeting(&ctx));
    if ctx.is_admin(&state.settings) {
        body.push_str("<p><a href=\"/dashboard/admin\">Manage content</a></p>\n");
    }
    let meta = Meta {
        title: &page_title("Dashboard"),
        description: None,
        canonical: None,
        image: None,
    };
    response::html(StatusCode::OK, layout(&meta, &body), false)
}

fn summary_rows(items: &[EntitySummary], out: &mut String) {
    out.push_str("<table>\n<tr><th>Title</th><th>Slug</th><th>Status</th><th>Updated</th></tr>\n");
    for s in items {
        let _ = writeln!(
            out,
            "<tr><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&s.path()),
            escape_html(&s.title),
            escape_html(&s.slug),
            if s.status == crate::content::Status::Published { "published" } else { "draft" },
            s.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
    out.push_str("</table>\n");
}

/// `GET /dashboard/admin` and `/udyomx-admin`: every entity of every kind. Behind the admin gate.
pub async fn admin_dashboard(State(state): State<AppState>, Session(ctx): Session) -> Response {
    let all = match state.catalog().list_all(Scope::All).await.or_failed_to("load dashboard") {
        Ok(all) => all,
        Err(e) => return error_html(e),
    };
    let mut body = String::from("<h1>Content</h1>\n");
    body.push_str(&greeting(&ctx));
    for (kind, entities) in all {
        let summaries: Vec<EntitySummary> = entities.iter().map(|e| e.summary()).collect();
        let _ = writeln!(body, "<h2>{} ({})</h2>", listing_heading(kind), summaries.len());
        summary_rows(&summaries, &mut body);
    }
    let meta = Meta {
        title: &page_title("Admin"),
        description: None,
        canonical: None,
        image: None,
    };
    response::html(StatusCode::OK, layout(&meta, &body), false)
}

#[derive(Debug, Default, Deserialize)]
pub struct UnauthorizedParams {
    pub error: Option<String>,
}

/// `GET /unauthorized`
pub async fn unauthorized(Query(params): Query<UnauthorizedParams>) -> Response {
    let message = match params.error.as_deref() {
        Some("oauth_failed") => "Sign-in with Google failed. Please try again.",
        _ => "You do not have access to this page.",
    };
    let body = format!(
        "<h1>Unauthorized</h1>\n<p>{}</p>\n<a href=\"/auth/google\">Sign in</a>\n",
        message
    );
    let meta = Meta {
        title: &page_title("Unauthorized"),
        description: None,
        canonical: None,
        image: None,
    };
    response::html(StatusCode::UNAUTHORIZED, layout(&meta, &body), false)
}

/// `GET /not-found` and every unmatched path.
pub async fn not_found() -> Response {
    not_found_html()
}
