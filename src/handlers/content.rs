//! JSON CRUD handlers shared by `/api/blogs`, `/api/projects` and `/api/services`.
//!
//! GET multiplexes on query parameters: `slug` for one entity, `fields=card` for the card list,
//! `admin=true` to ignore visibility. Writes revalidate the affected pages.

use crate::cache::{revalidate_all, revalidation_targets};
use crate::content::{Content, ContentApi};
use crate::error::{AppError, ContentResultExt};
use crate::response;
use crate::schema::{ContentKind, ID};
use crate::state::AppState;
use crate::store::Row;
use axum::{
    body::Bytes,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct ContentParams {
    pub slug: Option<String>,
    pub fields: Option<String>,
    pub admin: Option<String>,
    pub id: Option<String>,
}

impl ContentParams {
    fn admin(&self) -> bool {
        matches!(self.admin.as_deref(), Some("true") | Some("1"))
    }

    fn slug(&self) -> Option<&str> {
        self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Names used in messages: (`blog`, `blogs`) for posts, and so on.
fn names(kind: ContentKind) -> (&'static str, &'static str) {
    match kind {
        ContentKind::Post => ("blog", "blogs"),
        ContentKind::Project => ("project", "projects"),
        ContentKind::Service => ("service", "services"),
    }
}

fn not_found(kind: ContentKind) -> AppError {
    AppError::NotFound(match kind {
        ContentKind::Post => "Blog post not found".into(),
        ContentKind::Project => "Project not found".into(),
        ContentKind::Service => "Service not found".into(),
    })
}

/// Parse a request body that must be a JSON object.
pub(crate) fn body_to_row(body: &[u8]) -> Result<Row, AppError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(m)) => Ok(m),
        Ok(_) => Err(AppError::BadRequest("body must be a JSON object".into())),
        Err(_) => Err(AppError::BadRequest("body must be valid JSON".into())),
    }
}

/// Current slug of `id`, for invalidating the page it used to live at.
async fn slug_of<T: Content>(api: &ContentApi<T>, id: &str) -> Option<String> {
    match api.get_by_id(id).await {
        Ok(found) => found.map(|e| e.summary().slug),
        Err(e) => {
            tracing::warn!(error = %e, id, "could not look up slug before write");
            None
        }
    }
}

async fn revalidate_entity(state: &AppState, kind: ContentKind, slugs: &[Option<String>]) {
    let mut targets: Vec<String> = Vec::new();
    for slug in slugs.iter().flatten() {
        for t in revalidation_targets(&kind.detail_path(slug), Some(kind.singular())) {
            if !targets.contains(&t) {
                targets.push(t);
            }
        }
    }
    if targets.is_empty() {
        targets = revalidation_targets(kind.listing_path(), Some(kind.singular()));
    }
    revalidate_all(state.revalidator.as_ref(), &targets).await;
}

pub async fn get<T: Content>(
    State(state): State<AppState>,
    Query(params): Query<ContentParams>,
) -> Result<Response, AppError> {
    let api = state.api::<T>();
    let (one, many) = names(T::KIND);

    if let Some(slug) = params.slug() {
        let found = if params.admin() {
            api.get_by_slug_admin(slug).await
        } else {
            api.get_by_slug(slug).await
        }
        .or_failed_to(&format!("fetch {}", one))?;
        return match found {
            Some(entity) => Ok(response::ok(entity).into_response()),
            None => Err(not_found(T::KIND)),
        };
    }

    let action = format!("fetch {}", many);
    if params.fields.as_deref() == Some("card") {
        let cards = api.get_all_for_cards().await.or_failed_to(&action)?;
        return Ok(response::ok(cards).into_response());
    }
    let all = if params.admin() {
        api.get_all_admin().await
    } else {
        api.get_all().await
    }
    .or_failed_to(&action)?;
    Ok(response::ok(all).into_response())
}

pub async fn create<T: Content>(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let row = body_to_row(&body)?;
    let (one, _) = names(T::KIND);
    let created = state
        .api::<T>()
        .create(row)
        .await
        .or_failed_to(&format!("create {}", one))?;
    revalidate_entity(&state, T::KIND, &[Some(created.summary().slug)]).await;
    Ok(response::created(created).into_response())
}

pub async fn update<T: Content>(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let mut row = body_to_row(&body)?;
    let id = match row.remove(ID) {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        _ => return Err(AppError::BadRequest("ID is required".into())),
    };
    let (one, _) = names(T::KIND);
    let api = state.api::<T>();
    let previous_slug = if row.contains_key("slug") {
        slug_of(&api, &id).await
    } else {
        None
    };
    let updated = api
        .update(&id, row)
        .await
        .or_failed_to(&format!("update {}", one))?
        .ok_or_else(|| not_found(T::KIND))?;
    revalidate_entity(&state, T::KIND, &[previous_slug, Some(updated.summary().slug)]).await;
    Ok(response::ok(updated).into_response())
}

pub async fn delete<T: Content>(
    State(state): State<AppState>,
    Query(params): Query<ContentParams>,
) -> Result<Response, AppError> {
    let id = params
        .id()
        .ok_or_else(|| AppError::BadRequest("ID is required".into()))?;
    let (one, _) = names(T::KIND);
    let api = state.api::<T>();
    let slug = slug_of(&api, id).await;
    api.delete(id).await.or_failed_to(&format!("delete {}", one))?;
    revalidate_entity(&state, T::KIND, &[slug]).await;
    Ok(response::success().into_response())
}
