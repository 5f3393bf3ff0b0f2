//! Admin route gate, run in front of every request.

use super::context::{ADMIN_DASHBOARD, UNAUTHORIZED_PAGE, USER_DASHBOARD};
use super::session::{cookie_header, read_cookie, CookieState};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;

pub const ADMIN_LOGIN: &str = "/auth/google?admin=true";

const GATED_PREFIXES: &[&str] = &[ADMIN_DASHBOARD, "/udyomx-admin"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Pass,
    Redirect(&'static str),
}

/// Whether `path` is `prefix` itself or below it.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

pub fn is_gated(path: &str) -> bool {
    GATED_PREFIXES.iter().any(|p| under(path, p))
}

/// Decide what to do with a request for `path` carrying `cookie`.
pub fn evaluate<F>(path: &str, cookie: &CookieState, is_admin_email: F) -> GateDecision
where
    F: Fn(&str) -> bool,
{
    if !is_gated(path) {
        return GateDecision::Pass;
    }
    match cookie {
        CookieState::Absent => GateDecision::Redirect(ADMIN_LOGIN),
        CookieState::Malformed => GateDecision::Redirect(UNAUTHORIZED_PAGE),
        CookieState::Valid(s) if !s.is_admin => GateDecision::Redirect(USER_DASHBOARD),
        CookieState::Valid(s) if !is_admin_email(&s.email) => GateDecision::Redirect(UNAUTHORIZED_PAGE),
        CookieState::Valid(_) => GateDecision::Pass,
    }
}

/// Axum middleware applying `evaluate` with the configured admin email.
pub async fn admin_gate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    if !is_gated(&path) {
        return next.run(req).await;
    }
    let cookie = read_cookie(cookie_header(req.headers()).as_deref(), Utc::now());
    match evaluate(&path, &cookie, |e| state.settings.is_admin_email(e)) {
        GateDecision::Pass => next.run(req).await,
        GateDecision::Redirect(to) => {
            tracing::info!(path = %path, to, "admin gate redirect");
            Redirect::to(to).into_response()
        }
    }
}
