//! Google sign-in flow and session endpoints.

use crate::auth::context::OAUTH_FAILED;
use crate::auth::session::{clear_cookie_header, set_cookie_header};
use crate::auth::{decide_login, AdminSession, LoginOutcome};
use crate::extractors::Session;
use crate::response;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::header,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct StartParams {
    pub admin: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// `GET /auth/google[?admin=true]`: send the browser to the consent screen.
pub async fn google_start(State(state): State<AppState>, Query(params): Query<StartParams>) -> Redirect {
    let admin = matches!(params.admin.as_deref(), Some("true") | Some("1"));
    let redirect_uri = state.settings.oauth_redirect_uri();
    match state
        .identity
        .authorize_url(&redirect_uri, admin.then_some("admin"))
    {
        Ok(url) => Redirect::to(&url),
        Err(e) => {
            tracing::error!(error = %e, "could not build Google authorize url");
            Redirect::to(OAUTH_FAILED)
        }
    }
}

/// `GET /auth/google/callback`: exchange the code, then decide who this is.
pub async fn google_callback(State(state): State<AppState>, Query(params): Query<CallbackParams>) -> Response {
    let admin_intent = params.state.as_deref() == Some("admin");
    let outcome = match (params.error.as_deref(), params.code.as_deref()) {
        (Some(err), _) => {
            tracing::warn!(error = err, "provider returned an error");
            LoginOutcome::Failed
        }
        (None, None) | (None, Some("")) => {
            tracing::warn!("callback without authorization code");
            LoginOutcome::Failed
        }
        (None, Some(code)) => {
            let redirect_uri = state.settings.oauth_redirect_uri();
            match state.identity.resolve_identity(code, &redirect_uri).await {
                Ok(profile) => decide_login(&profile, admin_intent, &state.settings, Utc::now()),
                Err(e) => {
                    tracing::error!(error = %e, "oauth exchange failed");
                    LoginOutcome::Failed
                }
            }
        }
    };
    complete_login(outcome, state.settings.production)
}

fn complete_login(outcome: LoginOutcome, secure: bool) -> Response {
    match outcome {
        LoginOutcome::SignedIn { session, redirect } => match set_cookie_header(&session, secure) {
            Ok(cookie) => {
                tracing::info!(email = %session.email, admin = session.is_admin, "signed in");
                (AppendHeaders([(header::SET_COOKIE, cookie)]), Redirect::to(redirect)).into_response()
            }
            Err(e) => {
                tracing::error!(error = %e, "could not encode session cookie");
                Redirect::to(OAUTH_FAILED).into_response()
            }
        },
        LoginOutcome::Rejected => {
            tracing::warn!("admin sign-in rejected for non-admin account");
            Redirect::to(LoginOutcome::Rejected.redirect()).into_response()
        }
        LoginOutcome::Failed => Redirect::to(OAUTH_FAILED).into_response(),
    }
}

#[derive(Serialize)]
pub struct SessionBody {
    pub session: Option<AdminSession>,
}

/// `GET /api/auth/session`
pub async fn session(Session(ctx): Session) -> Json<SessionBody> {
    Json(SessionBody { session: ctx.session })
}

/// `POST /api/auth/signout`
pub async fn signout(State(state): State<AppState>) -> Response {
    (
        AppendHeaders([(header::SET_COOKIE, clear_cookie_header(state.settings.production))]),
        response::success(),
    )
        .into_response()
}
