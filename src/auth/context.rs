//! Per-request identity and the outcome of a completed login.

use super::google::GoogleProfile;
use super::session::{AdminSession, CookieState};
use crate::settings::Settings;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const ADMIN_DASHBOARD: &str = "/dashboard/admin";
pub const USER_DASHBOARD: &str = "/dashboard";
pub const NOT_FOUND_PAGE: &str = "/not-found";
pub const UNAUTHORIZED_PAGE: &str = "/unauthorized";
pub const OAUTH_FAILED: &str = "/unauthorized?error=oauth_failed";

/// Who is making the request, as far as the cookie shows. Passed into page rendering.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AuthContext {
    pub session: Option<AdminSession>,
}

impl AuthContext {
    pub fn from_cookie(state: CookieState) -> Self {
        match state {
            CookieState::Valid(session) => AuthContext { session: Some(session) },
            CookieState::Absent | CookieState::Malformed => AuthContext::default(),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Signed in with a session flagged admin whose email is still the configured admin.
    pub fn is_admin(&self, settings: &Settings) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.is_admin && settings.is_admin_email(&s.email))
    }

    pub fn display_name(&self) -> Option<&str> {
        let s = self.session.as_ref()?;
        Some(s.name.as_deref().unwrap_or(&s.email))
    }
}

/// What the OAuth callback does once the provider has answered.
#[derive(Clone, Debug, PartialEq)]
pub enum LoginOutcome {
    /// Set the session cookie and redirect.
    SignedIn { session: AdminSession, redirect: &'static str },
    /// Admin login attempted by someone else: no cookie.
    Rejected,
    /// Provider error, missing code, or failed exchange.
    Failed,
}

impl LoginOutcome {
    pub fn redirect(&self) -> &'static str {
        match self {
            LoginOutcome::SignedIn { redirect, .. } => *redirect,
            LoginOutcome::Rejected => NOT_FOUND_PAGE,
            LoginOutcome::Failed => OAUTH_FAILED,
        }
    }
}

/// Decide the login outcome for a resolved profile. `admin_intent` is set when the flow was
/// started from an admin page (`state=admin`).
pub fn decide_login(profile: &GoogleProfile, admin_intent: bool, settings: &Settings, now: DateTime<Utc>) -> LoginOutcome {
    let Some(email) = profile.email.as_deref() else {
        return LoginOutcome::Failed;
    };
    let is_admin = profile
        .verified_email()
        .is_some_and(|e| settings.is_admin_email(e));
    if admin_intent && !is_admin {
        return LoginOutcome::Rejected;
    }
    let session = AdminSession {
        id: profile.id.clone(),
        email: email.trim().to_string(),
        name: profile.name.clone(),
        picture: profile.picture.clone(),
        is_admin,
        login_at: now,
    };
    let redirect = if is_admin { ADMIN_DASHBOARD } else { USER_DASHBOARD };
    LoginOutcome::SignedIn { session, redirect }
}
