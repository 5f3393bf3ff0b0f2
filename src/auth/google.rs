//! Google OAuth 2.0 authorization-code client.

use crate::settings::GoogleSettings;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OAuthError {
    #[error("request: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid authorize endpoint: {0}")]
    Endpoint(String),
    #[error("{stage} returned {status}")]
    Status { stage: &'static str, status: u16 },
    #[error("token response carried no access token")]
    NoAccessToken,
    #[error("user info carried no email")]
    NoEmail,
}

/// Identity as reported by the provider's user-info endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GoogleProfile {
    #[serde(alias = "sub")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "email_verified")]
    pub verified_email: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl GoogleProfile {
    /// The email, unless the provider says it is unverified.
    pub fn verified_email(&self) -> Option<&str> {
        match self.verified_email {
            Some(false) => None,
            _ => self.email.as_deref(),
        }
    }
}

/// Login-with seam: build the consent URL, then turn a callback code into a profile.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn authorize_url(&self, redirect_uri: &str, state: Option<&str>) -> Result<String, OAuthError>;

    async fn resolve_identity(&self, code: &str, redirect_uri: &str) -> Result<GoogleProfile, OAuthError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

pub struct GoogleOAuth {
    http: Client,
    settings: GoogleSettings,
}

impl GoogleOAuth {
    pub fn new(settings: GoogleSettings) -> Self {
        GoogleOAuth {
            http: Client::new(),
            settings,
        }
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, OAuthError> {
        let res = self
            .http
            .post(&self.settings.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(OAuthError::Status {
                stage: "token exchange",
                status: res.status().as_u16(),
            });
        }
        let token: TokenResponse = res.json().await?;
        token.access_token.ok_or(OAuthError::NoAccessToken)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, OAuthError> {
        let res = self
            .http
            .get(&self.settings.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(OAuthError::Status {
                stage: "user info",
                status: res.status().as_u16(),
            });
        }
        let profile: GoogleProfile = res.json().await?;
        if profile.email.as_deref().map_or(true, str::is_empty) {
            return Err(OAuthError::NoEmail);
        }
        Ok(profile)
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuth {
    fn authorize_url(&self, redirect_uri: &str, state: Option<&str>) -> Result<String, OAuthError> {
        let mut params = vec![
            ("client_id", self.settings.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", "openid email profile"),
            ("access_type", "online"),
            ("prompt", "select_account"),
        ];
        if let Some(state) = state {
            params.push(("state", state));
        }
        let url = Url::parse_with_params(&self.settings.auth_url, &params)
            .map_err(|e| OAuthError::Endpoint(e.to_string()))?;
        Ok(url.to_string())
    }

    async fn resolve_identity(&self, code: &str, redirect_uri: &str) -> Result<GoogleProfile, OAuthError> {
        let token = self.exchange_code(code, redirect_uri).await?;
        self.fetch_profile(&token).await
    }
}
