//! Process settings read from the environment once at startup.

use crate::error::ConfigError;
use std::time::Duration;

pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_PAGE_TTL_SECS: u64 = 3600;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Google OAuth client credentials and endpoints.
#[derive(Clone, Debug)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    /// Schema holding the content tables. Must be a valid PostgreSQL identifier.
    pub db_schema: String,
    pub db_max_connections: u32,
    /// The single identity allowed into the admin area. Required; there is no fallback.
    pub admin_email: String,
    pub google: GoogleSettings,
    /// Public origin of the site, no trailing slash. Used for OAuth redirects and sitemaps.
    pub site_url: String,
    /// Production mode marks cookies `Secure`.
    pub production: bool,
    pub bind_addr: String,
    /// How long a rendered page stays cached before it is regenerated.
    pub page_ttl: Duration,
}

impl Settings {
    /// Read settings from the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let admin_email = required("ADMIN_EMAIL")?;
        if !admin_email.contains('@') {
            return Err(ConfigError::Invalid {
                key: "ADMIN_EMAIL",
                reason: "not an email address".into(),
            });
        }

        let db_schema = get("DB_SCHEMA").unwrap_or_else(|| "public".into());
        if !is_identifier(&db_schema) {
            return Err(ConfigError::Invalid {
                key: "DB_SCHEMA",
                reason: format!("'{}' is not a plain identifier", db_schema),
            });
        }

        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 5)?;
        let page_ttl_secs = parse_or("PAGE_TTL_SECS", get("PAGE_TTL_SECS"), DEFAULT_PAGE_TTL_SECS)?;

        Ok(Settings {
            database_url: required("DATABASE_URL")?,
            db_schema,
            db_max_connections,
            admin_email,
            google: GoogleSettings {
                client_id: required("GOOGLE_CLIENT_ID")?,
                client_secret: required("GOOGLE_CLIENT_SECRET")?,
                auth_url: get("GOOGLE_AUTH_URL").unwrap_or_else(|| GOOGLE_AUTH_URL.into()),
                token_url: get("GOOGLE_TOKEN_URL").unwrap_or_else(|| GOOGLE_TOKEN_URL.into()),
                userinfo_url: get("GOOGLE_USERINFO_URL").unwrap_or_else(|| GOOGLE_USERINFO_URL.into()),
            },
            site_url: get("SITE_URL")
                .unwrap_or_else(|| DEFAULT_SITE_URL.into())
                .trim_end_matches('/')
                .to_string(),
            production: get("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production")),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            page_ttl: Duration::from_secs(page_ttl_secs),
        })
    }

    /// Absolute redirect URI registered with Google for the callback route.
    pub fn oauth_redirect_uri(&self) -> String {
        format!("{}/auth/google/callback", self.site_url)
    }

    /// Case-insensitive comparison against the configured admin identity.
    pub fn is_admin_email(&self, email: &str) -> bool {
        email.trim().eq_ignore_ascii_case(&self.admin_email)
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(s) => s.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
