//! The `admin-session` cookie: payload, encoding, and `Set-Cookie` values.
//!
//! The cookie carries percent-encoded JSON. There is no server-side session store; whoever holds
//! a well-formed cookie whose email matches the configured admin is the admin.

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "admin-session";
pub const SESSION_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    pub is_admin: bool,
    pub login_at: DateTime<Utc>,
}

/// What the request's cookie header says about the session.
#[derive(Clone, Debug, PartialEq)]
pub enum CookieState {
    Absent,
    /// Present but not decodable.
    Malformed,
    Valid(AdminSession),
}

impl AdminSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.login_at > Duration::seconds(SESSION_MAX_AGE_SECS)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        Ok(percent_encode(&serde_json::to_string(self)?))
    }

    pub fn decode(raw: &str) -> Option<AdminSession> {
        let json = percent_decode(raw)?;
        serde_json::from_str(&json).ok()
    }
}

/// Classify the `admin-session` cookie in a `Cookie` header value. Expired sessions read as absent.
pub fn read_cookie(header: Option<&str>, now: DateTime<Utc>) -> CookieState {
    let Some(raw) = header.and_then(|h| cookie_value(h, SESSION_COOKIE)) else {
        return CookieState::Absent;
    };
    match AdminSession::decode(raw) {
        Some(s) if s.is_expired(now) => CookieState::Absent,
        Some(s) => CookieState::Valid(s),
        None => CookieState::Malformed,
    }
}

/// Every `Cookie` header of a request joined into one list. HTTP/2 clients may send several.
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let parts: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    (!parts.is_empty()).then(|| parts.join("; "))
}

/// Value of cookie `name` in a `Cookie` header (`a=1; b=2`).
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k.trim() == name).then(|| v.trim().trim_matches('"'))
    })
}

pub fn set_cookie_header(session: &AdminSession, secure: bool) -> Result<String, serde_json::Error> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        session.encode()?,
        SESSION_MAX_AGE_SECS
    );
    if secure {
        cookie.push_str("; Secure");
    }
    Ok(cookie)
}

pub fn clear_cookie_header(secure: bool) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        SESSION_COOKIE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
}

/// Percent-encode everything but URI-component unreserved characters.
pub fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 3);
    for &b in s.as_bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// Inverse of `percent_encode`. `None` on a truncated escape or invalid UTF-8.
pub fn percent_decode(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
