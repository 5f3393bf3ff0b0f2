//! Request body normalization and validation for content writes.

use crate::error::ContentError;
use crate::schema::{ColumnType, TableDef, ID, SLUG, STATUS};
use crate::store::Row;
use regex::Regex;
use serde_json::Value;

#[derive(Clone, Debug, Default)]
pub struct ValidationRule {
    pub required: bool,
    pub max_length: Option<usize>,
    pub pattern: Option<&'static str>,
    pub allowed: Option<&'static [&'static str]>,
    pub format: Option<&'static str>,
}

const STATUSES: &[&str] = &["draft", "published"];
pub const SLUG_PATTERN: &str = r"^[a-z0-9]+(?:-[a-z0-9]+)*$";

/// Per-column rules for a table. Unlisted columns are only type-checked.
pub fn rules_for(table: &TableDef, column: &str) -> ValidationRule {
    let mut rule = ValidationRule::default();
    if column == table.title_column {
        rule.required = true;
        rule.max_length = Some(200);
    }
    match column {
        SLUG => {
            rule.required = true;
            rule.max_length = Some(200);
            rule.pattern = Some(SLUG_PATTERN);
        }
        STATUS => rule.allowed = Some(STATUSES),
        "excerpt" => rule.max_length = Some(1000),
        "seo_title" | "og_title" | "twitter_title" => rule.max_length = Some(200),
        "seo_description" | "og_description" | "twitter_description" => rule.max_length = Some(500),
        "canonical_url" | "live_url" | "repo_url" => rule.format = Some("url"),
        _ => {}
    }
    rule
}

/// Turn a title into a URL-safe slug: lowercase ASCII words joined by single hyphens.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

/// Keep only writable columns, translate legacy fields, and coerce empty lists.
pub fn normalize(table: &TableDef, body: Row) -> Row {
    let mut out = Row::new();
    for (k, v) in body {
        if k == "is_published" && table.column(STATUS).is_some() {
            if let Value::Bool(published) = v {
                let status = if published { "published" } else { "draft" };
                out.entry(STATUS.to_string()).or_insert(Value::String(status.into()));
            }
            continue;
        }
        if k != ID && !table.is_writable(&k) {
            continue;
        }
        let v = match (table.column(&k).map(|c| c.ty), v) {
            (Some(ColumnType::TextList), Value::Null) => Value::Array(Vec::new()),
            (Some(ColumnType::Text), Value::String(s)) if k == SLUG => Value::String(s.trim().to_string()),
            (_, v) => v,
        };
        out.insert(k, v);
    }
    out
}

/// Validate a full row for insert: required fields must be present and non-empty.
pub fn validate_create(table: &TableDef, row: &Row) -> Result<(), ContentError> {
    for c in table.columns {
        let rule = rules_for(table, c.name);
        let val = row.get(c.name);
        if rule.required && is_blank(val) {
            return Err(ContentError::Invalid(format!("{} is required", c.name)));
        }
        if let Some(v) = val {
            validate_field(table, c.name, v, &rule)?;
        }
    }
    Ok(())
}

/// Validate only the fields present (for updates). Required fields may not be blanked.
pub fn validate_patch(table: &TableDef, patch: &Row) -> Result<(), ContentError> {
    for (k, v) in patch {
        let rule = rules_for(table, k);
        if rule.required && is_blank(Some(v)) {
            return Err(ContentError::Invalid(format!("{} cannot be empty", k)));
        }
        validate_field(table, k, v, &rule)?;
    }
    Ok(())
}

fn is_blank(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn validate_field(table: &TableDef, col: &str, v: &Value, rule: &ValidationRule) -> Result<(), ContentError> {
    let invalid = |msg: String| Err(ContentError::Invalid(msg));
    if v.is_null() {
        return match table.column(col) {
            Some(c) if c.not_null => invalid(format!("{} cannot be null", col)),
            _ => Ok(()),
        };
    }
    match table.column(col).map(|c| c.ty) {
        Some(ColumnType::Text) if col != ID && !v.is_string() => return invalid(format!("{} must be a string", col)),
        Some(ColumnType::Bool) if !v.is_boolean() => return invalid(format!("{} must be a boolean", col)),
        Some(ColumnType::TextList) => {
            let ok = v.as_array().is_some_and(|items| items.iter().all(Value::is_string));
            if !ok {
                return invalid(format!("{} must be a list of strings", col));
            }
        }
        Some(ColumnType::Timestamp) => {
            let ok = v
                .as_str()
                .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok());
            if !ok {
                return invalid(format!("{} must be an RFC 3339 timestamp", col));
            }
        }
        _ => {}
    }
    if col == ID && !(v.is_string() && !is_blank(Some(v))) {
        return invalid("id must be a non-empty string".into());
    }
    let Some(s) = v.as_str() else { return Ok(()) };
    if let Some(max) = rule.max_length {
        if s.chars().count() > max {
            return invalid(format!("{} must be at most {} characters", col, max));
        }
    }
    if let Some(pattern) = rule.pattern {
        let re = Regex::new(pattern).map_err(|_| ContentError::Invalid(format!("invalid pattern for {}", col)))?;
        if !re.is_match(s) {
            return invalid(format!(
                "{} may only contain lowercase letters, digits and single hyphens",
                col
            ));
        }
    }
    if let Some(allowed) = rule.allowed {
        if !allowed.contains(&s) {
            return invalid(format!("{} must be one of: {}", col, allowed.join(", ")));
        }
    }
    if rule.format == Some("url") && !s.is_empty() && !(s.starts_with("https://") || s.starts_with("http://")) {
        return invalid(format!("{} must be an http(s) URL", col));
    }
    Ok(())
}
