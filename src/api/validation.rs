//! Field-level validation of review payloads.
//!
//! Fields are checked in a fixed order (product_id, user_name, rating,
//! comment) and the first failure wins.

use crate::storage::{NewReview, ReviewPatch};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;

pub const USER_NAME_MAX_CHARS: usize = 255;
pub const COMMENT_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid product_id.")]
    InvalidProductId,
    #[error("Invalid user_name.")]
    InvalidUserName,
    #[error("user_name must be 1..255 characters.")]
    UserNameLength,
    #[error("Invalid rating.")]
    InvalidRating,
    #[error("Rating must be integer 1..5.")]
    RatingRange,
    #[error("Invalid comment.")]
    InvalidComment,
    #[error("Comment too long (max 2000).")]
    CommentTooLong,
    #[error("No valid fields provided for update.")]
    NoFields,
}

type Payload = Map<String, Value>;

impl NewReview {
    /// Every field except `comment` is required; a missing comment is stored as null.
    pub fn from_payload(payload: &Payload) -> Result<Self, ValidationError> {
        Ok(Self {
            product_id: product_id(payload.get("product_id"))?,
            user_name: user_name(payload.get("user_name"))?,
            rating: rating(payload.get("rating"))?,
            comment: match payload.get("comment") {
                Some(value) => comment(value)?,
                None => None,
            },
        })
    }
}

impl ReviewPatch {
    /// Validate only the keys present. Unknown keys are ignored.
    pub fn from_payload(payload: &Payload) -> Result<Self, ValidationError> {
        let mut patch = Self::default();
        if payload.contains_key("product_id") {
            patch.product_id = Some(product_id(payload.get("product_id"))?);
        }
        if payload.contains_key("user_name") {
            patch.user_name = Some(user_name(payload.get("user_name"))?);
        }
        if payload.contains_key("rating") {
            patch.rating = Some(rating(payload.get("rating"))?);
        }
        if let Some(value) = payload.get("comment") {
            patch.comment = Some(comment(value)?);
        }
        if patch.is_empty() {
            return Err(ValidationError::NoFields);
        }
        Ok(patch)
    }
}

fn product_id(value: Option<&Value>) -> Result<i64, ValidationError> {
    match value.and_then(coerce_integer) {
        Some(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidProductId),
    }
}

fn user_name(value: Option<&Value>) -> Result<String, ValidationError> {
    let Some(Value::String(raw)) = value else {
        return Err(ValidationError::InvalidUserName);
    };
    let name = normalize_text(raw);
    let len = name.chars().count();
    if len == 0 || len > USER_NAME_MAX_CHARS {
        return Err(ValidationError::UserNameLength);
    }
    Ok(name)
}

fn rating(value: Option<&Value>) -> Result<i64, ValidationError> {
    let rating = value
        .and_then(coerce_integer)
        .ok_or(ValidationError::InvalidRating)?;
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::RatingRange);
    }
    Ok(rating)
}

fn comment(value: &Value) -> Result<Option<String>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(raw) => {
            let text = normalize_text(raw);
            if text.chars().count() > COMMENT_MAX_CHARS {
                return Err(ValidationError::CommentTooLong);
            }
            Ok(Some(text))
        }
        _ => Err(ValidationError::InvalidComment),
    }
}

/// Numbers and numeric strings become integers, truncating toward zero.
/// Booleans, null, containers and non-numeric strings yield `None`.
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    }
}

fn parse_numeric_str(s: &str) -> Option<i64> {
    let s = s.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C'));
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    // f64 parsing also accepts "inf"/"nan"; restrict to plain decimal literals
    let literal = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !literal || !s.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}

/// Matches the Unicode "Other" category: control, format, surrogate,
/// private-use and unassigned code points.
static OTHER_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{C}+").expect("static pattern compiles"));

/// Strip Unicode "Other" characters, then surrounding spaces.
pub fn normalize_text(raw: &str) -> String {
    OTHER_CHARS.replace_all(raw, "").trim_matches(' ').to_string()
}
