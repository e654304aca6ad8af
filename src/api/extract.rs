use crate::api::error::AppError;
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Review id taken from the `{id}` path segment. Only plain ASCII digit
/// strings greater than zero are accepted. Any trailing segments are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewId(pub i64);

#[derive(Deserialize)]
struct IdParam {
    id: String,
}

impl<S> FromRequestParts<S> for ReviewId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(param) = Path::<IdParam>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::InvalidId)?;
        parse_id(&param.id).map(ReviewId)
    }
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::InvalidId);
    }
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::InvalidId),
    }
}

/// Optional JSON body, parsed for every method.
///
/// An empty body or a literal `null` yields `None`. Syntax errors are
/// reported with the parser's message.
pub struct JsonBody(pub Option<Value>);

impl JsonBody {
    /// The body as a JSON object, as required by create and update.
    pub fn into_object(self) -> Result<Map<String, Value>, AppError> {
        match self.0 {
            None => Err(AppError::BadRequest("JSON body required.")),
            Some(Value::Object(map)) => Ok(map),
            Some(_) => Err(AppError::BadRequest("JSON body must be an object.")),
        }
    }
}

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::MalformedBody(rejection.body_text()))?;
        parse(&bytes).map(JsonBody)
    }
}

fn parse(bytes: &[u8]) -> Result<Option<Value>, AppError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| AppError::MalformedBody(e.to_string()))?;
    Ok((!value.is_null()).then_some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_positive_digits_only() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("007").unwrap(), 7);
        for bad in ["", "0", "-1", "+1", "1.5", "abc", " 1", "99999999999999999999"] {
            assert!(matches!(parse_id(bad), Err(AppError::InvalidId)), "{bad:?}");
        }
    }

    #[test]
    fn empty_and_null_bodies_are_absent() {
        assert!(parse(b"").unwrap().is_none());
        assert!(parse(b"null").unwrap().is_none());
        assert!(matches!(
            JsonBody(None).into_object(),
            Err(AppError::BadRequest("JSON body required."))
        ));
    }

    #[test]
    fn object_body_is_returned() {
        let body = JsonBody(parse(br#"{"rating": 3}"#).unwrap());
        let map = body.into_object().unwrap();
        assert_eq!(map["rating"], 3);
    }

    #[test]
    fn syntax_error_carries_parser_message() {
        match parse(b"{\"rating\": ") {
            Err(AppError::MalformedBody(msg)) => assert!(msg.contains("line 1")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn non_object_parses_but_is_not_a_payload() {
        let body = JsonBody(parse(b"[1,2]").unwrap());
        assert!(matches!(
            body.into_object(),
            Err(AppError::BadRequest("JSON body must be an object."))
        ));
        assert!(parse(b"5").unwrap().is_some());
    }
}
