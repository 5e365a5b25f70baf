//! Request schema validation.
//!
//! Bodies are decoded with serde and then checked by the request type's
//! [`Validate`] impl. Either step failing yields a [`ValidationError`], which
//! the error layer renders as a 400 carrying `type`, `location` and `message`.

use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub location: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: &'static str, location: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.location, self.kind, self.message)
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

pub fn min_chars(field: &str, value: &str, min: usize) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        return Err(ValidationError::new(
            "too_short",
            field,
            format!("Must be at least {min} characters long"),
        ));
    }
    Ok(())
}

pub fn max_chars(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::new(
            "too_long",
            field,
            format!("Must be at most {max} characters long"),
        ));
    }
    Ok(())
}

/// Decode and validate a JSON body. The content type is not checked.
pub fn parse_json<T: DeserializeOwned + Validate>(body: &[u8]) -> Result<T, ValidationError> {
    let mut de = serde_json::Deserializer::from_slice(body);
    let value: T = serde_path_to_error::deserialize(&mut de).map_err(from_serde)?;
    de.end()
        .map_err(|e| ValidationError::new("json_invalid", "body", e.to_string()))?;
    value.validate()?;
    Ok(value)
}

/// Decode and validate a url-encoded query string. Every value arrives as a
/// string.
pub fn parse_query<T: DeserializeOwned + Validate>(query: &str) -> Result<T, ValidationError> {
    let map: Map<String, Value> = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect();
    let value: T = serde_path_to_error::deserialize(Value::Object(map)).map_err(from_serde)?;
    value.validate()?;
    Ok(value)
}

/// Map a decode failure to a field-level error. `location` is the path of the
/// offending value, e.g. `note_id` or `notes[1]`.
fn from_serde(err: serde_path_to_error::Error<serde_json::Error>) -> ValidationError {
    use serde_json::error::Category;

    let path = err.path().to_string();
    let err = err.into_inner();
    let message = err.to_string();
    match err.classify() {
        Category::Io | Category::Syntax | Category::Eof => {
            ValidationError::new("json_invalid", "body", message)
        }
        Category::Data => {
            // A missing field fails on its parent, so the path stops one level short.
            let missing = message
                .strip_prefix("missing field `")
                .and_then(|rest| rest.split('`').next());
            match missing {
                Some(field) => {
                    ValidationError::new("missing", &join_path(&path, field), "Field required")
                }
                None => ValidationError::new("type_error", &join_path(&path, ""), message),
            }
        }
    }
}

fn join_path(parent: &str, field: &str) -> String {
    match (parent, field) {
        (".", "") => "body".to_string(),
        (".", field) => field.to_string(),
        (parent, "") => parent.to_string(),
        (parent, field) => format!("{parent}.{field}"),
    }
}

/// JSON body extractor that runs [`Validate`] before the handler sees it.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge(e.body_text())
            } else {
                AppError::BadRequest(format!("Unreadable request body: {}", e.body_text()))
            }
        })?;
        Ok(ValidJson(parse_json(&body)?))
    }
}
