//! JSON body extractor that reports decode failures as field errors.
//!
//! `axum::Json` rejects bad bodies with a plain-text 400. Handlers take [`Payload`]
//! instead so that a missing field comes back in the same `{"field": ["message"]}` shape
//! as every other validation failure.

use crate::errors::Error;
use crate::validation::{FieldErrors, NON_FIELD_ERRORS, REQUIRED};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// A deserialized JSON request body
#[derive(Debug)]
pub struct Payload<T>(pub T);

impl<T> FromRequest<AppState> for Payload<T>
where
    T: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection.body_text());
                Err(Error::Validation(rejection_errors(&rejection)))
            }
        }
    }
}

fn rejection_errors(rejection: &JsonRejection) -> FieldErrors {
    match rejection {
        JsonRejection::JsonDataError(_) => data_errors(&rejection.body_text()),
        JsonRejection::MissingJsonContentType(_) => {
            FieldErrors::single(NON_FIELD_ERRORS, "Expected request with `Content-Type: application/json`.")
        }
        _ => FieldErrors::single(NON_FIELD_ERRORS, strip_position(&rejection.body_text())),
    }
}

/// Turn a serde data error into field errors.
///
/// `missing field `x`` is reported against `x`; anything else goes under
/// `non_field_errors` with the position suffix removed.
fn data_errors(text: &str) -> FieldErrors {
    let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text);

    if let Some(rest) = detail.split("missing field `").nth(1) {
        if let Some((field, _)) = rest.split_once('`') {
            return FieldErrors::single(field, REQUIRED);
        }
    }

    FieldErrors::single(NON_FIELD_ERRORS, strip_position(detail))
}

fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}
