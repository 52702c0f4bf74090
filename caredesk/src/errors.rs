use crate::db::errors::DbError;
use crate::validation::{FieldErrors, NON_FIELD_ERRORS};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided, or the token was rejected
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Login attempt with an unknown email, inactive account or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// One or more request fields failed validation
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Requested resource not found, or not visible to the requester
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Error::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message
                .clone()
                .unwrap_or_else(|| "Authentication credentials were not provided.".to_string()),
            Error::InvalidCredentials => INVALID_CREDENTIALS.to_string(),
            Error::Validation(errors) => errors.to_string(),
            Error::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Not found.".to_string(),
                DbError::UniqueViolation { .. } => "Resource already exists".to_string(),
                DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource".to_string(),
                DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
                DbError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }

    /// Field errors for constraint violations the database caught before the application did.
    ///
    /// These show up when two requests race past the same pre-check, so they are reported
    /// exactly like the pre-check would have reported them.
    pub fn constraint_field_errors(db_err: &DbError) -> Option<FieldErrors> {
        let errors = match (db_err, db_err.constraint()) {
            (DbError::UniqueViolation { .. }, Some("users_email_key")) => {
                FieldErrors::single("email", "user with this email already exists.")
            }
            (DbError::UniqueViolation { .. }, Some("doctors_email_key")) => {
                FieldErrors::single("email", "A doctor with this email already exists.")
            }
            (DbError::UniqueViolation { .. }, Some("patient_doctor_mappings_patient_doctor_key")) => {
                FieldErrors::single(NON_FIELD_ERRORS, "The fields patient, doctor must make a unique set.")
            }
            (DbError::UniqueViolation { .. }, _) => FieldErrors::single(NON_FIELD_ERRORS, "Resource already exists"),
            (DbError::CheckViolation { .. }, Some("doctors_experience_years_check")) => {
                FieldErrors::single("experience_years", "Experience years must be between 0 and 70.")
            }
            (DbError::CheckViolation { .. }, Some("patients_age_check")) => {
                FieldErrors::single("age", "Age must be between 0 and 150.")
            }
            (DbError::CheckViolation { .. }, Some(c)) if c.ends_with("phone_check") => {
                FieldErrors::single("phone", crate::validation::PHONE_TOO_SHORT)
            }
            (DbError::CheckViolation { .. }, _) => FieldErrors::single(NON_FIELD_ERRORS, "Invalid data provided"),
            (DbError::ForeignKeyViolation { .. }, Some("patient_doctor_mappings_patient_id_fkey")) => {
                FieldErrors::single("patient", "Invalid pk - object does not exist.")
            }
            (DbError::ForeignKeyViolation { .. }, Some("patient_doctor_mappings_doctor_id_fkey")) => {
                FieldErrors::single("doctor", "Invalid pk - object does not exist.")
            }
            (DbError::ForeignKeyViolation { .. }, _) => {
                FieldErrors::single(NON_FIELD_ERRORS, "Invalid reference to related resource")
            }
            _ => return None,
        };
        Some(errors)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::InvalidCredentials => {
                tracing::info!("Authentication error: {}", self);
            }
            Error::Validation(_) | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();

        match &self {
            Error::Validation(errors) => (status, Json(json!(errors))).into_response(),
            Error::InvalidCredentials => (status, Json(json!({ "error": INVALID_CREDENTIALS }))).into_response(),
            Error::Database(db_err) => match Self::constraint_field_errors(db_err) {
                Some(errors) => (status, Json(json!(errors))).into_response(),
                None => (status, Json(json!({ "detail": self.user_message() }))).into_response(),
            },
            _ => (status, Json(json!({ "detail": self.user_message() }))).into_response(),
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
