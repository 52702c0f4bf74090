//! API request and response data models.
//!
//! These types define the JSON shapes of the HTTP API. They derive `ToSchema` for the
//! OpenAPI document and convert from the database models in [`crate::db::models`].
//!
//! - [`auth`]: Registration, login and token refresh
//! - [`users`]: User projection and the authenticated [`users::CurrentUser`]
//! - [`doctors`]: Doctor directory payloads
//! - [`patients`]: Patient payloads
//! - [`mappings`]: Assignment payloads and the list/detail projections

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod auth;
pub mod doctors;
pub mod mappings;
pub mod patients;
pub mod users;

/// Body of responses that only confirm an action, such as deletes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
