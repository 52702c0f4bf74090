//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures
//! - **[`payload`]**: The JSON body extractor used by every handler that takes a body
//!
//! # API Structure
//!
//! Everything is mounted under `/api`:
//!
//! - **Authentication** (`/api/auth/*`): Registration, login and token refresh
//! - **Doctors** (`/api/doctors/*`): Global directory, any authenticated user
//! - **Patients** (`/api/patients/*`): Visible only to the user who created them
//! - **Mappings** (`/api/mappings/*`): Doctor assignments on the caller's patients
//!
//! # OpenAPI Documentation
//!
//! Handlers carry `utoipa` annotations. The document is served at `/api/openapi.json` and
//! rendered at `/docs`.

pub mod handlers;
pub mod models;
pub mod payload;
