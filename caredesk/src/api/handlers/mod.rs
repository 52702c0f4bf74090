//! HTTP request handlers for all API endpoints.
//!
//! Each handler validates its input, resolves the caller through the
//! [`CurrentUser`](crate::api::models::users::CurrentUser) extractor where the route is
//! protected, and talks to the database through the repositories in [`crate::db::handlers`].
//!
//! # Handler Modules
//!
//! - [`auth`]: Registration, login and token refresh
//! - [`doctors`]: The global doctor directory
//! - [`patients`]: Owner-scoped patient records
//! - [`mappings`]: Assigning doctors to patients
//! - [`root`]: The unauthenticated endpoint index
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`], which renders as a status code plus either a
//! `{"field": ["message"]}` map (validation) or `{"error": "..."}`.

pub mod auth;
pub mod doctors;
pub mod mappings;
pub mod patients;
pub mod root;
