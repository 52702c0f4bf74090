//! Database record models matching table schemas.
//!
//! This module contains the request and response structs repositories accept and
//! return. They are distinct from API models so storage and API representations can
//! evolve independently.
//!
//! # Conversions
//!
//! - API create/update payloads become DB requests through `TryFrom` (or a `new`
//!   constructor taking the owner), which is where field validation happens. A failed
//!   conversion yields a [`crate::validation::FieldErrors`] map.
//! - DB responses become API responses through `From` impls or the named projection
//!   functions in [`crate::api::models::mappings`].
//!
//! # Models
//!
//! - [`users`]: User accounts and credentials
//! - [`doctors`]: The global doctor directory
//! - [`patients`]: Owner-scoped patient records
//! - [`mappings`]: Patient-doctor assignments

pub mod doctors;
pub mod mappings;
pub mod patients;
pub mod users;
