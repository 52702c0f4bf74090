//! Authentication.
//!
//! Clients register or log in with email and password and receive a token pair:
//!
//! - an **access** token, sent as `Authorization: Bearer <token>` on every protected
//!   request, and
//! - a **refresh** token, accepted only by `/api/auth/token/refresh/` to mint a new
//!   access token.
//!
//! Both are HS256 JWTs signed with the configured `secret_key`. Nothing about a token is
//! stored server side; the user it names is re-loaded on each request so deleted or
//! deactivated accounts stop working immediately.
//!
//! # Modules
//!
//! - [`current_user`]: Extractor resolving the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: Token creation and verification
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use caredesk::api::models::users::CurrentUser;
//!
//! async fn protected_handler(current_user: CurrentUser) -> String {
//!     format!("Hello, {}!", current_user.name)
//! }
//! ```

pub mod current_user;
pub mod password;
pub mod session;
