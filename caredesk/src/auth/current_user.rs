use crate::{
    api::models::users::CurrentUser,
    auth::session::{self, TokenType},
    db::{errors::DbError, handlers::Users},
    errors::{Error, Result},
    AppState,
};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, instrument, trace};

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// Returns:
/// - None: no Authorization header, or a scheme other than Bearer
/// - Some(Ok(token)): a bearer token was supplied
/// - Some(Err(error)): the header is present but unreadable
fn bearer_token(parts: &Parts) -> Option<Result<&str>> {
    let header = parts.headers.get(AUTHORIZATION)?;

    let value = match header.to_str() {
        Ok(s) => s,
        Err(_) => {
            return Some(Err(Error::Unauthenticated {
                message: Some("Invalid Authorization header.".to_string()),
            }))
        }
    };

    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return Some(Err(Error::Unauthenticated {
            message: Some("Invalid Authorization header. No credentials provided.".to_string()),
        }));
    }
    Some(Ok(token))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = match bearer_token(parts) {
            Some(token) => token?,
            None => {
                trace!("No bearer token found in request");
                return Err(Error::Unauthenticated { message: None });
            }
        };

        // Refresh tokens are rejected here; they are only good for minting new access tokens
        let claims = session::verify_token(token, TokenType::Access, &state.config)?;

        let mut conn = state.db.acquire().await.map_err(DbError::from)?;
        let user = Users::new(&mut conn).get_by_id(claims.sub).await?;

        match user {
            Some(user) if user.is_active => {
                debug!("Found token authenticated user: {}", user.id);
                Ok(user.into())
            }
            Some(_) => Err(Error::Unauthenticated {
                message: Some("User is inactive".to_string()),
            }),
            None => Err(Error::Unauthenticated {
                message: Some("User not found".to_string()),
            }),
        }
    }
}
