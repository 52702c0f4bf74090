//! JWT access and refresh token creation and verification.
//!
//! Both token kinds are HS256 JWTs signed with `secret_key`. They differ only in the
//! `token_type` claim and in their lifetime; a refresh token is never accepted where an
//! access token is expected and vice versa.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::{
    api::models::{auth::TokenPair, users::CurrentUser},
    config::Config,
    errors::Error,
    types::UserId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: UserId,           // Subject (user ID)
    pub email: String,         // User email
    pub token_type: TokenType, // Access or refresh
    pub jti: Uuid,             // Unique token ID
    pub exp: i64,              // Expiration time
    pub iat: i64,              // Issued at
}

impl TokenClaims {
    /// Create new claims for a user, valid for `lifetime`
    pub fn new(user: &CurrentUser, token_type: TokenType, lifetime: Duration) -> Self {
        let now = Utc::now();
        let exp = now + lifetime;

        Self {
            sub: user.id,
            email: user.email.clone(),
            token_type,
            jti: Uuid::new_v4(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

fn secret_key(config: &Config) -> Result<&str, Error> {
    config.secret_key.as_deref().ok_or_else(|| Error::Internal {
        operation: "JWT tokens: secret_key is required".to_string(),
    })
}

/// Create a signed token of the given type for a user
pub fn create_token(user: &CurrentUser, token_type: TokenType, config: &Config) -> Result<String, Error> {
    let lifetime = match token_type {
        TokenType::Access => config.auth.security.access_token_expiry,
        TokenType::Refresh => config.auth.security.refresh_token_expiry,
    };
    let claims = TokenClaims::new(user, token_type, lifetime);

    let key = EncodingKey::from_secret(secret_key(config)?.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("create JWT: {e}"),
    })
}

/// Issue a fresh access/refresh pair for a user
pub fn issue_token_pair(user: &CurrentUser, config: &Config) -> Result<TokenPair, Error> {
    Ok(TokenPair {
        refresh: create_token(user, TokenType::Refresh, config)?,
        access: create_token(user, TokenType::Access, config)?,
    })
}

/// Verify and decode a token, requiring it to be of the `expected` type
pub fn verify_token(token: &str, expected: TokenType, config: &Config) -> Result<TokenClaims, Error> {
    let key = DecodingKey::from_secret(secret_key(config)?.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<TokenClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        // Client errors (401) - malformed tokens, invalid claims, expired tokens
        jsonwebtoken::errors::ErrorKind::InvalidToken
        | jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::ExpiredSignature
        | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_)
        | jsonwebtoken::errors::ErrorKind::InvalidIssuer
        | jsonwebtoken::errors::ErrorKind::InvalidAudience
        | jsonwebtoken::errors::ErrorKind::InvalidSubject
        | jsonwebtoken::errors::ErrorKind::ImmatureSignature
        | jsonwebtoken::errors::ErrorKind::Base64(_)
        | jsonwebtoken::errors::ErrorKind::Json(_)
        | jsonwebtoken::errors::ErrorKind::Utf8(_)
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => Error::Unauthenticated {
            message: Some("Given token not valid for any token type".to_string()),
        },

        // Server errors (500) - key issues, internal failures
        jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_)
        | jsonwebtoken::errors::ErrorKind::RsaFailedSigning
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithmName
        | jsonwebtoken::errors::ErrorKind::InvalidKeyFormat
        | jsonwebtoken::errors::ErrorKind::MissingAlgorithm
        | jsonwebtoken::errors::ErrorKind::Crypto(_) => Error::Internal {
            operation: format!("JWT verification: {e}"),
        },

        // Catch-all for any future error variants (default to server error for safety)
        _ => Error::Internal {
            operation: format!("JWT verification (unknown error): {e}"),
        },
    })?;

    if token_data.claims.token_type != expected {
        return Err(Error::Unauthenticated {
            message: Some("Given token not valid for any token type".to_string()),
        });
    }

    Ok(token_data.claims)
}
