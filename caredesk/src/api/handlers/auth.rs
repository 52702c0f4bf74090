//! Registration, login and token refresh.

use crate::{
    api::{
        models::{
            auth::{AccessTokenResponse, AuthResponse, LoginRequest, RefreshRequest, RegisterRequest},
            users::{CurrentUser, UserResponse},
        },
        payload::Payload,
    },
    auth::{
        password::{self, Argon2Params},
        session::{self, TokenType},
    },
    db::{handlers::Users, models::users::UserCreateDBRequest},
    errors::Error,
    validation::{self, FieldErrors, BLANK, NAME_MAX_LENGTH},
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};

pub const REGISTERED: &str = "User registered successfully";
pub const LOGGED_IN: &str = "Login successful";

/// Check a registration request, returning the normalized email on success
fn validate_registration(request: &RegisterRequest, state: &AppState) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::new();

    validation::text(&mut errors, "name", &request.name, NAME_MAX_LENGTH);
    let email = validation::email(&mut errors, "email", &request.email);

    if request.password.is_empty() {
        errors.add("password", BLANK);
    } else if request.password != request.password_confirm {
        errors.add("password", "Password fields didn't match.");
    } else {
        let local_part = request.email.split('@').next().unwrap_or_default();
        let attributes = [("email address", local_part), ("name", request.name.as_str())];
        for problem in validation::password_strength(&request.password, &state.config.auth.password, &attributes) {
            errors.add("password", problem);
        }
    }
    if request.password_confirm.is_empty() {
        errors.add("password_confirm", BLANK);
    }

    match email {
        Some(email) if errors.is_empty() => Ok(email),
        _ => Err(errors),
    }
}

#[utoipa::path(
    post,
    path = "/auth/register/",
    request_body = RegisterRequest,
    tag = "authentication",
    summary = "Register",
    description = "Create an account and receive an access/refresh token pair.",
    responses(
        (status = 201, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Invalid request or email already registered", body = FieldErrors),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Payload(request): Payload<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    let email = validate_registration(&request, &state).map_err(Error::Validation)?;

    let password_hash = password::hash_password(request.password, Argon2Params::from(&state.config.auth.password)).await?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let mut user_repo = Users::new(&mut tx);
    if user_repo.get_user_by_email(&email).await?.is_some() {
        return Err(Error::Validation(FieldErrors::single(
            "email",
            "user with this email already exists.",
        )));
    }

    let created_user = user_repo
        .create(&UserCreateDBRequest {
            email,
            name: request.name,
            password_hash,
            is_staff: false,
        })
        .await?;

    // A concurrent registration for the same email fails here with users_email_key
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let tokens = session::issue_token_pair(&CurrentUser::from(created_user.clone()), &state.config)?;
    tracing::info!("Registered user {}", created_user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: REGISTERED.to_string(),
            user: UserResponse::from(created_user),
            tokens,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login/",
    request_body = LoginRequest,
    tag = "authentication",
    summary = "Login",
    description = "Exchange email and password for an access/refresh token pair.",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid email or password"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Payload(request): Payload<LoginRequest>) -> Result<Json<AuthResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    let user = user_repo
        .get_user_by_email(&validation::normalize_email(&request.email))
        .await?
        .filter(|user| user.is_active)
        .ok_or(Error::InvalidCredentials)?;

    let is_valid = password::verify_password(request.password, user.password_hash.clone()).await?;
    if !is_valid {
        return Err(Error::InvalidCredentials);
    }

    let tokens = session::issue_token_pair(&CurrentUser::from(user.clone()), &state.config)?;

    Ok(Json(AuthResponse {
        message: LOGGED_IN.to_string(),
        user: UserResponse::from(user),
        tokens,
    }))
}

#[utoipa::path(
    post,
    path = "/auth/token/refresh/",
    request_body = RefreshRequest,
    tag = "authentication",
    summary = "Refresh access token",
    description = "Exchange a refresh token for a new access token.",
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 401, description = "Refresh token invalid, expired, or its user is gone"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    Payload(request): Payload<RefreshRequest>,
) -> Result<Json<AccessTokenResponse>, Error> {
    let claims = session::verify_token(&request.refresh, TokenType::Refresh, &state.config)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .get_by_id(claims.sub)
        .await?
        .filter(|user| user.is_active)
        .ok_or(Error::Unauthenticated {
            message: Some("User not found".to_string()),
        })?;

    let access = session::create_token(&CurrentUser::from(user), TokenType::Access, &state.config)?;
    Ok(Json(AccessTokenResponse { access }))
}
