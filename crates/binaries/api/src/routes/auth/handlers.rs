use app_state::settings;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use common_services::api::auth::error::AuthError;
use common_services::api::auth::interfaces::{CreateUser, LoginUser, RefreshTokenPayload, Tokens};
use common_services::api::auth::service;
use common_services::database::app_user::User;
use sqlx::PgPool;

/// Register a new user account.
///
/// The first account on a fresh server becomes the superadmin; later
/// accounts are free-tier creators with the default quota caps.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created successfully.", body = User),
        (status = 400, description = "The username contains illegal characters."),
        (status = 409, description = "A user with this email already exists."),
    )
)]
pub async fn register(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateUser>,
) -> Result<(StatusCode, Json<User>), AuthError> {
    let user = service::create_user(&pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginUser,
    responses(
        (status = 200, description = "Login successful.", body = Tokens),
        (status = 401, description = "Invalid email or password."),
    )
)]
pub async fn login(
    State(pool): State<PgPool>,
    Json(payload): Json<LoginUser>,
) -> Result<Json<Tokens>, AuthError> {
    let user = service::authenticate_user(&pool, &payload.email, &payload.password).await?;
    let tokens =
        service::issue_tokens(&pool, &settings().secrets.jwt, user.id, user.role).await?;
    Ok(Json(tokens))
}

/// Exchange a refresh token for a new access/refresh pair.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "Auth",
    request_body = RefreshTokenPayload,
    responses(
        (status = 200, description = "Tokens rotated.", body = Tokens),
        (status = 401, description = "The refresh token is invalid or expired."),
    )
)]
pub async fn refresh_session(
    State(pool): State<PgPool>,
    Json(payload): Json<RefreshTokenPayload>,
) -> Result<Json<Tokens>, AuthError> {
    service::refresh_tokens(&pool, &settings().secrets.jwt, &payload.refresh_token).await
}

/// Log out by invalidating the provided refresh token.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    request_body = RefreshTokenPayload,
    responses(
        (status = 204, description = "Logged out."),
    )
)]
pub async fn logout(
    State(pool): State<PgPool>,
    Json(payload): Json<RefreshTokenPayload>,
) -> Result<StatusCode, AuthError> {
    service::logout_user(&pool, &payload.refresh_token).await
}

/// Get the currently authenticated user.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "The current user.", body = User),
        (status = 401, description = "Authentication failed."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}
