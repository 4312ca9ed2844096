use crate::routes::auth::middleware::OptionalUser;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use common_services::api::permissions::error::PermissionError;
use common_services::api::permissions::interfaces::{
    Collaborator, GrantPermissionRequest, ItemCapabilities,
};
use common_services::api::permissions::service;
use common_services::database::app_user::User;
use sqlx::PgPool;

/// Resolve the caller's capabilities on an item.
///
/// Works for anonymous callers too: they get the view-only set for existing
/// items and the empty set otherwise.
#[utoipa::path(
    get,
    path = "/items/{item_id}/permissions",
    tag = "Permissions",
    params(
        ("item_id" = String, Path, description = "The unique ID of the item.")
    ),
    responses(
        (status = 200, description = "The caller's resolved capabilities.", body = ItemCapabilities),
    )
)]
pub async fn get_item_permissions_handler(
    State(pool): State<PgPool>,
    OptionalUser(user): OptionalUser,
    Path(item_id): Path<String>,
) -> Json<ItemCapabilities> {
    Json(service::get_user_item_permissions(&pool, &item_id, user.as_ref()).await)
}

/// Grant (or replace) a permission for another user on an item.
///
/// The granter must be an admin or hold grant capability on the item.
/// Re-granting over a revoked or expired grant reactivates it.
#[utoipa::path(
    post,
    path = "/items/{item_id}/permissions",
    tag = "Permissions",
    params(
        ("item_id" = String, Path, description = "The unique ID of the item.")
    ),
    request_body = GrantPermissionRequest,
    responses(
        (status = 204, description = "Permission granted."),
        (status = 403, description = "The caller may not grant permissions on this item."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn grant_permission_handler(
    State(pool): State<PgPool>,
    Extension(user): Extension<User>,
    Path(item_id): Path<String>,
    Json(payload): Json<GrantPermissionRequest>,
) -> Result<StatusCode, PermissionError> {
    let granted = service::grant_permission(
        &pool,
        &item_id,
        payload.user_id,
        &user,
        payload.ownership_type,
        payload.permission_level,
        payload.expires_at,
    )
    .await;

    if granted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(PermissionError::Forbidden(
            "Item not found or permission denied.".to_string(),
        ))
    }
}

/// Revoke a user's permission on an item (soft revoke).
#[utoipa::path(
    delete,
    path = "/items/{item_id}/permissions/{user_id}",
    tag = "Permissions",
    params(
        ("item_id" = String, Path, description = "The unique ID of the item."),
        ("user_id" = i32, Path, description = "The user whose grant is revoked.")
    ),
    responses(
        (status = 204, description = "Permission revoked."),
        (status = 403, description = "The caller may not revoke permissions on this item."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn revoke_permission_handler(
    State(pool): State<PgPool>,
    Extension(user): Extension<User>,
    Path((item_id, target_user_id)): Path<(String, i32)>,
) -> Result<StatusCode, PermissionError> {
    let revoked = service::revoke_permission(&pool, &item_id, target_user_id, &user).await;

    if revoked {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(PermissionError::Forbidden(
            "Item not found or permission denied.".to_string(),
        ))
    }
}

/// List all users holding a live grant on an item.
#[utoipa::path(
    get,
    path = "/items/{item_id}/collaborators",
    tag = "Permissions",
    params(
        ("item_id" = String, Path, description = "The unique ID of the item.")
    ),
    responses(
        (status = 200, description = "The item's collaborators.", body = Vec<Collaborator>),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_collaborators_handler(
    State(pool): State<PgPool>,
    Path(item_id): Path<String>,
) -> Result<Json<Vec<Collaborator>>, PermissionError> {
    let collaborators = service::get_item_collaborators(&pool, &item_id).await?;
    Ok(Json(collaborators))
}
