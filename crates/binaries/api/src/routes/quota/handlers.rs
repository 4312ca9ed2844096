use app_state::constants;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use common_services::api::quota::error::QuotaError;
use common_services::api::quota::interfaces::{
    NearLimitParams, NearLimitUser, QuotaStatistics, SetQuotaRequest, SetRoleQuotaRequest,
    UploadCheck, UploadCheckParams, UserQuotaInfo,
};
use common_services::api::quota::service;
use common_services::database::app_user::{User, UserRole};
use sqlx::PgPool;

/// Get the current user's quota usage.
#[utoipa::path(
    get,
    path = "/quota/me",
    tag = "Quota",
    responses(
        (status = 200, description = "The user's quota snapshot.", body = UserQuotaInfo),
        (status = 404, description = "User not found."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_my_quota_handler(
    State(pool): State<PgPool>,
    Extension(user): Extension<User>,
) -> Result<Json<UserQuotaInfo>, QuotaError> {
    let info = service::get_user_quota_info(&pool, user.id)
        .await?
        .ok_or(QuotaError::UserNotFound(user.id))?;
    Ok(Json(info))
}

/// Check whether an upload of the given size would be admitted.
///
/// The storage check is prospective: it refuses an upload that would push
/// usage past the cap, even when current usage is still below it.
#[utoipa::path(
    get,
    path = "/quota/upload-check",
    tag = "Quota",
    params(UploadCheckParams),
    responses(
        (status = 200, description = "The gate's verdict, with an upgrade prompt when closed.", body = UploadCheck),
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_check_handler(
    State(pool): State<PgPool>,
    Extension(user): Extension<User>,
    Query(params): Query<UploadCheckParams>,
) -> Json<UploadCheck> {
    Json(service::can_user_upload(&pool, user.id, params.item_size_mb).await)
}

/// Set a user's quota caps and optionally their subscription tier.
/// Admins only; `null` caps mean unlimited.
#[utoipa::path(
    put,
    path = "/admin/users/{user_id}/quota",
    tag = "Admin",
    params(
        ("user_id" = i32, Path, description = "The user whose quota is updated.")
    ),
    request_body = SetQuotaRequest,
    responses(
        (status = 204, description = "Quota updated."),
        (status = 404, description = "User not found."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_user_quota_handler(
    State(pool): State<PgPool>,
    Path(user_id): Path<i32>,
    Json(payload): Json<SetQuotaRequest>,
) -> Result<StatusCode, QuotaError> {
    let updated = service::set_user_quota(
        &pool,
        user_id,
        payload.max_items,
        payload.max_storage_mb,
        payload.subscription,
    )
    .await;

    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(QuotaError::UserNotFound(user_id))
    }
}

/// Apply quota caps to every user with the given role.
///
/// This is a batch overwrite: per-user overrides for that role are
/// clobbered.
#[utoipa::path(
    put,
    path = "/admin/roles/{role}/quota",
    tag = "Admin",
    params(
        ("role" = UserRole, Path, description = "The role whose users are updated.")
    ),
    request_body = SetRoleQuotaRequest,
    responses(
        (status = 204, description = "Quota defaults applied."),
        (status = 500, description = "The batch update failed."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_role_quota_handler(
    State(pool): State<PgPool>,
    Path(role): Path<UserRole>,
    Json(payload): Json<SetRoleQuotaRequest>,
) -> StatusCode {
    let updated = service::set_default_quota_for_role(
        &pool,
        role,
        payload.max_items,
        payload.max_storage_mb,
    )
    .await;

    if updated {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Aggregate quota usage across all users, for the admin dashboard.
#[utoipa::path(
    get,
    path = "/admin/quota/statistics",
    tag = "Admin",
    responses(
        (status = 200, description = "Aggregate quota statistics.", body = QuotaStatistics),
    ),
    security(("bearer_auth" = []))
)]
pub async fn quota_statistics_handler(
    State(pool): State<PgPool>,
) -> Result<Json<QuotaStatistics>, QuotaError> {
    let stats = service::get_quota_statistics(&pool).await?;
    Ok(Json(stats))
}

/// List free-tier users approaching their caps.
#[utoipa::path(
    get,
    path = "/admin/quota/near-limits",
    tag = "Admin",
    params(NearLimitParams),
    responses(
        (status = 200, description = "Users near their item or storage limit.", body = Vec<NearLimitUser>),
    ),
    security(("bearer_auth" = []))
)]
pub async fn near_limits_handler(
    State(pool): State<PgPool>,
    Query(params): Query<NearLimitParams>,
) -> Result<Json<Vec<NearLimitUser>>, QuotaError> {
    let default_threshold = constants().quota.near_limit_threshold;
    let users = service::get_users_near_limits(
        &pool,
        params.item_threshold.unwrap_or(default_threshold),
        params.storage_threshold.unwrap_or(default_threshold),
    )
    .await?;
    Ok(Json(users))
}
