use crate::api::quota::error::QuotaError;
use crate::api::quota::interfaces::{
    NearLimitUser, QuotaStatistics, UploadCheck, UserQuotaInfo,
};
use crate::api::quota::usage::{build_quota_info, check_upload, usage_ratio};
use crate::database::app_user::{SubscriptionTier, UserRole};
use crate::database::item_store::ItemStore;
use crate::database::user_store::UserStore;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{error, instrument};

/// Computes a user's quota snapshot: live item count plus the stored
/// storage-usage field, measured against their caps. `None` means the user
/// does not exist.
#[instrument(skip(pool))]
pub async fn get_user_quota_info(
    pool: &PgPool,
    user_id: i32,
) -> Result<Option<UserQuotaInfo>, QuotaError> {
    let Some(user) = UserStore::find_by_id(pool, user_id).await? else {
        return Ok(None);
    };
    let current_items = ItemStore::count_by_user(pool, user.id).await?;
    Ok(Some(build_quota_info(&user, current_items)))
}

/// The upload gate. Degrades gracefully: an unknown user or a failed lookup
/// yields a closed gate with a reason, never an error.
#[instrument(skip(pool))]
pub async fn can_user_upload(pool: &PgPool, user_id: i32, item_size_mb: f64) -> UploadCheck {
    match get_user_quota_info(pool, user_id).await {
        Ok(Some(info)) => check_upload(&info, item_size_mb),
        Ok(None) => UploadCheck {
            can_upload: false,
            reason: Some("User not found.".to_string()),
        },
        Err(e) => {
            error!("Upload gate failed for user {user_id}: {e}");
            UploadCheck {
                can_upload: false,
                reason: Some("Your quota could not be determined.".to_string()),
            }
        }
    }
}

/// Overwrites one user's caps (and optionally their subscription tier).
/// Values are caller-validated; returns whether the update was applied.
#[instrument(skip(pool))]
pub async fn set_user_quota(
    pool: &PgPool,
    user_id: i32,
    max_items: Option<i32>,
    max_storage_mb: Option<f64>,
    subscription: Option<SubscriptionTier>,
) -> bool {
    match UserStore::set_quota(pool, user_id, max_items, max_storage_mb, subscription).await {
        Ok(result) => result.rows_affected() > 0,
        Err(e) => {
            error!("Failed to set quota for user {user_id}: {e}");
            false
        }
    }
}

/// Bulk-applies caps to every user with the given role. Clobbers any
/// per-user overrides for that role; that is the documented behavior.
#[instrument(skip(pool))]
pub async fn set_default_quota_for_role(
    pool: &PgPool,
    role: UserRole,
    max_items: Option<i32>,
    max_storage_mb: Option<f64>,
) -> bool {
    match UserStore::set_quota_for_role(pool, role, max_items, max_storage_mb).await {
        Ok(_) => true,
        Err(e) => {
            error!("Failed to set default quota for role {role}: {e}");
            false
        }
    }
}

/// Aggregates quota usage across all users for the admin dashboard.
///
/// Item counts come from one grouped query and are joined in memory against
/// the user list, instead of a count query per user.
#[instrument(skip(pool))]
pub async fn get_quota_statistics(pool: &PgPool) -> Result<QuotaStatistics, QuotaError> {
    let users = UserStore::list_users(pool).await?;
    let item_counts: HashMap<i32, i64> = ItemStore::count_grouped_by_user(pool)
        .await?
        .into_iter()
        .collect();

    let mut stats = QuotaStatistics {
        total_users: users.len() as i64,
        free_users: 0,
        paid_users: 0,
        unlimited_users: 0,
        users_at_item_limit: 0,
        users_at_storage_limit: 0,
        total_items: 0,
        total_storage_used_mb: 0.0,
    };

    for user in &users {
        match user.subscription {
            SubscriptionTier::Free => stats.free_users += 1,
            SubscriptionTier::Paid => stats.paid_users += 1,
            SubscriptionTier::Unlimited => stats.unlimited_users += 1,
        }

        let current_items = item_counts.get(&user.id).copied().unwrap_or(0);
        stats.total_items += current_items;
        stats.total_storage_used_mb += user.current_storage_used_mb;

        let info = build_quota_info(user, current_items);
        if info.is_at_item_limit {
            stats.users_at_item_limit += 1;
        }
        if info.is_at_storage_limit {
            stats.users_at_storage_limit += 1;
        }
    }

    Ok(stats)
}

/// Lists free-tier users whose usage ratio meets either threshold. Users on
/// other tiers are not evaluated at all. Missing caps read as ratio 0, so
/// uncapped users never show up as "near limit".
#[instrument(skip(pool))]
pub async fn get_users_near_limits(
    pool: &PgPool,
    item_threshold: f64,
    storage_threshold: f64,
) -> Result<Vec<NearLimitUser>, QuotaError> {
    let users = UserStore::list_users(pool).await?;
    let item_counts: HashMap<i32, i64> = ItemStore::count_grouped_by_user(pool)
        .await?
        .into_iter()
        .collect();

    let mut near_limit = Vec::new();
    for user in users {
        if user.subscription != SubscriptionTier::Free {
            continue;
        }

        let current_items = item_counts.get(&user.id).copied().unwrap_or(0);
        let item_usage = usage_ratio(current_items as f64, user.max_items.map(f64::from));
        let storage_usage = usage_ratio(user.current_storage_used_mb, user.max_storage_mb);

        if item_usage >= item_threshold || storage_usage >= storage_threshold {
            near_limit.push(NearLimitUser {
                user_id: user.id,
                name: user.name,
                email: user.email,
                current_items,
                max_items: user.max_items,
                item_usage,
                current_storage_used_mb: user.current_storage_used_mb,
                max_storage_mb: user.max_storage_mb,
                storage_usage,
            });
        }
    }

    Ok(near_limit)
}
