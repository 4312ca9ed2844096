use crate::api::quota::interfaces::{UploadCheck, UserQuotaInfo};
use crate::database::app_user::{SubscriptionTier, User};

/// Paid and unlimited subscribers, and both admin tiers, are never limited.
/// This bypasses whatever numeric caps happen to be stored on the row.
#[must_use]
pub fn is_exempt_from_limits(user: &User) -> bool {
    matches!(
        user.subscription,
        SubscriptionTier::Paid | SubscriptionTier::Unlimited
    ) || user.role.is_admin()
}

/// Builds the quota snapshot for a user from their row and a live item
/// count. The `is_at_*_limit` flags are retrospective (`>=` against the
/// cap); the upload gate in `check_upload` is the stricter, prospective one.
#[must_use]
pub fn build_quota_info(user: &User, current_items: i64) -> UserQuotaInfo {
    if is_exempt_from_limits(user) {
        return UserQuotaInfo {
            user_id: user.id,
            role: user.role,
            subscription: user.subscription,
            current_items,
            current_storage_used_mb: user.current_storage_used_mb,
            max_items: None,
            max_storage_mb: None,
            items_remaining: None,
            storage_remaining_mb: None,
            is_at_item_limit: false,
            is_at_storage_limit: false,
            can_upload: true,
        };
    }

    let items_remaining = user
        .max_items
        .map(|cap| (i64::from(cap) - current_items).max(0));
    let storage_remaining_mb = user
        .max_storage_mb
        .map(|cap| (cap - user.current_storage_used_mb).max(0.0));

    // A missing cap is never "at limit".
    let is_at_item_limit = user
        .max_items
        .is_some_and(|cap| current_items >= i64::from(cap));
    let is_at_storage_limit = user
        .max_storage_mb
        .is_some_and(|cap| user.current_storage_used_mb >= cap);

    UserQuotaInfo {
        user_id: user.id,
        role: user.role,
        subscription: user.subscription,
        current_items,
        current_storage_used_mb: user.current_storage_used_mb,
        max_items: user.max_items,
        max_storage_mb: user.max_storage_mb,
        items_remaining,
        storage_remaining_mb,
        is_at_item_limit,
        is_at_storage_limit,
        can_upload: !is_at_item_limit && !is_at_storage_limit,
    }
}

/// The upload gate. Checks the item-count cap first, then whether the
/// projected total `current + item_size_mb` would exceed the storage cap.
///
/// The storage check is prospective, unlike `is_at_storage_limit`: a user at
/// 40/50 MB is not "at limit", but a 20 MB upload is still refused. The two
/// checks intentionally disagree.
#[must_use]
pub fn check_upload(info: &UserQuotaInfo, item_size_mb: f64) -> UploadCheck {
    if info.max_items.is_none() && info.max_storage_mb.is_none() {
        return UploadCheck {
            can_upload: true,
            reason: None,
        };
    }

    if let Some(cap) = info.max_items
        && info.current_items >= i64::from(cap)
    {
        return UploadCheck {
            can_upload: false,
            reason: Some(format!(
                "You have reached your limit of {cap} items. Upgrade your plan to upload more."
            )),
        };
    }

    if let Some(cap) = info.max_storage_mb
        && info.current_storage_used_mb + item_size_mb > cap
    {
        return UploadCheck {
            can_upload: false,
            reason: Some(format!(
                "This upload would exceed your storage limit of {cap} MB. Upgrade your plan for more storage."
            )),
        };
    }

    UploadCheck {
        can_upload: true,
        reason: None,
    }
}

/// Usage as a fraction of the cap. A missing or zero cap reads as 0.0
/// ("not near limit"), never NaN or infinity.
#[must_use]
pub fn usage_ratio(current: f64, cap: Option<f64>) -> f64 {
    match cap {
        Some(cap) if cap > 0.0 => current / cap,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::app_user::UserRole;
    use chrono::Utc;

    fn user(
        role: UserRole,
        subscription: SubscriptionTier,
        max_items: Option<i32>,
        max_storage_mb: Option<f64>,
        current_storage_used_mb: f64,
    ) -> User {
        User {
            id: 7,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            email: "artist@example.com".to_string(),
            name: "Artist".to_string(),
            role,
            subscription,
            max_items,
            max_storage_mb,
            current_storage_used_mb,
        }
    }

    #[test]
    fn test_at_item_limit_blocks_upload() {
        let u = user(UserRole::Creator, SubscriptionTier::Free, Some(10), Some(500.0), 0.0);
        let info = build_quota_info(&u, 10);
        assert!(info.is_at_item_limit);
        assert!(!info.can_upload);
        assert_eq!(info.items_remaining, Some(0));
    }

    #[test]
    fn test_unlimited_subscription_ignores_stored_caps() {
        // Even a nonsensical stored cap of zero is bypassed.
        let u = user(UserRole::Creator, SubscriptionTier::Unlimited, Some(0), Some(0.0), 123.0);
        let info = build_quota_info(&u, 42);
        assert_eq!(info.max_items, None);
        assert_eq!(info.max_storage_mb, None);
        assert!(info.can_upload);
        assert!(check_upload(&info, 10_000.0).can_upload);
    }

    #[test]
    fn test_admin_role_is_exempt() {
        let u = user(UserRole::Admin, SubscriptionTier::Free, Some(1), Some(1.0), 999.0);
        assert!(is_exempt_from_limits(&u));
        assert!(build_quota_info(&u, 999).can_upload);
    }

    #[test]
    fn test_prospective_and_retrospective_checks_disagree() {
        // 40 of 50 MB used: not at limit, but a 20 MB upload is refused.
        let u = user(UserRole::Creator, SubscriptionTier::Free, Some(100), Some(50.0), 40.0);
        let info = build_quota_info(&u, 3);
        assert!(!info.is_at_storage_limit);
        assert!(info.can_upload);

        let check = check_upload(&info, 20.0);
        assert!(!check.can_upload);
        assert!(check.reason.is_some());

        // A 10 MB upload lands exactly on the cap and passes.
        assert!(check_upload(&info, 10.0).can_upload);
    }

    #[test]
    fn test_item_limit_reason_comes_before_storage() {
        let u = user(UserRole::Creator, SubscriptionTier::Free, Some(5), Some(10.0), 10.0);
        let info = build_quota_info(&u, 5);
        let check = check_upload(&info, 50.0);
        assert!(!check.can_upload);
        let reason = check.reason.expect("reason should be set");
        assert!(reason.contains("5 items"));
    }

    #[test]
    fn test_missing_caps_never_limit() {
        let u = user(UserRole::Creator, SubscriptionTier::Free, None, None, 1e9);
        let info = build_quota_info(&u, 1_000_000);
        assert!(!info.is_at_item_limit);
        assert!(!info.is_at_storage_limit);
        assert!(info.can_upload);
        assert_eq!(info.items_remaining, None);
        assert!(check_upload(&info, 1e6).can_upload);
    }

    #[test]
    fn test_remaining_counts_floor_at_zero() {
        let u = user(UserRole::Creator, SubscriptionTier::Free, Some(10), Some(100.0), 150.0);
        let info = build_quota_info(&u, 25);
        assert_eq!(info.items_remaining, Some(0));
        assert_eq!(info.storage_remaining_mb, Some(0.0));
        assert!(info.is_at_item_limit);
        assert!(info.is_at_storage_limit);
    }

    #[test]
    fn test_usage_ratio_guards_missing_and_zero_caps() {
        assert!((usage_ratio(40.0, Some(50.0)) - 0.8).abs() < f64::EPSILON);
        assert_eq!(usage_ratio(40.0, None), 0.0);
        assert_eq!(usage_ratio(40.0, Some(0.0)), 0.0);
    }
}
