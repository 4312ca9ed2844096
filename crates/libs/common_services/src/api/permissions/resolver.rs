use crate::api::permissions::interfaces::ItemCapabilities;
use crate::database::app_user::UserRole;
use crate::database::portfolio::item_permission::{ItemPermission, OwnershipType, PermissionLevel};
use chrono::{DateTime, Utc};

/// The requesting user, as far as resolution cares: identity and role.
/// Anonymous requests pass `None` at the call site.
#[derive(Debug, Clone, Copy)]
pub struct Requester {
    pub user_id: i32,
    pub role: UserRole,
}

/// Everything capability resolution is a function of. No queries happen past
/// this point; the service layer gathers the grant row up front.
#[derive(Debug)]
pub struct ResolveInput<'a> {
    pub requester: Option<Requester>,
    pub item_owner_id: i32,
    pub grant: Option<&'a ItemPermission>,
    pub now: DateTime<Utc>,
}

/// A resolution rule either resolves the capability set or defers to the
/// next rule in the chain.
type Rule = fn(&ResolveInput<'_>) -> Option<ItemCapabilities>;

/// Ordered chain, first match wins. The order is the whole contract:
/// role short-circuits come before ownership, ownership before grants.
const RULES: &[Rule] = &[
    rule_anonymous,
    rule_visitor_role,
    rule_portfolio_tier,
    rule_owner_fallback,
];

/// Resolves the capability set for a requester on an item.
///
/// Pure function of its input. The admin override is not part of this
/// chain; it lives in `can_user_perform_action`.
#[must_use]
pub fn resolve_item_capabilities(input: &ResolveInput<'_>) -> ItemCapabilities {
    for rule in RULES {
        if let Some(resolved) = rule(input) {
            return resolved;
        }
    }
    resolve_explicit_grant(input)
}

/// Anonymous requests can browse anything, nothing more.
fn rule_anonymous(input: &ResolveInput<'_>) -> Option<ItemCapabilities> {
    match input.requester {
        None => Some(ItemCapabilities::view_only()),
        Some(_) => None,
    }
}

/// Visitors browse and favorite but never edit, regardless of ownership or
/// any grant rows that may exist for them.
fn rule_visitor_role(input: &ResolveInput<'_>) -> Option<ItemCapabilities> {
    let requester = input.requester?;
    (requester.role == UserRole::Visitor).then(ItemCapabilities::view_only)
}

/// Creators and collectors: ownership is the sole gate. Their own items give
/// them everything; other people's items are view-only even when an explicit
/// grant exists for them.
fn rule_portfolio_tier(input: &ResolveInput<'_>) -> Option<ItemCapabilities> {
    let requester = input.requester?;
    if !matches!(requester.role, UserRole::Creator | UserRole::Collector) {
        return None;
    }
    if requester.user_id == input.item_owner_id {
        Some(ItemCapabilities::owner_full())
    } else {
        Some(ItemCapabilities::view_only())
    }
}

/// General case for the remaining roles: owners get everything, everyone
/// else falls through to the explicit-grant lookup.
fn rule_owner_fallback(input: &ResolveInput<'_>) -> Option<ItemCapabilities> {
    let requester = input.requester?;
    (requester.user_id == input.item_owner_id).then(ItemCapabilities::owner_full)
}

/// Terminal step: map the live grant (if any) through the fixed
/// level x ownership table. A revoked or expired row counts for nothing.
fn resolve_explicit_grant(input: &ResolveInput<'_>) -> ItemCapabilities {
    match input.grant {
        Some(grant) if grant.is_live(input.now) => {
            grant_capabilities(grant.permission_level, grant.ownership_type)
        }
        _ => ItemCapabilities::none(),
    }
}

/// The fixed mapping from (level, ownership type) to capabilities.
///
/// `can_delete` and `can_grant_permissions` under `full` additionally require
/// the grant's ownership type to be `owner`: a collaborator holding `full`
/// can edit and share but never delete or re-grant. Same for `can_share`
/// under `edit`.
#[must_use]
pub fn grant_capabilities(
    level: PermissionLevel,
    ownership_type: OwnershipType,
) -> ItemCapabilities {
    let is_owner_grant = ownership_type == OwnershipType::Owner;
    match level {
        PermissionLevel::None => ItemCapabilities::none(),
        PermissionLevel::View | PermissionLevel::Comment => ItemCapabilities {
            can_view: true,
            can_edit: false,
            can_delete: false,
            can_share: false,
            can_grant_permissions: false,
            ownership_type: Some(ownership_type),
            permission_level: level,
        },
        PermissionLevel::Edit => ItemCapabilities {
            can_view: true,
            can_edit: true,
            can_delete: false,
            can_share: is_owner_grant,
            can_grant_permissions: false,
            ownership_type: Some(ownership_type),
            permission_level: level,
        },
        PermissionLevel::Full => ItemCapabilities {
            can_view: true,
            can_edit: true,
            can_delete: is_owner_grant,
            can_share: true,
            can_grant_permissions: is_owner_grant,
            ownership_type: Some(ownership_type),
            permission_level: level,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const OWNER_ID: i32 = 1;
    const OTHER_ID: i32 = 2;

    fn grant(
        user_id: i32,
        ownership_type: OwnershipType,
        level: PermissionLevel,
        is_active: bool,
        expires_at: Option<DateTime<Utc>>,
    ) -> ItemPermission {
        ItemPermission {
            id: 1,
            item_id: "item".to_string(),
            user_id,
            ownership_type,
            permission_level: level,
            granted_by: OWNER_ID,
            granted_at: Utc::now(),
            expires_at,
            is_active,
        }
    }

    fn resolve(
        requester: Option<Requester>,
        grant: Option<&ItemPermission>,
    ) -> ItemCapabilities {
        resolve_item_capabilities(&ResolveInput {
            requester,
            item_owner_id: OWNER_ID,
            grant,
            now: Utc::now(),
        })
    }

    #[test]
    fn test_anonymous_is_view_only() {
        let caps = resolve(None, None);
        assert_eq!(caps, ItemCapabilities::view_only());
        assert!(caps.can_view);
        assert!(!caps.can_edit);
        assert_eq!(caps.permission_level, PermissionLevel::View);
        assert_eq!(caps.ownership_type, None);
    }

    #[test]
    fn test_visitor_is_view_only_even_with_full_grant() {
        let g = grant(OTHER_ID, OwnershipType::Owner, PermissionLevel::Full, true, None);
        let requester = Requester {
            user_id: OTHER_ID,
            role: UserRole::Visitor,
        };
        assert_eq!(resolve(Some(requester), Some(&g)), ItemCapabilities::view_only());
    }

    #[test]
    fn test_creator_owner_gets_everything() {
        let requester = Requester {
            user_id: OWNER_ID,
            role: UserRole::Creator,
        };
        let caps = resolve(Some(requester), None);
        assert_eq!(caps, ItemCapabilities::owner_full());
        assert_eq!(caps.ownership_type, Some(OwnershipType::Owner));
        assert_eq!(caps.permission_level, PermissionLevel::Full);
    }

    #[test]
    fn test_collector_grant_is_overridden_by_role_tier() {
        // The end-to-end precedence scenario: an explicit edit grant exists,
        // but the collector is not the owner, so the tier rule wins.
        let g = grant(
            OTHER_ID,
            OwnershipType::Collaborator,
            PermissionLevel::Edit,
            true,
            None,
        );
        let requester = Requester {
            user_id: OTHER_ID,
            role: UserRole::Collector,
        };
        assert_eq!(resolve(Some(requester), Some(&g)), ItemCapabilities::view_only());
    }

    #[test]
    fn test_admin_owner_falls_through_to_owner_rule() {
        let requester = Requester {
            user_id: OWNER_ID,
            role: UserRole::Admin,
        };
        assert_eq!(resolve(Some(requester), None), ItemCapabilities::owner_full());
    }

    #[test]
    fn test_admin_without_grant_gets_nothing_from_the_resolver() {
        // The admin override lives outside the chain on purpose.
        let requester = Requester {
            user_id: OTHER_ID,
            role: UserRole::Admin,
        };
        assert_eq!(resolve(Some(requester), None), ItemCapabilities::none());
    }

    #[test]
    fn test_full_grant_on_collaborator_row_keeps_the_asymmetry() {
        let g = grant(
            OTHER_ID,
            OwnershipType::Collaborator,
            PermissionLevel::Full,
            true,
            None,
        );
        let requester = Requester {
            user_id: OTHER_ID,
            role: UserRole::Admin,
        };
        let caps = resolve(Some(requester), Some(&g));
        assert!(caps.can_view);
        assert!(caps.can_edit);
        assert!(caps.can_share);
        assert!(!caps.can_delete);
        assert!(!caps.can_grant_permissions);
        assert_eq!(caps.permission_level, PermissionLevel::Full);
        assert_eq!(caps.ownership_type, Some(OwnershipType::Collaborator));
    }

    #[test]
    fn test_edit_grant_shares_only_on_owner_rows() {
        let collaborator =
            grant_capabilities(PermissionLevel::Edit, OwnershipType::Collaborator);
        assert!(collaborator.can_edit);
        assert!(!collaborator.can_share);

        let owner = grant_capabilities(PermissionLevel::Edit, OwnershipType::Owner);
        assert!(owner.can_share);
        assert!(!owner.can_delete);
    }

    #[test]
    fn test_comment_grant_is_view_only_in_capabilities() {
        let caps = grant_capabilities(PermissionLevel::Comment, OwnershipType::Collaborator);
        assert!(caps.can_view);
        assert!(!caps.can_edit);
        assert_eq!(caps.permission_level, PermissionLevel::Comment);
    }

    #[test]
    fn test_expired_grant_resolves_to_bottom() {
        let g = grant(
            OTHER_ID,
            OwnershipType::Collaborator,
            PermissionLevel::Full,
            true,
            Some(Utc::now() - Duration::minutes(5)),
        );
        let requester = Requester {
            user_id: OTHER_ID,
            role: UserRole::Admin,
        };
        assert_eq!(resolve(Some(requester), Some(&g)), ItemCapabilities::none());
    }

    #[test]
    fn test_revoked_grant_resolves_to_bottom() {
        let g = grant(
            OTHER_ID,
            OwnershipType::Collaborator,
            PermissionLevel::Full,
            false,
            None,
        );
        let requester = Requester {
            user_id: OTHER_ID,
            role: UserRole::Admin,
        };
        assert_eq!(resolve(Some(requester), Some(&g)), ItemCapabilities::none());
    }

    #[test]
    fn test_no_grant_resolves_to_bottom() {
        let requester = Requester {
            user_id: OTHER_ID,
            role: UserRole::Superadmin,
        };
        let caps = resolve(Some(requester), None);
        assert_eq!(caps, ItemCapabilities::none());
        assert_eq!(caps.permission_level, PermissionLevel::None);
    }
}
