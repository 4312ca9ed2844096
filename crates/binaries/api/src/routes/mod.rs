pub mod auth;
pub mod items;
pub mod permissions;
pub mod quota;
pub mod root;

use crate::routes::auth::handlers::{get_me, login, logout, refresh_session, register};
use crate::routes::auth::middleware::{ApiUser, require_admin};
use crate::routes::items::handlers::{
    create_category_handler, create_item_handler, delete_item_handler, favorite_item_handler,
    generate_share_link_handler, get_item_handler, list_categories_handler,
    list_favorites_handler, list_my_items_handler, list_public_items_handler,
    resolve_share_link_handler, unfavorite_item_handler, update_item_handler,
};
use crate::routes::permissions::handlers::{
    get_collaborators_handler, get_item_permissions_handler, grant_permission_handler,
    revoke_permission_handler,
};
use crate::routes::quota::handlers::{
    get_my_quota_handler, near_limits_handler, quota_statistics_handler, set_role_quota_handler,
    set_user_quota_handler, upload_check_handler,
};
use crate::routes::root::handlers::root;
use axum::middleware::{from_extractor_with_state, from_fn};
use axum::routing::{delete, get, post, put};
use axum::Router;
use sqlx::PgPool;
use tower_http::{LatencyUnit, trace::TraceLayer};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable};

// --- API Documentation ---
#[derive(OpenApi)]
#[openapi(
    paths(
        root::handlers::root,
        // Auth handlers
        auth::handlers::login,
        auth::handlers::register,
        auth::handlers::refresh_session,
        auth::handlers::logout,
        auth::handlers::get_me,
        // Item handlers
        items::handlers::create_item_handler,
        items::handlers::get_item_handler,
        items::handlers::update_item_handler,
        items::handlers::delete_item_handler,
        items::handlers::list_my_items_handler,
        items::handlers::list_public_items_handler,
        items::handlers::generate_share_link_handler,
        items::handlers::resolve_share_link_handler,
        items::handlers::favorite_item_handler,
        items::handlers::unfavorite_item_handler,
        items::handlers::list_favorites_handler,
        items::handlers::list_categories_handler,
        items::handlers::create_category_handler,
        // Permission handlers
        permissions::handlers::get_item_permissions_handler,
        permissions::handlers::grant_permission_handler,
        permissions::handlers::revoke_permission_handler,
        permissions::handlers::get_collaborators_handler,
        // Quota handlers
        quota::handlers::get_my_quota_handler,
        quota::handlers::upload_check_handler,
        quota::handlers::set_user_quota_handler,
        quota::handlers::set_role_quota_handler,
        quota::handlers::quota_statistics_handler,
        quota::handlers::near_limits_handler,
    ),
    components(
        schemas(
            // Auth schemas
            common_services::database::app_user::User,
            common_services::database::app_user::UserRole,
            common_services::database::app_user::SubscriptionTier,
            common_services::api::auth::interfaces::CreateUser,
            common_services::api::auth::interfaces::LoginUser,
            common_services::api::auth::interfaces::RefreshTokenPayload,
            common_services::api::auth::interfaces::Tokens,
            // Item schemas
            common_services::database::portfolio::portfolio_item::PortfolioItem,
            common_services::database::category::Category,
            common_services::api::items::interfaces::CreateItemRequest,
            common_services::api::items::interfaces::UpdateItemRequest,
            common_services::api::items::interfaces::CreateCategoryRequest,
            common_services::api::items::interfaces::ItemDetailsResponse,
            // Permission schemas
            common_services::database::portfolio::item_permission::OwnershipType,
            common_services::database::portfolio::item_permission::PermissionLevel,
            common_services::api::permissions::interfaces::ItemCapabilities,
            common_services::api::permissions::interfaces::Collaborator,
            common_services::api::permissions::interfaces::GrantPermissionRequest,
            // Quota schemas
            common_services::api::quota::interfaces::UserQuotaInfo,
            common_services::api::quota::interfaces::UploadCheck,
            common_services::api::quota::interfaces::QuotaStatistics,
            common_services::api::quota::interfaces::NearLimitUser,
            common_services::api::quota::interfaces::SetQuotaRequest,
            common_services::api::quota::interfaces::SetRoleQuotaRequest,
        ),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Items", description = "Endpoints for browsing and managing portfolio items"),
        (name = "Permissions", description = "Endpoints for item collaboration and grants"),
        (name = "Quota", description = "Endpoints for plan limits and upload gating"),
        (name = "Admin", description = "Quota administration and analytics")
    )
)]
struct ApiDoc;

/// A modifier to add bearer token security to the `OpenAPI` specification.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

// --- Router Construction ---
pub fn create_router(pool: PgPool) -> Router {
    let openapi = ApiDoc::openapi();

    Router::new()
        .merge(Scalar::with_url("/docs", openapi))
        .merge(public_routes())
        .merge(protected_routes(pool.clone()))
        .merge(admin_routes(pool.clone()))
        .with_state(pool)
        .layer(
            TraceLayer::new_for_http().on_response(
                tower_http::trace::DefaultOnResponse::new()
                    .level(tracing::Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
        )
}

fn public_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(root))
        .route("/auth/refresh", post(refresh_session))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/items/public", get(list_public_items_handler))
        .route("/items/{item_id}", get(get_item_handler))
        .route(
            "/items/{item_id}/permissions",
            get(get_item_permissions_handler),
        )
        .route("/share/{token}", get(resolve_share_link_handler))
        .route("/categories", get(list_categories_handler))
}

fn protected_routes(pool: PgPool) -> Router<PgPool> {
    Router::new()
        .route("/auth/me", get(get_me))
        .route("/items", post(create_item_handler))
        .route("/items/mine", get(list_my_items_handler))
        .route(
            "/items/{item_id}",
            put(update_item_handler).delete(delete_item_handler),
        )
        .route("/items/{item_id}/share", post(generate_share_link_handler))
        .route(
            "/items/{item_id}/permissions",
            post(grant_permission_handler),
        )
        .route(
            "/items/{item_id}/permissions/{user_id}",
            delete(revoke_permission_handler),
        )
        .route(
            "/items/{item_id}/collaborators",
            get(get_collaborators_handler),
        )
        .route(
            "/items/{item_id}/favorite",
            post(favorite_item_handler).delete(unfavorite_item_handler),
        )
        .route("/favorites", get(list_favorites_handler))
        .route("/quota/me", get(get_my_quota_handler))
        .route("/quota/upload-check", get(upload_check_handler))
        .route_layer(from_extractor_with_state::<ApiUser, PgPool>(pool))
}

fn admin_routes(pool: PgPool) -> Router<PgPool> {
    Router::new()
        .route("/admin/users/{user_id}/quota", put(set_user_quota_handler))
        .route("/admin/roles/{role}/quota", put(set_role_quota_handler))
        .route("/admin/quota/statistics", get(quota_statistics_handler))
        .route("/admin/quota/near-limits", get(near_limits_handler))
        .route("/admin/categories", post(create_category_handler))
        .route_layer(from_fn(require_admin))
        .route_layer(from_extractor_with_state::<ApiUser, PgPool>(pool))
}
