use crate::routes::auth::middleware::OptionalUser;
use app_state::settings;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use common_services::api::items::error::ItemError;
use common_services::api::items::interfaces::{
    CreateCategoryRequest, CreateItemRequest, ItemDetailsResponse, ListPublicParams,
    UpdateItemRequest,
};
use common_services::api::items::service;
use common_services::database::app_user::User;
use common_services::database::category::Category;
use common_services::database::portfolio::portfolio_item::PortfolioItem;
use sqlx::PgPool;

/// Upload a new portfolio item.
///
/// The upload is gated on the user's quota; the owner permission record and
/// the storage accounting are written together with the item.
#[utoipa::path(
    post,
    path = "/items",
    tag = "Items",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created successfully.", body = PortfolioItem),
        (status = 403, description = "The user's quota does not allow this upload."),
        (status = 500, description = "A database or internal error occurred."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_item_handler(
    State(pool): State<PgPool>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<PortfolioItem>), ItemError> {
    let item = service::create_item(&pool, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Get details for a specific item.
///
/// Anyone may view an existing item; the response includes the caller's
/// resolved capabilities and the item's collaborators.
#[utoipa::path(
    get,
    path = "/items/{item_id}",
    tag = "Items",
    params(
        ("item_id" = String, Path, description = "The unique ID of the item.")
    ),
    responses(
        (status = 200, description = "Detailed information about the item.", body = ItemDetailsResponse),
        (status = 404, description = "Item not found."),
    )
)]
pub async fn get_item_handler(
    State(pool): State<PgPool>,
    OptionalUser(user): OptionalUser,
    Path(item_id): Path<String>,
) -> Result<Json<ItemDetailsResponse>, ItemError> {
    let details = service::get_item_details(&pool, &item_id, user.as_ref()).await?;
    Ok(Json(details))
}

/// Update an item's details.
///
/// The caller needs edit capability: the owner, a collaborator holding an
/// edit or full grant, or an admin.
#[utoipa::path(
    put,
    path = "/items/{item_id}",
    tag = "Items",
    params(
        ("item_id" = String, Path, description = "The unique ID of the item to update.")
    ),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated successfully.", body = PortfolioItem),
        (status = 404, description = "Item not found or permission denied."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_item_handler(
    State(pool): State<PgPool>,
    Extension(user): Extension<User>,
    Path(item_id): Path<String>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<Json<PortfolioItem>, ItemError> {
    let item = service::update_item(&pool, &item_id, &user, payload).await?;
    Ok(Json(item))
}

/// Delete an item.
///
/// Owners and admins only; a collaborator's `full` grant does not suffice.
/// Permissions and favorites are deleted with the item.
#[utoipa::path(
    delete,
    path = "/items/{item_id}",
    tag = "Items",
    params(
        ("item_id" = String, Path, description = "The unique ID of the item to delete.")
    ),
    responses(
        (status = 204, description = "Item deleted successfully."),
        (status = 404, description = "Item not found or permission denied."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_item_handler(
    State(pool): State<PgPool>,
    Extension(user): Extension<User>,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ItemError> {
    service::delete_item(&pool, &item_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the current user's own items.
#[utoipa::path(
    get,
    path = "/items/mine",
    tag = "Items",
    responses(
        (status = 200, description = "The user's items.", body = Vec<PortfolioItem>),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_items_handler(
    State(pool): State<PgPool>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<PortfolioItem>>, ItemError> {
    let items = service::list_user_items(&pool, user.id).await?;
    Ok(Json(items))
}

/// Browse public items, optionally filtered by category.
#[utoipa::path(
    get,
    path = "/items/public",
    tag = "Items",
    params(ListPublicParams),
    responses(
        (status = 200, description = "Public items.", body = Vec<PortfolioItem>),
    )
)]
pub async fn list_public_items_handler(
    State(pool): State<PgPool>,
    Query(params): Query<ListPublicParams>,
) -> Result<Json<Vec<PortfolioItem>>, ItemError> {
    let items = service::list_public_items(&pool, params.category.as_deref()).await?;
    Ok(Json(items))
}

/// Generate an expiring share link token for an item.
///
/// The caller needs share capability on the item.
#[utoipa::path(
    post,
    path = "/items/{item_id}/share",
    tag = "Items",
    params(
        ("item_id" = String, Path, description = "The unique ID of the item to share.")
    ),
    responses(
        (status = 200, description = "Share token generated successfully.", body = String),
        (status = 404, description = "Item not found or permission denied."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn generate_share_link_handler(
    State(pool): State<PgPool>,
    Extension(user): Extension<User>,
    Path(item_id): Path<String>,
) -> Result<Json<String>, ItemError> {
    let api_settings = &settings().api;
    let token = service::generate_share_token(
        &pool,
        api_settings.public_url.clone(),
        &settings().secrets.jwt,
        &item_id,
        &user,
    )
    .await?;
    Ok(Json(token))
}

/// Resolve a share link token to its item, without authentication.
#[utoipa::path(
    get,
    path = "/share/{token}",
    tag = "Items",
    params(
        ("token" = String, Path, description = "The share link token.")
    ),
    responses(
        (status = 200, description = "The shared item.", body = PortfolioItem),
        (status = 400, description = "The share token is expired or malformed."),
        (status = 404, description = "The shared item no longer exists."),
    )
)]
pub async fn resolve_share_link_handler(
    State(pool): State<PgPool>,
    Path(token): Path<String>,
) -> Result<Json<PortfolioItem>, ItemError> {
    let item = service::resolve_share_token(&pool, &settings().secrets.jwt, &token).await?;
    Ok(Json(item))
}

/// Favorite an item.
#[utoipa::path(
    post,
    path = "/items/{item_id}/favorite",
    tag = "Favorites",
    params(
        ("item_id" = String, Path, description = "The unique ID of the item.")
    ),
    responses(
        (status = 204, description = "Item favorited."),
        (status = 404, description = "Item not found."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn favorite_item_handler(
    State(pool): State<PgPool>,
    Extension(user): Extension<User>,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ItemError> {
    service::favorite_item(&pool, &item_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove an item from the current user's favorites.
#[utoipa::path(
    delete,
    path = "/items/{item_id}/favorite",
    tag = "Favorites",
    params(
        ("item_id" = String, Path, description = "The unique ID of the item.")
    ),
    responses(
        (status = 204, description = "Favorite removed."),
        (status = 404, description = "The item was not favorited."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn unfavorite_item_handler(
    State(pool): State<PgPool>,
    Extension(user): Extension<User>,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ItemError> {
    service::unfavorite_item(&pool, &item_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the current user's favorite items.
#[utoipa::path(
    get,
    path = "/favorites",
    tag = "Favorites",
    responses(
        (status = 200, description = "The user's favorite items.", body = Vec<PortfolioItem>),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_favorites_handler(
    State(pool): State<PgPool>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<PortfolioItem>>, ItemError> {
    let items = service::list_favorites(&pool, user.id).await?;
    Ok(Json(items))
}

/// List all categories.
#[utoipa::path(
    get,
    path = "/categories",
    tag = "Items",
    responses(
        (status = 200, description = "All categories.", body = Vec<Category>),
    )
)]
pub async fn list_categories_handler(
    State(pool): State<PgPool>,
) -> Result<Json<Vec<Category>>, ItemError> {
    let categories = service::list_categories(&pool).await?;
    Ok(Json(categories))
}

/// Create a new category. Admins only.
#[utoipa::path(
    post,
    path = "/admin/categories",
    tag = "Admin",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created.", body = Category),
        (status = 403, description = "Permission denied."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_category_handler(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ItemError> {
    let category =
        service::create_category(&pool, &payload.name, payload.description.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
