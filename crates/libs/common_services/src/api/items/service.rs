use crate::api::items::error::ItemError;
use crate::api::items::interfaces::{
    CreateItemRequest, ItemDetailsResponse, ShareClaims, UpdateItemRequest,
};
use crate::api::permissions::interfaces::ItemAction;
use crate::api::permissions::service::{
    can_user_perform_action, get_item_collaborators, get_user_item_permissions,
    grant_ownership_on_upload,
};
use crate::api::quota;
use crate::database::app_user::User;
use crate::database::category::Category;
use crate::database::category_store::CategoryStore;
use crate::database::favorite_store::FavoriteStore;
use crate::database::item_store::ItemStore;
use crate::database::portfolio::portfolio_item::{NewPortfolioItem, PortfolioItem};
use crate::database::user_store::UserStore;
use crate::utils::nice_id;
use app_state::constants;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sqlx::PgPool;
use tracing::{info, instrument};

/// Creates a portfolio item for the uploader.
///
/// The quota gate runs first with the projected upload size. The item row,
/// the owner/full permission record, and the storage-usage increment are one
/// transaction, so a failure in any of them aborts the upload as a whole.
#[instrument(skip(pool, user, payload))]
pub async fn create_item(
    pool: &PgPool,
    user: &User,
    payload: CreateItemRequest,
) -> Result<PortfolioItem, ItemError> {
    let check = quota::service::can_user_upload(pool, user.id, payload.file_size_mb).await;
    if !check.can_upload {
        return Err(ItemError::QuotaExceeded(
            check.reason.unwrap_or_else(|| "Upload quota exceeded.".to_string()),
        ));
    }

    let mut tx = pool.begin().await?;
    let item = ItemStore::create(
        &mut *tx,
        &NewPortfolioItem {
            id: nice_id(constants().database.item_id_length),
            user_id: user.id,
            title: payload.title,
            description: payload.description,
            category: payload.category,
            marketplace_url: payload.marketplace_url,
            token_contract: payload.token_contract,
            token_id: payload.token_id,
            file_size_mb: payload.file_size_mb,
            is_public: payload.is_public,
        },
    )
    .await?;
    grant_ownership_on_upload(&mut *tx, &item.id, user.id).await?;
    UserStore::adjust_storage_used(&mut *tx, user.id, item.file_size_mb).await?;
    tx.commit().await?;

    info!("User {} created item {}", user.id, item.id);
    Ok(item)
}

/// Fetches an item with the caller's resolved capabilities and its
/// collaborators. Anyone may view; a missing item is the only 404 path.
#[instrument(skip(pool, user))]
pub async fn get_item_details(
    pool: &PgPool,
    item_id: &str,
    user: Option<&User>,
) -> Result<ItemDetailsResponse, ItemError> {
    if !can_user_perform_action(pool, item_id, user, ItemAction::View).await {
        return Err(ItemError::NotFound(item_id.to_string()));
    }

    let item = ItemStore::find_by_id(pool, item_id)
        .await?
        .ok_or_else(|| ItemError::NotFound(item_id.to_string()))?;

    let (capabilities, collaborators) = tokio::join!(
        get_user_item_permissions(pool, item_id, user),
        get_item_collaborators(pool, item_id),
    );

    Ok(ItemDetailsResponse {
        item,
        capabilities,
        collaborators: collaborators?,
    })
}

/// Updates an item's details. The caller needs edit capability (owners,
/// holders of an edit/full grant, admins).
#[instrument(skip(pool, user))]
pub async fn update_item(
    pool: &PgPool,
    item_id: &str,
    user: &User,
    payload: UpdateItemRequest,
) -> Result<PortfolioItem, ItemError> {
    if !can_user_perform_action(pool, item_id, Some(user), ItemAction::Edit).await {
        return Err(ItemError::NotFound(
            "Item not found or permission denied.".to_string(),
        ));
    }

    Ok(ItemStore::update(
        pool,
        item_id,
        payload.title,
        payload.description,
        payload.category,
        payload.marketplace_url,
        payload.is_public,
    )
    .await?)
}

/// Deletes an item and releases its storage from the owner's usage.
/// Permissions and favorites cascade with the row.
#[instrument(skip(pool, user))]
pub async fn delete_item(pool: &PgPool, item_id: &str, user: &User) -> Result<(), ItemError> {
    if !can_user_perform_action(pool, item_id, Some(user), ItemAction::Delete).await {
        return Err(ItemError::NotFound(
            "Item not found or permission denied.".to_string(),
        ));
    }

    let Some(owner_id) = ItemStore::find_owner_by_id(pool, item_id).await? else {
        return Err(ItemError::NotFound(item_id.to_string()));
    };
    let file_size_mb = ItemStore::find_file_size_by_id(pool, item_id)
        .await?
        .unwrap_or(0.0);

    let mut tx = pool.begin().await?;
    ItemStore::delete(&mut *tx, item_id).await?;
    UserStore::adjust_storage_used(&mut *tx, owner_id, -file_size_mb).await?;
    tx.commit().await?;

    info!("User {} deleted item {item_id}", user.id);
    Ok(())
}

pub async fn list_user_items(pool: &PgPool, user_id: i32) -> Result<Vec<PortfolioItem>, ItemError> {
    Ok(ItemStore::list_by_user(pool, user_id).await?)
}

pub async fn list_public_items(
    pool: &PgPool,
    category: Option<&str>,
) -> Result<Vec<PortfolioItem>, ItemError> {
    Ok(ItemStore::list_public(pool, category).await?)
}

//================================================================================
// Share Links
//================================================================================

fn encode_share_claims(jwt_secret: &str, claims: &ShareClaims) -> Result<String, ItemError> {
    Ok(encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )?)
}

fn decode_share_claims(jwt_secret: &str, token: &str) -> Result<ShareClaims, ItemError> {
    Ok(decode::<ShareClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| ItemError::InvalidShareToken("expired or malformed".to_string()))?
    .claims)
}

/// Generates an expiring share link token for an item. The caller needs
/// share capability on the item.
#[instrument(skip(pool, jwt_secret, user))]
pub async fn generate_share_token(
    pool: &PgPool,
    public_url: String,
    jwt_secret: &str,
    item_id: &str,
    user: &User,
) -> Result<String, ItemError> {
    if !can_user_perform_action(pool, item_id, Some(user), ItemAction::Share).await {
        return Err(ItemError::NotFound(
            "Item not found or permission denied.".to_string(),
        ));
    }

    let expires_at =
        (Utc::now() + Duration::minutes(constants().auth.share_link_expiry_minutes)).timestamp();

    let claims = ShareClaims {
        iss: public_url,
        sub: item_id.to_owned(),
        exp: expires_at,
        sharer_name: user.name.clone(),
    };

    encode_share_claims(jwt_secret, &claims)
}

/// Resolves a share link token to its item, granting the bearer view access
/// without authentication. Expired or malformed tokens are rejected.
#[instrument(skip(pool, jwt_secret, token))]
pub async fn resolve_share_token(
    pool: &PgPool,
    jwt_secret: &str,
    token: &str,
) -> Result<PortfolioItem, ItemError> {
    let claims = decode_share_claims(jwt_secret, token)?;

    ItemStore::find_by_id(pool, &claims.sub)
        .await?
        .ok_or_else(|| ItemError::NotFound(claims.sub))
}

//================================================================================
// Favorites
//================================================================================

/// Favorites an item for the user. Favoriting requires view access, which
/// every role has for existing items; a missing item resolves to no access.
#[instrument(skip(pool, user))]
pub async fn favorite_item(pool: &PgPool, item_id: &str, user: &User) -> Result<(), ItemError> {
    if !can_user_perform_action(pool, item_id, Some(user), ItemAction::View).await {
        return Err(ItemError::NotFound(item_id.to_string()));
    }
    FavoriteStore::add(pool, user.id, item_id).await?;
    Ok(())
}

pub async fn unfavorite_item(pool: &PgPool, item_id: &str, user: &User) -> Result<(), ItemError> {
    let result = FavoriteStore::remove(pool, user.id, item_id).await?;
    if result.rows_affected() == 0 {
        return Err(ItemError::NotFound(format!(
            "Item {item_id} is not in your favorites"
        )));
    }
    Ok(())
}

pub async fn list_favorites(pool: &PgPool, user_id: i32) -> Result<Vec<PortfolioItem>, ItemError> {
    Ok(FavoriteStore::list_items_by_user(pool, user_id).await?)
}

//================================================================================
// Categories
//================================================================================

pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>, ItemError> {
    Ok(CategoryStore::list(pool).await?)
}

pub async fn create_category(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
) -> Result<Category, ItemError> {
    Ok(CategoryStore::create(pool, name, description).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn claims(exp: i64) -> ShareClaims {
        ShareClaims {
            iss: "http://localhost:9165".to_string(),
            sub: "a1B2c3D4e5F6".to_string(),
            exp,
            sharer_name: "Artist".to_string(),
        }
    }

    #[test]
    fn test_share_claims_round_trip() -> Result<(), ItemError> {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = encode_share_claims(SECRET, &claims(exp))?;
        let decoded = decode_share_claims(SECRET, &token)?;

        assert_eq!(decoded.sub, "a1B2c3D4e5F6");
        assert_eq!(decoded.sharer_name, "Artist");
        assert_eq!(decoded.exp, exp);
        Ok(())
    }

    #[test]
    fn test_expired_share_token_is_rejected() -> Result<(), ItemError> {
        let exp = (Utc::now() - Duration::hours(2)).timestamp();
        let token = encode_share_claims(SECRET, &claims(exp))?;

        assert!(matches!(
            decode_share_claims(SECRET, &token),
            Err(ItemError::InvalidShareToken(_))
        ));
        Ok(())
    }

    #[test]
    fn test_share_token_with_wrong_secret_is_rejected() -> Result<(), ItemError> {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = encode_share_claims(SECRET, &claims(exp))?;

        assert!(matches!(
            decode_share_claims("other-secret", &token),
            Err(ItemError::InvalidShareToken(_))
        ));
        Ok(())
    }
}
