//! User service for registration, login and profiles
//!
//! Password hashing and verification run on the blocking thread pool; the
//! token service is shared by reference with its keys already derived.

use crate::auth::{PasswordService, TokenService};
use crate::error::ApiError;
use crate::repositories::{CredentialStore, StoreError};
use crate::services::media::ProfilePicPicker;
use aphid_shared::types::{AuthResponse, UserProfile};
use aphid_shared::validation::{validate_email, validate_password};
use once_cell::sync::Lazy;
use tracing::{info, warn};
use uuid::Uuid;

/// Verified against when the email is unknown, so a miss costs as much as a
/// wrong password.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    PasswordService::hash("aphid-timing-equalizer").unwrap_or_else(|e| {
        warn!("Could not prepare dummy password hash: {:#}", e);
        String::new()
    })
});

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user and sign them in
    pub async fn register(
        store: &dyn CredentialStore,
        tokens: &TokenService,
        pics: &ProfilePicPicker,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        validate_email(email).map_err(ApiError::Validation)?;
        validate_password(password).map_err(ApiError::Validation)?;

        // Hash password on blocking thread pool (CPU-intensive)
        let password_hash = PasswordService::hash_async(password.to_string())
            .await
            .map_err(ApiError::Internal)?;

        let profile_pic = pics.pick().await;

        // Uniqueness is enforced by the store; a duplicate comes back as Conflict
        let user_id = store
            .create_user(email, &password_hash, profile_pic.as_deref())
            .await?;

        info!(%user_id, "User registered");

        let token = tokens.issue(user_id).map_err(ApiError::Internal)?;
        Ok(AuthResponse { user_id, token })
    }

    /// Login with email and password
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn login(
        store: &dyn CredentialStore,
        tokens: &TokenService,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let user = match store.find_by_email(email).await {
            Ok(user) => Some(user),
            Err(StoreError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };

        let hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| DUMMY_HASH.clone());
        let valid = PasswordService::verify_async(password.to_string(), hash)
            .await
            .map_err(ApiError::Internal)?;

        match user {
            Some(user) if valid => {
                let token = tokens.issue(user.id).map_err(ApiError::Internal)?;
                Ok(AuthResponse {
                    user_id: user.id,
                    token,
                })
            }
            _ => Err(ApiError::InvalidCredentials),
        }
    }

    /// Get user profile
    pub async fn get_profile(
        store: &dyn CredentialStore,
        user_id: Uuid,
    ) -> Result<UserProfile, ApiError> {
        let user = store.find_by_id(user_id).await?;

        Ok(UserProfile {
            id: user.id,
            email: user.email,
            profile_pic: user.profile_pic,
            created_at: user.created_at,
        })
    }
}
