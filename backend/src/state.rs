//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction. Everything in it
//! is built once at startup and read-only afterwards.

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::repositories::{CredentialStore, PgCredentialStore};
use crate::services::{responder_from_config, AiResponder, ProfilePicPicker, UploadStore};
use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
///
/// All fields are cheap to clone: the pool and token keys are internally
/// reference counted, and the trait objects sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Token service with pre-computed keys
    pub tokens: TokenService,
    /// Credential store used by register/login
    pub users: Arc<dyn CredentialStore>,
    /// Answers question posts
    pub responder: Arc<dyn AiResponder>,
    pub profile_pics: ProfilePicPicker,
    pub uploads: UploadStore,
}

impl AppState {
    /// Create a new application state
    ///
    /// # Errors
    /// Fails when the AI responder's HTTP client cannot be built.
    pub fn new(db: PgPool, config: AppConfig) -> Result<Self> {
        let responder = responder_from_config(&config.ai)?;
        let users: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(db.clone()));
        Ok(Self::from_parts(db, config, users, responder))
    }

    /// Assemble state from explicit collaborators
    pub fn from_parts(
        db: PgPool,
        config: AppConfig,
        users: Arc<dyn CredentialStore>,
        responder: Arc<dyn AiResponder>,
    ) -> Self {
        let tokens = TokenService::new(&config.jwt.secret, config.jwt.token_ttl_secs);
        let profile_pics = ProfilePicPicker::new(&config.storage.profile_pic_dir);
        let uploads = UploadStore::new(&config.storage.upload_dir);

        Self {
            db,
            config: Arc::new(config),
            tokens,
            users,
            responder,
            profile_pics,
            uploads,
        }
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the token service
    #[inline]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Get a reference to the credential store
    #[inline]
    pub fn users(&self) -> &dyn CredentialStore {
        self.users.as_ref()
    }

    /// Get a reference to the AI responder
    #[inline]
    pub fn responder(&self) -> &dyn AiResponder {
        self.responder.as_ref()
    }
}
