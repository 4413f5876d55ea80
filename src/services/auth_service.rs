use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;

use crate::api::{self, ApiClient};
use crate::config::Config;
use crate::models::{AuthResponse, LoginRequest, ProfileUpdate, RegisterRequest, User};
use crate::utils::error::{AppError, AppResult};
use crate::utils::jwt;
use crate::utils::loading::LoadingFlag;
use crate::utils::token_store::{FileTokenStore, TokenStore};

const EVENT_CAPACITY: usize = 64;

/// Notificações emitidas depois de cada mutação de estado
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(User),
    ProfileUpdated(User),
    SignedOut,
    LoadingChanged(bool),
}

/// Provider de autenticação: usuário corrente e ciclo de vida do token.
pub struct AuthService {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    user: RwLock<Option<User>>,
    loading: LoadingFlag,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthService {
    pub fn new(api: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let loading_events = events.clone();
        let loading = LoadingFlag::with_listener(move |busy| {
            let _ = loading_events.send(AuthEvent::LoadingChanged(busy));
        });

        Self {
            api,
            store,
            user: RwLock::new(None),
            loading,
            events,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ApiClient::new(&config.api_base_url),
            Arc::new(FileTokenStore::new(&config.token_file)),
        )
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read_user().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_user().is_some()
    }

    /// Token persistido, relido do store a cada chamada.
    pub fn token(&self) -> Option<String> {
        match self.store.get() {
            Ok(token) => token,
            Err(e) => {
                log::warn!("⚠️ Failed to read stored token: {}", e);
                None
            }
        }
    }

    /// Valida o token salvo contra o backend.
    ///
    /// Best-effort: qualquer falha descarta o token e deixa o usuário deslogado,
    /// sem propagar erro.
    pub async fn initialize(&self) {
        let token = match self.store.get() {
            Ok(Some(token)) => token,
            Ok(None) => {
                log::debug!("No stored token, starting signed out");
                return;
            }
            Err(e) => {
                log::warn!("⚠️ Could not read token store, starting signed out: {}", e);
                return;
            }
        };

        if jwt::is_token_expired(&token) {
            log::info!("⌛ Stored token expired, discarding");
            self.discard_token();
            return;
        }

        let _loading = self.loading.begin();
        log::info!("🔑 Checking stored session...");

        match api::auth::check_session(&self.api, &token).await {
            Ok(raw) => {
                let user = User::from(raw);
                log::info!("✅ Session restored for {} ({})", user.email, user.role);
                self.sign_in(user);
            }
            Err(e) => {
                log::warn!("⚠️ Session check failed, staying signed out: {}", e);
                self.discard_token();
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<User> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            self.reset_after_failure();
            return Err(AppError::InvalidInput("Email and password are required".to_string()));
        }

        let _loading = self.loading.begin();
        log::info!("🔐 Logging in: {}", email);

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        match api::auth::login(&self.api, &request).await {
            Ok(response) => self.complete_sign_in(response),
            Err(e) => {
                log::warn!("❌ Login failed: {} - {}", email, e);
                self.reset_after_failure();
                Err(e)
            }
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        if request.name.trim().is_empty() || request.email.trim().is_empty() || request.password.is_empty() {
            self.reset_after_failure();
            return Err(AppError::InvalidInput("Name, email and password are required".to_string()));
        }

        let _loading = self.loading.begin();
        log::info!("📝 Registering {} as {}", request.email, request.role);

        match api::auth::register(&self.api, &request).await {
            Ok(response) => self.complete_sign_in(response),
            Err(e) => {
                log::warn!("❌ Registration failed: {} - {}", request.email, e);
                self.reset_after_failure();
                Err(e)
            }
        }
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> AppResult<User> {
        if !self.is_authenticated() {
            return Err(AppError::NotAuthenticated);
        }
        let token = self.token().ok_or(AppError::NotAuthenticated)?;

        let _loading = self.loading.begin();
        log::info!("✏️ Updating profile");

        let raw = api::auth::update_profile(&self.api, &token, &update)
            .await
            .map_err(|e| {
                log::warn!("❌ Profile update failed: {}", e);
                e
            })?;

        let updated = {
            let mut current = self.write_user();
            match current.as_mut() {
                Some(user) => {
                    user.merge(raw);
                    user.clone()
                }
                // Logout durante a requisição: não ressuscita o usuário
                None => return Err(AppError::NotAuthenticated),
            }
        };

        log::info!("✅ Profile updated for {}", updated.email);
        let _ = self.events.send(AuthEvent::ProfileUpdated(updated.clone()));
        Ok(updated)
    }

    pub fn logout(&self) {
        self.discard_token();
        let was_signed_in = self.write_user().take().is_some();
        log::info!("👋 Logged out");
        if was_signed_in {
            let _ = self.events.send(AuthEvent::SignedOut);
        }
    }

    fn complete_sign_in(&self, response: AuthResponse) -> AppResult<User> {
        self.store.set(&response.token)?;
        let user = User::from(response.user);
        log::info!("✅ Signed in: {} ({})", user.email, user.role);
        self.sign_in(user.clone());
        Ok(user)
    }

    fn sign_in(&self, user: User) {
        *self.write_user() = Some(user.clone());
        let _ = self.events.send(AuthEvent::SignedIn(user));
    }

    fn reset_after_failure(&self) {
        self.discard_token();
        if self.write_user().take().is_some() {
            let _ = self.events.send(AuthEvent::SignedOut);
        }
    }

    fn discard_token(&self) {
        if let Err(e) = self.store.remove() {
            log::error!("❌ Failed to remove stored token: {}", e);
        }
    }

    fn read_user(&self) -> RwLockReadGuard<'_, Option<User>> {
        self.user.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_user(&self) -> RwLockWriteGuard<'_, Option<User>> {
        self.user.write().unwrap_or_else(PoisonError::into_inner)
    }
}
