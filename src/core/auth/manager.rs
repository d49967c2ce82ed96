use reqwest::Client;
use tracing::{info, warn};

use super::profile::{AccountKind, Profile};
use super::provider::{AuthEndpoints, Authenticator};
use super::session::{SessionEvent, SessionState};
use crate::core::credentials::CredentialStore;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::state::AppState;

/// Ties the providers to the credential store.
pub struct AccountManager {
    client: Client,
    endpoints: AuthEndpoints,
    store: CredentialStore,
}

impl AccountManager {
    pub fn new(client: Client, endpoints: AuthEndpoints, store: CredentialStore) -> Self {
        Self {
            client,
            endpoints,
            store,
        }
    }

    pub fn from_state(state: &AppState) -> LauncherResult<Self> {
        let endpoints = AuthEndpoints {
            official: state.config.official_auth_url.clone(),
            third_party: state.config.third_party_auth_url.clone(),
        };
        let store = CredentialStore::open(&state.data_dir)?;
        Ok(Self::new(state.http_client.clone(), endpoints, store))
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    fn authenticator(&self, kind: AccountKind) -> Authenticator {
        Authenticator::new(kind, self.client.clone(), &self.endpoints)
    }

    /// Authenticates and persists the resulting profile.
    ///
    /// Without an explicit `secret`, a remembered one for the same identity
    /// and kind is used.
    pub async fn login(
        &self,
        kind: AccountKind,
        identity: &str,
        secret: Option<&str>,
        remember: bool,
    ) -> LauncherResult<Profile> {
        let secret = match secret {
            Some(s) => Some(s.to_string()),
            None if kind != AccountKind::Offline => self
                .store
                .remembered(identity)
                .await?
                .filter(|c| c.kind == kind)
                .map(|c| c.secret),
            None => None,
        };

        let profile = self
            .authenticator(kind)
            .authenticate(identity, secret.as_deref())
            .await?;
        self.store.save_profile(&profile).await?;

        if remember {
            self.store
                .remember(
                    identity,
                    secret.as_deref().unwrap_or_default(),
                    kind,
                    Some(profile.identity()),
                )
                .await?;
        }

        info!("Logged in '{}' ({})", profile.identity(), kind);
        Ok(profile)
    }

    pub async fn validate(&self, profile: &Profile) -> bool {
        self.authenticator(profile.kind()).validate(profile).await
    }

    /// Refreshes the session and persists it. `profile` is untouched on error.
    pub async fn refresh(&self, profile: &mut Profile) -> LauncherResult<()> {
        self.authenticator(profile.kind()).refresh(profile).await?;
        if profile.is_online() {
            self.store.save_profile(profile).await?;
        }
        Ok(())
    }

    /// Validates the session, refreshing it when the backend rejects it.
    pub async fn ensure_valid(&self, profile: &mut Profile) -> SessionState {
        let state = SessionState::Authenticated(profile.kind());
        if self.validate(profile).await {
            return state;
        }

        let state = state.apply(SessionEvent::ValidationFailed);
        match self.refresh(profile).await {
            Ok(()) => state.apply(SessionEvent::Refreshed),
            Err(e) => {
                warn!("Session for '{}' could not be refreshed: {}", profile.identity(), e);
                state.apply(SessionEvent::RefreshFailed)
            }
        }
    }

    /// Invalidates the tokens (best effort) and deletes the stored profile.
    pub async fn remove(&self, identity: &str) -> LauncherResult<SessionState> {
        let profile = self
            .store
            .load_profile(identity)
            .await?
            .ok_or_else(|| LauncherError::NotFound(format!("profile '{}'", identity)))?;

        if let Err(e) = self.authenticator(profile.kind()).invalidate(&profile).await {
            warn!("Token invalidation for '{}' failed: {}", identity, e);
        }
        self.store.delete_profile(identity).await?;
        info!("Removed account '{}'", identity);

        Ok(SessionState::Authenticated(profile.kind()).apply(SessionEvent::Removed))
    }

    /// Loads the auto-login profile, if one is set, and makes sure its
    /// session is still usable.
    pub async fn auto_login(&self) -> LauncherResult<Option<(Profile, SessionState)>> {
        let Some(identity) = self.store.auto_login().await? else {
            return Ok(None);
        };
        let Some(mut profile) = self.store.load_profile(&identity).await? else {
            warn!("Auto-login profile '{}' no longer exists", identity);
            return Ok(None);
        };
        let state = self.ensure_valid(&mut profile).await;
        Ok(Some((profile, state)))
    }
}
