use async_trait::async_trait;
use uuid::Uuid;

use super::profile::{AccountKind, OfflineIdentity, Profile};
use super::provider::AuthProvider;
use crate::core::error::{LauncherError, LauncherResult};

/// Stable id for an offline player: UUID v3 over `OfflinePlayer:<name>`
/// in the URL namespace.
pub fn offline_uuid(identity: &str) -> Uuid {
    Uuid::new_v3(
        &Uuid::NAMESPACE_URL,
        format!("OfflinePlayer:{}", identity).as_bytes(),
    )
}

/// Pseudonymous accounts: no backend, no tokens.
#[derive(Debug, Default, Clone)]
pub struct OfflineProvider;

#[async_trait]
impl AuthProvider for OfflineProvider {
    fn kind(&self) -> AccountKind {
        AccountKind::Offline
    }

    async fn authenticate(&self, identity: &str, _secret: Option<&str>) -> LauncherResult<Profile> {
        if identity.trim().is_empty() {
            return Err(LauncherError::InvalidCredentials(
                "player name must not be empty".into(),
            ));
        }
        Ok(Profile::Offline(OfflineIdentity {
            identity: identity.to_string(),
            unique_id: offline_uuid(identity),
        }))
    }

    async fn validate(&self, _profile: &Profile) -> bool {
        true
    }

    async fn refresh(&self, _profile: &mut Profile) -> LauncherResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _profile: &Profile) -> LauncherResult<()> {
        Ok(())
    }
}
