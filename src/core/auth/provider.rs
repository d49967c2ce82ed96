use async_trait::async_trait;
use reqwest::Client;

use super::offline::OfflineProvider;
use super::profile::{AccountKind, Profile};
use super::yggdrasil::YggdrasilProvider;
use crate::core::error::LauncherResult;

/// Issues, validates and refreshes sessions for one backend.
///
/// Transport and parse failures come back as typed `LauncherError`s.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn kind(&self) -> AccountKind;

    async fn authenticate(&self, identity: &str, secret: Option<&str>) -> LauncherResult<Profile>;

    /// Never fails: anything but a positive answer means invalid.
    async fn validate(&self, profile: &Profile) -> bool;

    /// Replaces the session token in place; `profile` is untouched on error.
    async fn refresh(&self, profile: &mut Profile) -> LauncherResult<()>;

    async fn invalidate(&self, profile: &Profile) -> LauncherResult<()>;
}

/// Backend base URLs.
#[derive(Debug, Clone)]
pub struct AuthEndpoints {
    pub official: String,
    /// API root of a Yggdrasil-compatible server; `/authserver` is appended.
    pub third_party: String,
}

/// Dispatcher over the concrete providers.
pub enum Authenticator {
    Yggdrasil(YggdrasilProvider),
    Offline(OfflineProvider),
}

impl Authenticator {
    pub fn new(kind: AccountKind, client: Client, endpoints: &AuthEndpoints) -> Self {
        match kind {
            AccountKind::Official => {
                Self::Yggdrasil(YggdrasilProvider::official(client, &endpoints.official))
            }
            AccountKind::ThirdParty => {
                Self::Yggdrasil(YggdrasilProvider::third_party(client, &endpoints.third_party))
            }
            AccountKind::Offline => Self::Offline(OfflineProvider),
        }
    }

    pub fn kind(&self) -> AccountKind {
        match self {
            Authenticator::Yggdrasil(p) => p.kind(),
            Authenticator::Offline(p) => p.kind(),
        }
    }

    pub async fn authenticate(&self, identity: &str, secret: Option<&str>) -> LauncherResult<Profile> {
        match self {
            Authenticator::Yggdrasil(p) => p.authenticate(identity, secret).await,
            Authenticator::Offline(p) => p.authenticate(identity, secret).await,
        }
    }

    pub async fn validate(&self, profile: &Profile) -> bool {
        match self {
            Authenticator::Yggdrasil(p) => p.validate(profile).await,
            Authenticator::Offline(p) => p.validate(profile).await,
        }
    }

    pub async fn refresh(&self, profile: &mut Profile) -> LauncherResult<()> {
        match self {
            Authenticator::Yggdrasil(p) => p.refresh(profile).await,
            Authenticator::Offline(p) => p.refresh(profile).await,
        }
    }

    pub async fn invalidate(&self, profile: &Profile) -> LauncherResult<()> {
        match self {
            Authenticator::Yggdrasil(p) => p.invalidate(profile).await,
            Authenticator::Offline(p) => p.invalidate(profile).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_follows_account_kind() {
        let endpoints = AuthEndpoints {
            official: "https://auth.example".into(),
            third_party: "https://skins.example/api/yggdrasil".into(),
        };
        for kind in [
            AccountKind::Official,
            AccountKind::ThirdParty,
            AccountKind::Offline,
        ] {
            assert_eq!(Authenticator::new(kind, Client::new(), &endpoints).kind(), kind);
        }
    }
}
