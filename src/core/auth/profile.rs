use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which backend issued a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Official,
    Offline,
    ThirdParty,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Official => write!(f, "official"),
            AccountKind::Offline => write!(f, "offline"),
            AccountKind::ThirdParty => write!(f, "third_party"),
        }
    }
}

/// Token pair issued by a Yggdrasil-style backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineSession {
    pub identity: String,
    pub unique_id: Uuid,
    /// Access token.
    pub session_token: String,
    /// Client token the access token is bound to.
    pub session_secret: String,
    #[serde(default = "Utc::now")]
    pub refreshed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineIdentity {
    pub identity: String,
    pub unique_id: Uuid,
}

/// Normalized authenticated identity, persisted as
/// `{type, identity, unique_id, session_token?, session_secret?}`.
///
/// Offline profiles carry no tokens; online ones always do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Profile {
    Official(OnlineSession),
    Offline(OfflineIdentity),
    ThirdParty(OnlineSession),
}

impl Profile {
    pub fn kind(&self) -> AccountKind {
        match self {
            Profile::Official(_) => AccountKind::Official,
            Profile::Offline(_) => AccountKind::Offline,
            Profile::ThirdParty(_) => AccountKind::ThirdParty,
        }
    }

    /// Display name.
    pub fn identity(&self) -> &str {
        match self {
            Profile::Official(s) | Profile::ThirdParty(s) => &s.identity,
            Profile::Offline(o) => &o.identity,
        }
    }

    pub fn unique_id(&self) -> Uuid {
        match self {
            Profile::Official(s) | Profile::ThirdParty(s) => s.unique_id,
            Profile::Offline(o) => o.unique_id,
        }
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session().map(|s| s.session_token.as_str())
    }

    pub fn session_secret(&self) -> Option<&str> {
        self.session().map(|s| s.session_secret.as_str())
    }

    pub fn is_online(&self) -> bool {
        self.session().is_some()
    }

    pub fn session(&self) -> Option<&OnlineSession> {
        match self {
            Profile::Official(s) | Profile::ThirdParty(s) => Some(s),
            Profile::Offline(_) => None,
        }
    }

    pub(crate) fn session_mut(&mut self) -> Option<&mut OnlineSession> {
        match self {
            Profile::Official(s) | Profile::ThirdParty(s) => Some(s),
            Profile::Offline(_) => None,
        }
    }

    pub(crate) fn online(kind: AccountKind, session: OnlineSession) -> Option<Self> {
        match kind {
            AccountKind::Official => Some(Profile::Official(session)),
            AccountKind::ThirdParty => Some(Profile::ThirdParty(session)),
            AccountKind::Offline => None,
        }
    }
}
