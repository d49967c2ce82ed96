use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::cipher::CredentialCipher;
use crate::core::auth::{AccountKind, Profile};
use crate::core::error::{LauncherError, LauncherResult};

pub const AUTH_CONFIG_FILE: &str = "auth_config.json";
pub const KEY_FILE: &str = "auth_key.key";

/// A remembered login. `secret` is always the encrypted payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RememberedCredential {
    pub identity: String,
    pub secret: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    /// Display name of the profile this login produced, when it differs
    /// from the login identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

/// A remembered login with its secret decrypted.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub identity: String,
    pub secret: String,
    pub kind: AccountKind,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AuthConfig {
    #[serde(default)]
    auto_login: Option<String>,
    #[serde(default)]
    remembered_accounts: Vec<RememberedCredential>,
}

/// Durable storage for profiles and remembered secrets under the data dir:
///
/// ```text
/// config/auth_key.key
/// config/auth_config.json
/// profiles/{encoded identity}.json
/// ```
pub struct CredentialStore {
    config_path: PathBuf,
    profiles_dir: PathBuf,
    cipher: CredentialCipher,
    // Serializes read-modify-write cycles on auth_config.json.
    lock: Mutex<()>,
}

impl CredentialStore {
    pub fn open(data_dir: &Path) -> LauncherResult<Self> {
        let config_dir = data_dir.join("config");
        let profiles_dir = data_dir.join("profiles");
        for dir in [&config_dir, &profiles_dir] {
            std::fs::create_dir_all(dir).map_err(|e| LauncherError::io(dir, e))?;
        }
        let cipher = CredentialCipher::load_or_create(&config_dir.join(KEY_FILE))?;
        Ok(Self {
            config_path: config_dir.join(AUTH_CONFIG_FILE),
            profiles_dir,
            cipher,
            lock: Mutex::new(()),
        })
    }

    // ── auth_config.json ────────────────────────────────

    async fn read_config(&self) -> LauncherResult<AuthConfig> {
        match tokio::fs::read_to_string(&self.config_path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring corrupt {:?}: {}", self.config_path, e);
                AuthConfig::default()
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AuthConfig::default()),
            Err(e) => Err(LauncherError::io(&self.config_path, e)),
        }
    }

    async fn write_config(&self, config: &AuthConfig) -> LauncherResult<()> {
        let json = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&self.config_path, json)
            .await
            .map_err(|e| LauncherError::io(&self.config_path, e))
    }

    /// Stores `secret` encrypted, replacing any earlier entry for `identity`.
    pub async fn remember(
        &self,
        identity: &str,
        secret: &str,
        kind: AccountKind,
        profile: Option<&str>,
    ) -> LauncherResult<()> {
        let entry = RememberedCredential {
            identity: identity.to_string(),
            secret: self.cipher.encrypt(secret)?,
            kind,
            profile: profile.filter(|p| *p != identity).map(str::to_string),
        };

        let _guard = self.lock.lock().await;
        let mut config = self.read_config().await?;
        config.remembered_accounts.retain(|c| c.identity != identity);
        config.remembered_accounts.push(entry);
        self.write_config(&config).await?;
        debug!("Remembered credentials for '{}'", identity);
        Ok(())
    }

    pub async fn remembered(&self, identity: &str) -> LauncherResult<Option<Credential>> {
        let config = self.read_config().await?;
        let Some(entry) = config
            .remembered_accounts
            .into_iter()
            .find(|c| c.identity == identity)
        else {
            return Ok(None);
        };
        Ok(Some(Credential {
            secret: self.cipher.decrypt(&entry.secret)?,
            identity: entry.identity,
            kind: entry.kind,
        }))
    }

    /// Remembered entries, secrets still encrypted.
    pub async fn remembered_accounts(&self) -> LauncherResult<Vec<RememberedCredential>> {
        Ok(self.read_config().await?.remembered_accounts)
    }

    /// Drops the remembered entry for `identity`. Returns whether one existed.
    pub async fn forget(&self, identity: &str) -> LauncherResult<bool> {
        let _guard = self.lock.lock().await;
        let mut config = self.read_config().await?;
        let before = config.remembered_accounts.len();
        config.remembered_accounts.retain(|c| c.identity != identity);
        let removed = config.remembered_accounts.len() != before;
        if removed {
            self.write_config(&config).await?;
        }
        Ok(removed)
    }

    pub async fn set_auto_login(&self, identity: Option<&str>) -> LauncherResult<()> {
        let _guard = self.lock.lock().await;
        let mut config = self.read_config().await?;
        config.auto_login = identity.map(str::to_string);
        self.write_config(&config).await
    }

    pub async fn auto_login(&self) -> LauncherResult<Option<String>> {
        Ok(self.read_config().await?.auto_login)
    }

    // ── profiles/ ───────────────────────────────────────

    fn profile_path(&self, identity: &str) -> PathBuf {
        self.profiles_dir
            .join(format!("{}.json", profile_file_stem(identity)))
    }

    pub async fn save_profile(&self, profile: &Profile) -> LauncherResult<()> {
        let path = self.profile_path(profile.identity());
        let json = serde_json::to_string_pretty(profile)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| LauncherError::io(&path, e))?;
        debug!("Saved {} profile '{}'", profile.kind(), profile.identity());
        Ok(())
    }

    pub async fn load_profile(&self, identity: &str) -> LauncherResult<Option<Profile>> {
        let path = self.profile_path(identity);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LauncherError::io(&path, e)),
        };
        let profile: Profile = serde_json::from_str(&raw)
            .map_err(|e| LauncherError::Format(format!("corrupt profile {:?}: {}", path, e)))?;
        if profile.identity() != identity {
            warn!(
                "Profile file {:?} holds '{}', not '{}'",
                path,
                profile.identity(),
                identity
            );
            return Ok(None);
        }
        Ok(Some(profile))
    }

    /// All stored profiles sorted by identity. Unreadable files are skipped.
    pub async fn list_profiles(&self) -> LauncherResult<Vec<Profile>> {
        let mut entries = tokio::fs::read_dir(&self.profiles_dir)
            .await
            .map_err(|e| LauncherError::io(&self.profiles_dir, e))?;

        let mut profiles = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| LauncherError::io(&self.profiles_dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| e.to_string())
                .and_then(|raw| serde_json::from_str::<Profile>(&raw).map_err(|e| e.to_string()));
            match parsed {
                Ok(profile) => profiles.push(profile),
                Err(e) => warn!("Skipping unreadable profile {:?}: {}", path, e),
            }
        }
        profiles.sort_by(|a, b| a.identity().cmp(b.identity()));
        Ok(profiles)
    }

    /// Removes the profile along with any remembered login that produced it,
    /// and clears auto-login if it pointed here. Returns whether a profile
    /// record existed.
    pub async fn delete_profile(&self, identity: &str) -> LauncherResult<bool> {
        let path = self.profile_path(identity);
        let existed = match tokio::fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(LauncherError::io(&path, e)),
        };

        let _guard = self.lock.lock().await;
        let mut config = self.read_config().await?;
        let before = config.remembered_accounts.len();
        config.remembered_accounts.retain(|c| {
            c.identity != identity && c.profile.as_deref() != Some(identity)
        });
        let mut changed = config.remembered_accounts.len() != before;
        if config.auto_login.as_deref() == Some(identity) {
            config.auto_login = None;
            changed = true;
        }
        if changed {
            self.write_config(&config).await?;
        }

        if existed {
            info!("Deleted profile '{}'", identity);
        }
        Ok(existed)
    }
}

/// Reversible file stem for an identity.
///
/// Lowercase ASCII letters, digits and `-_@.` pass through; every other byte
/// of the UTF-8 form (uppercase letters, a leading dot, `%` itself) becomes
/// `%XX`. Distinct identities never share a file, even on case-insensitive
/// filesystems.
fn profile_file_stem(identity: &str) -> String {
    let mut stem = String::with_capacity(identity.len());
    for (i, byte) in identity.bytes().enumerate() {
        let plain = byte.is_ascii_lowercase()
            || byte.is_ascii_digit()
            || matches!(byte, b'-' | b'_' | b'@')
            || (byte == b'.' && i > 0);
        if plain {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}
