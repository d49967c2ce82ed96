use std::path::Path;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{info, warn};

use crate::core::error::{LauncherError, LauncherResult};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// AES-256-GCM over remembered secrets. Payloads are base64(nonce ‖ ciphertext).
#[derive(Clone)]
pub struct CredentialCipher {
    cipher: Aes256Gcm,
}

impl CredentialCipher {
    pub fn from_key(key_bytes: &[u8]) -> LauncherResult<Self> {
        if key_bytes.len() != KEY_LEN {
            return Err(LauncherError::Crypto("invalid key length".to_string()));
        }
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Reads the key at `path`, generating and persisting a fresh one the
    /// first time.
    pub fn load_or_create(path: &Path) -> LauncherResult<Self> {
        if path.exists() {
            let data = std::fs::read(path).map_err(|e| LauncherError::io(path, e))?;
            return Self::from_key(&data);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
        }
        let mut key = vec![0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        std::fs::write(path, &key).map_err(|e| LauncherError::io(path, e))?;
        restrict_permissions(path);
        info!("Generated credential key at {:?}", path);
        Self::from_key(&key)
    }

    pub fn encrypt(&self, plaintext: &str) -> LauncherResult<String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| LauncherError::Crypto("encryption failed".to_string()))?;

        let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        output.extend_from_slice(&nonce_bytes);
        output.extend_from_slice(&ciphertext);
        Ok(base64::engine::general_purpose::STANDARD.encode(output))
    }

    pub fn decrypt(&self, payload: &str) -> LauncherResult<String> {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|_| LauncherError::Crypto("invalid base64 payload".to_string()))?;
        if decoded.len() <= NONCE_LEN {
            return Err(LauncherError::Crypto("payload too small".to_string()));
        }

        let (nonce_bytes, ciphertext) = decoded.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| LauncherError::Crypto("decryption failed".to_string()))?;
        String::from_utf8(plaintext)
            .map_err(|_| LauncherError::Crypto("secret is not valid UTF-8".to_string()))
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        warn!("Could not restrict permissions on {:?}: {}", path, e);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}
