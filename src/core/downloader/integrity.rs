use std::path::Path;

use sha1::{Digest, Sha1};
use tokio::io::AsyncReadExt;

use crate::core::error::{LauncherError, LauncherResult};

const BLOCK_SIZE: usize = 4 * 1024;

/// Lowercase hex SHA-1 of an in-memory buffer.
pub fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

/// Streams a file through SHA-1. Returns `None` when the file does not exist.
pub async fn file_sha1(path: &Path) -> LauncherResult<Option<String>> {
    let mut file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(LauncherError::io(path, e)),
    };

    let mut hasher = Sha1::new();
    let mut block = [0u8; BLOCK_SIZE];
    loop {
        let read = file
            .read(&mut block)
            .await
            .map_err(|e| LauncherError::io(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&block[..read]);
    }

    Ok(Some(hex::encode(hasher.finalize())))
}

/// True only if `path` exists and its SHA-1 hex digest equals `expected` exactly.
///
/// Unreadable files count as invalid.
pub async fn verify_file(path: &Path, expected: &str) -> bool {
    matches!(file_sha1(path).await, Ok(Some(actual)) if actual == expected)
}

/// Like [`verify_file`] but reports the mismatch as an error.
pub async fn ensure_file_hash(path: &Path, expected: &str) -> LauncherResult<()> {
    match file_sha1(path).await? {
        Some(actual) if actual == expected => Ok(()),
        Some(actual) => Err(LauncherError::Integrity {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        }),
        None => Err(LauncherError::NotFound(format!("{}", path.display()))),
    }
}
