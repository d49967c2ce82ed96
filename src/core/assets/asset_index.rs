use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::error::{LauncherError, LauncherResult};

/// Top-level asset index JSON: logical name -> content-addressed object.
#[derive(Debug, Deserialize)]
pub struct AssetIndex {
    pub objects: BTreeMap<String, AssetObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    #[serde(default)]
    pub size: u64,
}

impl AssetIndex {
    pub fn parse(raw: &str) -> LauncherResult<Self> {
        let index: AssetIndex = serde_json::from_str(raw)
            .map_err(|e| LauncherError::Format(format!("asset index: {}", e)))?;

        if let Some((name, obj)) = index
            .objects
            .iter()
            .find(|(_, obj)| !is_sha1_hex(&obj.hash))
        {
            return Err(LauncherError::Format(format!(
                "asset {} has malformed hash {:?}",
                name, obj.hash
            )));
        }
        Ok(index)
    }

    /// Load a previously downloaded index; a missing file is `NotFound`.
    pub async fn load(path: &Path) -> LauncherResult<Self> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LauncherError::NotFound(format!(
                    "asset index {}",
                    path.display()
                )))
            }
            Err(e) => return Err(LauncherError::io(path, e)),
        };
        Self::parse(&raw)
    }
}

impl AssetObject {
    /// `objects/<first two hex chars>/<hash>`, relative to the assets root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from("objects").join(&self.hash[..2]).join(&self.hash)
    }

    pub fn url(&self, resources_base_url: &str) -> String {
        format!(
            "{}/{}/{}",
            resources_base_url.trim_end_matches('/'),
            &self.hash[..2],
            self.hash
        )
    }
}

fn is_sha1_hex(hash: &str) -> bool {
    hash.len() == 40 && hash.bytes().all(|b| b.is_ascii_hexdigit())
}
