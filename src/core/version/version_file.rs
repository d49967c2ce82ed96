// ─── Version File ───
// Parses a version descriptor JSON and evaluates OS rules for libraries.

use serde::Deserialize;

use crate::core::error::{LauncherError, LauncherResult};

/// Per-version metadata: client binary, asset index and libraries.
#[derive(Debug, Clone)]
pub struct VersionDescriptor {
    pub id: String,
    pub client_artifact: ClientArtifact,
    pub asset_index: AssetIndexInfo,
    /// Declaration order is preserved.
    pub libraries: Vec<LibraryEntry>,
    /// Descriptor document exactly as fetched.
    pub raw: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientArtifact {
    pub url: String,
    #[serde(rename = "sha1", default)]
    pub expected_hash: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetIndexInfo {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
}

// ─── Raw document shape ───

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionJson {
    id: String,
    #[serde(default)]
    downloads: Option<VersionDownloads>,
    #[serde(default)]
    asset_index: Option<AssetIndexInfo>,
    #[serde(default)]
    libraries: Vec<LibraryEntry>,
}

#[derive(Debug, Deserialize)]
struct VersionDownloads {
    client: Option<ClientArtifact>,
}

// ─── Library Entry with Rules ───

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Option<Vec<LibraryRule>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<LibraryArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryArtifact {
    pub url: String,
    /// Relative to the libraries root.
    pub path: String,
    #[serde(default)]
    pub sha1: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryRule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
}

impl LibraryEntry {
    /// The downloadable artifact, if the entry declares one.
    pub fn artifact(&self) -> Option<&LibraryArtifact> {
        self.downloads.as_ref()?.artifact.as_ref()
    }

    /// Evaluate whether this library should be included for the current OS.
    ///
    /// No rules means allowed. Otherwise start disallowed and let every rule
    /// whose OS matches (or that names no OS) set the outcome, in order.
    pub fn is_allowed_for_current_os(&self) -> bool {
        let rules = match &self.rules {
            Some(r) => r,
            None => return true,
        };

        let current_os = current_os_name();
        let mut allowed = false;

        for rule in rules {
            let os_matches = match rule.os.as_ref().and_then(|os| os.name.as_deref()) {
                None => true,
                Some(name) => name == current_os,
            };

            if os_matches {
                allowed = rule.action == RuleAction::Allow;
            }
        }

        allowed
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or_else(|| self.artifact().map(|a| a.path.as_str()))
            .unwrap_or("<unnamed>")
    }
}

/// OS name as used in version descriptors.
pub fn current_os_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else {
        "linux"
    }
}

impl VersionDescriptor {
    pub fn parse(raw: &str) -> LauncherResult<Self> {
        let json: VersionJson = serde_json::from_str(raw)
            .map_err(|e| LauncherError::Format(format!("version descriptor: {}", e)))?;

        let client_artifact = json
            .downloads
            .and_then(|d| d.client)
            .ok_or_else(|| {
                LauncherError::Format(format!("version {} has no client download", json.id))
            })?;
        let asset_index = json.asset_index.ok_or_else(|| {
            LauncherError::Format(format!("version {} has no asset index", json.id))
        })?;

        Ok(Self {
            id: json.id,
            client_artifact,
            asset_index,
            libraries: json.libraries,
            raw: raw.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library(rules: Option<Vec<LibraryRule>>) -> LibraryEntry {
        LibraryEntry {
            name: Some("test:lib:1.0".into()),
            downloads: None,
            rules,
        }
    }

    fn os_rule(action: RuleAction, os: Option<&str>) -> LibraryRule {
        LibraryRule {
            action,
            os: os.map(|name| OsRule {
                name: Some(name.to_string()),
            }),
        }
    }

    #[test]
    fn no_rules_means_allowed() {
        assert!(library(None).is_allowed_for_current_os());
    }

    #[test]
    fn allow_only_current_os() {
        let lib = library(Some(vec![os_rule(RuleAction::Allow, Some(current_os_name()))]));
        assert!(lib.is_allowed_for_current_os());
    }

    #[test]
    fn disallow_current_os() {
        let lib = library(Some(vec![
            os_rule(RuleAction::Allow, None),
            os_rule(RuleAction::Disallow, Some(current_os_name())),
        ]));
        assert!(!lib.is_allowed_for_current_os());
    }

    #[test]
    fn parses_descriptor_fields() {
        let raw = r#"{
            "id": "1.20.1",
            "mainClass": "net.minecraft.client.main.Main",
            "downloads": {"client": {"url": "https://x/client.jar", "sha1": "abc", "size": 3}},
            "assetIndex": {"id": "5", "url": "https://x/5.json"},
            "libraries": [
                {"name": "a:b:1", "downloads": {"artifact": {"url": "https://x/a.jar", "path": "a/b/1/b-1.jar", "sha1": "def"}}},
                {"name": "natives-only:c:1", "downloads": {"classifiers": {}}},
                {"name": "legacy:d:1"}
            ]
        }"#;

        let descriptor = VersionDescriptor::parse(raw).unwrap();
        assert_eq!(descriptor.id, "1.20.1");
        assert_eq!(descriptor.client_artifact.expected_hash.as_deref(), Some("abc"));
        assert_eq!(descriptor.asset_index.id, "5");
        assert_eq!(descriptor.libraries.len(), 3);
        assert_eq!(descriptor.libraries[0].artifact().unwrap().path, "a/b/1/b-1.jar");
        assert!(descriptor.libraries[1].artifact().is_none());
        assert!(descriptor.libraries[2].artifact().is_none());
        assert_eq!(descriptor.raw, raw);
    }

    #[test]
    fn missing_client_download_is_a_format_error() {
        let raw = r#"{"id": "x", "assetIndex": {"id": "1", "url": "u"}}"#;
        assert!(matches!(
            VersionDescriptor::parse(raw),
            Err(LauncherError::Format(_))
        ));
    }
}
