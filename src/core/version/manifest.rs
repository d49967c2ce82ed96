// ─── Version Manifest ───
// Index of every known game version and where its descriptor lives.

use serde::Deserialize;

use crate::core::error::{LauncherError, LauncherResult};

/// Top-level `version_manifest.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    pub versions: Vec<VersionEntry>,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub version_type: String,
    #[serde(rename = "releaseTime", default)]
    pub release_time: String,
}

impl VersionManifest {
    pub fn parse(raw: &str) -> LauncherResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| LauncherError::Format(format!("version manifest: {}", e)))
    }

    /// Exact-id lookup (e.g. "1.20.4").
    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Stable releases only.
    pub fn releases(&self) -> Vec<&VersionEntry> {
        self.versions
            .iter()
            .filter(|v| v.version_type == "release")
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_entries_parse() {
        let manifest = VersionManifest::parse(
            r#"{"versions":[{"id":"1.20.1","url":"https://x/1.20.1.json"}]}"#,
        )
        .unwrap();
        let entry = manifest.find_version("1.20.1").unwrap();
        assert_eq!(entry.url, "https://x/1.20.1.json");
        assert!(manifest.find_version("1.20").is_none());
    }

    #[test]
    fn releases_filter_by_type() {
        let manifest = VersionManifest::parse(
            r#"{"versions":[
                {"id":"23w31a","type":"snapshot","url":"u1","releaseTime":"2023-08-01T00:00:00+00:00"},
                {"id":"1.20.1","type":"release","url":"u2","releaseTime":"2023-06-12T00:00:00+00:00"}
            ]}"#,
        )
        .unwrap();
        let ids: Vec<_> = manifest.releases().iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["1.20.1"]);
    }

    #[test]
    fn wrong_schema_is_a_format_error() {
        let err = VersionManifest::parse(r#"{"latest":{}}"#).unwrap_err();
        assert!(matches!(err, LauncherError::Format(_)));
    }
}
