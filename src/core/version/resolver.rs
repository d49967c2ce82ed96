use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, info};

use super::manifest::VersionManifest;
use super::version_file::VersionDescriptor;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::mirror::MirrorSelector;

/// Resolves manifests and version descriptors through the session's mirror.
pub struct VersionResolver {
    client: Client,
    mirrors: Arc<MirrorSelector>,
}

impl VersionResolver {
    pub fn new(client: Client, mirrors: Arc<MirrorSelector>) -> Self {
        Self { client, mirrors }
    }

    pub fn mirrors(&self) -> &MirrorSelector {
        &self.mirrors
    }

    pub async fn manifest(&self) -> LauncherResult<VersionManifest> {
        let mirror = self.mirrors.select().await;
        info!("Fetching version manifest from {}", mirror.label);

        let raw = self.fetch_text(&mirror.manifest_url).await?;
        let manifest = VersionManifest::parse(&raw)?;

        info!("Loaded {} versions from manifest", manifest.versions.len());
        Ok(manifest)
    }

    /// `Ok(None)` when the manifest has no such id; errors are transport or format failures.
    pub async fn version_info(&self, version_id: &str) -> LauncherResult<Option<VersionDescriptor>> {
        let manifest = self.manifest().await?;
        let Some(entry) = manifest.find_version(version_id) else {
            debug!("Version {} not listed in manifest", version_id);
            return Ok(None);
        };

        let raw = self.fetch_text(&entry.url).await?;
        VersionDescriptor::parse(&raw).map(Some)
    }

    /// Like [`version_info`](Self::version_info) but treats an unknown id as `NotFound`.
    pub async fn require_version(&self, version_id: &str) -> LauncherResult<VersionDescriptor> {
        self.version_info(version_id)
            .await?
            .ok_or_else(|| LauncherError::NotFound(format!("version {}", version_id)))
    }

    async fn fetch_text(&self, url: &str) -> LauncherResult<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}
