// ─── Download Orchestrator ───
// Walks a version descriptor and fetches whatever is missing, one transfer at a time.

use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::task::{DownloadTask, TaskQueue};
use crate::core::assets::AssetIndex;
use crate::core::downloader::{
    ensure_file_hash, verify_file, PauseGate, ProgressFn, TransferEngine, TransferProgress,
};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::instance::GameLayout;
use crate::core::mirror::MirrorSelector;
use crate::core::state::AppState;
use crate::core::version::{VersionDescriptor, VersionResolver};

#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub resources_base_url: String,
    /// Hash-check existing files (when a digest is known) before skipping them.
    pub verify_existing: bool,
}

pub struct DownloadOrchestrator {
    resolver: VersionResolver,
    engine: TransferEngine,
    layout: GameLayout,
    options: InstallOptions,
}

impl DownloadOrchestrator {
    pub fn new(
        resolver: VersionResolver,
        engine: TransferEngine,
        layout: GameLayout,
        options: InstallOptions,
    ) -> Self {
        Self {
            resolver,
            engine,
            layout,
            options,
        }
    }

    /// Wires mirror selection, resolver and engine from the launcher config.
    pub fn from_state(state: &AppState) -> LauncherResult<Self> {
        let config = &state.config;
        let mirrors = MirrorSelector::new(config.mirrors.clone(), config.probe_timeout())?;
        let resolver = VersionResolver::new(state.http_client.clone(), Arc::new(mirrors));
        let engine = TransferEngine::new(state.http_client.clone());

        Ok(Self::new(
            resolver,
            engine,
            GameLayout::new(&config.game_dir),
            InstallOptions {
                resources_base_url: config.resources_base_url.clone(),
                verify_existing: config.verify_existing,
            },
        ))
    }

    pub fn resolver(&self) -> &VersionResolver {
        &self.resolver
    }

    pub fn layout(&self) -> &GameLayout {
        &self.layout
    }

    /// Handle for pausing/resuming from another task or thread.
    pub fn gate(&self) -> PauseGate {
        self.engine.gate()
    }

    pub fn pause(&self) {
        self.engine.pause();
    }

    pub fn resume(&self) {
        self.engine.resume();
    }

    // ── Core binary + libraries ─────────────────────────

    /// Fetch the client binary, asset index and libraries for `version_id`.
    /// Files already present are skipped.
    pub async fn download_version(
        &self,
        version_id: &str,
        on_progress: Option<&ProgressFn>,
    ) -> LauncherResult<VersionDescriptor> {
        let descriptor = self.resolver.require_version(version_id).await?;
        info!("Installing version {}", descriptor.id);

        // Nothing is written until every destination is known to stay inside the game dir.
        self.check_destinations(version_id, &descriptor)?;
        self.save_descriptor(&descriptor).await?;

        let client = &descriptor.client_artifact;
        self.fetch_artifact(
            &client.url,
            &self.layout.client_jar(version_id)?,
            client.expected_hash.as_deref(),
            on_progress,
        )
        .await?;

        let index = &descriptor.asset_index;
        self.fetch_artifact(
            &index.url,
            &self.layout.asset_index_path(&index.id)?,
            index.sha1.as_deref(),
            on_progress,
        )
        .await?;

        let mut fetched = 0usize;
        for lib in &descriptor.libraries {
            if !lib.is_allowed_for_current_os() {
                debug!("Skipping library (OS rule): {}", lib.display_name());
                continue;
            }
            let Some(artifact) = lib.artifact() else {
                debug!("Skipping library without artifact: {}", lib.display_name());
                continue;
            };

            let dest = self.layout.library_path(&artifact.path)?;
            if self
                .fetch_artifact(&artifact.url, &dest, artifact.sha1.as_deref(), on_progress)
                .await?
            {
                fetched += 1;
            }
        }

        info!(
            "Version {} ready ({} of {} libraries fetched)",
            descriptor.id,
            fetched,
            descriptor.libraries.len()
        );
        Ok(descriptor)
    }

    // ── Asset objects ───────────────────────────────────

    /// Fetch every asset object missing locally. Progress counts objects, not bytes.
    /// Returns how many objects were downloaded.
    pub async fn download_assets(
        &self,
        version_id: &str,
        on_progress: Option<&ProgressFn>,
    ) -> LauncherResult<usize> {
        let descriptor = self.resolver.require_version(version_id).await?;
        let index_path = self.layout.asset_index_path(&descriptor.asset_index.id)?;
        let index = AssetIndex::load(&index_path).await?;

        let total = index.objects.len() as u64;
        let mut processed = 0u64;
        let mut fetched = 0usize;

        for object in index.objects.values() {
            let dest = self.layout.asset_object_path(object);
            if !exists(&dest).await {
                let url = object.url(&self.options.resources_base_url);
                self.engine.download(&url, &dest, None).await?;
                fetched += 1;
            }

            processed += 1;
            if let Some(callback) = on_progress {
                callback(TransferProgress {
                    percent: Some(processed as f64 / total as f64 * 100.0),
                    bytes_per_sec: 0.0,
                    done: processed,
                    total: Some(total),
                });
            }
        }

        info!(
            "Assets for {} ready ({} downloaded, {} already present)",
            version_id,
            fetched,
            index.objects.len() - fetched
        );
        Ok(fetched)
    }

    // ── Task queue ──────────────────────────────────────

    pub async fn run_task(
        &self,
        task: DownloadTask,
        version_id: &str,
        on_progress: Option<&ProgressFn>,
    ) -> LauncherResult<()> {
        info!("Starting task: {} for {}", task, version_id);
        match task {
            DownloadTask::FetchCoreBinary => {
                self.download_version(version_id, on_progress).await?;
            }
            DownloadTask::FetchAssetBundle => {
                self.download_assets(version_id, on_progress).await?;
            }
        }
        Ok(())
    }

    /// Run tasks in insertion order. Finished tasks leave the queue; on the first
    /// error the failing task and everything after it stay queued.
    pub async fn run_queue(
        &self,
        version_id: &str,
        queue: &mut TaskQueue,
        on_progress: Option<&ProgressFn>,
    ) -> LauncherResult<()> {
        while let Some(task) = queue.front() {
            if let Err(e) = self.run_task(task, version_id, on_progress).await {
                warn!("Task {} failed: {}", task, e);
                return Err(e);
            }
            queue.complete_front();
        }
        Ok(())
    }

    /// Run the queue on a background task. The queue comes back with the
    /// result so a failed run can be restarted.
    pub fn spawn_queue(
        self: Arc<Self>,
        version_id: String,
        mut queue: TaskQueue,
        on_progress: Option<Arc<ProgressFn>>,
    ) -> JoinHandle<(TaskQueue, LauncherResult<()>)> {
        tokio::spawn(async move {
            let result = self
                .run_queue(&version_id, &mut queue, on_progress.as_deref())
                .await;
            (queue, result)
        })
    }

    // ── Helpers ─────────────────────────────────────────

    /// Returns `true` when a transfer happened.
    async fn fetch_artifact(
        &self,
        url: &str,
        dest: &Path,
        expected_sha1: Option<&str>,
        on_progress: Option<&ProgressFn>,
    ) -> LauncherResult<bool> {
        if self.is_present(dest, expected_sha1).await {
            debug!("Already present: {:?}", dest);
            return Ok(false);
        }

        self.engine.download(url, dest, on_progress).await?;

        if self.options.verify_existing {
            if let Some(expected) = expected_sha1 {
                ensure_file_hash(dest, expected).await?;
            }
        }
        Ok(true)
    }

    async fn is_present(&self, dest: &Path, expected_sha1: Option<&str>) -> bool {
        if !exists(dest).await {
            return false;
        }
        match (self.options.verify_existing, expected_sha1) {
            (true, Some(expected)) => {
                let valid = verify_file(dest, expected).await;
                if !valid {
                    warn!("Existing file failed verification, refetching: {:?}", dest);
                }
                valid
            }
            _ => true,
        }
    }

    fn check_destinations(&self, version_id: &str, descriptor: &VersionDescriptor) -> LauncherResult<()> {
        self.layout.client_jar(version_id)?;
        self.layout.descriptor_path(&descriptor.id)?;
        self.layout.asset_index_path(&descriptor.asset_index.id)?;
        for lib in &descriptor.libraries {
            if let Some(artifact) = lib.artifact() {
                self.layout.library_path(&artifact.path)?;
            }
        }
        Ok(())
    }

    async fn save_descriptor(&self, descriptor: &VersionDescriptor) -> LauncherResult<()> {
        let path = self.layout.descriptor_path(&descriptor.id)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }
        tokio::fs::write(&path, &descriptor.raw)
            .await
            .map_err(|e| LauncherError::io(path, e))
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
