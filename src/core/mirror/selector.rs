// ─── Mirror Selector ───
// Races the configured content mirrors and keeps the fastest one for the session.

use std::time::{Duration, Instant};

use futures_util::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_probe_client;

/// A content-distribution endpoint serving the manifest and artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorCandidate {
    pub label: String,
    pub manifest_url: String,
    pub content_base_url: String,
}

impl MirrorCandidate {
    pub fn new(label: &str, manifest_url: &str, content_base_url: &str) -> Self {
        Self {
            label: label.to_string(),
            manifest_url: manifest_url.to_string(),
            content_base_url: content_base_url.to_string(),
        }
    }
}

/// Built-in mirror list. The first entry is the fallback when no probe succeeds.
pub fn default_mirrors() -> Vec<MirrorCandidate> {
    vec![
        MirrorCandidate::new(
            "BMCLAPI",
            "https://bmclapi2.bangbang93.com/mc/game/version_manifest.json",
            "https://bmclapi2.bangbang93.com/",
        ),
        MirrorCandidate::new(
            "MCBBS",
            "https://download.mcbbs.net/mc/game/version_manifest.json",
            "https://download.mcbbs.net/",
        ),
        MirrorCandidate::new(
            "Mojang",
            "https://launchermeta.mojang.com/mc/game/version_manifest.json",
            "https://launchermeta.mojang.com/",
        ),
    ]
}

/// Picks the lowest-latency mirror once and caches it for its own lifetime.
pub struct MirrorSelector {
    candidates: Vec<MirrorCandidate>,
    probe_client: Client,
    selected: OnceCell<MirrorCandidate>,
}

impl MirrorSelector {
    pub fn new(candidates: Vec<MirrorCandidate>, probe_timeout: Duration) -> LauncherResult<Self> {
        if candidates.is_empty() {
            return Err(LauncherError::InvalidArgument(
                "mirror list must contain at least one candidate".into(),
            ));
        }
        Ok(Self {
            candidates,
            probe_client: build_probe_client(probe_timeout)?,
            selected: OnceCell::new(),
        })
    }

    pub fn candidates(&self) -> &[MirrorCandidate] {
        &self.candidates
    }

    /// The designated default (first configured candidate).
    pub fn fallback(&self) -> &MirrorCandidate {
        &self.candidates[0]
    }

    /// Returns the session's mirror, probing all candidates on first use.
    pub async fn select(&self) -> &MirrorCandidate {
        self.selected.get_or_init(|| self.race()).await
    }

    async fn race(&self) -> MirrorCandidate {
        let probes = self
            .candidates
            .iter()
            .map(|candidate| self.probe(candidate));
        let results = join_all(probes).await;

        let fastest = self
            .candidates
            .iter()
            .zip(results)
            .filter_map(|(candidate, latency)| latency.map(|l| (candidate, l)))
            .min_by_key(|(_, latency)| *latency);

        match fastest {
            Some((candidate, latency)) => {
                info!("Selected mirror {} ({:?})", candidate.label, latency);
                candidate.clone()
            }
            None => {
                warn!(
                    "No mirror answered, falling back to {}",
                    self.fallback().label
                );
                self.fallback().clone()
            }
        }
    }

    /// Time to fetch the whole manifest, or `None` if the probe failed.
    async fn probe(&self, candidate: &MirrorCandidate) -> Option<Duration> {
        let started = Instant::now();
        match self.probe_client.get(&candidate.manifest_url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.bytes().await {
                Ok(body) => {
                    let elapsed = started.elapsed();
                    debug!(
                        "Mirror {} served {} bytes in {:?}",
                        candidate.label,
                        body.len(),
                        elapsed
                    );
                    Some(elapsed)
                }
                Err(e) => {
                    debug!("Mirror {} dropped the body: {}", candidate.label, e);
                    None
                }
            },
            Ok(resp) => {
                debug!("Mirror {} returned HTTP {}", candidate.label, resp.status());
                None
            }
            Err(e) => {
                debug!("Mirror {} unreachable: {}", candidate.label, e);
                None
            }
        }
    }
}
