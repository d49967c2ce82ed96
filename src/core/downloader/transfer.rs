// ─── Transfer Engine ───
// Streams one remote resource to disk, chunk by chunk, under the shared pause gate.

use std::path::Path;
use std::time::Instant;

use futures_util::{Stream, StreamExt};
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::gate::PauseGate;
use crate::core::error::{LauncherError, LauncherResult};

/// Largest slice written between two pause checks.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Snapshot handed to progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferProgress {
    /// `None` when the server did not announce a length.
    pub percent: Option<f64>,
    /// Average throughput since the transfer started.
    pub bytes_per_sec: f64,
    pub done: u64,
    pub total: Option<u64>,
}

pub type ProgressFn = dyn Fn(TransferProgress) + Send + Sync;

/// Per-invocation bookkeeping, dropped when the transfer ends.
struct TransferState<'a> {
    source: &'a str,
    destination: &'a Path,
    bytes_done: u64,
    bytes_total: Option<u64>,
    started: Instant,
}

impl TransferState<'_> {
    fn snapshot(&self) -> TransferProgress {
        let elapsed = self.started.elapsed().as_secs_f64();
        let bytes_per_sec = if elapsed > 0.0 {
            self.bytes_done as f64 / elapsed
        } else {
            0.0
        };
        let percent = self
            .bytes_total
            .filter(|total| *total > 0)
            .map(|total| self.bytes_done as f64 / total as f64 * 100.0);

        TransferProgress {
            percent,
            bytes_per_sec,
            done: self.bytes_done,
            total: self.bytes_total,
        }
    }
}

/// Sequential streaming downloader. Every transfer run through one engine
/// (or its clones) shares the same [`PauseGate`].
#[derive(Clone)]
pub struct TransferEngine {
    client: Client,
    gate: PauseGate,
}

impl TransferEngine {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            gate: PauseGate::new(),
        }
    }

    pub fn gate(&self) -> PauseGate {
        self.gate.clone()
    }

    pub fn pause(&self) {
        debug!("Transfers paused");
        self.gate.pause();
    }

    pub fn resume(&self) {
        debug!("Transfers resumed");
        self.gate.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    /// Download `url` to `destination`, returning the number of bytes written.
    ///
    /// A mid-stream failure leaves the partial file in place.
    pub async fn download(
        &self,
        url: &str,
        destination: &Path,
        on_progress: Option<&ProgressFn>,
    ) -> LauncherResult<u64> {
        ensure_parent(destination).await?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let total = response.content_length();
        self.write_stream(url, response.bytes_stream(), total, destination, on_progress)
            .await
    }

    /// Core read loop: waits on the gate before writing each chunk.
    pub async fn write_stream<S, B, E>(
        &self,
        source: &str,
        stream: S,
        total: Option<u64>,
        destination: &Path,
        on_progress: Option<&ProgressFn>,
    ) -> LauncherResult<u64>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<LauncherError>,
    {
        ensure_parent(destination).await?;
        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(|e| LauncherError::io(destination, e))?;

        let mut state = TransferState {
            source,
            destination,
            bytes_done: 0,
            bytes_total: total,
            started: Instant::now(),
        };

        tokio::pin!(stream);
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    let _ = file.flush().await;
                    return Err(e.into());
                }
            };

            for piece in chunk.as_ref().chunks(CHUNK_SIZE) {
                self.gate.wait_open().await;
                file.write_all(piece)
                    .await
                    .map_err(|e| LauncherError::io(state.destination, e))?;
                state.bytes_done += piece.len() as u64;

                if let Some(callback) = on_progress {
                    callback(state.snapshot());
                }
            }
        }

        file.flush()
            .await
            .map_err(|e| LauncherError::io(state.destination, e))?;

        debug!(
            "Transferred {} bytes: {} -> {:?}",
            state.bytes_done, state.source, state.destination
        );
        Ok(state.bytes_done)
    }
}

async fn ensure_parent(path: &Path) -> LauncherResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| LauncherError::io(parent, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use mockito::Server;
    use tokio::sync::mpsc;

    type Chunk = Result<Vec<u8>, std::io::Error>;

    fn channel_stream(rx: mpsc::Receiver<Chunk>) -> impl Stream<Item = Chunk> {
        futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
    }

    fn recorder() -> (Arc<Mutex<Vec<TransferProgress>>>, Arc<ProgressFn>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: Arc<ProgressFn> = Arc::new(move |p: TransferProgress| sink.lock().unwrap().push(p));
        (seen, callback)
    }

    async fn wait_for_len(seen: &Arc<Mutex<Vec<TransferProgress>>>, len: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while seen.lock().unwrap().len() < len {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("progress never arrived");
    }

    #[tokio::test]
    async fn pause_halts_progress_and_resume_continues_at_same_offset() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested/out.bin");
        let engine = TransferEngine::new(Client::new());
        let gate = engine.gate();
        let (seen, callback) = recorder();
        let (tx, rx) = mpsc::channel::<Chunk>(4);

        let task_dest = dest.clone();
        let task = tokio::spawn(async move {
            engine
                .write_stream(
                    "memory://slow",
                    channel_stream(rx),
                    Some(3000),
                    &task_dest,
                    Some(callback.as_ref()),
                )
                .await
        });

        tx.send(Ok(vec![1u8; 1000])).await.unwrap();
        wait_for_len(&seen, 1).await;

        gate.pause();
        tx.send(Ok(vec![2u8; 1000])).await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(seen.lock().unwrap().len(), 1, "no progress while paused");

        gate.resume();
        wait_for_len(&seen, 2).await;
        tx.send(Ok(vec![3u8; 1000])).await.unwrap();
        drop(tx);

        let written = task.await.unwrap().unwrap();
        assert_eq!(written, 3000);

        let done: Vec<u64> = seen.lock().unwrap().iter().map(|p| p.done).collect();
        assert_eq!(done, vec![1000, 2000, 3000]);
        assert_eq!(seen.lock().unwrap()[2].percent, Some(100.0));

        let mut expected = vec![1u8; 1000];
        expected.extend(vec![2u8; 1000]);
        expected.extend(vec![3u8; 1000]);
        assert_eq!(std::fs::read(&dest).unwrap(), expected);
    }

    #[tokio::test]
    async fn large_chunks_are_split_at_chunk_size() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("split.bin");
        let engine = TransferEngine::new(Client::new());
        let (seen, callback) = recorder();

        let body = vec![7u8; CHUNK_SIZE * 2 + 10];
        let stream = futures_util::stream::iter(vec![Ok::<_, std::io::Error>(body.clone())]);
        engine
            .write_stream("memory://big", stream, None, &dest, Some(callback.as_ref()))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|p| p.percent.is_none() && p.total.is_none()));
        assert_eq!(seen[2].done, body.len() as u64);
    }

    #[tokio::test]
    async fn stream_error_leaves_partial_file_and_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("partial.bin");
        let engine = TransferEngine::new(Client::new());

        let stream = futures_util::stream::iter(vec![
            Ok(vec![9u8; 500]),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ]);
        let result = engine
            .write_stream("memory://broken", stream, Some(1000), &dest, None)
            .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read(&dest).unwrap(), vec![9u8; 500]);
    }

    #[tokio::test]
    async fn downloads_over_http_with_known_length() {
        let mut server = Server::new_async().await;
        let body = b"client jar bytes".to_vec();
        let _m = server
            .mock("GET", "/v/client.jar")
            .with_status(200)
            .with_body(body.clone())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("versions/1.20.1/1.20.1.jar");
        let engine = TransferEngine::new(Client::new());
        let (seen, callback) = recorder();

        let url = format!("{}/v/client.jar", server.url());
        let written = engine
            .download(&url, &dest, Some(callback.as_ref()))
            .await
            .unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
        let last = *seen.lock().unwrap().last().unwrap();
        assert_eq!(last.total, Some(body.len() as u64));
        assert_eq!(last.percent, Some(100.0));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/missing.jar")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let engine = TransferEngine::new(Client::new());
        let url = format!("{}/missing.jar", server.url());
        let err = engine
            .download(&url, &dir.path().join("missing.jar"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, LauncherError::DownloadFailed { status: 404, .. }));
    }
}
