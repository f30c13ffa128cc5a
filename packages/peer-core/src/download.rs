//! The download engine.
//!
//! A download takes a [`Manifest`] (the ordered fingerprints of the wanted
//! content) and an output path:
//!
//! 1. The manifest chunk size must match the configured one, unless the
//!    manifest names a whole file.
//! 2. The tracker is asked once for the candidates of every fingerprint.
//! 3. For every fingerprint, in order, the candidates are tried one after
//!    the other until one returns a non-empty chunk with that fingerprint.
//! 4. The chunks are combined into the output file.
//!
//! ```text
//!  manifest ──query──> candidates ──fetch (failover)──> chunks ──combine──> output
//! ```
//!
//! A fingerprint nobody owns is reported and skipped, so all the missing
//! fingerprints can be reported at once. A fingerprint whose every candidate
//! fails stops the download right away. In both cases nothing is written to
//! the output path.
//!
//! Candidates are dialed on the host they connected to the tracker from and
//! the configured peer server port: the tracker only knows the address of
//! the peer's tracker connection.
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use mockall::automock;
use swarmshare_content::{combine, fingerprint as content_fingerprint, Chunk, Manifest, StorageError};
use swarmshare_located_error::Located;
use swarmshare_primitives::{Fingerprint, PeerAddress};
use swarmshare_tracker_client::TrackerClient;

use crate::error::{DownloadError, FetchError, QueryError};

/// Asks who owns a fingerprint.
#[automock]
pub trait CandidateSource: Sync + Send {
    fn candidates(&self, fingerprint: Fingerprint) -> BoxFuture<'_, Result<Vec<PeerAddress>, QueryError>>;
}

impl CandidateSource for TrackerClient {
    fn candidates(&self, fingerprint: Fingerprint) -> BoxFuture<'_, Result<Vec<PeerAddress>, QueryError>> {
        async move {
            self.query(fingerprint)
                .await
                .map_err(|source| QueryError { fingerprint, source })
        }
        .boxed()
    }
}

/// Fetches one chunk from one peer.
#[automock]
pub trait ChunkFetcher: Sync + Send {
    fn fetch(&self, peer: PeerAddress, fingerprint: Fingerprint) -> BoxFuture<'_, Result<Chunk, FetchError>>;
}

/// The outcome of a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub output: PathBuf,
    pub chunks: usize,
    pub bytes: u64,

    /// The peer each chunk came from, in manifest order.
    pub sources: Vec<PeerAddress>,
}

pub struct DownloadEngine {
    candidate_source: Arc<dyn CandidateSource>,
    chunk_fetcher: Arc<dyn ChunkFetcher>,
    chunk_size: usize,
    peer_port: u16,
}

impl DownloadEngine {
    #[must_use]
    pub fn new(
        candidate_source: &Arc<dyn CandidateSource>,
        chunk_fetcher: &Arc<dyn ChunkFetcher>,
        chunk_size: usize,
        peer_port: u16,
    ) -> Self {
        Self {
            candidate_source: candidate_source.clone(),
            chunk_fetcher: chunk_fetcher.clone(),
            chunk_size,
            peer_port,
        }
    }

    /// Downloads the content described by `manifest` into `output`.
    ///
    /// # Errors
    ///
    /// Will return a [`DownloadError`] if the manifest is not compatible, the
    /// tracker can not be queried, a fingerprint has no owner, every owner
    /// of a fingerprint fails, or the output can not be written.
    pub async fn download(&self, manifest: &Manifest, output: &Path) -> Result<DownloadReport, DownloadError> {
        let (chunks, sources) = self.fetch_chunks(manifest).await?;

        let bytes = chunks.iter().map(|chunk| chunk.len() as u64).sum();
        let count = chunks.len();

        let destination = output.to_path_buf();
        tokio::task::spawn_blocking(move || combine(&chunks, &destination))
            .await
            .map_err(|err| {
                DownloadError::Storage(StorageError::Write {
                    path: output.to_path_buf(),
                    source: Located(std::io::Error::other(err)).into(),
                })
            })??;

        tracing::info!(output = %output.display(), chunks = count, bytes, "download completed");

        Ok(DownloadReport {
            output: output.to_path_buf(),
            chunks: count,
            bytes,
            sources,
        })
    }

    /// Fetches every chunk of the manifest, in order, without writing them.
    ///
    /// # Errors
    ///
    /// See [`download`](Self::download).
    pub async fn fetch_chunks(&self, manifest: &Manifest) -> Result<(Vec<Chunk>, Vec<PeerAddress>), DownloadError> {
        if manifest.is_empty() {
            return Err(DownloadError::EmptyManifest);
        }

        if manifest.is_chunked() && manifest.chunk_size != self.chunk_size {
            return Err(DownloadError::ChunkSizeMismatch {
                manifest: manifest.chunk_size,
                configured: self.chunk_size,
            });
        }

        let mut candidate_sets = Vec::with_capacity(manifest.len());
        for fingerprint in &manifest.fingerprints {
            candidate_sets.push(self.candidate_source.candidates(*fingerprint).await?);
        }

        let mut chunks = Vec::with_capacity(manifest.len());
        let mut sources = Vec::with_capacity(manifest.len());
        let mut unresolved = Vec::new();

        for (fingerprint, candidates) in manifest.fingerprints.iter().zip(candidate_sets) {
            if candidates.is_empty() {
                tracing::warn!(%fingerprint, "no peer owns the chunk");
                unresolved.push(*fingerprint);
                continue;
            }

            let (chunk, source) = self.fetch_with_failover(*fingerprint, &candidates).await?;

            chunks.push(chunk);
            sources.push(source);
        }

        if !unresolved.is_empty() {
            return Err(DownloadError::Unresolved { fingerprints: unresolved });
        }

        Ok((chunks, sources))
    }

    async fn fetch_with_failover(
        &self,
        fingerprint: Fingerprint,
        candidates: &[PeerAddress],
    ) -> Result<(Chunk, PeerAddress), DownloadError> {
        for candidate in candidates {
            let peer = self.dial_address(candidate);

            match self.chunk_fetcher.fetch(peer, fingerprint).await {
                Ok(chunk) if chunk.is_empty() => {
                    tracing::debug!(%fingerprint, %peer, "peer answered with an empty chunk, trying the next one");
                }
                Ok(chunk) if content_fingerprint(&chunk) != fingerprint => {
                    tracing::debug!(%fingerprint, %peer, "peer answered with other content, trying the next one");
                }
                Ok(chunk) => {
                    tracing::debug!(%fingerprint, %peer, len = chunk.len(), "chunk fetched");
                    return Ok((chunk, peer));
                }
                Err(err) => {
                    tracing::debug!(%fingerprint, %peer, "fetch failed, trying the next peer: {err}");
                }
            }
        }

        tracing::warn!(%fingerprint, candidates = candidates.len(), "every candidate failed");

        Err(DownloadError::DownloadFailed {
            fingerprint,
            candidates: candidates.len(),
        })
    }

    fn dial_address(&self, candidate: &PeerAddress) -> PeerAddress {
        SocketAddr::new(candidate.ip(), self.peer_port)
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::Arc;

    use futures::FutureExt;
    use mockall::predicate::eq;
    use swarmshare_primitives::{Fingerprint, PeerAddress};

    use crate::download::{CandidateSource, ChunkFetcher, DownloadEngine, MockCandidateSource, MockChunkFetcher};
    use crate::error::FetchError;

    const PEER_PORT: u16 = 9090;
    const CHUNK_SIZE: usize = 4;

    /// The address a peer had on its tracker connection.
    fn advertised(last_octet: u8) -> PeerAddress {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, last_octet)), 50_000 + u16::from(last_octet))
    }

    /// The address the engine dials for that peer.
    fn dialed(last_octet: u8) -> PeerAddress {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, last_octet)), PEER_PORT)
    }

    fn engine(candidate_source: MockCandidateSource, chunk_fetcher: MockChunkFetcher) -> DownloadEngine {
        let candidate_source: Arc<dyn CandidateSource> = Arc::new(candidate_source);
        let chunk_fetcher: Arc<dyn ChunkFetcher> = Arc::new(chunk_fetcher);

        DownloadEngine::new(&candidate_source, &chunk_fetcher, CHUNK_SIZE, PEER_PORT)
    }

    fn owners(owners: Vec<PeerAddress>) -> impl Fn(Fingerprint) -> futures::future::BoxFuture<'static, Result<Vec<PeerAddress>, crate::error::QueryError>> {
        move |_| {
            let owners = owners.clone();
            async move { Ok(owners) }.boxed()
        }
    }

    fn refused(peer: PeerAddress) -> FetchError {
        FetchError::unavailable(peer, std::io::Error::from(std::io::ErrorKind::ConnectionRefused))
    }

    mod failing_over {
        use futures::FutureExt;
        use mockall::predicate::eq;
        use swarmshare_content::Manifest;
        use swarmshare_primitives::Fingerprint;

        use super::{advertised, dialed, engine, owners, refused, CHUNK_SIZE};
        use crate::download::{MockCandidateSource, MockChunkFetcher};

        #[tokio::test]
        async fn it_should_take_the_chunk_from_the_next_candidate_when_one_refuses() {
            let mut candidate_source = MockCandidateSource::new();
            candidate_source
                .expect_candidates()
                .with(eq(Fingerprint::new(6)))
                .times(1)
                .returning(owners(vec![advertised(1), advertised(2)]));

            let mut chunk_fetcher = MockChunkFetcher::new();
            chunk_fetcher
                .expect_fetch()
                .with(eq(dialed(1)), eq(Fingerprint::new(6)))
                .times(1)
                .returning(|peer, _| async move { Err(refused(peer)) }.boxed());
            chunk_fetcher
                .expect_fetch()
                .with(eq(dialed(2)), eq(Fingerprint::new(6)))
                .times(1)
                .returning(|_, _| async { Ok(vec![1, 2, 3]) }.boxed());

            let manifest = Manifest {
                chunk_size: CHUNK_SIZE,
                fingerprints: vec![Fingerprint::new(6)],
            };

            let (chunks, sources) = engine(candidate_source, chunk_fetcher).fetch_chunks(&manifest).await.unwrap();

            assert_eq!(chunks, vec![vec![1, 2, 3]]);
            assert_eq!(sources, vec![dialed(2)]);
        }

        #[tokio::test]
        async fn it_should_not_contact_more_candidates_once_one_succeeds() {
            let mut candidate_source = MockCandidateSource::new();
            candidate_source
                .expect_candidates()
                .returning(owners(vec![advertised(1), advertised(2)]));

            let mut chunk_fetcher = MockChunkFetcher::new();
            chunk_fetcher
                .expect_fetch()
                .with(eq(dialed(1)), eq(Fingerprint::new(6)))
                .times(1)
                .returning(|_, _| async { Ok(vec![1, 2, 3]) }.boxed());
            chunk_fetcher
                .expect_fetch()
                .with(eq(dialed(2)), eq(Fingerprint::new(6)))
                .never();

            let manifest = Manifest {
                chunk_size: CHUNK_SIZE,
                fingerprints: vec![Fingerprint::new(6)],
            };

            let (chunks, _) = engine(candidate_source, chunk_fetcher).fetch_chunks(&manifest).await.unwrap();

            assert_eq!(chunks, vec![vec![1, 2, 3]]);
        }

        #[tokio::test]
        async fn it_should_treat_an_empty_chunk_as_a_failure() {
            let mut candidate_source = MockCandidateSource::new();
            candidate_source
                .expect_candidates()
                .returning(owners(vec![advertised(1), advertised(2)]));

            let mut chunk_fetcher = MockChunkFetcher::new();
            chunk_fetcher
                .expect_fetch()
                .with(eq(dialed(1)), eq(Fingerprint::new(6)))
                .returning(|_, _| async { Ok(vec![]) }.boxed());
            chunk_fetcher
                .expect_fetch()
                .with(eq(dialed(2)), eq(Fingerprint::new(6)))
                .returning(|_, _| async { Ok(vec![1, 2, 3]) }.boxed());

            let manifest = Manifest {
                chunk_size: CHUNK_SIZE,
                fingerprints: vec![Fingerprint::new(6)],
            };

            let (chunks, sources) = engine(candidate_source, chunk_fetcher).fetch_chunks(&manifest).await.unwrap();

            assert_eq!(chunks, vec![vec![1, 2, 3]]);
            assert_eq!(sources, vec![dialed(2)]);
        }
    }

    mod verifying_chunks {
        use futures::FutureExt;
        use mockall::predicate::eq;
        use swarmshare_content::Manifest;
        use swarmshare_primitives::Fingerprint;

        use super::{advertised, dialed, engine, owners, CHUNK_SIZE};
        use crate::download::{MockCandidateSource, MockChunkFetcher};

        #[tokio::test]
        async fn it_should_skip_a_candidate_that_serves_other_content() {
            let mut candidate_source = MockCandidateSource::new();
            candidate_source
                .expect_candidates()
                .returning(owners(vec![advertised(1), advertised(2)]));

            let mut chunk_fetcher = MockChunkFetcher::new();
            chunk_fetcher
                .expect_fetch()
                .with(eq(dialed(1)), eq(Fingerprint::new(6)))
                .returning(|_, _| async { Ok(vec![9, 9]) }.boxed());
            chunk_fetcher
                .expect_fetch()
                .with(eq(dialed(2)), eq(Fingerprint::new(6)))
                .returning(|_, _| async { Ok(vec![3, 3]) }.boxed());

            let manifest = Manifest {
                chunk_size: CHUNK_SIZE,
                fingerprints: vec![Fingerprint::new(6)],
            };

            let (chunks, sources) = engine(candidate_source, chunk_fetcher).fetch_chunks(&manifest).await.unwrap();

            assert_eq!(chunks, vec![vec![3, 3]]);
            assert_eq!(sources, vec![dialed(2)]);
        }
    }

    mod failing_the_download {
        use futures::FutureExt;
        use mockall::predicate::eq;
        use swarmshare_content::Manifest;
        use swarmshare_primitives::Fingerprint;

        use super::{advertised, dialed, engine, owners, CHUNK_SIZE};
        use crate::download::{MockCandidateSource, MockChunkFetcher};
        use crate::error::DownloadError;

        #[tokio::test]
        async fn it_should_fail_without_writing_anything_when_every_candidate_fails() {
            let mut candidate_source = MockCandidateSource::new();
            candidate_source.expect_candidates().returning(owners(vec![advertised(1)]));

            let mut chunk_fetcher = MockChunkFetcher::new();
            chunk_fetcher
                .expect_fetch()
                .with(eq(dialed(1)), eq(Fingerprint::new(6)))
                .times(1)
                .returning(|_, _| async { Ok(vec![]) }.boxed());

            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("out.bin");
            let manifest = Manifest {
                chunk_size: CHUNK_SIZE,
                fingerprints: vec![Fingerprint::new(6)],
            };

            let result = engine(candidate_source, chunk_fetcher).download(&manifest, &output).await;

            assert!(matches!(
                result,
                Err(DownloadError::DownloadFailed { fingerprint, candidates: 1 }) if fingerprint == Fingerprint::new(6)
            ));
            assert!(!output.exists());
        }

        #[tokio::test]
        async fn it_should_report_every_fingerprint_nobody_owns() {
            let mut candidate_source = MockCandidateSource::new();
            candidate_source
                .expect_candidates()
                .with(eq(Fingerprint::new(1)))
                .returning(owners(vec![]));
            candidate_source
                .expect_candidates()
                .with(eq(Fingerprint::new(2)))
                .returning(owners(vec![advertised(1)]));
            candidate_source
                .expect_candidates()
                .with(eq(Fingerprint::new(3)))
                .returning(owners(vec![]));

            let mut chunk_fetcher = MockChunkFetcher::new();
            chunk_fetcher
                .expect_fetch()
                .returning(|_, _| async { Ok(vec![2]) }.boxed());

            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("out.bin");
            let manifest = Manifest {
                chunk_size: CHUNK_SIZE,
                fingerprints: vec![Fingerprint::new(1), Fingerprint::new(2), Fingerprint::new(3)],
            };

            let result = engine(candidate_source, chunk_fetcher).download(&manifest, &output).await;

            assert!(matches!(
                result,
                Err(DownloadError::Unresolved { fingerprints }) if fingerprints == vec![Fingerprint::new(1), Fingerprint::new(3)]
            ));
            assert!(!output.exists());
        }

        #[tokio::test]
        async fn it_should_reject_a_manifest_with_another_chunk_size() {
            let mut candidate_source = MockCandidateSource::new();
            candidate_source.expect_candidates().never();

            let manifest = Manifest {
                chunk_size: CHUNK_SIZE * 2,
                fingerprints: vec![Fingerprint::new(6)],
            };

            let result = engine(candidate_source, MockChunkFetcher::new()).fetch_chunks(&manifest).await;

            assert!(matches!(
                result,
                Err(DownloadError::ChunkSizeMismatch {
                    manifest: 8,
                    configured: 4
                })
            ));
        }

        #[tokio::test]
        async fn it_should_reject_an_empty_manifest() {
            let manifest = Manifest {
                chunk_size: CHUNK_SIZE,
                fingerprints: vec![],
            };

            let result = engine(MockCandidateSource::new(), MockChunkFetcher::new())
                .fetch_chunks(&manifest)
                .await;

            assert!(matches!(result, Err(DownloadError::EmptyManifest)));
        }
    }

    mod downloading {
        use futures::FutureExt;
        use swarmshare_content::{fingerprint, split_bytes, Manifest};

        use super::{advertised, engine, owners, CHUNK_SIZE};
        use crate::download::{MockCandidateSource, MockChunkFetcher};

        #[tokio::test]
        async fn it_should_write_the_chunks_in_manifest_order() {
            let content = b"the quick brown fox".to_vec();
            let chunks = split_bytes(&content, CHUNK_SIZE).unwrap();
            let manifest = Manifest::from_bytes(&content, CHUNK_SIZE).unwrap();

            let mut candidate_source = MockCandidateSource::new();
            candidate_source.expect_candidates().returning(owners(vec![advertised(1)]));

            let mut chunk_fetcher = MockChunkFetcher::new();
            chunk_fetcher.expect_fetch().returning(move |_, wanted| {
                let chunk = chunks
                    .iter()
                    .find(|chunk| fingerprint(chunk) == wanted)
                    .cloned()
                    .unwrap_or_default();
                async move { Ok(chunk) }.boxed()
            });

            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("fox.txt");

            let report = engine(candidate_source, chunk_fetcher)
                .download(&manifest, &output)
                .await
                .unwrap();

            assert_eq!(std::fs::read(&output).unwrap(), content);
            assert_eq!(report.chunks, manifest.len());
            assert_eq!(report.bytes, content.len() as u64);
        }

        #[tokio::test]
        async fn it_should_download_a_whole_file_manifest_regardless_of_the_chunk_size() {
            let content = b"a whole file that is longer than one chunk".to_vec();
            let manifest = Manifest::whole_file(fingerprint(&content));

            let mut candidate_source = MockCandidateSource::new();
            candidate_source.expect_candidates().returning(owners(vec![advertised(1)]));

            let mut chunk_fetcher = MockChunkFetcher::new();
            let served = content.clone();
            chunk_fetcher.expect_fetch().returning(move |_, _| {
                let chunk = served.clone();
                async move { Ok(chunk) }.boxed()
            });

            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("whole.txt");

            engine(candidate_source, chunk_fetcher)
                .download(&manifest, &output)
                .await
                .unwrap();

            assert_eq!(std::fs::read(&output).unwrap(), content);
        }
    }

    #[tokio::test]
    async fn it_should_dial_candidates_on_the_configured_peer_port() {
        let mut candidate_source = MockCandidateSource::new();
        candidate_source.expect_candidates().returning(owners(vec![advertised(7)]));

        let mut chunk_fetcher = MockChunkFetcher::new();
        chunk_fetcher
            .expect_fetch()
            .with(eq(dialed(7)), eq(Fingerprint::new(6)))
            .times(1)
            .returning(|_, _| async { Ok(vec![6]) }.boxed());

        let manifest = swarmshare_content::Manifest {
            chunk_size: CHUNK_SIZE,
            fingerprints: vec![Fingerprint::new(6)],
        };

        let (_, sources) = engine(candidate_source, chunk_fetcher).fetch_chunks(&manifest).await.unwrap();

        assert_eq!(sources, vec![dialed(7)]);
    }
}
