//! Keeps the tracker up to date with the content directory.
//!
//! Watch events are applied to the [`LocalContentMap`] and the fingerprints
//! that appear or disappear are sent to the tracker as `create` and `delete`
//! requests. The task ends when the watch event channel closes.
use std::path::Path;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use mockall::automock;
use swarmshare_configuration::AdvertiseMode;
use swarmshare_peer_core::{scan_file, LocalContentMap};
use swarmshare_primitives::Fingerprint;
use swarmshare_tracker_client::TrackerClient;
use tokio::sync::mpsc;

use crate::watcher::WatchEvent;

/// The capacity of the channel between the watcher and the update task.
pub const WATCH_CHANNEL_CAPACITY: usize = 1024;

/// Announces fingerprint changes.
#[automock]
pub trait Announcer: Sync + Send {
    fn create(&self, fingerprint: Fingerprint) -> BoxFuture<'_, Result<(), swarmshare_tracker_client::Error>>;
    fn delete(&self, fingerprint: Fingerprint) -> BoxFuture<'_, Result<(), swarmshare_tracker_client::Error>>;
}

impl Announcer for TrackerClient {
    fn create(&self, fingerprint: Fingerprint) -> BoxFuture<'_, Result<(), swarmshare_tracker_client::Error>> {
        TrackerClient::create(self, fingerprint).boxed()
    }

    fn delete(&self, fingerprint: Fingerprint) -> BoxFuture<'_, Result<(), swarmshare_tracker_client::Error>> {
        TrackerClient::delete(self, fingerprint).boxed()
    }
}

/// Applies watch events until the channel closes.
pub struct ContentUpdater {
    content: Arc<LocalContentMap>,
    announcer: Arc<dyn Announcer>,
    mode: AdvertiseMode,
    chunk_size: usize,
}

impl ContentUpdater {
    #[must_use]
    pub fn new(content: &Arc<LocalContentMap>, announcer: &Arc<dyn Announcer>, mode: AdvertiseMode, chunk_size: usize) -> Self {
        Self {
            content: content.clone(),
            announcer: announcer.clone(),
            mode,
            chunk_size,
        }
    }

    pub async fn run(self, mut receiver: mpsc::Receiver<WatchEvent>) {
        while let Some(event) = receiver.recv().await {
            self.apply(&event).await;
        }

        tracing::debug!("watch event channel closed, stopping the content updates");
    }

    /// Applies one event. Failures are logged.
    pub async fn apply(&self, event: &WatchEvent) {
        match event {
            WatchEvent::Created(path) => self.added(path).await,
            WatchEvent::Removed(path) => self.removed(path).await,
            WatchEvent::Modified(path) => {
                self.removed(path).await;
                self.added(path).await;
            }
        }
    }

    async fn added(&self, path: &Path) {
        let entries = {
            let path = path.to_path_buf();
            let (mode, chunk_size) = (self.mode, self.chunk_size);

            tokio::task::spawn_blocking(move || {
                if path.is_file() {
                    scan_file(&path, mode, chunk_size).map(Some)
                } else {
                    Ok(None)
                }
            })
            .await
        };

        let entries = match entries {
            Ok(Ok(Some(entries))) => entries,
            Ok(Ok(None)) => {
                tracing::debug!(path = %path.display(), "not a regular file, ignoring it");
                return;
            }
            Ok(Err(err)) => {
                tracing::warn!(path = %path.display(), "unable to fingerprint the new file: {err}");
                return;
            }
            Err(err) => {
                tracing::error!(path = %path.display(), "fingerprinting failed: {err}");
                return;
            }
        };

        for fingerprint in self.content.insert_all(entries).await {
            tracing::info!(path = %path.display(), %fingerprint, "advertising new content");

            if let Err(err) = self.announcer.create(fingerprint).await {
                tracing::warn!(%fingerprint, "unable to advertise new content: {err}");
            }
        }
    }

    async fn removed(&self, path: &Path) {
        for fingerprint in self.content.remove_path(path).await {
            tracing::info!(path = %path.display(), %fingerprint, "withdrawing removed content");

            if let Err(err) = self.announcer.delete(fingerprint).await {
                tracing::warn!(%fingerprint, "unable to withdraw removed content: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::FutureExt;
    use mockall::predicate::eq;
    use swarmshare_configuration::AdvertiseMode;
    use swarmshare_content::fingerprint;
    use swarmshare_peer_core::{ChunkStorage, LocalContentMap, RequestHandler};
    use swarmshare_primitives::Fingerprint;
    use swarmshare_wire_protocol::PeerRequest;

    use super::{Announcer, ContentUpdater, MockAnnouncer};
    use crate::watcher::WatchEvent;

    fn updater(content: &Arc<LocalContentMap>, announcer: MockAnnouncer) -> ContentUpdater {
        let announcer: Arc<dyn Announcer> = Arc::new(announcer);
        ContentUpdater::new(content, &announcer, AdvertiseMode::Whole, 4)
    }

    #[tokio::test]
    async fn it_should_advertise_a_created_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let mut announcer = MockAnnouncer::new();
        announcer
            .expect_create()
            .with(eq(fingerprint(b"hello")))
            .times(1)
            .returning(|_| async { Ok(()) }.boxed());

        let content = Arc::new(LocalContentMap::default());

        updater(&content, announcer).apply(&WatchEvent::Created(path)).await;

        assert!(content.contains(&fingerprint(b"hello")).await);
    }

    #[tokio::test]
    async fn it_should_not_advertise_a_fingerprint_that_is_already_held() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let copy = dir.path().join("copy.txt");
        std::fs::write(&first, b"hello").unwrap();
        std::fs::write(&copy, b"hello").unwrap();

        let mut announcer = MockAnnouncer::new();
        announcer.expect_create().times(1).returning(|_| async { Ok(()) }.boxed());

        let content = Arc::new(LocalContentMap::default());
        let updater = updater(&content, announcer);

        updater.apply(&WatchEvent::Created(first)).await;
        updater.apply(&WatchEvent::Created(copy)).await;
    }

    #[tokio::test]
    async fn it_should_advertise_a_created_file_whose_content_a_peer_already_pushed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let mut announcer = MockAnnouncer::new();
        announcer
            .expect_create()
            .with(eq(fingerprint(b"hello")))
            .times(1)
            .returning(|_| async { Ok(()) }.boxed());
        announcer
            .expect_delete()
            .with(eq(fingerprint(b"hello")))
            .times(1)
            .returning(|_| async { Ok(()) }.boxed());

        let content = Arc::new(LocalContentMap::default());
        let peer_server = RequestHandler::new(&content, ChunkStorage::new(&dir.path().join("storage")));

        peer_server
            .handle_request(
                "126.0.0.1:51514".parse().unwrap(),
                PeerRequest::Store {
                    file_name: "x.bin".to_string(),
                    bytes: b"hello".to_vec(),
                },
            )
            .await;

        let updater = updater(&content, announcer);

        updater.apply(&WatchEvent::Created(path.clone())).await;

        assert_eq!(content.fingerprints().await, vec![fingerprint(b"hello")]);

        std::fs::remove_file(&path).unwrap();
        updater.apply(&WatchEvent::Removed(path)).await;

        assert!(content.fingerprints().await.is_empty());
        assert!(content.contains(&fingerprint(b"hello")).await);
    }

    #[tokio::test]
    async fn it_should_withdraw_the_fingerprints_of_a_removed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let mut announcer = MockAnnouncer::new();
        announcer.expect_create().returning(|_| async { Ok(()) }.boxed());
        announcer
            .expect_delete()
            .with(eq(fingerprint(b"hello")))
            .times(1)
            .returning(|_| async { Ok(()) }.boxed());

        let content = Arc::new(LocalContentMap::default());
        let updater = updater(&content, announcer);

        updater.apply(&WatchEvent::Created(path.clone())).await;
        std::fs::remove_file(&path).unwrap();
        updater.apply(&WatchEvent::Removed(path)).await;

        assert!(content.is_empty().await);
    }

    #[tokio::test]
    async fn it_should_keep_a_fingerprint_another_file_still_holds() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let copy = dir.path().join("copy.txt");
        std::fs::write(&first, b"hello").unwrap();
        std::fs::write(&copy, b"hello").unwrap();

        let mut announcer = MockAnnouncer::new();
        announcer.expect_create().returning(|_| async { Ok(()) }.boxed());
        announcer.expect_delete().never();

        let content = Arc::new(LocalContentMap::default());
        let updater = updater(&content, announcer);

        updater.apply(&WatchEvent::Created(first.clone())).await;
        updater.apply(&WatchEvent::Created(copy)).await;
        std::fs::remove_file(&first).unwrap();
        updater.apply(&WatchEvent::Removed(first)).await;

        assert!(content.contains(&fingerprint(b"hello")).await);
    }

    #[tokio::test]
    async fn it_should_readvertise_a_modified_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let mut announcer = MockAnnouncer::new();
        announcer
            .expect_create()
            .with(eq(fingerprint(b"hello")))
            .times(1)
            .returning(|_| async { Ok(()) }.boxed());
        announcer
            .expect_delete()
            .with(eq(fingerprint(b"hello")))
            .times(1)
            .returning(|_| async { Ok(()) }.boxed());
        announcer
            .expect_create()
            .with(eq(fingerprint(b"hello, world")))
            .times(1)
            .returning(|_| async { Ok(()) }.boxed());

        let content = Arc::new(LocalContentMap::default());
        let updater = updater(&content, announcer);

        updater.apply(&WatchEvent::Created(path.clone())).await;
        std::fs::write(&path, b"hello, world").unwrap();
        updater.apply(&WatchEvent::Modified(path)).await;

        assert_eq!(content.fingerprints().await, vec![fingerprint(b"hello, world")]);
    }

    #[tokio::test]
    async fn it_should_ignore_paths_that_are_not_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let mut announcer = MockAnnouncer::new();
        announcer.expect_create().never();

        let content = Arc::new(LocalContentMap::default());

        updater(&content, announcer)
            .apply(&WatchEvent::Created(dir.path().join("nested")))
            .await;

        assert!(content.is_empty().await);
    }

    #[tokio::test]
    async fn it_should_stop_when_the_watch_channel_closes() {
        let (sender, receiver) = tokio::sync::mpsc::channel(1);
        let content = Arc::new(LocalContentMap::default());

        let task = tokio::spawn(updater(&content, MockAnnouncer::new()).run(receiver));
        drop(sender);

        task.await.unwrap();

        assert_eq!(content.fingerprints().await, Vec::<Fingerprint>::new());
    }
}
