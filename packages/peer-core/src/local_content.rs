//! The content a peer holds and can serve.
//!
//! The [`LocalContentMap`] maps every fingerprint the peer advertises to the
//! place its bytes live on disk: a whole file, or a byte range of a file (a
//! chunk of a shared file, or a chunk stored after another peer pushed it).
//!
//! The map is built at startup by [`scan_directory`] and updated by the agent
//! when files are created or deleted. The peer server reads it concurrently
//! to answer `download` requests.
//!
//! A fingerprint can live in several places: two identical files, or the
//! same chunk in a shared file and in the storage directory. The map keeps
//! all of them, so a fingerprint stays held until its last location goes
//! away, and a read falls back to the next location when one can not be
//! read.
//!
//! Only content directory files are advertised. A chunk pushed into the
//! storage directory is served, but it neither advertises a fingerprint nor
//! keeps one advertised.
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use swarmshare_configuration::AdvertiseMode;
use swarmshare_content::{fingerprint, fingerprint_file, read_range, split, StorageError};
use swarmshare_located_error::Located;
use swarmshare_primitives::Fingerprint;
use tokio::sync::RwLock;

/// Where the bytes of a fingerprint are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLocation {
    WholeFile { path: PathBuf },
    Range { path: PathBuf, offset: u64, len: usize },
}

impl ContentLocation {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ContentLocation::WholeFile { path } | ContentLocation::Range { path, .. } => path,
        }
    }

    /// Reads the bytes of the location.
    ///
    /// # Errors
    ///
    /// Will return an error if the file can not be read.
    pub fn read(&self) -> Result<Vec<u8>, StorageError> {
        match self {
            ContentLocation::WholeFile { path } => std::fs::read(path).map_err(|err| StorageError::Read {
                path: path.clone(),
                source: Located(err).into(),
            }),
            ContentLocation::Range { path, offset, len } => read_range(path, *offset, *len),
        }
    }
}

/// A fingerprint with the place its bytes live.
pub type ContentEntry = (Fingerprint, ContentLocation);

/// Why the peer holds a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentOrigin {
    /// A file of the content directory. Its fingerprints are advertised.
    Shared,

    /// A chunk another peer pushed into the storage directory. It is served
    /// but not advertised.
    Stored,
}

#[derive(Debug, PartialEq, Eq)]
struct HeldLocation {
    location: ContentLocation,
    origin: ContentOrigin,
}

#[derive(Debug, Default)]
struct Entries {
    locations: HashMap<Fingerprint, Vec<HeldLocation>>,
    advertised: HashSet<Fingerprint>,
}

impl Entries {
    fn add(&mut self, fingerprint: Fingerprint, location: ContentLocation, origin: ContentOrigin) {
        let held = HeldLocation { location, origin };
        let locations = self.locations.entry(fingerprint).or_default();

        if !locations.contains(&held) {
            locations.push(held);
        }
    }

    fn is_shared(&self, fingerprint: &Fingerprint) -> bool {
        self.locations
            .get(fingerprint)
            .is_some_and(|locations| locations.iter().any(|held| held.origin == ContentOrigin::Shared))
    }
}

/// Fingerprint to locations map, shared between the agent and its server.
///
/// The map also remembers which fingerprints the agent advertised to the
/// tracker. A fingerprint is advertised while it has a location in the
/// content directory, whatever the stored chunks with the same fingerprint.
#[derive(Debug, Default)]
pub struct LocalContentMap {
    entries: RwLock<Entries>,
}

impl LocalContentMap {
    /// Adds shared entries. It returns the fingerprints that became
    /// advertised, in the order they were first seen.
    pub async fn insert_all(&self, entries: Vec<ContentEntry>) -> Vec<Fingerprint> {
        let mut map = self.entries.write().await;

        let mut added = Vec::new();

        for (fingerprint, location) in entries {
            map.add(fingerprint, location, ContentOrigin::Shared);

            if map.advertised.insert(fingerprint) {
                added.push(fingerprint);
            }
        }

        added
    }

    /// Adds one shared entry. It returns `true` if the fingerprint became
    /// advertised.
    pub async fn insert(&self, fingerprint: Fingerprint, location: ContentLocation) -> bool {
        !self.insert_all(vec![(fingerprint, location)]).await.is_empty()
    }

    /// Adds a stored chunk. It can be served but it is not advertised.
    pub async fn insert_stored(&self, fingerprint: Fingerprint, location: ContentLocation) {
        self.entries
            .write()
            .await
            .add(fingerprint, location, ContentOrigin::Stored);
    }

    /// Removes every location inside `path`. It returns the advertised
    /// fingerprints that no longer have a shared location, sorted.
    pub async fn remove_path(&self, path: &Path) -> Vec<Fingerprint> {
        let mut guard = self.entries.write().await;
        let map = &mut *guard;

        map.locations.retain(|_, locations| {
            locations.retain(|held| held.location.path() != path);
            !locations.is_empty()
        });

        let mut released: Vec<Fingerprint> = map
            .advertised
            .iter()
            .filter(|fingerprint| !map.is_shared(fingerprint))
            .copied()
            .collect();

        for fingerprint in &released {
            map.advertised.remove(fingerprint);
        }

        released.sort_unstable();

        released
    }

    /// The first location of a fingerprint.
    pub async fn get(&self, fingerprint: &Fingerprint) -> Option<ContentLocation> {
        self.entries
            .read()
            .await
            .locations
            .get(fingerprint)
            .and_then(|locations| locations.first())
            .map(|held| held.location.clone())
    }

    /// Whether the fingerprint can be served.
    pub async fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.read().await.locations.contains_key(fingerprint)
    }

    /// Whether the fingerprint is advertised to the tracker.
    pub async fn is_advertised(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.read().await.advertised.contains(fingerprint)
    }

    /// The advertised fingerprints, sorted.
    pub async fn fingerprints(&self) -> Vec<Fingerprint> {
        let mut fingerprints: Vec<Fingerprint> = self.entries.read().await.advertised.iter().copied().collect();
        fingerprints.sort_unstable();
        fingerprints
    }

    /// The number of fingerprints that can be served.
    pub async fn len(&self) -> usize {
        self.entries.read().await.locations.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.locations.is_empty()
    }

    /// Reads the bytes of a fingerprint.
    ///
    /// Locations are tried in the order they were added. A location that can
    /// no longer be read is dropped. The fingerprint stays advertised until
    /// its path is removed. It returns `None` if the fingerprint is unknown
    /// or none of its locations can be read.
    pub async fn read(&self, fingerprint: &Fingerprint) -> Option<Vec<u8>> {
        while let Some(location) = self.get(fingerprint).await {
            let result = {
                let location = location.clone();
                tokio::task::spawn_blocking(move || location.read()).await
            };

            match result {
                Ok(Ok(bytes)) => return Some(bytes),
                Ok(Err(err)) => {
                    tracing::warn!(%fingerprint, "dropping stale content location: {err}");
                    self.remove_location(fingerprint, &location).await;
                }
                Err(err) => {
                    tracing::error!(%fingerprint, "reading content failed: {err}");
                    return None;
                }
            }
        }

        None
    }

    async fn remove_location(&self, fingerprint: &Fingerprint, location: &ContentLocation) {
        let mut map = self.entries.write().await;

        if let Some(locations) = map.locations.get_mut(fingerprint) {
            locations.retain(|held| held.location != *location);

            if locations.is_empty() {
                map.locations.remove(fingerprint);
            }
        }
    }
}

/// Fingerprints one file.
///
/// In whole-file mode it gives a single entry. In chunked mode it gives one
/// entry per chunk; an empty file has no chunks and gives no entries.
///
/// # Errors
///
/// Will return an error if the file can not be read or `chunk_size` is zero
/// in chunked mode.
pub fn scan_file(path: &Path, mode: AdvertiseMode, chunk_size: usize) -> Result<Vec<ContentEntry>, StorageError> {
    match mode {
        AdvertiseMode::Whole => Ok(vec![(
            fingerprint_file(path)?,
            ContentLocation::WholeFile { path: path.to_path_buf() },
        )]),
        AdvertiseMode::Chunked => Ok(split(path, chunk_size)?
            .iter()
            .enumerate()
            .map(|(index, chunk)| {
                (
                    fingerprint(chunk),
                    ContentLocation::Range {
                        path: path.to_path_buf(),
                        offset: index as u64 * chunk_size as u64,
                        len: chunk.len(),
                    },
                )
            })
            .collect()),
    }
}

/// Fingerprints every regular file directly inside `dir`.
///
/// Subdirectories are not visited. Files that can not be read are logged and
/// skipped.
///
/// # Errors
///
/// Will return an error if the directory can not be listed.
pub fn scan_directory(dir: &Path, mode: AdvertiseMode, chunk_size: usize) -> Result<Vec<ContentEntry>, StorageError> {
    let read_error = |err: std::io::Error| StorageError::Read {
        path: dir.to_path_buf(),
        source: Located(err).into(),
    };

    let mut paths = Vec::new();

    for dir_entry in std::fs::read_dir(dir).map_err(read_error)? {
        let dir_entry = dir_entry.map_err(read_error)?;
        match dir_entry.file_type() {
            Ok(file_type) if file_type.is_file() => paths.push(dir_entry.path()),
            Ok(_) => {}
            Err(err) => tracing::warn!(path = %dir_entry.path().display(), "skipping entry: {err}"),
        }
    }

    paths.sort();

    let mut entries = Vec::new();

    for path in paths {
        match scan_file(&path, mode, chunk_size) {
            Ok(file_entries) => entries.extend(file_entries),
            Err(err) => tracing::warn!(path = %path.display(), "skipping unreadable file: {err}"),
        }
    }

    tracing::info!(dir = %dir.display(), entries = entries.len(), "content directory scanned");

    Ok(entries)
}
