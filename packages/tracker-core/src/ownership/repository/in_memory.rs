use std::collections::{BTreeSet, HashMap};

use parking_lot::Mutex;
use swarmshare_primitives::{Fingerprint, PeerAddress};

use crate::ownership::RegistryMetrics;

/// Both indexes of the registry. They are only ever mutated together, while
/// holding the repository lock.
#[derive(Debug, Default)]
struct Ownership {
    owners: HashMap<Fingerprint, BTreeSet<PeerAddress>>,
    fingerprints_of: HashMap<PeerAddress, BTreeSet<Fingerprint>>,
}

impl Ownership {
    fn insert(&mut self, peer: PeerAddress, fingerprint: Fingerprint) -> bool {
        let added = self.owners.entry(fingerprint).or_default().insert(peer);
        self.fingerprints_of.entry(peer).or_default().insert(fingerprint);
        added
    }

    fn remove(&mut self, peer: &PeerAddress, fingerprint: &Fingerprint) -> bool {
        let removed = match self.owners.get_mut(fingerprint) {
            Some(owners) => {
                let removed = owners.remove(peer);
                if owners.is_empty() {
                    self.owners.remove(fingerprint);
                }
                removed
            }
            None => false,
        };

        if let Some(fingerprints) = self.fingerprints_of.get_mut(peer) {
            fingerprints.remove(fingerprint);
            if fingerprints.is_empty() {
                self.fingerprints_of.remove(peer);
            }
        }

        removed
    }
}

/// The in-memory ownership registry.
///
/// Every operation takes the lock once and performs the whole logical
/// mutation before releasing it, so other operations never observe the two
/// indexes out of sync. The lock is never held across I/O.
#[derive(Debug, Default)]
pub struct InMemoryOwnershipRepository {
    ownership: Mutex<Ownership>,
}

impl InMemoryOwnershipRepository {
    /// Records `peer` as an owner of every fingerprint. Registering a pair
    /// that is already known is a no-op.
    ///
    /// It returns the number of new ownership pairs.
    pub fn register(&self, peer: &PeerAddress, fingerprints: &[Fingerprint]) -> usize {
        let mut ownership = self.ownership.lock();

        fingerprints
            .iter()
            .filter(|fingerprint| ownership.insert(*peer, **fingerprint))
            .count()
    }

    /// Records `peer` as an owner of `fingerprint`. It returns `false` if the
    /// pair was already known.
    pub fn register_one(&self, peer: &PeerAddress, fingerprint: &Fingerprint) -> bool {
        self.ownership.lock().insert(*peer, *fingerprint)
    }

    /// Removes `peer` from the owners of `fingerprint`. It returns `false` if
    /// the pair was not known.
    pub fn unregister_one(&self, peer: &PeerAddress, fingerprint: &Fingerprint) -> bool {
        self.ownership.lock().remove(peer, fingerprint)
    }

    /// The peers owning a fingerprint, empty when nobody owns it.
    #[must_use]
    pub fn query(&self, fingerprint: &Fingerprint) -> Vec<PeerAddress> {
        self.owners(fingerprint).into_iter().collect()
    }

    #[must_use]
    pub fn owners(&self, fingerprint: &Fingerprint) -> BTreeSet<PeerAddress> {
        self.ownership.lock().owners.get(fingerprint).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn fingerprints_of(&self, peer: &PeerAddress) -> BTreeSet<Fingerprint> {
        self.ownership
            .lock()
            .fingerprints_of
            .get(peer)
            .cloned()
            .unwrap_or_default()
    }

    /// Releases every fingerprint owned by `peer`.
    ///
    /// It returns the number of released fingerprints.
    pub fn cleanup(&self, peer: &PeerAddress) -> usize {
        let mut ownership = self.ownership.lock();

        let Some(fingerprints) = ownership.fingerprints_of.remove(peer) else {
            return 0;
        };

        for fingerprint in &fingerprints {
            if let Some(owners) = ownership.owners.get_mut(fingerprint) {
                owners.remove(peer);
                if owners.is_empty() {
                    ownership.owners.remove(fingerprint);
                }
            }
        }

        fingerprints.len()
    }

    #[must_use]
    pub fn metrics(&self) -> RegistryMetrics {
        let ownership = self.ownership.lock();

        RegistryMetrics {
            fingerprints: ownership.owners.len() as u64,
            peers: ownership.fingerprints_of.len() as u64,
            ownerships: ownership.owners.values().map(|owners| owners.len() as u64).sum(),
        }
    }

    /// Checks that both indexes describe the same ownership pairs and that
    /// neither keeps empty entries.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let ownership = self.ownership.lock();

        let forward = ownership.owners.iter().all(|(fingerprint, owners)| {
            !owners.is_empty()
                && owners.iter().all(|peer| {
                    ownership
                        .fingerprints_of
                        .get(peer)
                        .is_some_and(|fingerprints| fingerprints.contains(fingerprint))
                })
        });

        let backward = ownership.fingerprints_of.iter().all(|(peer, fingerprints)| {
            !fingerprints.is_empty()
                && fingerprints.iter().all(|fingerprint| {
                    ownership
                        .owners
                        .get(fingerprint)
                        .is_some_and(|owners| owners.contains(peer))
                })
        });

        forward && backward
    }
}
