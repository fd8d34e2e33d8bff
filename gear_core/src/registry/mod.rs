//! Part/Material registry
//!
//! Definitions live in an immutable [`Snapshot`]. A reload builds a complete
//! new snapshot off to the side and publishes it with a single pointer swap,
//! so readers holding an `Arc<Snapshot>` never see a half-built catalog.

mod error;
mod material;
mod matcher;
mod part;
mod record;
mod snapshot;

pub use error::{DataIntegrityError, EncodeError, LoadError, ReloadError};
pub use material::{MaterialDefinition, MaterialRecord, RepairValues};
pub use matcher::ItemMatcher;
pub use part::{PartDefinition, PartRecord};
pub use record::{RawRecord, RecordKind};
pub use snapshot::Snapshot;

use crate::config::GearConstants;
use crate::types::{DefinitionId, ItemPayload, PartType};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// A part or material looked up from a snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Part(Arc<PartDefinition>),
    Material(Arc<MaterialDefinition>),
}

impl Definition {
    pub fn id(&self) -> &DefinitionId {
        match self {
            Definition::Part(p) => &p.id,
            Definition::Material(m) => &m.id,
        }
    }

    pub fn as_part(&self) -> Option<&Arc<PartDefinition>> {
        match self {
            Definition::Part(p) => Some(p),
            Definition::Material(_) => None,
        }
    }

    pub fn as_material(&self) -> Option<&Arc<MaterialDefinition>> {
        match self {
            Definition::Material(m) => Some(m),
            Definition::Part(_) => None,
        }
    }
}

/// Outcome of one load: how many definitions made it, and why the rest did not
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub loaded: usize,
    /// (record id, reason), in batch order
    pub errors: Vec<(String, LoadError)>,
    /// Epoch of the published snapshot
    pub epoch: Option<u64>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_for(&self, id: &str) -> Option<&LoadError> {
        self.errors.iter().find(|(e, _)| e == id).map(|(_, e)| e)
    }
}

#[derive(Debug, Clone)]
struct CachedMatch {
    generation: u64,
    found: Option<Definition>,
}

/// Owner of the current snapshot
pub struct Registry {
    current: RwLock<Arc<Snapshot>>,
    reload_lock: Mutex<()>,
    epoch: AtomicU64,
    constants: Arc<GearConstants>,
    match_cache: Mutex<HashMap<ItemPayload, CachedMatch>>,
}

impl Registry {
    /// Empty registry (built-in stats only, epoch 0)
    pub fn new(constants: GearConstants) -> Self {
        let constants = Arc::new(constants);
        Registry {
            current: RwLock::new(Arc::new(Snapshot::empty(Arc::clone(&constants)))),
            reload_lock: Mutex::new(()),
            epoch: AtomicU64::new(0),
            constants,
            match_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn constants(&self) -> &GearConstants {
        &self.constants
    }

    /// Epoch of the current snapshot
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// The current snapshot; hold on to it for several consistent lookups
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    /// Replace the whole catalog with one batch of records.
    ///
    /// Per-record failures are collected in the report. The previous snapshot
    /// stays current when the batch is empty or nothing in it loaded.
    pub fn load(&self, records: &[RawRecord]) -> Result<LoadReport, ReloadError> {
        if records.is_empty() {
            error!("reload rejected: empty batch");
            return Err(ReloadError::Empty);
        }

        let _guard = self.reload_lock.lock();
        let epoch = self.epoch.load(Ordering::Acquire) + 1;
        let (snapshot, mut report) =
            Snapshot::build(epoch, Arc::clone(&self.constants), records);

        if report.loaded == 0 {
            error!(
                errors = report.errors.len(),
                "reload rejected: no definition loaded"
            );
            return Err(ReloadError::NothingLoaded { report });
        }

        info!(
            epoch,
            stats = snapshot.stats().len(),
            traits = snapshot.traits().count(),
            materials = snapshot.materials().count(),
            parts = snapshot.parts().count(),
            rejected = report.errors.len(),
            "published registry snapshot"
        );

        report.epoch = Some(epoch);
        *self.current.write() = Arc::new(snapshot);
        self.epoch.store(epoch, Ordering::Release);
        self.match_cache.lock().clear();
        Ok(report)
    }

    /// Flat record list of the current snapshot, as a JSON byte stream
    pub fn encode_snapshot(&self) -> Result<Vec<u8>, EncodeError> {
        let records = self.snapshot().to_records()?;
        Ok(serde_json::to_vec(&records)?)
    }

    /// Decode a stream produced by [`Registry::encode_snapshot`] and load it
    pub fn load_encoded(&self, bytes: &[u8]) -> Result<LoadReport, ReloadError> {
        let records: Vec<RawRecord> = serde_json::from_slice(bytes)?;
        self.load(&records)
    }

    pub fn get(&self, id: &DefinitionId) -> Option<Definition> {
        self.snapshot().get(id)
    }

    pub fn fallback(&self, slot: PartType) -> Option<Definition> {
        self.snapshot().fallback(slot)
    }

    /// Resolve an item against the current snapshot, through the cache
    pub fn match_item(&self, payload: &ItemPayload) -> Option<Definition> {
        let snapshot = self.snapshot();
        self.match_in(&snapshot, payload)
    }

    /// Resolve an item against a specific snapshot, through the cache.
    ///
    /// Entries are keyed by the whole payload (id and tags) and carry the
    /// generation of the snapshot they were computed against; an entry from
    /// any other snapshot is treated as a miss.
    pub fn match_in(&self, snapshot: &Snapshot, payload: &ItemPayload) -> Option<Definition> {
        let generation = snapshot.generation();
        if let Some(hit) = self.match_cache.lock().get(payload) {
            if hit.generation == generation {
                return hit.found.clone();
            }
        }

        debug!(item = %payload.item, epoch = snapshot.epoch(), "match cache miss");
        let found = snapshot.match_item(payload);

        let mut cache = self.match_cache.lock();
        let stale = cache
            .get(payload)
            .map_or(true, |cached| cached.generation <= generation);
        if stale {
            cache.insert(
                payload.clone(),
                CachedMatch {
                    generation,
                    found: found.clone(),
                },
            );
        }
        found
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new(GearConstants::default())
    }
}
