//! Snapshot - one immutable, fully validated generation of the registry

use super::{
    Definition, LoadError, LoadReport, MaterialDefinition, MaterialRecord, PartDefinition,
    PartRecord, RawRecord, RecordKind,
};
use crate::config::GearConstants;
use crate::stat::{StatCatalog, StatDefinition, StatId};
use crate::traits::TraitDefinition;
use crate::types::{DefinitionId, Grade, ItemPayload, PartType};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Shared by every registry in the process, so no two snapshots share a generation
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Every definition of one load, never mutated after publication
#[derive(Debug, Clone)]
pub struct Snapshot {
    epoch: u64,
    generation: u64,
    constants: Arc<GearConstants>,
    stats: StatCatalog,
    traits: HashMap<DefinitionId, TraitDefinition>,
    trait_order: Vec<DefinitionId>,
    parts: Vec<Arc<PartDefinition>>,
    part_index: HashMap<DefinitionId, usize>,
    materials: Vec<Arc<MaterialDefinition>>,
    material_index: HashMap<DefinitionId, usize>,
}

impl Snapshot {
    /// Snapshot with the built-in stats and nothing else
    pub fn empty(constants: Arc<GearConstants>) -> Self {
        Snapshot {
            epoch: 0,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            constants,
            stats: StatCatalog::builtin(),
            traits: HashMap::new(),
            trait_order: Vec::new(),
            parts: Vec::new(),
            part_index: HashMap::new(),
            materials: Vec::new(),
            material_index: HashMap::new(),
        }
    }

    /// Build a snapshot from one batch. Rejected records end up in the report.
    pub(crate) fn build(
        epoch: u64,
        constants: Arc<GearConstants>,
        records: &[RawRecord],
    ) -> (Snapshot, LoadReport) {
        let mut snapshot = Snapshot::empty(constants);
        snapshot.epoch = epoch;
        let mut report = LoadReport::default();

        let duplicates = find_duplicates(records);
        let mut reported = HashSet::new();
        let mut accepted: Vec<&RawRecord> = Vec::with_capacity(records.len());
        for record in records {
            match duplicates.get(&(record.kind, record.id.as_str())) {
                Some(&occurrences) => {
                    if reported.insert((record.kind, record.id.as_str())) {
                        report.reject(record, LoadError::Duplicate { occurrences });
                    }
                }
                None => accepted.push(record),
            }
        }

        for record in of_kind(&accepted, RecordKind::Stat) {
            match load_stat(record) {
                Ok(def) => {
                    snapshot.stats.insert(def);
                    report.loaded += 1;
                }
                Err(e) => report.reject(record, e),
            }
        }

        for record in of_kind(&accepted, RecordKind::Trait) {
            match load_trait(record) {
                Ok(def) => {
                    snapshot.trait_order.push(def.id.clone());
                    snapshot.traits.insert(def.id.clone(), def);
                    report.loaded += 1;
                }
                Err(e) => report.reject(record, e),
            }
        }

        // Materials: decode everything first so parents can be found in any order
        let mut raw_materials = HashMap::new();
        let mut material_order = Vec::new();
        for record in of_kind(&accepted, RecordKind::Material) {
            let decoded = DefinitionId::parse(&record.id)
                .map_err(LoadError::from)
                .and_then(|id| record.decode::<MaterialRecord>().map(|m| (id, m)));
            match decoded {
                Ok((id, material)) => {
                    raw_materials.insert(id.clone(), material);
                    material_order.push((id, record));
                }
                Err(e) => report.reject(record, e),
            }
        }

        let mut resolved = resolve_parents(&material_order, &raw_materials);
        for (id, record) in &material_order {
            let loaded = resolved
                .remove(id)
                .unwrap_or_else(|| Err(LoadError::MissingParent(id.to_string())))
                .and_then(|merged| {
                    MaterialDefinition::from_record(id.clone(), merged, &snapshot.stats, |t| {
                        snapshot.traits.contains_key(t)
                    })
                });
            match loaded {
                Ok(def) => {
                    snapshot
                        .material_index
                        .insert(def.id.clone(), snapshot.materials.len());
                    snapshot.materials.push(Arc::new(def));
                    report.loaded += 1;
                }
                Err(e) => report.reject(record, e),
            }
        }

        for record in of_kind(&accepted, RecordKind::Part) {
            let loaded = DefinitionId::parse(&record.id)
                .map_err(LoadError::from)
                .and_then(|id| record.decode::<PartRecord>().map(|p| (id, p)))
                .and_then(|(id, part)| {
                    PartDefinition::from_record(id, part, &snapshot.stats, |t| {
                        snapshot.traits.contains_key(t)
                    })
                });
            match loaded {
                Ok(def) => {
                    snapshot.part_index.insert(def.id.clone(), snapshot.parts.len());
                    snapshot.parts.push(Arc::new(def));
                    report.loaded += 1;
                }
                Err(e) => report.reject(record, e),
            }
        }

        (snapshot, report)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Process-wide identity of this snapshot; grows with every snapshot built.
    ///
    /// Epochs count per registry, so caches that may see snapshots from
    /// several registries key on this instead.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn constants(&self) -> &GearConstants {
        &self.constants
    }

    pub fn stats(&self) -> &StatCatalog {
        &self.stats
    }

    pub fn trait_def(&self, id: &DefinitionId) -> Option<&TraitDefinition> {
        self.traits.get(id)
    }

    /// Trait definitions in load order
    pub fn traits(&self) -> impl Iterator<Item = &TraitDefinition> {
        self.trait_order.iter().filter_map(|id| self.traits.get(id))
    }

    pub fn part(&self, id: &DefinitionId) -> Option<&Arc<PartDefinition>> {
        self.part_index.get(id).and_then(|&i| self.parts.get(i))
    }

    pub fn material(&self, id: &DefinitionId) -> Option<&Arc<MaterialDefinition>> {
        self.material_index.get(id).and_then(|&i| self.materials.get(i))
    }

    pub fn parts(&self) -> impl Iterator<Item = &Arc<PartDefinition>> {
        self.parts.iter()
    }

    pub fn materials(&self) -> impl Iterator<Item = &Arc<MaterialDefinition>> {
        self.materials.iter()
    }

    /// Look up a part or material; parts win when both share an id
    pub fn get(&self, id: &DefinitionId) -> Option<Definition> {
        self.part(id)
            .map(|p| Definition::Part(Arc::clone(p)))
            .or_else(|| self.material(id).map(|m| Definition::Material(Arc::clone(m))))
    }

    /// Uncached matcher scan: parts first, then materials, each in load order
    pub fn match_item(&self, payload: &ItemPayload) -> Option<Definition> {
        self.parts
            .iter()
            .find(|p| p.matcher.matches(payload))
            .map(|p| Definition::Part(Arc::clone(p)))
            .or_else(|| {
                self.materials
                    .iter()
                    .find(|m| m.ingredient.matches(payload))
                    .map(|m| Definition::Material(Arc::clone(m)))
            })
    }

    /// Configured default part for MAIN, ROD or BOWSTRING
    pub fn fallback(&self, slot: PartType) -> Option<Definition> {
        let id = self.constants.fallbacks.for_slot(slot)?;
        let id = DefinitionId::parse(id).ok()?;
        self.part(&id).map(|p| Definition::Part(Arc::clone(p)))
    }

    /// Every part definition filling a slot, in load order
    pub fn parts_of_type(&self, slot: PartType) -> impl Iterator<Item = &Arc<PartDefinition>> {
        self.parts.iter().filter(move |p| p.slot == slot)
    }

    pub fn grade_multiplier(&self, grade: Grade) -> f64 {
        self.constants.grades.multiplier(grade)
    }

    /// Every definition as a flat raw record, in an order `build` accepts
    pub fn to_records(&self) -> Result<Vec<RawRecord>, toml::ser::Error> {
        let mut records = Vec::new();
        for def in self.stats.iter() {
            records.push(RawRecord::encode(RecordKind::Stat, def.id.as_str(), def)?);
        }
        for def in self.traits() {
            records.push(RawRecord::encode(RecordKind::Trait, def.id.to_string(), def)?);
        }
        for def in &self.materials {
            records.push(RawRecord::encode(
                RecordKind::Material,
                def.id.to_string(),
                &def.to_record(),
            )?);
        }
        for def in &self.parts {
            records.push(RawRecord::encode(
                RecordKind::Part,
                def.id.to_string(),
                &def.to_record(),
            )?);
        }
        Ok(records)
    }
}

fn of_kind<'a>(
    records: &'a [&'a RawRecord],
    kind: RecordKind,
) -> impl Iterator<Item = &'a RawRecord> + 'a {
    records.iter().copied().filter(move |r| r.kind == kind)
}

fn find_duplicates(records: &[RawRecord]) -> HashMap<(RecordKind, &str), usize> {
    let mut counts: HashMap<(RecordKind, &str), usize> = HashMap::new();
    for record in records {
        *counts.entry((record.kind, record.id.as_str())).or_default() += 1;
    }
    counts.retain(|_, n| *n > 1);
    counts
}

fn load_stat(record: &RawRecord) -> Result<StatDefinition, LoadError> {
    if record.id.is_empty() {
        return Err(LoadError::Invalid("empty stat id".to_string()));
    }
    let mut def: StatDefinition = record.decode()?;
    def.id = StatId::from(record.id.as_str());
    if !(def.base.is_finite() && def.min.is_finite() && def.max.is_finite()) {
        return Err(LoadError::Invalid(format!(
            "base {}, min {} and max {} must be finite",
            def.base, def.min, def.max
        )));
    }
    if def.min > def.max {
        return Err(LoadError::Invalid(format!(
            "min {} is above max {}",
            def.min, def.max
        )));
    }
    Ok(def)
}

fn load_trait(record: &RawRecord) -> Result<TraitDefinition, LoadError> {
    let id = DefinitionId::parse(&record.id)?;
    let mut def: TraitDefinition = record.decode()?;
    def.id = id;
    if def.max_level == 0 {
        return Err(LoadError::Invalid("max_level must be at least 1".to_string()));
    }
    Ok(def)
}

enum Ancestor {
    Root,
    Resolved(MaterialRecord),
    Broken,
}

/// Flatten parent chains. Materials on a cycle get `ParentCycle`, materials whose
/// chain hits a missing or broken parent get `MissingParent`.
fn resolve_parents(
    order: &[(DefinitionId, &RawRecord)],
    raw: &HashMap<DefinitionId, MaterialRecord>,
) -> HashMap<DefinitionId, Result<MaterialRecord, LoadError>> {
    let mut resolved: HashMap<DefinitionId, Result<MaterialRecord, LoadError>> = HashMap::new();

    for (id, _) in order {
        if resolved.contains_key(id) {
            continue;
        }

        let mut chain: Vec<DefinitionId> = Vec::new();
        let mut cursor = id.clone();
        let ancestor = loop {
            if let Some(done) = resolved.get(&cursor) {
                break match done {
                    Ok(record) => Ancestor::Resolved(record.clone()),
                    Err(_) => Ancestor::Broken,
                };
            }
            if let Some(start) = chain.iter().position(|c| *c == cursor) {
                for member in chain.drain(start..) {
                    resolved.insert(member, Err(LoadError::ParentCycle));
                }
                break Ancestor::Broken;
            }
            let Some(record) = raw.get(&cursor) else {
                break Ancestor::Broken;
            };
            chain.push(cursor.clone());
            match record.parent.as_deref().map(DefinitionId::parse) {
                None => break Ancestor::Root,
                Some(Ok(parent)) => cursor = parent,
                Some(Err(_)) => break Ancestor::Broken,
            }
        };

        let mut current = match ancestor {
            Ancestor::Root => None,
            Ancestor::Resolved(record) => Some(record),
            Ancestor::Broken => {
                for member in chain {
                    let parent = raw
                        .get(&member)
                        .and_then(|r| r.parent.clone())
                        .unwrap_or_default();
                    resolved.insert(member, Err(LoadError::MissingParent(parent)));
                }
                continue;
            }
        };

        for member in chain.into_iter().rev() {
            let Some(own) = raw.get(&member).cloned() else {
                continue;
            };
            let merged = match &current {
                Some(parent) => own.inherit(parent),
                None => MaterialRecord { parent: None, ..own },
            };
            resolved.insert(member, Ok(merged.clone()));
            current = Some(merged);
        }
    }

    resolved
}

impl LoadReport {
    fn reject(&mut self, record: &RawRecord, error: LoadError) {
        warn!(kind = %record.kind, id = %record.id, %error, "rejected definition");
        self.errors.push((record.id.clone(), error));
    }
}
