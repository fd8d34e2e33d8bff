//! Stat aggregation over an assembly
//!
//! Every modifier reachable from the assembly is collected in arena-walk
//! order, scaled by the grade of the reference that contributed it, then
//! routed through [`StatValue`] and clamped by the catalog entry.

use super::{StatDefinition, StatId, StatOp, StatValue, SynergyFormula};
use crate::assembly::{Assembly, NodeId, Reference};
use crate::gear::excluded_stats;
use crate::registry::Snapshot;
use crate::types::{DefinitionId, GearType, Grade, PartType};
use serde::Serialize;

/// Result of a stat query. `Locked` means the assembly is incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatResult {
    Value(f64),
    Locked,
}

impl StatResult {
    pub fn value(self) -> Option<f64> {
        match self {
            StatResult::Value(v) => Some(v),
            StatResult::Locked => None,
        }
    }

    pub fn is_locked(self) -> bool {
        self == StatResult::Locked
    }

    /// Number shown to the player; locked reads as 0
    pub fn display_value(self) -> f64 {
        self.value().unwrap_or(0.0)
    }
}

/// One collected modifier after grade scaling
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModifierSample {
    /// Part or material that declared the modifier
    pub source: DefinitionId,
    pub stat: StatId,
    pub op: StatOp,
    pub grade: Grade,
    /// Declared magnitude × grade multiplier
    pub magnitude: f64,
}

/// Every modifier an assembly contributes, in collection order
#[derive(Debug, Clone, Default)]
pub struct StatAccumulator {
    samples: Vec<ModifierSample>,
}

impl StatAccumulator {
    /// Walk the arena and collect modifiers. Unknown ids contribute nothing.
    pub fn collect(snapshot: &Snapshot, assembly: &Assembly) -> Self {
        let mut acc = StatAccumulator::default();

        for visit in assembly.walk() {
            match &visit.node.reference {
                Reference::Part(r) => {
                    if let Some(part) = snapshot.part(&r.part) {
                        let scale = snapshot.grade_multiplier(r.grade);
                        for m in &part.stats {
                            acc.push(&part.id, m.stat.clone(), m.op, r.grade, m.value * scale);
                        }
                    }
                }
                Reference::Material(r) => {
                    let slot = visit
                        .owner
                        .and_then(|owner| snapshot.part(&owner.part))
                        .map(|p| p.slot);
                    let (Some(slot), Some(material)) = (slot, snapshot.material(&r.material))
                    else {
                        continue;
                    };
                    let scale = snapshot.grade_multiplier(r.grade);
                    for m in material.stats_for(slot) {
                        acc.push(&material.id, m.stat.clone(), m.op, r.grade, m.value * scale);
                    }
                }
            }
        }

        acc
    }

    fn push(&mut self, source: &DefinitionId, stat: StatId, op: StatOp, grade: Grade, magnitude: f64) {
        self.samples.push(ModifierSample {
            source: source.clone(),
            stat,
            op,
            grade,
            magnitude,
        });
    }

    pub fn samples(&self) -> &[ModifierSample] {
        &self.samples
    }

    pub fn samples_for<'a>(&'a self, stat: &'a StatId) -> impl Iterator<Item = &'a ModifierSample> {
        self.samples.iter().filter(move |s| s.stat == *stat)
    }

    /// Route this stat's samples into a pipeline seeded with the catalog base
    pub fn value_for(&self, def: &StatDefinition) -> StatValue {
        let mut value = StatValue::with_base(def.base);
        for sample in self.samples_for(&def.id) {
            value.push(sample.op, sample.magnitude);
        }
        value
    }

    /// Final, clamped value of one stat
    pub fn compute(&self, def: &StatDefinition) -> f64 {
        def.clamp(self.value_for(def).compute())
    }
}

/// Values of every stat relevant to a gear type, in catalog order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatMap {
    locked: bool,
    entries: Vec<(StatId, StatResult)>,
}

impl StatMap {
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Locked for unknown stats as well as for a locked map
    pub fn get(&self, stat: &StatId) -> StatResult {
        self.entries
            .iter()
            .find(|(id, _)| id == stat)
            .map(|(_, r)| *r)
            .unwrap_or(StatResult::Locked)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StatId, StatResult)> {
        self.entries.iter().map(|(id, r)| (id, *r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Inspection view of one stat: where each modifier came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatBreakdown {
    pub stat: StatId,
    pub base: f64,
    pub samples: Vec<ModifierSample>,
    pub additive: f64,
    pub multiply_base: f64,
    pub average: Option<f64>,
    pub result: StatResult,
}

/// Compute one stat; `Locked` when the assembly is invalid or the stat unknown
pub fn aggregate(
    snapshot: &Snapshot,
    assembly: &Assembly,
    gear_type: GearType,
    stat: &StatId,
) -> StatResult {
    if !assembly.validate(snapshot, gear_type).is_ok() {
        return StatResult::Locked;
    }
    let Some(def) = snapshot.stats().get(stat) else {
        return StatResult::Locked;
    };
    StatResult::Value(StatAccumulator::collect(snapshot, assembly).compute(def))
}

/// Compute every catalog stat the gear type does not exclude
pub fn aggregate_all(snapshot: &Snapshot, assembly: &Assembly, gear_type: GearType) -> StatMap {
    let excluded = excluded_stats(gear_type);
    let stats = snapshot
        .stats()
        .iter()
        .filter(|def| !excluded.contains(&def.id.as_str()));

    if !assembly.validate(snapshot, gear_type).is_ok() {
        return StatMap {
            locked: true,
            entries: stats.map(|def| (def.id.clone(), StatResult::Locked)).collect(),
        };
    }

    let acc = StatAccumulator::collect(snapshot, assembly);
    StatMap {
        locked: false,
        entries: stats
            .map(|def| (def.id.clone(), StatResult::Value(acc.compute(def))))
            .collect(),
    }
}

/// Per-modifier view of one stat; `None` for a stat the catalog does not know
pub fn breakdown(
    snapshot: &Snapshot,
    assembly: &Assembly,
    gear_type: GearType,
    stat: &StatId,
) -> Option<StatBreakdown> {
    let def = snapshot.stats().get(stat)?;
    let acc = StatAccumulator::collect(snapshot, assembly);
    let value = acc.value_for(def);
    let result = if assembly.validate(snapshot, gear_type).is_ok() {
        StatResult::Value(def.clamp(value.compute()))
    } else {
        StatResult::Locked
    };

    Some(StatBreakdown {
        stat: def.id.clone(),
        base: def.base,
        samples: acc.samples_for(stat).cloned().collect(),
        additive: value.total_additive(),
        multiply_base: value.total_multiply_base(),
        average: value.average_mean(),
        result,
    })
}

/// Tier a root node brings to the synergy calculation.
///
/// A plain part has its declared tier; a compound part takes the tier of its
/// first material. Unknown ids have no tier.
pub fn tier_of_root(snapshot: &Snapshot, assembly: &Assembly, root: NodeId) -> Option<u32> {
    let Reference::Part(r) = &assembly.node(root)?.reference else {
        return None;
    };
    let part = snapshot.part(&r.part)?;
    if !part.compound {
        return Some(part.tier);
    }
    let first = assembly.materials_of(root).next()?;
    snapshot.material(&first.material).map(|m| m.tier)
}

/// Synergy of a valid assembly; 1.0 for invalid ones
pub fn synergy(
    snapshot: &Snapshot,
    assembly: &Assembly,
    gear_type: GearType,
    formula: &dyn SynergyFormula,
) -> f64 {
    if !assembly.validate(snapshot, gear_type).is_ok() {
        return 1.0;
    }

    let mut main_tier = None;
    let mut others = Vec::new();
    for (node, r) in assembly.root_parts() {
        let is_main = snapshot
            .part(&r.part)
            .is_some_and(|p| p.slot == PartType::Main);
        match (is_main, tier_of_root(snapshot, assembly, node)) {
            (true, tier) => main_tier = main_tier.or(tier),
            (false, Some(tier)) => others.push(tier),
            (false, None) => {}
        }
    }
    formula.synergy(main_tier, &others)
}
