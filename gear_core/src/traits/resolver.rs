//! Trait resolution - one effective level per trait for an assembly

use super::{TraitContext, TraitInstance};
use crate::assembly::{Assembly, Reference};
use crate::registry::Snapshot;
use crate::types::{DefinitionId, Grade};
use serde::Serialize;
use std::collections::HashMap;

/// A trait as it applies to a finished gear
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraitLevel {
    pub id: DefinitionId,
    pub level: u32,
    pub visible: bool,
    pub name: String,
}

/// Ordered effective traits of one assembly
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EffectiveTraits {
    locked: bool,
    traits: Vec<TraitLevel>,
}

impl EffectiveTraits {
    /// Result for an invalid assembly: no traits, flagged locked
    pub fn locked() -> Self {
        EffectiveTraits {
            locked: true,
            traits: Vec::new(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraitLevel> {
        self.traits.iter()
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// Effective level of a trait, 0 when absent
    pub fn level(&self, id: &DefinitionId) -> u32 {
        self.traits
            .iter()
            .find(|t| t.id == *id)
            .map_or(0, |t| t.level)
    }

    /// Traits shown in tooltips, in resolution order
    pub fn visible(&self) -> Vec<&TraitLevel> {
        self.traits.iter().filter(|t| t.visible).collect()
    }

    /// Round-robin position for a tooltip that shows one trait at a time
    pub fn display_index(&self, ticks: u64, rotation_ticks: u64) -> Option<usize> {
        let count = self.traits.iter().filter(|t| t.visible).count();
        if count == 0 {
            return None;
        }
        Some(((ticks / rotation_ticks.max(1)) % count as u64) as usize)
    }

    /// The visible trait at the current round-robin position
    pub fn displayed(&self, ticks: u64, rotation_ticks: u64) -> Option<&TraitLevel> {
        let index = self.display_index(ticks, rotation_ticks)?;
        self.visible().get(index).copied()
    }
}

/// Merge every part and material trait into effective levels.
///
/// Levels of the same trait are summed and clamped to its `max_level`. An
/// instance whose conditions fail contributes nothing, and a trait left at
/// level 0 is dropped. Plain parts and material layers are the "sources"
/// a `material_ratio` condition counts.
pub fn effective_traits(
    snapshot: &Snapshot,
    assembly: &Assembly,
    ctx: &TraitContext,
) -> EffectiveTraits {
    if !assembly.validate(snapshot, ctx.gear_type).is_ok() {
        return EffectiveTraits::locked();
    }

    let mut contributions: Vec<&TraitInstance> = Vec::new();
    let mut sources = 0usize;
    let mut carriers: HashMap<&DefinitionId, usize> = HashMap::new();

    for visit in assembly.walk() {
        let (instances, grade, is_source): (&[TraitInstance], Grade, bool) =
            match &visit.node.reference {
                Reference::Part(r) => match snapshot.part(&r.part) {
                    Some(part) => (part.traits.as_slice(), r.grade, !part.compound),
                    None => continue,
                },
                Reference::Material(r) => {
                    let slot = visit
                        .owner
                        .and_then(|owner| snapshot.part(&owner.part))
                        .map(|p| p.slot);
                    match (slot, snapshot.material(&r.material)) {
                        (Some(slot), Some(material)) => (material.traits_for(slot), r.grade, true),
                        _ => continue,
                    }
                }
            };

        let unlocked: Vec<&TraitInstance> =
            instances.iter().filter(|i| i.unlocked_at(grade)).collect();
        if is_source {
            sources += 1;
            let mut seen: Vec<&DefinitionId> = Vec::new();
            for inst in unlocked.iter().copied() {
                if !seen.contains(&&inst.id) {
                    seen.push(&inst.id);
                    *carriers.entry(&inst.id).or_default() += 1;
                }
            }
        }
        contributions.extend(unlocked);
    }

    let mut order: Vec<&DefinitionId> = Vec::new();
    let mut levels: HashMap<&DefinitionId, u32> = HashMap::new();
    for instance in contributions {
        let id = &instance.id;
        let ratio = if sources == 0 {
            0.0
        } else {
            carriers.get(id).copied().unwrap_or(0) as f64 / sources as f64
        };
        if !instance.conditions.iter().all(|cond| cond.matches(ctx, ratio)) {
            continue;
        }
        if !levels.contains_key(id) {
            order.push(id);
        }
        *levels.entry(id).or_default() += instance.level;
    }

    let traits = order
        .into_iter()
        .filter_map(|id| {
            let def = snapshot.trait_def(id)?;
            let level = levels.get(id).copied().unwrap_or(0).min(def.max_level);
            (level > 0).then(|| TraitLevel {
                id: id.clone(),
                level,
                visible: def.visible,
                name: def.display_name(),
            })
        })
        .collect();

    EffectiveTraits {
        locked: false,
        traits,
    }
}
