//! MaterialDefinition - per-slot stats and traits a raw ingredient lends a part

use super::{ItemMatcher, LoadError, PartDefinition};
use crate::config::GearConstants;
use crate::repair::RepairMode;
use crate::stat::{ids, StatCatalog, StatModifier, StatOp};
use crate::traits::TraitInstance;
use crate::types::{DefinitionId, GearType, Grade, PartType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Declared repair amounts; an unset mode is derived from the MAIN durability
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anvil: Option<f64>,
}

impl RepairValues {
    pub fn for_mode(&self, mode: RepairMode) -> Option<f64> {
        match mode {
            RepairMode::Quick => self.quick,
            RepairMode::Anvil => self.anvil,
        }
    }

    fn or(self, parent: RepairValues) -> RepairValues {
        RepairValues {
            quick: self.quick.or(parent.quick),
            anvil: self.anvil.or(parent.anvil),
        }
    }
}

/// Serialized form of a material. Every field is optional so a child only
/// states what differs from its parent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredient: Option<ItemMatcher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gear_blacklist: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repair: Option<RepairValues>,
    /// Modifiers keyed by slot name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stats: BTreeMap<String, Vec<StatModifier>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub traits: BTreeMap<String, Vec<TraitInstance>>,
}

impl MaterialRecord {
    /// Fill unset fields from an already-resolved parent.
    ///
    /// Stats and traits merge per slot: a slot the child declares replaces
    /// the parent's entries with the same stat (or trait id), the rest carry over.
    pub fn inherit(self, parent: &MaterialRecord) -> MaterialRecord {
        let mut stats = parent.stats.clone();
        for (slot, mods) in self.stats {
            let merged = stats.entry(slot).or_default();
            for modifier in mods {
                merged.retain(|m| m.stat != modifier.stat || m.op != modifier.op);
                merged.push(modifier);
            }
        }

        let mut traits = parent.traits.clone();
        for (slot, insts) in self.traits {
            let merged = traits.entry(slot).or_default();
            for inst in insts {
                merged.retain(|t| t.id != inst.id);
                merged.push(inst);
            }
        }

        let repair = match (self.repair, parent.repair) {
            (Some(own), Some(inherited)) => Some(own.or(inherited)),
            (own, inherited) => own.or(inherited),
        };

        MaterialRecord {
            parent: None,
            tier: self.tier.or(parent.tier),
            name: self.name.or_else(|| parent.name.clone()),
            ingredient: self.ingredient.or_else(|| parent.ingredient.clone()),
            visible: self.visible.or(parent.visible),
            gear_blacklist: self
                .gear_blacklist
                .or_else(|| parent.gear_blacklist.clone()),
            repair,
            stats,
            traits,
        }
    }
}

/// Loaded material, fully flattened (no parent reference survives loading)
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDefinition {
    pub id: DefinitionId,
    pub tier: u32,
    pub name: Option<String>,
    pub ingredient: ItemMatcher,
    pub visible: bool,
    /// Gear types (or groups, or "all") this material may not be used in
    pub gear_blacklist: Vec<String>,
    pub repair: RepairValues,
    pub stats: HashMap<PartType, Vec<StatModifier>>,
    pub traits: HashMap<PartType, Vec<TraitInstance>>,
}

impl MaterialDefinition {
    pub fn new(id: DefinitionId, tier: u32) -> Self {
        MaterialDefinition {
            id,
            tier,
            name: None,
            ingredient: ItemMatcher::default(),
            visible: true,
            gear_blacklist: Vec::new(),
            repair: RepairValues::default(),
            stats: HashMap::new(),
            traits: HashMap::new(),
        }
    }

    /// Build from a record whose parent chain has already been merged in
    pub fn from_record(
        id: DefinitionId,
        record: MaterialRecord,
        catalog: &StatCatalog,
        has_trait: impl Fn(&DefinitionId) -> bool,
    ) -> Result<Self, LoadError> {
        let mut stats = HashMap::new();
        for (slot, mods) in record.stats {
            let slot = parse_slot(&slot)?;
            for modifier in &mods {
                catalog.validate(modifier)?;
            }
            stats.insert(slot, mods);
        }

        let mut traits = HashMap::new();
        for (slot, insts) in record.traits {
            let slot = parse_slot(&slot)?;
            for inst in &insts {
                inst.validate(&has_trait)?;
            }
            traits.insert(slot, insts);
        }

        Ok(MaterialDefinition {
            id,
            tier: record.tier.unwrap_or(0),
            name: record.name,
            ingredient: record.ingredient.unwrap_or_default(),
            visible: record.visible.unwrap_or(true),
            gear_blacklist: record.gear_blacklist.unwrap_or_default(),
            repair: record.repair.unwrap_or_default(),
            stats,
            traits,
        })
    }

    /// Flattened record; slots come out sorted so the encoding is stable
    pub fn to_record(&self) -> MaterialRecord {
        MaterialRecord {
            parent: None,
            tier: Some(self.tier),
            name: self.name.clone(),
            ingredient: (!self.ingredient.is_empty()).then(|| self.ingredient.clone()),
            visible: Some(self.visible),
            gear_blacklist: (!self.gear_blacklist.is_empty())
                .then(|| self.gear_blacklist.clone()),
            repair: (self.repair != RepairValues::default()).then_some(self.repair),
            stats: self
                .stats
                .iter()
                .map(|(slot, mods)| (slot.name().to_string(), mods.clone()))
                .collect(),
            traits: self
                .traits
                .iter()
                .map(|(slot, insts)| (slot.name().to_string(), insts.clone()))
                .collect(),
        }
    }

    pub fn with_stats(mut self, slot: PartType, stats: Vec<StatModifier>) -> Self {
        self.stats.insert(slot, stats);
        self
    }

    pub fn with_traits(mut self, slot: PartType, traits: Vec<TraitInstance>) -> Self {
        self.traits.insert(slot, traits);
        self
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.id.path().replace('_', " "))
    }

    /// A material supports a slot when it declares stats for it
    pub fn supports(&self, slot: PartType) -> bool {
        self.stats.contains_key(&slot)
    }

    pub fn stats_for(&self, slot: PartType) -> &[StatModifier] {
        self.stats.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn traits_for(&self, slot: PartType) -> &[TraitInstance] {
        self.traits.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_blacklisted(&self, gear_type: GearType) -> bool {
        self.gear_blacklist.iter().any(|name| gear_type.matches(name))
    }

    /// Whether this material may fill a compound part on the given gear
    pub fn can_fill(&self, part: &PartDefinition, gear_type: GearType) -> bool {
        self.supports(part.slot)
            && self.tier >= part.min_material_tier
            && !self.is_blacklisted(gear_type)
    }

    /// Durability points one unit of this material restores
    pub fn repair_amount(&self, mode: RepairMode, grade: Grade, constants: &GearConstants) -> f64 {
        let base = self.repair.for_mode(mode).unwrap_or_else(|| {
            let factor = match mode {
                RepairMode::Quick => constants.repair.quick_factor,
                RepairMode::Anvil => constants.repair.anvil_factor,
            };
            self.main_durability() * factor
        });
        base * constants.grades.multiplier(grade)
    }

    fn main_durability(&self) -> f64 {
        self.stats_for(PartType::Main)
            .iter()
            .filter(|m| m.stat.as_str() == ids::DURABILITY)
            .find(|m| matches!(m.op, StatOp::Average | StatOp::Add))
            .map(|m| m.value)
            .unwrap_or(0.0)
    }
}

fn parse_slot(name: &str) -> Result<PartType, LoadError> {
    name.parse().map_err(LoadError::Invalid)
}
