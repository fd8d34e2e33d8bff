//! PartDefinition - a slot-typed component gear is assembled from

use super::{ItemMatcher, LoadError};
use crate::stat::{StatCatalog, StatModifier};
use crate::traits::TraitInstance;
use crate::types::{DefinitionId, PartType};
use serde::{Deserialize, Serialize};

fn default_visible() -> bool {
    true
}

/// Serialized form of a part definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRecord {
    pub slot: PartType,
    #[serde(default)]
    pub tier: u32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Compound parts take their stats and traits from nested materials
    #[serde(default)]
    pub compound: bool,
    #[serde(default)]
    pub min_material_tier: u32,
    #[serde(default)]
    pub matcher: ItemMatcher,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stats: Vec<StatModifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<TraitInstance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Loaded, validated part definition (immutable once in a snapshot)
#[derive(Debug, Clone, PartialEq)]
pub struct PartDefinition {
    pub id: DefinitionId,
    pub slot: PartType,
    pub tier: u32,
    pub visible: bool,
    pub compound: bool,
    /// Lowest material tier a compound part accepts
    pub min_material_tier: u32,
    pub matcher: ItemMatcher,
    pub stats: Vec<StatModifier>,
    pub traits: Vec<TraitInstance>,
    pub name: Option<String>,
}

impl PartDefinition {
    /// Create a bare part for a slot
    pub fn new(id: DefinitionId, slot: PartType) -> Self {
        PartDefinition {
            id,
            slot,
            tier: 0,
            visible: true,
            compound: false,
            min_material_tier: 0,
            matcher: ItemMatcher::default(),
            stats: Vec::new(),
            traits: Vec::new(),
            name: None,
        }
    }

    /// Validate a record against the catalogs
    pub fn from_record(
        id: DefinitionId,
        record: PartRecord,
        stats: &StatCatalog,
        has_trait: impl Fn(&DefinitionId) -> bool,
    ) -> Result<Self, LoadError> {
        for modifier in &record.stats {
            stats.validate(modifier)?;
        }
        for inst in &record.traits {
            inst.validate(&has_trait)?;
        }

        Ok(PartDefinition {
            id,
            slot: record.slot,
            tier: record.tier,
            visible: record.visible,
            compound: record.compound,
            min_material_tier: record.min_material_tier,
            matcher: record.matcher,
            stats: record.stats,
            traits: record.traits,
            name: record.name,
        })
    }

    pub fn to_record(&self) -> PartRecord {
        PartRecord {
            slot: self.slot,
            tier: self.tier,
            visible: self.visible,
            compound: self.compound,
            min_material_tier: self.min_material_tier,
            matcher: self.matcher.clone(),
            stats: self.stats.clone(),
            traits: self.traits.clone(),
            name: self.name.clone(),
        }
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.id.path().replace('_', " "))
    }
}
