//! Stats - catalog, modifiers and the aggregation pipeline

mod aggregator;
mod synergy;
mod value;

pub use aggregator::{
    aggregate, aggregate_all, breakdown, synergy, tier_of_root, ModifierSample, StatAccumulator,
    StatBreakdown, StatMap, StatResult,
};
pub use synergy::{SynergyFormula, TierVarianceSynergy};
pub use value::StatValue;

use crate::registry::DataIntegrityError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Built-in stat identifiers
pub mod ids {
    pub const DURABILITY: &str = "durability";
    pub const ARMOR_DURABILITY: &str = "armor_durability";
    pub const REPAIR_EFFICIENCY: &str = "repair_efficiency";
    pub const HARVEST_LEVEL: &str = "harvest_level";
    pub const HARVEST_SPEED: &str = "harvest_speed";
    pub const MELEE_DAMAGE: &str = "melee_damage";
    pub const MAGIC_DAMAGE: &str = "magic_damage";
    pub const ATTACK_SPEED: &str = "attack_speed";
    pub const RANGED_DAMAGE: &str = "ranged_damage";
    pub const RANGED_SPEED: &str = "ranged_speed";
    pub const ENCHANTABILITY: &str = "enchantability";
    pub const RARITY: &str = "rarity";
    pub const ARMOR: &str = "armor";
    pub const ARMOR_TOUGHNESS: &str = "armor_toughness";
    pub const MAGIC_ARMOR: &str = "magic_armor";
    pub const CHARGING_VALUE: &str = "charging_value";
}

/// Identifier of a stat in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatId(pub String);

impl StatId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StatId {
    fn from(s: &str) -> Self {
        StatId(s.to_string())
    }
}

impl From<String> for StatId {
    fn from(s: String) -> Self {
        StatId(s)
    }
}

impl fmt::Display for StatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a modifier combines into its stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatOp {
    /// Flat addition
    Add,
    /// Adds `stat base × magnitude`
    AddMultiplied,
    /// Compounds the running value by `1 + magnitude`, one modifier at a time
    MultiplyBase,
    /// Multiplies the post-multiply-base total by `1 + Σ magnitude`, once
    MultiplyTotal,
    /// Sample of an arithmetic mean, added after everything else
    Average,
}

impl StatOp {
    /// Get all operations in application order
    pub fn all() -> &'static [StatOp] {
        &[
            StatOp::Add,
            StatOp::AddMultiplied,
            StatOp::MultiplyBase,
            StatOp::MultiplyTotal,
            StatOp::Average,
        ]
    }

    /// Apply a single (already combined) magnitude of this operation to a value
    pub fn apply(self, base: f64, magnitude: f64) -> f64 {
        match self {
            StatOp::Add | StatOp::Average => base + magnitude,
            StatOp::AddMultiplied | StatOp::MultiplyBase | StatOp::MultiplyTotal => {
                base * (1.0 + magnitude)
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StatOp::Add => "add",
            StatOp::AddMultiplied => "add_multiplied",
            StatOp::MultiplyBase => "multiply_base",
            StatOp::MultiplyTotal => "multiply_total",
            StatOp::Average => "average",
        }
    }
}

impl fmt::Display for StatOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_op() -> StatOp {
    StatOp::Average
}

/// A single stat contribution declared by a part or material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat: StatId,
    pub value: f64,
    #[serde(default = "default_op")]
    pub op: StatOp,
}

impl StatModifier {
    pub fn new(stat: impl Into<StatId>, value: f64, op: StatOp) -> Self {
        StatModifier {
            stat: stat.into(),
            value,
            op,
        }
    }
}

fn default_min() -> f64 {
    0.0
}

fn default_max() -> f64 {
    1_000_000.0
}

fn default_ops() -> Vec<StatOp> {
    StatOp::all().to_vec()
}

/// Catalog entry describing one stat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatDefinition {
    pub id: StatId,
    /// Value the pipeline starts from
    #[serde(default)]
    pub base: f64,
    #[serde(default = "default_min")]
    pub min: f64,
    #[serde(default = "default_max")]
    pub max: f64,
    /// Operations modifiers of this stat may use
    #[serde(default = "default_ops")]
    pub ops: Vec<StatOp>,
    #[serde(default)]
    pub display_as_int: bool,
}

impl StatDefinition {
    pub fn new(id: &str) -> Self {
        StatDefinition {
            id: StatId::from(id),
            base: 0.0,
            min: default_min(),
            max: default_max(),
            ops: default_ops(),
            display_as_int: false,
        }
    }

    pub fn with_base(mut self, base: f64) -> Self {
        self.base = base;
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_ops(mut self, ops: &[StatOp]) -> Self {
        self.ops = ops.to_vec();
        self
    }

    pub fn as_int(mut self) -> Self {
        self.display_as_int = true;
        self
    }

    pub fn allows(&self, op: StatOp) -> bool {
        self.ops.contains(&op)
    }

    /// Clamp a computed value into the declared range; min wins on an inverted range
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.min(self.max).max(self.min)
    }
}

/// All stats known to a registry snapshot
#[derive(Debug, Clone, Default)]
pub struct StatCatalog {
    stats: HashMap<StatId, StatDefinition>,
    order: Vec<StatId>,
}

impl StatCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        StatCatalog::default()
    }

    /// Catalog with the built-in stats
    pub fn builtin() -> Self {
        let mut catalog = StatCatalog::new();
        for def in [
            StatDefinition::new(ids::DURABILITY).with_range(1.0, 1_000_000.0).as_int(),
            StatDefinition::new(ids::ARMOR_DURABILITY).with_range(1.0, 1_000_000.0).as_int(),
            StatDefinition::new(ids::REPAIR_EFFICIENCY).with_base(1.0),
            StatDefinition::new(ids::HARVEST_LEVEL).with_range(0.0, 10.0).as_int(),
            StatDefinition::new(ids::HARVEST_SPEED),
            StatDefinition::new(ids::MELEE_DAMAGE),
            StatDefinition::new(ids::MAGIC_DAMAGE),
            StatDefinition::new(ids::ATTACK_SPEED).with_range(-3.9, 4.0),
            StatDefinition::new(ids::RANGED_DAMAGE),
            StatDefinition::new(ids::RANGED_SPEED),
            StatDefinition::new(ids::ENCHANTABILITY).as_int(),
            StatDefinition::new(ids::RARITY).as_int(),
            StatDefinition::new(ids::ARMOR).with_range(0.0, 40.0),
            StatDefinition::new(ids::ARMOR_TOUGHNESS).with_range(0.0, 40.0),
            StatDefinition::new(ids::MAGIC_ARMOR),
            StatDefinition::new(ids::CHARGING_VALUE).with_range(0.0, 10.0),
        ] {
            catalog.insert(def);
        }
        catalog
    }

    /// Add a stat, replacing any existing definition of the same id in place
    pub fn insert(&mut self, def: StatDefinition) {
        if !self.stats.contains_key(&def.id) {
            self.order.push(def.id.clone());
        }
        self.stats.insert(def.id.clone(), def);
    }

    pub fn get(&self, id: &StatId) -> Option<&StatDefinition> {
        self.stats.get(id)
    }

    pub fn contains(&self, id: &StatId) -> bool {
        self.stats.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate stats in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &StatDefinition> {
        self.order.iter().filter_map(|id| self.stats.get(id))
    }

    /// Check that a modifier targets a known stat with an allowed operation
    pub fn validate(&self, modifier: &StatModifier) -> Result<(), DataIntegrityError> {
        let def = self
            .get(&modifier.stat)
            .ok_or_else(|| DataIntegrityError::UnknownStat(modifier.stat.clone()))?;
        if !def.allows(modifier.op) {
            return Err(DataIntegrityError::UnsupportedOperation {
                stat: modifier.stat.clone(),
                op: modifier.op,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_has_repair_efficiency() {
        let catalog = StatCatalog::builtin();
        let def = catalog.get(&StatId::from(ids::REPAIR_EFFICIENCY)).unwrap();
        assert!((def.base - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut catalog = StatCatalog::builtin();
        let len = catalog.len();
        catalog.insert(StatDefinition::new(ids::DURABILITY).with_base(5.0));
        assert_eq!(catalog.len(), len);
        assert_eq!(catalog.iter().next().unwrap().id.as_str(), ids::DURABILITY);
        assert!((catalog.iter().next().unwrap().base - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_unknown_stat() {
        let catalog = StatCatalog::builtin();
        let modifier = StatModifier::new("luck", 1.0, StatOp::Add);
        assert_eq!(
            catalog.validate(&modifier),
            Err(DataIntegrityError::UnknownStat(StatId::from("luck")))
        );
    }

    #[test]
    fn test_validate_unsupported_op() {
        let mut catalog = StatCatalog::new();
        catalog.insert(StatDefinition::new("rarity").with_ops(&[StatOp::Add]));
        let modifier = StatModifier::new("rarity", 0.5, StatOp::MultiplyTotal);
        assert!(matches!(
            catalog.validate(&modifier),
            Err(DataIntegrityError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_clamp() {
        let def = StatDefinition::new("x").with_range(0.0, 10.0);
        assert!((def.clamp(-5.0) - 0.0).abs() < f64::EPSILON);
        assert!((def.clamp(50.0) - 10.0).abs() < f64::EPSILON);
        assert!((def.clamp(f64::NAN) - 0.0).abs() < f64::EPSILON);

        let inverted = StatDefinition::new("x").with_range(10.0, 0.0);
        assert!((inverted.clamp(5.0) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_modifier_op_defaults_to_average() {
        let modifier: StatModifier = toml::from_str("stat = \"durability\"\nvalue = 100").unwrap();
        assert_eq!(modifier.op, StatOp::Average);
        assert!((modifier.value - 100.0).abs() < f64::EPSILON);
    }
}
