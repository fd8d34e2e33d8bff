//! Gear - an assembly plus its wear state, and the read-only query surface

use crate::assembly::{Assembly, CodecError, ValidationResult};
use crate::registry::Snapshot;
use crate::stat::{aggregate, aggregate_all, ids, StatId, StatMap, StatResult, TierVarianceSynergy};
use crate::traits::{effective_traits, EffectiveTraits, TraitContext};
use crate::types::{GearGroup, GearType};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

const TOOL_STATS: &[&str] = &[
    ids::DURABILITY,
    ids::HARVEST_LEVEL,
    ids::HARVEST_SPEED,
    ids::MELEE_DAMAGE,
    ids::ATTACK_SPEED,
    ids::ENCHANTABILITY,
    ids::RARITY,
];

const MELEE_STATS: &[&str] = &[
    ids::DURABILITY,
    ids::MELEE_DAMAGE,
    ids::MAGIC_DAMAGE,
    ids::ATTACK_SPEED,
    ids::ENCHANTABILITY,
    ids::RARITY,
];

const RANGED_STATS: &[&str] = &[
    ids::DURABILITY,
    ids::RANGED_DAMAGE,
    ids::RANGED_SPEED,
    ids::CHARGING_VALUE,
    ids::ENCHANTABILITY,
    ids::RARITY,
];

const ARMOR_STATS: &[&str] = &[
    ids::ARMOR_DURABILITY,
    ids::ARMOR,
    ids::ARMOR_TOUGHNESS,
    ids::MAGIC_ARMOR,
    ids::ENCHANTABILITY,
    ids::RARITY,
];

const ARMOR_ONLY: &[&str] = &[
    ids::ARMOR_DURABILITY,
    ids::ARMOR,
    ids::ARMOR_TOUGHNESS,
    ids::MAGIC_ARMOR,
];

const RANGED_EXCLUDED: &[&str] = &[
    ids::ARMOR_DURABILITY,
    ids::ARMOR,
    ids::ARMOR_TOUGHNESS,
    ids::MAGIC_ARMOR,
    ids::HARVEST_LEVEL,
    ids::HARVEST_SPEED,
];

const ARMOR_EXCLUDED: &[&str] = &[
    ids::DURABILITY,
    ids::HARVEST_LEVEL,
    ids::HARVEST_SPEED,
    ids::MELEE_DAMAGE,
    ids::MAGIC_DAMAGE,
    ids::ATTACK_SPEED,
    ids::RANGED_DAMAGE,
    ids::RANGED_SPEED,
    ids::CHARGING_VALUE,
];

/// Stats a tooltip shows for this gear type
pub fn relevant_stats(gear_type: GearType) -> &'static [&'static str] {
    match gear_type.group() {
        GearGroup::Tool => TOOL_STATS,
        GearGroup::MeleeWeapon => MELEE_STATS,
        GearGroup::RangedWeapon => RANGED_STATS,
        GearGroup::Armor => ARMOR_STATS,
    }
}

/// Stats that never apply to this gear type
pub fn excluded_stats(gear_type: GearType) -> &'static [&'static str] {
    match gear_type.group() {
        GearGroup::Tool | GearGroup::MeleeWeapon => ARMOR_ONLY,
        GearGroup::RangedWeapon => RANGED_EXCLUDED,
        GearGroup::Armor => ARMOR_EXCLUDED,
    }
}

/// Stat id backing max durability for this gear type
pub fn durability_stat(gear_type: GearType) -> &'static str {
    if gear_type.is_armor() {
        ids::ARMOR_DURABILITY
    } else {
        ids::DURABILITY
    }
}

#[derive(Debug, Clone)]
struct CachedStats {
    generation: u64,
    stats: StatMap,
}

/// A gear item: what it is built from and how worn it is
#[derive(Debug, Serialize, Deserialize)]
pub struct Gear {
    gear_type: GearType,
    #[serde(flatten)]
    assembly: Assembly,
    #[serde(default)]
    damage: u32,
    #[serde(default)]
    repair_count: u32,
    #[serde(skip)]
    cache: Mutex<Option<CachedStats>>,
}

impl Clone for Gear {
    fn clone(&self) -> Self {
        Gear {
            gear_type: self.gear_type,
            assembly: self.assembly.clone(),
            damage: self.damage,
            repair_count: self.repair_count,
            cache: Mutex::new(self.cache.lock().clone()),
        }
    }
}

impl PartialEq for Gear {
    fn eq(&self, other: &Self) -> bool {
        self.gear_type == other.gear_type
            && self.assembly == other.assembly
            && self.damage == other.damage
            && self.repair_count == other.repair_count
    }
}

impl Gear {
    pub fn new(gear_type: GearType, assembly: Assembly) -> Self {
        Gear {
            gear_type,
            assembly,
            damage: 0,
            repair_count: 0,
            cache: Mutex::new(None),
        }
    }

    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    pub fn gear_type(&self) -> GearType {
        self.gear_type
    }

    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    /// Mutable access to the parts; drops cached stats
    pub fn assembly_mut(&mut self) -> &mut Assembly {
        *self.cache.get_mut() = None;
        &mut self.assembly
    }

    pub fn damage(&self) -> u32 {
        self.damage
    }

    pub fn repair_count(&self) -> u32 {
        self.repair_count
    }

    /// Add wear; damage never wraps
    pub fn apply_damage(&mut self, amount: u32) {
        self.damage = self.damage.saturating_add(amount);
    }

    pub fn validate(&self, snapshot: &Snapshot) -> ValidationResult {
        self.assembly.validate(snapshot, self.gear_type)
    }

    /// All stats, served from the cache while computed against this same snapshot
    pub fn stats(&self, snapshot: &Snapshot) -> StatMap {
        let mut cache = self.cache.lock();
        if let Some(cached) = cache.as_ref() {
            if cached.generation == snapshot.generation() {
                return cached.stats.clone();
            }
        }
        let stats = self.compute_stats(snapshot);
        *cache = Some(CachedStats {
            generation: snapshot.generation(),
            stats: stats.clone(),
        });
        stats
    }

    /// Recompute and re-cache every stat regardless of what is cached
    pub fn recalculate(&self, snapshot: &Snapshot) -> StatMap {
        let stats = self.compute_stats(snapshot);
        *self.cache.lock() = Some(CachedStats {
            generation: snapshot.generation(),
            stats: stats.clone(),
        });
        stats
    }

    fn compute_stats(&self, snapshot: &Snapshot) -> StatMap {
        debug!(
            gear_type = %self.gear_type,
            epoch = snapshot.epoch(),
            repair_count = self.repair_count,
            "recalculating gear stats"
        );
        aggregate_all(snapshot, &self.assembly, self.gear_type)
    }

    /// One stat; excluded stats are computed on demand
    pub fn stat(&self, snapshot: &Snapshot, stat: &StatId) -> StatResult {
        if excluded_stats(self.gear_type).contains(&stat.as_str()) {
            return aggregate(snapshot, &self.assembly, self.gear_type, stat);
        }
        self.stats(snapshot).get(stat)
    }

    /// Maximum durability; 0 for locked gear
    pub fn max_durability(&self, snapshot: &Snapshot) -> u32 {
        let stat = StatId::from(durability_stat(self.gear_type));
        self.stat(snapshot, &stat).display_value().round().max(0.0) as u32
    }

    pub fn remaining_durability(&self, snapshot: &Snapshot) -> u32 {
        self.max_durability(snapshot).saturating_sub(self.damage)
    }

    pub fn is_broken(&self, snapshot: &Snapshot) -> bool {
        self.damage >= self.max_durability(snapshot)
    }

    pub fn effective_traits(&self, snapshot: &Snapshot, ctx: &TraitContext) -> EffectiveTraits {
        effective_traits(snapshot, &self.assembly, ctx)
    }

    /// Synergy with the snapshot's configured coefficients
    pub fn synergy(&self, snapshot: &Snapshot) -> f64 {
        let formula = TierVarianceSynergy::from(&snapshot.constants().synergy);
        crate::stat::synergy(snapshot, &self.assembly, self.gear_type, &formula)
    }

    /// The gear after a successful repair: less damage, one more repair, fresh stats
    pub(crate) fn repaired(&self, snapshot: &Snapshot, damage: u32) -> Gear {
        let gear = Gear {
            gear_type: self.gear_type,
            assembly: self.assembly.clone(),
            damage,
            repair_count: self.repair_count.saturating_add(1),
            cache: Mutex::new(None),
        };
        gear.recalculate(snapshot);
        gear
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{AssemblyBuilder, MaterialRef};
    use crate::config::{parse_definitions, GearConstants};
    use crate::types::{DefinitionId, Grade};
    use std::sync::Arc;

    const DEFS: &str = r#"
[[part]]
id = "gear:pickaxe_head"
slot = "main"
compound = true

[[part]]
id = "gear:rod_wood"
slot = "rod"
tier = 1

[[part]]
id = "gear:helmet_plate"
slot = "main"
tier = 2
stats = [{ stat = "armor_durability", value = 120 }, { stat = "armor", value = 2 }]

[[material]]
id = "gear:iron"
tier = 2
[material.stats]
main = [{ stat = "durability", value = 250 }, { stat = "armor", value = 3 }]
"#;

    fn id(s: &str) -> DefinitionId {
        DefinitionId::parse(s).unwrap()
    }

    fn snapshot(epoch: u64) -> Snapshot {
        let records = parse_definitions(DEFS).unwrap();
        Snapshot::build(epoch, Arc::new(GearConstants::default()), &records).0
    }

    fn pickaxe() -> Gear {
        let assembly = AssemblyBuilder::new()
            .compound(
                id("gear:pickaxe_head"),
                vec![MaterialRef::new(id("gear:iron"), Grade::None)],
            )
            .part(id("gear:rod_wood"))
            .build();
        Gear::new(GearType::Pickaxe, assembly)
    }

    #[test]
    fn test_relevant_and_excluded_are_disjoint() {
        for &gear_type in GearType::all() {
            let excluded = excluded_stats(gear_type);
            assert!(relevant_stats(gear_type)
                .iter()
                .all(|s| !excluded.contains(s)));
            assert!(relevant_stats(gear_type).contains(&durability_stat(gear_type)));
        }
    }

    #[test]
    fn test_max_durability_by_gear_kind() {
        let snapshot = snapshot(1);
        let tool = pickaxe().with_damage(50);
        assert_eq!(tool.max_durability(&snapshot), 250);
        assert_eq!(tool.remaining_durability(&snapshot), 200);
        assert!(!tool.is_broken(&snapshot));

        let helmet = Gear::new(
            GearType::Helmet,
            AssemblyBuilder::new().part(id("gear:helmet_plate")).build(),
        );
        assert_eq!(helmet.max_durability(&snapshot), 120);
    }

    #[test]
    fn test_locked_gear_reads_zero_durability() {
        let snapshot = snapshot(1);
        let gear = Gear::new(
            GearType::Pickaxe,
            AssemblyBuilder::new().part(id("gear:rod_wood")).build(),
        );
        assert!(gear.stats(&snapshot).is_locked());
        assert_eq!(gear.max_durability(&snapshot), 0);
        assert!(gear.is_broken(&snapshot));
    }

    #[test]
    fn test_excluded_stat_still_answerable() {
        let snapshot = snapshot(1);
        let gear = pickaxe();
        assert!(gear.stats(&snapshot).get(&ids::ARMOR.into()).is_locked());
        assert_eq!(gear.stat(&snapshot, &ids::ARMOR.into()), StatResult::Value(3.0));
    }

    #[test]
    fn test_cache_follows_snapshot() {
        let gear = pickaxe();
        let first_snapshot = snapshot(1);
        let first = gear.stats(&first_snapshot);
        let cached = gear.cache.lock().as_ref().map(|c| c.generation);
        assert_eq!(cached, Some(first_snapshot.generation()));
        assert_eq!(first, gear.stats(&first_snapshot));

        let second_snapshot = snapshot(2);
        gear.stats(&second_snapshot);
        let cached = gear.cache.lock().as_ref().map(|c| c.generation);
        assert_eq!(cached, Some(second_snapshot.generation()));
    }

    #[test]
    fn test_same_epoch_in_other_registry_is_not_a_cache_hit() {
        let with_durability = |durability: u32| {
            let defs = DEFS.replace(
                "{ stat = \"durability\", value = 250 }",
                &format!("{{ stat = \"durability\", value = {durability} }}"),
            );
            let records = parse_definitions(&defs).unwrap();
            Snapshot::build(1, Arc::new(GearConstants::default()), &records).0
        };
        let soft = with_durability(100);
        let hard = with_durability(900);
        assert_eq!(soft.epoch(), hard.epoch());

        let gear = pickaxe();
        assert_eq!(gear.max_durability(&soft), 100);
        assert_eq!(gear.max_durability(&hard), 900);
        assert_eq!(gear.max_durability(&soft), 100);
    }

    #[test]
    fn test_persisted_form() {
        let gear = pickaxe().with_damage(17);
        let json = gear.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["gear_type"], "pickaxe");
        assert_eq!(value["damage"], 17);
        assert_eq!(value["version"], 1);
        assert_eq!(value["parts"].as_array().map(Vec::len), Some(2));

        let decoded = Gear::from_json(&json).unwrap();
        assert_eq!(decoded, gear);

        let minimal =
            Gear::from_json(r#"{"gear_type": "sword", "parts": [{"id": "gear:rod_wood"}]}"#)
                .unwrap();
        assert_eq!(minimal.damage(), 0);
        assert_eq!(minimal.repair_count(), 0);
    }
}
