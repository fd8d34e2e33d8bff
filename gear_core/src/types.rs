//! Core types shared by the registry, assembly and aggregation layers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Namespace used when an identifier is written without one
pub const DEFAULT_NAMESPACE: &str = "gear";

/// Slot a part fills on a gear item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartType {
    Main,
    Rod,
    Bowstring,
    Tip,
    Coating,
    Grip,
    Binding,
    Fletching,
    Misc,
}

impl PartType {
    /// Get all part types
    pub fn all() -> &'static [PartType] {
        &[
            PartType::Main,
            PartType::Rod,
            PartType::Bowstring,
            PartType::Tip,
            PartType::Coating,
            PartType::Grip,
            PartType::Binding,
            PartType::Fletching,
            PartType::Misc,
        ]
    }

    /// Singleton slots hold at most one part per assembly
    pub fn is_singleton(self) -> bool {
        matches!(self, PartType::Main | PartType::Rod)
    }

    pub fn name(self) -> &'static str {
        match self {
            PartType::Main => "main",
            PartType::Rod => "rod",
            PartType::Bowstring => "bowstring",
            PartType::Tip => "tip",
            PartType::Coating => "coating",
            PartType::Grip => "grip",
            PartType::Binding => "binding",
            PartType::Fletching => "fletching",
            PartType::Misc => "misc",
        }
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PartType::all()
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown part type '{}'", s))
    }
}

/// Broad family a gear type belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GearGroup {
    Tool,
    MeleeWeapon,
    RangedWeapon,
    Armor,
}

impl GearGroup {
    pub fn name(self) -> &'static str {
        match self {
            GearGroup::Tool => "tool",
            GearGroup::MeleeWeapon => "melee_weapon",
            GearGroup::RangedWeapon => "ranged_weapon",
            GearGroup::Armor => "armor",
        }
    }
}

/// Gear archetype (what kind of item an assembly builds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GearType {
    Pickaxe,
    Shovel,
    Axe,
    Sickle,
    Sword,
    Dagger,
    Bow,
    Crossbow,
    Helmet,
    Chestplate,
    Leggings,
    Boots,
}

impl GearType {
    /// Get all gear types
    pub fn all() -> &'static [GearType] {
        &[
            GearType::Pickaxe,
            GearType::Shovel,
            GearType::Axe,
            GearType::Sickle,
            GearType::Sword,
            GearType::Dagger,
            GearType::Bow,
            GearType::Crossbow,
            GearType::Helmet,
            GearType::Chestplate,
            GearType::Leggings,
            GearType::Boots,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            GearType::Pickaxe => "pickaxe",
            GearType::Shovel => "shovel",
            GearType::Axe => "axe",
            GearType::Sickle => "sickle",
            GearType::Sword => "sword",
            GearType::Dagger => "dagger",
            GearType::Bow => "bow",
            GearType::Crossbow => "crossbow",
            GearType::Helmet => "helmet",
            GearType::Chestplate => "chestplate",
            GearType::Leggings => "leggings",
            GearType::Boots => "boots",
        }
    }

    pub fn group(self) -> GearGroup {
        match self {
            GearType::Pickaxe | GearType::Shovel | GearType::Axe | GearType::Sickle => {
                GearGroup::Tool
            }
            GearType::Sword | GearType::Dagger => GearGroup::MeleeWeapon,
            GearType::Bow | GearType::Crossbow => GearGroup::RangedWeapon,
            GearType::Helmet | GearType::Chestplate | GearType::Leggings | GearType::Boots => {
                GearGroup::Armor
            }
        }
    }

    pub fn is_armor(self) -> bool {
        self.group() == GearGroup::Armor
    }

    /// Check a gear-type name as used in blacklists and trait conditions.
    ///
    /// Accepts the exact type name, its group name, or `all`.
    pub fn matches(self, name: &str) -> bool {
        name == "all" || name == self.name() || name == self.group().name()
    }

    /// Slots an assembly of this type must fill, in reporting order
    pub fn required_parts(self) -> &'static [PartType] {
        match self.group() {
            GearGroup::Tool | GearGroup::MeleeWeapon => &[PartType::Main, PartType::Rod],
            GearGroup::RangedWeapon => &[PartType::Main, PartType::Rod, PartType::Bowstring],
            GearGroup::Armor => &[PartType::Main],
        }
    }

    pub fn requires(self, slot: PartType) -> bool {
        self.required_parts().contains(&slot)
    }
}

impl fmt::Display for GearType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GearType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GearType::all()
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown gear type '{}'", s))
    }
}

/// Enrichment level of a material instance
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Grade {
    #[default]
    None,
    E,
    D,
    C,
    B,
    A,
    S,
    Ss,
    Sss,
    Max,
}

impl Grade {
    /// Get all grades, lowest first
    pub fn all() -> &'static [Grade] {
        &[
            Grade::None,
            Grade::E,
            Grade::D,
            Grade::C,
            Grade::B,
            Grade::A,
            Grade::S,
            Grade::Ss,
            Grade::Sss,
            Grade::Max,
        ]
    }

    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn is_none(&self) -> bool {
        *self == Grade::None
    }

    pub fn name(self) -> &'static str {
        match self {
            Grade::None => "NONE",
            Grade::E => "E",
            Grade::D => "D",
            Grade::C => "C",
            Grade::B => "B",
            Grade::A => "A",
            Grade::S => "S",
            Grade::Ss => "SS",
            Grade::Sss => "SSS",
            Grade::Max => "MAX",
        }
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Grade::all()
            .iter()
            .copied()
            .find(|g| g.name() == upper)
            .ok_or_else(|| format!("unknown grade '{}'", s))
    }
}

/// Identifier parse failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid identifier '{id}': {reason}")]
pub struct IdError {
    pub id: String,
    pub reason: &'static str,
}

/// Namespaced identifier of a part, material or trait (`namespace:path`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DefinitionId {
    namespace: String,
    path: String,
}

impl DefinitionId {
    /// Parse an identifier; a bare path gets the default namespace
    pub fn parse(s: &str) -> Result<Self, IdError> {
        let (namespace, path) = match s.split_once(':') {
            Some((ns, path)) => (ns, path),
            None => (DEFAULT_NAMESPACE, s),
        };
        let fail = |reason| IdError {
            id: s.to_string(),
            reason,
        };

        if namespace.is_empty() {
            return Err(fail("empty namespace"));
        }
        if path.is_empty() {
            return Err(fail("empty path"));
        }
        if !namespace
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "_.-".contains(c))
        {
            return Err(fail("namespace may only contain [a-z0-9_.-]"));
        }
        if !path
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "_./-".contains(c))
        {
            return Err(fail("path may only contain [a-z0-9_./-]"));
        }

        Ok(DefinitionId {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for DefinitionId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DefinitionId::parse(s)
    }
}

impl TryFrom<String> for DefinitionId {
    type Error = IdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        DefinitionId::parse(&s)
    }
}

impl From<DefinitionId> for String {
    fn from(id: DefinitionId) -> Self {
        id.to_string()
    }
}

/// A concrete item as handed over by the host (crafting grid slot, inventory stack)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemPayload {
    /// Item identifier, e.g. `minecraft:iron_ingot`
    pub item: String,
    /// Tags the item carries, e.g. `forge:ingots/iron`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ItemPayload {
    pub fn new(item: impl Into<String>) -> Self {
        ItemPayload {
            item: item.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}
