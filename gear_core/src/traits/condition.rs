//! Trait conditions - gates deciding whether a trait applies to a gear

use crate::types::GearType;
use serde::{Deserialize, Serialize};

/// Facts about the gear a trait is being resolved for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraitContext {
    pub gear_type: GearType,
    /// Set by the host when the wearer has a full matching armor set
    pub full_set: bool,
}

impl TraitContext {
    pub fn new(gear_type: GearType) -> Self {
        TraitContext {
            gear_type,
            full_set: false,
        }
    }

    pub fn with_full_set(mut self, full_set: bool) -> Self {
        self.full_set = full_set;
        self
    }
}

/// Condition attached to a trait instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraitCondition {
    /// Gear type name, group name (`tool`, `armor`, ...) or `all`
    GearType { gear_type: String },
    /// Every armor slot must be filled by gear sharing the material
    FullSet,
    /// Share of contributing sources that carry the trait
    MaterialRatio { ratio: f64 },
    Not { condition: Box<TraitCondition> },
    And { conditions: Vec<TraitCondition> },
    Or { conditions: Vec<TraitCondition> },
}

impl TraitCondition {
    /// Evaluate against a context; `ratio` is the share of sources carrying the trait
    pub fn matches(&self, ctx: &TraitContext, ratio: f64) -> bool {
        match self {
            TraitCondition::GearType { gear_type } => ctx.gear_type.matches(gear_type),
            TraitCondition::FullSet => ctx.full_set,
            TraitCondition::MaterialRatio { ratio: required } => ratio + 1e-9 >= *required,
            TraitCondition::Not { condition } => !condition.matches(ctx, ratio),
            TraitCondition::And { conditions } => conditions.iter().all(|c| c.matches(ctx, ratio)),
            TraitCondition::Or { conditions } => conditions.iter().any(|c| c.matches(ctx, ratio)),
        }
    }
}
