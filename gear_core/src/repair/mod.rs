//! Repair engine - restores durability from loose materials and a repair kit
//!
//! A repair attempt is all-or-nothing: it either returns a repaired copy of
//! the gear (and kit), or leaves every input exactly as it was.

mod engine;

pub use engine::repair;

use crate::assembly::ValidationResult;
use crate::gear::Gear;
use crate::types::{Grade, ItemPayload};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which recipe is repairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairMode {
    /// Crafting-grid repair with a kit
    #[default]
    Quick,
    /// Anvil repair
    Anvil,
}

impl RepairMode {
    pub fn name(self) -> &'static str {
        match self {
            RepairMode::Quick => "quick",
            RepairMode::Anvil => "anvil",
        }
    }
}

impl fmt::Display for RepairMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RepairMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quick" => Ok(RepairMode::Quick),
            "anvil" | "full" => Ok(RepairMode::Anvil),
            _ => Err(format!("unknown repair mode '{}'", s)),
        }
    }
}

/// Stored durability points a kit can hand out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairKit {
    pub charge: u32,
    /// Most points a single repair may draw
    pub per_use_cap: u32,
}

impl RepairKit {
    pub fn new(charge: u32, per_use_cap: u32) -> Self {
        RepairKit {
            charge,
            per_use_cap,
        }
    }

    /// Points this kit would put into the given damage
    pub fn available_for(&self, damage: u32) -> u32 {
        damage.min(self.charge).min(self.per_use_cap)
    }
}

/// An item offered as repair material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LooseMaterial {
    pub item: ItemPayload,
    #[serde(default, skip_serializing_if = "Grade::is_none")]
    pub grade: Grade,
}

impl LooseMaterial {
    pub fn new(item: ItemPayload, grade: Grade) -> Self {
        LooseMaterial { item, grade }
    }
}

/// One thing placed into a repair recipe
#[derive(Debug, Clone)]
pub enum RepairInput<'a> {
    Gear(&'a Gear),
    Material(LooseMaterial),
    Kit(&'a RepairKit),
}

/// A repair attempt that was refused before anything happened
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepairAbort {
    #[error("no gear to repair")]
    NoTarget,
    #[error("{0} gear items offered, expected one")]
    MultipleTargets(usize),
    #[error("{0} repair kits offered, expected at most one")]
    MultipleKits(usize),
    #[error("gear is incomplete ({0:?})")]
    InvalidTarget(ValidationResult),
}

/// Why a valid attempt changed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoOpReason {
    Undamaged,
    NothingToApply,
}

/// A successful repair. The inputs are untouched; these are the new values.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairResult {
    pub gear: Gear,
    /// Kit with the used charge removed
    pub kit: Option<RepairKit>,
    pub consumed: Vec<LooseMaterial>,
    /// Materials that cannot repair this gear; left in place
    pub rejected: Vec<LooseMaterial>,
    pub restored_by_materials: u32,
    pub restored_by_kit: u32,
}

impl RepairResult {
    pub fn restored(&self) -> u32 {
        self.restored_by_materials + self.restored_by_kit
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RepairOutcome {
    Repaired(RepairResult),
    NoOp(NoOpReason),
}

/// Everything one repair attempt works with
#[derive(Debug, Clone)]
pub struct RepairContext<'a> {
    gear: &'a Gear,
    mode: RepairMode,
    materials: Vec<LooseMaterial>,
    kit: Option<&'a RepairKit>,
}

impl<'a> RepairContext<'a> {
    pub fn new(gear: &'a Gear, mode: RepairMode) -> Self {
        RepairContext {
            gear,
            mode,
            materials: Vec::new(),
            kit: None,
        }
    }

    pub fn with_material(mut self, material: LooseMaterial) -> Self {
        self.materials.push(material);
        self
    }

    pub fn with_kit(mut self, kit: &'a RepairKit) -> Self {
        self.kit = Some(kit);
        self
    }

    /// Sort loose recipe inputs: exactly one gear, at most one kit
    pub fn from_inputs(
        mode: RepairMode,
        inputs: impl IntoIterator<Item = RepairInput<'a>>,
    ) -> Result<Self, RepairAbort> {
        let mut gears = Vec::new();
        let mut kits = Vec::new();
        let mut materials = Vec::new();
        for input in inputs {
            match input {
                RepairInput::Gear(g) => gears.push(g),
                RepairInput::Kit(k) => kits.push(k),
                RepairInput::Material(m) => materials.push(m),
            }
        }

        let gear = match gears.as_slice() {
            [] => return Err(RepairAbort::NoTarget),
            [gear] => *gear,
            many => return Err(RepairAbort::MultipleTargets(many.len())),
        };
        if kits.len() > 1 {
            return Err(RepairAbort::MultipleKits(kits.len()));
        }

        Ok(RepairContext {
            gear,
            mode,
            materials,
            kit: kits.pop(),
        })
    }

    pub fn gear(&self) -> &Gear {
        self.gear
    }

    pub fn mode(&self) -> RepairMode {
        self.mode
    }

    pub fn materials(&self) -> &[LooseMaterial] {
        &self.materials
    }

    pub fn kit(&self) -> Option<&RepairKit> {
        self.kit
    }
}
