//! Tunable gear constants

use super::ConfigError;
use crate::types::{Grade, PartType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable balance data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GearConstants {
    #[serde(default)]
    pub grades: GradeConstants,
    #[serde(default)]
    pub synergy: SynergyConstants,
    #[serde(default)]
    pub fallbacks: FallbackConstants,
    #[serde(default)]
    pub repair: RepairConstants,
    #[serde(default)]
    pub display: DisplayConstants,
}

impl GearConstants {
    /// Load constants from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let constants: GearConstants = super::load_toml(path)?;
        constants.validate()?;
        Ok(constants)
    }

    /// Parse constants from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let constants: GearConstants = super::parse_toml(content)?;
        constants.validate()?;
        Ok(constants)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grades.validate()?;
        self.synergy.validate()?;
        self.repair.validate()?;
        if self.display.trait_rotation_ticks == 0 {
            return Err(ConfigError::Invalid(
                "display.trait_rotation_ticks must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeConstants {
    /// Stat bonus in percent for each grade above NONE (E first)
    #[serde(default = "default_bonus_percent")]
    pub bonus_percent: Vec<f64>,
}

impl Default for GradeConstants {
    fn default() -> Self {
        GradeConstants {
            bonus_percent: default_bonus_percent(),
        }
    }
}

fn default_bonus_percent() -> Vec<f64> {
    vec![5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 60.0]
}

impl GradeConstants {
    /// Stat multiplier for a grade; NONE is always exactly 1.0.
    ///
    /// Grades past the end of the curve reuse its last entry.
    pub fn multiplier(&self, grade: Grade) -> f64 {
        if grade == Grade::None {
            return 1.0;
        }
        let index = grade.ordinal() - 1;
        let bonus = self
            .bonus_percent
            .get(index)
            .or_else(|| self.bonus_percent.last())
            .copied()
            .unwrap_or(0.0);
        1.0 + bonus / 100.0
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut previous = 0.0;
        for bonus in &self.bonus_percent {
            if *bonus < previous {
                return Err(ConfigError::Invalid(
                    "grades.bonus_percent must be non-negative and non-decreasing".to_string(),
                ));
            }
            previous = *bonus;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyConstants {
    /// Bonus per tier the other parts sit above the main part (on average)
    #[serde(default = "default_tier_bonus")]
    pub tier_bonus: f64,
    /// Penalty per unit of tier variance
    #[serde(default = "default_variance_penalty")]
    pub variance_penalty: f64,
    #[serde(default = "default_synergy_min")]
    pub min: f64,
    #[serde(default = "default_synergy_max")]
    pub max: f64,
}

impl Default for SynergyConstants {
    fn default() -> Self {
        SynergyConstants {
            tier_bonus: default_tier_bonus(),
            variance_penalty: default_variance_penalty(),
            min: default_synergy_min(),
            max: default_synergy_max(),
        }
    }
}

impl SynergyConstants {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min <= 1.0 && 1.0 <= self.max) {
            return Err(ConfigError::Invalid(
                "synergy range must contain 1.0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_tier_bonus() -> f64 {
    0.05
}
fn default_variance_penalty() -> f64 {
    0.1
}
fn default_synergy_min() -> f64 {
    0.5
}
fn default_synergy_max() -> f64 {
    1.5
}

/// Part ids handed out when a recipe needs a part the player did not supply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackConstants {
    #[serde(default = "default_fallback_main")]
    pub main: Option<String>,
    #[serde(default = "default_fallback_rod")]
    pub rod: Option<String>,
    #[serde(default = "default_fallback_bowstring")]
    pub bowstring: Option<String>,
}

impl Default for FallbackConstants {
    fn default() -> Self {
        FallbackConstants {
            main: default_fallback_main(),
            rod: default_fallback_rod(),
            bowstring: default_fallback_bowstring(),
        }
    }
}

impl FallbackConstants {
    /// Configured fallback id for a slot (only MAIN, ROD and BOWSTRING have one)
    pub fn for_slot(&self, slot: PartType) -> Option<&str> {
        match slot {
            PartType::Main => self.main.as_deref(),
            PartType::Rod => self.rod.as_deref(),
            PartType::Bowstring => self.bowstring.as_deref(),
            _ => None,
        }
    }
}

fn default_fallback_main() -> Option<String> {
    Some("gear:main_iron".to_string())
}
fn default_fallback_rod() -> Option<String> {
    Some("gear:rod_wood".to_string())
}
fn default_fallback_bowstring() -> Option<String> {
    Some("gear:bowstring_string".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairConstants {
    /// Share of a material's main durability restored by a quick repair
    #[serde(default = "default_quick_factor")]
    pub quick_factor: f64,
    /// Share of a material's main durability restored at an anvil
    #[serde(default = "default_anvil_factor")]
    pub anvil_factor: f64,
}

impl Default for RepairConstants {
    fn default() -> Self {
        RepairConstants {
            quick_factor: default_quick_factor(),
            anvil_factor: default_anvil_factor(),
        }
    }
}

impl RepairConstants {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.quick_factor < 0.0 || self.anvil_factor < 0.0 {
            return Err(ConfigError::Invalid(
                "repair factors must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_quick_factor() -> f64 {
    0.35
}
fn default_anvil_factor() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConstants {
    /// Ticks each visible trait stays on screen before the tooltip rotates
    #[serde(default = "default_trait_rotation_ticks")]
    pub trait_rotation_ticks: u64,
}

impl Default for DisplayConstants {
    fn default() -> Self {
        DisplayConstants {
            trait_rotation_ticks: default_trait_rotation_ticks(),
        }
    }
}

fn default_trait_rotation_ticks() -> u64 {
    20
}
