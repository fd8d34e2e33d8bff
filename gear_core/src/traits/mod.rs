//! Traits - leveled special behaviors merged from parts and materials onto gear

mod condition;
mod resolver;

pub use condition::{TraitCondition, TraitContext};
pub use resolver::{effective_traits, EffectiveTraits, TraitLevel};

use crate::registry::DataIntegrityError;
use crate::types::{DefinitionId, Grade};
use serde::{Deserialize, Serialize};

fn default_max_level() -> u32 {
    1
}

fn default_visible() -> bool {
    true
}

fn default_level() -> u32 {
    1
}

/// Catalog entry for a trait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitDefinition {
    pub id: DefinitionId,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    /// Hidden traits still apply but are left out of tooltips
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TraitDefinition {
    pub fn new(id: DefinitionId, max_level: u32) -> Self {
        TraitDefinition {
            id,
            max_level,
            visible: true,
            name: None,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.id.path().replace('_', " "))
    }
}

/// A trait attached to a part or to one slot of a material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitInstance {
    pub id: DefinitionId,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<TraitCondition>,
    /// Lowest material grade that unlocks this trait
    #[serde(default, skip_serializing_if = "Grade::is_none")]
    pub min_grade: Grade,
}

impl TraitInstance {
    pub fn new(id: DefinitionId, level: u32) -> Self {
        TraitInstance {
            id,
            level,
            conditions: Vec::new(),
            min_grade: Grade::None,
        }
    }

    pub fn with_condition(mut self, condition: TraitCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_min_grade(mut self, grade: Grade) -> Self {
        self.min_grade = grade;
        self
    }

    /// Whether an instance at the given grade carries this trait
    pub fn unlocked_at(&self, grade: Grade) -> bool {
        grade >= self.min_grade
    }

    /// Check the instance against the trait catalog
    pub fn validate(
        &self,
        lookup: impl Fn(&DefinitionId) -> bool,
    ) -> Result<(), DataIntegrityError> {
        if !lookup(&self.id) {
            return Err(DataIntegrityError::UnknownTrait(self.id.clone()));
        }
        if self.level == 0 {
            return Err(DataIntegrityError::ZeroTraitLevel(self.id.clone()));
        }
        Ok(())
    }
}
