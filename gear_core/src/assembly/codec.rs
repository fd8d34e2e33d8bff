//! Persisted assembly form
//!
//! ```json
//! {"version": 1, "parts": [{"id": "gear:pickaxe_head", "grade": "A",
//!   "materials": [{"id": "gear:iron", "grade": "B"}]}]}
//! ```
//!
//! Unknown keys are ignored. Missing `version` reads as 1, missing `grade`
//! as NONE, missing `materials` as empty.

use super::{Assembly, MaterialRef, PartRef};
use crate::types::{DefinitionId, Grade, ItemPayload};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

pub const CURRENT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("malformed persisted data: {0}")]
    Json(#[from] serde_json::Error),
}

fn current_version() -> u32 {
    CURRENT_VERSION
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedAssembly {
    #[serde(default = "current_version")]
    version: u32,
    #[serde(default)]
    parts: Vec<PersistedPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedPart {
    id: DefinitionId,
    #[serde(default, skip_serializing_if = "Grade::is_none")]
    grade: Grade,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    item: Option<ItemPayload>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    materials: Vec<PersistedMaterial>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedMaterial {
    id: DefinitionId,
    #[serde(default, skip_serializing_if = "Grade::is_none")]
    grade: Grade,
}

impl From<&Assembly> for PersistedAssembly {
    fn from(assembly: &Assembly) -> Self {
        let parts = assembly
            .root_parts()
            .map(|(node, part)| PersistedPart {
                id: part.part.clone(),
                grade: part.grade,
                item: part.item.clone(),
                materials: assembly
                    .materials_of(node)
                    .map(|m| PersistedMaterial {
                        id: m.material.clone(),
                        grade: m.grade,
                    })
                    .collect(),
            })
            .collect();
        PersistedAssembly {
            version: CURRENT_VERSION,
            parts,
        }
    }
}

impl From<PersistedAssembly> for Assembly {
    fn from(persisted: PersistedAssembly) -> Self {
        if persisted.version > CURRENT_VERSION {
            debug!(
                version = persisted.version,
                "reading newer assembly format best-effort"
            );
        }

        let mut assembly = Assembly::new();
        for part in persisted.parts {
            let node = assembly.push_part(PartRef {
                part: part.id,
                grade: part.grade,
                item: part.item,
            });
            for m in part.materials {
                assembly.push_material(node, MaterialRef::new(m.id, m.grade));
            }
        }
        assembly
    }
}

impl Serialize for Assembly {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PersistedAssembly::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Assembly {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        PersistedAssembly::deserialize(deserializer).map(Assembly::from)
    }
}

impl Assembly {
    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(json)?)
    }
}
