//! Building assemblies and crafting compound parts from materials

use super::{Assembly, MaterialRef, PartRef};
use crate::registry::Snapshot;
use crate::types::{DefinitionId, GearType, Grade};
use thiserror::Error;

/// Why a compound part could not be crafted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CraftError {
    #[error("unknown part '{0}'")]
    UnknownPart(DefinitionId),
    #[error("part '{0}' is not built from materials")]
    NotCompound(DefinitionId),
    #[error("part '{0}' needs at least one material")]
    NoMaterials(DefinitionId),
    #[error("unknown material '{0}'")]
    UnknownMaterial(DefinitionId),
    #[error("material '{material}' cannot fill part '{part}' on a {gear_type}")]
    MaterialRejected {
        material: DefinitionId,
        part: DefinitionId,
        gear_type: GearType,
    },
}

/// A compound part together with its material fragment
#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    pub part: PartRef,
    pub materials: Vec<MaterialRef>,
}

/// Check every material against a compound part and pair them up
pub fn craft_compound(
    snapshot: &Snapshot,
    part: &DefinitionId,
    materials: &[MaterialRef],
    gear_type: GearType,
) -> Result<Compound, CraftError> {
    let def = snapshot
        .part(part)
        .ok_or_else(|| CraftError::UnknownPart(part.clone()))?;
    if !def.compound {
        return Err(CraftError::NotCompound(part.clone()));
    }
    if materials.is_empty() {
        return Err(CraftError::NoMaterials(part.clone()));
    }

    for m in materials {
        let material = snapshot
            .material(&m.material)
            .ok_or_else(|| CraftError::UnknownMaterial(m.material.clone()))?;
        if !material.can_fill(def, gear_type) {
            return Err(CraftError::MaterialRejected {
                material: m.material.clone(),
                part: part.clone(),
                gear_type,
            });
        }
    }

    Ok(Compound {
        part: PartRef::new(part.clone()),
        materials: materials.to_vec(),
    })
}

/// Fluent assembly construction
#[derive(Debug, Clone, Default)]
pub struct AssemblyBuilder {
    assembly: Assembly,
}

impl AssemblyBuilder {
    pub fn new() -> Self {
        AssemblyBuilder::default()
    }

    /// Add a plain part with no grade
    pub fn part(self, part: DefinitionId) -> Self {
        self.part_ref(PartRef::new(part))
    }

    pub fn graded_part(self, part: DefinitionId, grade: Grade) -> Self {
        self.part_ref(PartRef::new(part).with_grade(grade))
    }

    pub fn part_ref(mut self, part: PartRef) -> Self {
        self.assembly.push_part(part);
        self
    }

    /// Add a compound part with its material layers, unchecked
    pub fn compound(mut self, part: DefinitionId, materials: Vec<MaterialRef>) -> Self {
        let node = self.assembly.push_part(PartRef::new(part));
        for m in materials {
            self.assembly.push_material(node, m);
        }
        self
    }

    /// Add a compound part produced by [`craft_compound`]
    pub fn crafted(mut self, compound: Compound) -> Self {
        let node = self.assembly.push_part(compound.part);
        for m in compound.materials {
            self.assembly.push_material(node, m);
        }
        self
    }

    pub fn build(self) -> Assembly {
        self.assembly
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_definitions, GearConstants};
    use std::sync::Arc;

    fn id(s: &str) -> DefinitionId {
        DefinitionId::parse(s).unwrap()
    }

    fn snapshot() -> Snapshot {
        let records = parse_definitions(
            r#"
[[part]]
id = "gear:pickaxe_head"
slot = "main"
compound = true
min_material_tier = 1

[[part]]
id = "gear:rod_wood"
slot = "rod"

[[material]]
id = "gear:iron"
tier = 2
[material.stats]
main = [{ stat = "durability", value = 250 }]

[[material]]
id = "gear:paper"
tier = 0
[material.stats]
main = [{ stat = "durability", value = 5 }]

[[material]]
id = "gear:silk"
tier = 2
gear_blacklist = ["tool"]
[material.stats]
main = [{ stat = "durability", value = 30 }]
"#,
        )
        .unwrap();
        Snapshot::build(1, Arc::new(GearConstants::default()), &records).0
    }

    #[test]
    fn test_craft_compound_accepts_fitting_materials() {
        let snapshot = snapshot();
        let compound = craft_compound(
            &snapshot,
            &id("gear:pickaxe_head"),
            &[MaterialRef::new(id("gear:iron"), Grade::B)],
            GearType::Pickaxe,
        )
        .unwrap();

        let assembly = AssemblyBuilder::new()
            .crafted(compound)
            .part(id("gear:rod_wood"))
            .build();
        assert_eq!(assembly.roots().len(), 2);
        assert_eq!(assembly.len(), 3);
        assert!(assembly.validate(&snapshot, GearType::Pickaxe).is_ok());
    }

    #[test]
    fn test_craft_compound_names_first_bad_material() {
        let snapshot = snapshot();
        let head = id("gear:pickaxe_head");
        let craft = |materials: &[MaterialRef]| {
            craft_compound(&snapshot, &head, materials, GearType::Pickaxe)
        };

        assert_eq!(
            craft(&[
                MaterialRef::new(id("gear:iron"), Grade::None),
                MaterialRef::new(id("gear:paper"), Grade::None),
                MaterialRef::new(id("gear:silk"), Grade::None),
            ]),
            Err(CraftError::MaterialRejected {
                material: id("gear:paper"),
                part: head.clone(),
                gear_type: GearType::Pickaxe,
            })
        );
        assert!(matches!(
            craft(&[MaterialRef::new(id("gear:silk"), Grade::None)]),
            Err(CraftError::MaterialRejected { .. })
        ));
        assert_eq!(craft(&[]), Err(CraftError::NoMaterials(head.clone())));
        assert_eq!(
            craft(&[MaterialRef::new(id("gear:void"), Grade::None)]),
            Err(CraftError::UnknownMaterial(id("gear:void")))
        );
    }

    #[test]
    fn test_craft_compound_requires_compound_part() {
        let snapshot = snapshot();
        assert_eq!(
            craft_compound(
                &snapshot,
                &id("gear:rod_wood"),
                &[MaterialRef::new(id("gear:iron"), Grade::None)],
                GearType::Pickaxe,
            ),
            Err(CraftError::NotCompound(id("gear:rod_wood")))
        );
        assert!(matches!(
            craft_compound(&snapshot, &id("gear:nope"), &[], GearType::Pickaxe),
            Err(CraftError::UnknownPart(_))
        ));
    }
}
