//! Shared fixtures for the integration tests
#![allow(dead_code)]

use gear_core::prelude::*;
use std::path::PathBuf;

pub fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

pub fn constants() -> GearConstants {
    GearConstants::load(&data_dir().join("constants.toml")).unwrap()
}

pub fn records() -> Vec<RawRecord> {
    load_definitions_dir(&data_dir().join("defs")).unwrap()
}

/// Registry with every fixture definition loaded
pub fn loaded_registry() -> Registry {
    let registry = Registry::new(constants());
    let report = registry.load(&records()).unwrap();
    assert!(report.is_clean(), "{:?}", report.errors);
    registry
}

pub fn id(s: &str) -> DefinitionId {
    DefinitionId::parse(s).unwrap()
}

pub fn material(s: &str, grade: Grade) -> MaterialRef {
    MaterialRef::new(id(s), grade)
}

/// Iron (grade C) and gold pickaxe head on a wooden rod
pub fn pickaxe() -> Gear {
    let assembly = AssemblyBuilder::new()
        .compound(
            id("gear:pickaxe_head"),
            vec![
                material("gear:iron", Grade::C),
                material("gear:gold", Grade::None),
            ],
        )
        .part_ref(PartRef::new(id("gear:rod_wood")).with_item(ItemPayload::new("minecraft:stick")))
        .build();
    Gear::new(GearType::Pickaxe, assembly)
}

pub fn value(result: StatResult) -> f64 {
    result.value().expect("stat should not be locked")
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
