//! Integration test: definitions on disk -> registry -> gear -> stats/traits -> repair -> persistence

mod common;

use common::*;
use gear_core::assembly::CraftError;
use gear_core::prelude::*;
use gear_core::repair::{NoOpReason, RepairAbort, RepairInput};
use gear_core::stat::{breakdown, ids};
use gear_core::ValidationResult;

fn stat(name: &str) -> StatId {
    StatId::from(name)
}

fn repaired(outcome: RepairOutcome) -> gear_core::repair::RepairResult {
    match outcome {
        RepairOutcome::Repaired(result) => result,
        other => panic!("expected a repair, got {:?}", other),
    }
}

#[test]
fn test_fixture_definitions_load_clean() {
    let registry = Registry::new(constants());
    let report = registry.load(&records()).unwrap();

    assert!(report.is_clean(), "{:?}", report.errors);
    assert_eq!(report.loaded, 19);
    assert_eq!(report.epoch, Some(1));

    let snapshot = registry.snapshot();
    assert!(snapshot.stats().get(&stat("chill")).is_some());
    assert_eq!(snapshot.parts_of_type(PartType::Rod).count(), 2);

    // inherited from gear:iron
    let rusty = snapshot.material(&id("gear:rusty_iron")).unwrap();
    assert_eq!(rusty.tier, 2);
    assert_eq!(rusty.stats_for(PartType::Rod).len(), 2);
    assert_eq!(rusty.traits_for(PartType::Main).len(), 3);
}

#[test]
fn test_item_matching_and_fallbacks() {
    let registry = loaded_registry();

    let by_tag = ItemPayload::new("othermod:iron_ingot").with_tag("forge:ingots/iron");
    assert_eq!(registry.match_item(&by_tag).map(|d| d.id().clone()), Some(id("gear:iron")));

    let stick = registry.match_item(&ItemPayload::new("minecraft:stick")).unwrap();
    assert!(stick.as_part().is_some());
    assert!(registry.match_item(&ItemPayload::new("minecraft:dirt")).is_none());

    assert_eq!(
        registry.fallback(PartType::Rod).map(|d| d.id().clone()),
        Some(id("gear:rod_wood"))
    );
    assert!(registry.fallback(PartType::Tip).is_none());
}

#[test]
fn test_pickaxe_stats() {
    let registry = loaded_registry();
    let snapshot = registry.snapshot();
    let gear = pickaxe();

    assert_eq!(gear.validate(&snapshot), ValidationResult::Ok);

    // mean of iron (250 x 1.15 at grade C) and gold (32)
    assert_close(value(gear.stat(&snapshot, &stat(ids::DURABILITY))), 159.75);
    assert_eq!(gear.max_durability(&snapshot), 160);
    // rod +1, then mean of 6.9 and 12
    assert_close(value(gear.stat(&snapshot, &stat(ids::HARVEST_SPEED))), 10.45);
    assert_close(value(gear.stat(&snapshot, &stat(ids::ENCHANTABILITY))), 19.05);
    assert_close(value(gear.stat(&snapshot, &stat(ids::REPAIR_EFFICIENCY))), 1.0);
    assert_close(value(gear.stat(&snapshot, &stat("chill"))), 0.0);
    assert!(gear.stat(&snapshot, &stat("luck")).is_locked());

    // armor stats are left out of the tool's stat map but still answerable
    let stats = gear.stats(&snapshot);
    assert!(!stats.is_locked());
    assert!(stats.get(&stat(ids::ARMOR)).is_locked());
    assert_close(value(gear.stat(&snapshot, &stat(ids::ARMOR))), 2.3);

    let detail = breakdown(&snapshot, gear.assembly(), gear.gear_type(), &stat(ids::DURABILITY)).unwrap();
    assert_eq!(detail.samples.len(), 2);
    assert_eq!(detail.samples[0].source, id("gear:iron"));
    assert_eq!(detail.samples[0].grade, Grade::C);

    assert_close(gear.synergy(&snapshot), 0.9);
}

#[test]
fn test_pickaxe_traits() {
    let registry = loaded_registry();
    let snapshot = registry.snapshot();
    let gear = pickaxe();

    let traits = gear.effective_traits(&snapshot, &TraitContext::new(GearType::Pickaxe));
    let levels: Vec<(String, u32)> = traits.iter().map(|t| (t.id.to_string(), t.level)).collect();
    assert_eq!(
        levels,
        vec![
            ("gear:magnetic".to_string(), 1),
            ("gear:malleable".to_string(), 2)
        ]
    );
    // one gold layer of three sources is below the 0.5 ratio
    assert_eq!(traits.level(&id("gear:lustrous")), 0);

    let rotation = snapshot.constants().display.trait_rotation_ticks;
    assert_eq!(traits.displayed(0, rotation).map(|t| t.name.as_str()), Some("Magnetic"));
    assert_eq!(traits.displayed(rotation, rotation).map(|t| t.name.as_str()), Some("Malleable"));
}

#[test]
fn test_inherited_material_on_blaze_rod() {
    let registry = loaded_registry();
    let snapshot = registry.snapshot();

    let assembly = AssemblyBuilder::new()
        .compound(id("gear:pickaxe_head"), vec![material("gear:rusty_iron", Grade::None)])
        .part(id("gear:rod_blaze"))
        .part(id("gear:coating_wax"))
        .build();
    let gear = Gear::new(GearType::Pickaxe, assembly);

    // multiply_total scales the pre-average total, which is 0 here
    assert_close(value(gear.stat(&snapshot, &stat(ids::DURABILITY))), 120.0);
    assert_close(value(gear.stat(&snapshot, &stat(ids::REPAIR_EFFICIENCY))), 1.5);

    let traits = gear.effective_traits(&snapshot, &TraitContext::new(GearType::Pickaxe));
    let names: Vec<String> = traits.iter().map(|t| t.id.to_string()).collect();
    assert_eq!(names, vec!["gear:magnetic", "gear:brittle", "gear:synergy_boost"]);
    assert_eq!(traits.visible().len(), 2);

    // main tier 2, others 3 and 1
    assert_close(gear.synergy(&snapshot), 0.9);
}

#[test]
fn test_crafting_rejects_blacklisted_material() {
    let registry = loaded_registry();
    let snapshot = registry.snapshot();

    let err = craft_compound(
        &snapshot,
        &id("gear:sword_blade"),
        &[material("gear:gold", Grade::None)],
        GearType::Sword,
    )
    .unwrap_err();
    assert!(matches!(err, CraftError::MaterialRejected { .. }));

    let blade = craft_compound(
        &snapshot,
        &id("gear:sword_blade"),
        &[material("gear:iron", Grade::B)],
        GearType::Sword,
    )
    .unwrap();
    let sword = Gear::new(
        GearType::Sword,
        AssemblyBuilder::new().crafted(blade).part(id("gear:rod_wood")).build(),
    );
    assert!(sword.validate(&snapshot).is_ok());
    assert_close(value(sword.stat(&snapshot, &stat(ids::MELEE_DAMAGE))), 2.4);
}

#[test]
fn test_incomplete_gear_is_locked() {
    let registry = loaded_registry();
    let snapshot = registry.snapshot();

    let bow = Gear::new(
        GearType::Bow,
        AssemblyBuilder::new()
            .part(id("gear:main_iron"))
            .part(id("gear:rod_wood"))
            .build(),
    );
    assert_eq!(
        bow.validate(&snapshot),
        ValidationResult::MissingRequiredSlot(PartType::Bowstring)
    );
    assert!(bow.stats(&snapshot).is_locked());
    assert_eq!(bow.max_durability(&snapshot), 0);
    assert!(bow.is_broken(&snapshot));
    assert!(bow.effective_traits(&snapshot, &TraitContext::new(GearType::Bow)).is_locked());
    assert_close(bow.synergy(&snapshot), 1.0);
}

#[test]
fn test_repair_flow() {
    let registry = loaded_registry();
    let snapshot = registry.snapshot();

    let json = std::fs::read_to_string(data_dir().join("pickaxe.json")).unwrap();
    let gear = Gear::from_json(&json).unwrap();
    assert_eq!(gear.assembly(), pickaxe().assembly());
    assert_eq!(gear.damage(), 120);
    assert_eq!(gear.repair_count(), 2);

    let kit = RepairKit::new(1000, 50);
    let gold = LooseMaterial::new(ItemPayload::new("minecraft:gold_ingot"), Grade::None);
    let ctx = RepairContext::from_inputs(
        RepairMode::Quick,
        vec![
            RepairInput::Material(gold.clone()),
            RepairInput::Gear(&gear),
            RepairInput::Material(gold.clone()),
            RepairInput::Material(LooseMaterial::new(ItemPayload::new("minecraft:string"), Grade::None)),
            RepairInput::Material(LooseMaterial::new(ItemPayload::new("minecraft:stick"), Grade::None)),
            RepairInput::Kit(&kit),
        ],
    )
    .unwrap();

    let result = repaired(repair(&registry, &ctx).unwrap());
    // two gold at their declared 20 each, then the kit's per-use cap
    assert_eq!(result.restored_by_materials, 40);
    assert_eq!(result.restored_by_kit, 50);
    assert_eq!(result.gear.damage(), 30);
    assert_eq!(result.gear.repair_count(), 3);
    assert_eq!(result.kit, Some(RepairKit::new(950, 50)));
    assert_eq!(result.consumed, vec![gold.clone(), gold]);
    assert_eq!(result.rejected.len(), 2);
    assert_eq!(result.gear.remaining_durability(&snapshot), 130);

    // inputs are unchanged
    assert_eq!(gear.damage(), 120);
    assert_eq!(kit.charge, 1000);

    // fully repaired gear has nothing left to fix
    let whole = result.gear.clone().with_damage(0);
    let ctx = RepairContext::new(&whole, RepairMode::Anvil).with_kit(&kit);
    assert_eq!(
        repair(&registry, &ctx),
        Ok(RepairOutcome::NoOp(NoOpReason::Undamaged))
    );

    let broken = Gear::new(GearType::Pickaxe, AssemblyBuilder::new().part(id("gear:rod_wood")).build())
        .with_damage(5);
    let ctx = RepairContext::new(&broken, RepairMode::Quick).with_kit(&kit);
    assert_eq!(
        repair(&registry, &ctx),
        Err(RepairAbort::InvalidTarget(ValidationResult::MissingMain))
    );
}

#[test]
fn test_gear_survives_persistence() {
    let registry = loaded_registry();
    let snapshot = registry.snapshot();
    let gear = pickaxe().with_damage(12);

    let json = gear.to_json().unwrap();
    let back = Gear::from_json(&json).unwrap();
    assert_eq!(back, gear);
    assert_eq!(back.stats(&snapshot), gear.stats(&snapshot));
}

#[test]
fn test_snapshot_replicates_to_another_registry() {
    let server = loaded_registry();
    let bytes = server.encode_snapshot().unwrap();

    let client = Registry::new(constants());
    let report = client.load_encoded(&bytes).unwrap();
    assert!(report.is_clean(), "{:?}", report.errors);

    let gear = pickaxe();
    let (server_snapshot, client_snapshot) = (server.snapshot(), client.snapshot());
    assert_eq!(gear.recalculate(&client_snapshot), gear.recalculate(&server_snapshot));
    assert_eq!(
        gear.effective_traits(&client_snapshot, &TraitContext::new(GearType::Pickaxe)),
        gear.effective_traits(&server_snapshot, &TraitContext::new(GearType::Pickaxe))
    );
}
