//! Hot reload while readers are querying

mod common;

use common::*;
use gear_core::config::parse_definitions;
use gear_core::prelude::*;
use gear_core::stat::ids;
use gear_core::ReloadError;
use std::sync::atomic::{AtomicBool, Ordering};

/// Fixture records with iron's MAIN durability replaced
fn records_with_iron_durability(durability: f64) -> Vec<RawRecord> {
    let mut records = records();
    let extra = parse_definitions(&format!(
        r#"
[[material]]
id = "gear:iron"
tier = 2
ingredient = {{ items = ["minecraft:iron_ingot"] }}
[material.stats]
main = [{{ stat = "durability", value = {} }}]
"#,
        durability
    ))
    .unwrap();
    records.retain(|r| r.id != "gear:iron");
    records.extend(extra);
    records
}

#[test]
fn test_reload_bumps_epoch_and_invalidates_caches() {
    let registry = loaded_registry();
    let gear = pickaxe();
    let before = registry.snapshot();
    assert_eq!(gear.max_durability(&before), 160);
    assert_eq!(
        registry.match_item(&ItemPayload::new("minecraft:iron_ingot")).map(|d| d.id().clone()),
        Some(id("gear:iron"))
    );

    let report = registry.load(&records_with_iron_durability(500.0)).unwrap();
    assert!(report.is_clean(), "{:?}", report.errors);
    let after = registry.snapshot();
    assert_eq!(after.epoch(), before.epoch() + 1);

    // (500 x 1.15 + 32) / 2
    assert_eq!(gear.max_durability(&after), 304);
    // the old snapshot still answers with the old data
    assert_eq!(gear.max_durability(&before), 160);
}

#[test]
fn test_registries_at_same_epoch_keep_separate_stats() {
    let standard = loaded_registry();
    let reinforced = Registry::new(constants());
    reinforced.load(&records_with_iron_durability(500.0)).unwrap();
    assert_eq!(standard.epoch(), reinforced.epoch());

    let gear = pickaxe();
    assert_eq!(gear.max_durability(&standard.snapshot()), 160);
    assert_eq!(gear.max_durability(&reinforced.snapshot()), 304);

    let replica = Registry::new(constants());
    replica.load_encoded(&reinforced.encode_snapshot().unwrap()).unwrap();
    assert_eq!(replica.epoch(), standard.epoch());
    assert_eq!(gear.max_durability(&standard.snapshot()), 160);
    assert_eq!(gear.max_durability(&replica.snapshot()), 304);
}

#[test]
fn test_failed_reload_keeps_current_snapshot() {
    let registry = loaded_registry();
    let epoch = registry.epoch();

    assert!(matches!(registry.load(&[]), Err(ReloadError::Empty)));

    let broken = parse_definitions(
        r#"
[[part]]
id = "gear:rod_broken"
slot = "rod"
stats = [{ stat = "luck", value = 1 }]
"#,
    )
    .unwrap();
    match registry.load(&broken) {
        Err(ReloadError::NothingLoaded { report }) => {
            assert!(report.error_for("gear:rod_broken").is_some());
        }
        other => panic!("expected NothingLoaded, got {:?}", other),
    }

    assert_eq!(registry.epoch(), epoch);
    assert!(registry.get(&id("gear:iron")).is_some());
}

#[test]
fn test_readers_never_see_a_torn_snapshot() {
    let registry = loaded_registry();
    let low = records_with_iron_durability(250.0);
    let high = records_with_iron_durability(500.0);
    let done = AtomicBool::new(false);

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for round in 0..50 {
                let batch = if round % 2 == 0 { &high } else { &low };
                registry.load(batch).unwrap();
            }
            done.store(true, Ordering::Release);
        });

        for _ in 0..4 {
            scope.spawn(|| {
                let gear = pickaxe();
                let durability = StatId::from(ids::DURABILITY);
                let mut last_epoch = 0;
                while !done.load(Ordering::Acquire) {
                    let snapshot = registry.snapshot();
                    assert!(snapshot.epoch() >= last_epoch);
                    last_epoch = snapshot.epoch();

                    let declared = snapshot
                        .material(&id("gear:iron"))
                        .and_then(|m| m.stats_for(PartType::Main).first().map(|s| s.value))
                        .unwrap();
                    let expected = (declared * 1.15 + 32.0) / 2.0;
                    let actual = value(gear.stat(&snapshot, &durability));
                    assert!((actual - expected).abs() < 1e-9, "{} vs {}", actual, expected);
                }
            });
        }
    });

    assert_eq!(registry.epoch(), 51);
}
