//! Subcommand implementations

use crate::args::{DefsArgs, GearArgs, RepairArgs, TraitsArgs};
use anyhow::{Context, Result};
use gear_core::config::{load_definitions, load_definitions_dir};
use gear_core::gear::durability_stat;
use gear_core::repair::{repair, RepairContext, RepairOutcome};
use gear_core::stat::breakdown;
use gear_core::{relevant_stats, Gear, GearConstants, Registry, StatResult, TraitContext};
use std::fs;
use tracing::{info, warn};

/// Load constants and definitions into a fresh registry
fn load_registry(args: &DefsArgs) -> Result<Registry> {
    let constants = match &args.constants {
        Some(path) => GearConstants::load(path)
            .with_context(|| format!("loading constants from {}", path.display()))?,
        None => GearConstants::default(),
    };

    let records = if args.defs.is_dir() {
        load_definitions_dir(&args.defs)
    } else {
        load_definitions(&args.defs)
    }
    .with_context(|| format!("reading definitions from {}", args.defs.display()))?;

    let registry = Registry::new(constants);
    let report = registry.load(&records).context("definition reload failed")?;
    for (id, err) in &report.errors {
        warn!(%id, %err, "definition skipped");
    }
    info!(loaded = report.loaded, rejected = report.errors.len(), "definitions loaded");
    Ok(registry)
}

fn load_gear(path: &std::path::Path) -> Result<Gear> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Gear::from_json(&json).with_context(|| format!("parsing gear {}", path.display()))
}

fn format_stat(result: StatResult) -> String {
    match result {
        StatResult::Value(v) => format!("{:.2}", v),
        StatResult::Locked => "locked".to_string(),
    }
}

pub fn stats(args: GearArgs) -> Result<()> {
    let registry = load_registry(&args.defs)?;
    let snapshot = registry.snapshot();
    let gear = load_gear(&args.gear)?;

    println!("{} ({:?})", gear.gear_type(), gear.validate(&snapshot));
    println!(
        "durability: {}/{} (damage {}, repaired {} times)",
        gear.remaining_durability(&snapshot),
        gear.max_durability(&snapshot),
        gear.damage(),
        gear.repair_count()
    );
    println!("synergy: {:.3}", gear.synergy(&snapshot));
    println!();

    let relevant = relevant_stats(gear.gear_type());
    for (id, result) in gear.stats(&snapshot).iter() {
        let marker = if relevant.contains(&id.as_str()) { "*" } else { " " };
        println!("{} {:<20} {}", marker, id.as_str(), format_stat(result));

        if args.breakdown {
            if let Some(detail) = breakdown(&snapshot, gear.assembly(), gear.gear_type(), id) {
                for sample in &detail.samples {
                    println!(
                        "      {:<16} {:<24} {:>10.3} ({})",
                        sample.op.name(),
                        sample.source.to_string(),
                        sample.magnitude,
                        sample.grade.name()
                    );
                }
            }
        }
    }
    Ok(())
}

pub fn traits(args: TraitsArgs) -> Result<()> {
    let registry = load_registry(&args.defs)?;
    let snapshot = registry.snapshot();
    let gear = load_gear(&args.gear)?;

    let ctx = TraitContext::new(gear.gear_type()).with_full_set(args.full_set);
    let traits = gear.effective_traits(&snapshot, &ctx);
    if traits.is_locked() {
        println!("locked ({:?})", gear.validate(&snapshot));
        return Ok(());
    }
    if traits.is_empty() {
        println!("no traits");
    }
    for t in traits.iter() {
        let hidden = if t.visible { "" } else { " (hidden)" };
        println!("{:<24} {:<20} {}{}", t.id.to_string(), t.name, t.level, hidden);
    }
    Ok(())
}

pub fn repair_gear(args: RepairArgs) -> Result<()> {
    let registry = load_registry(&args.defs)?;
    let gear = load_gear(&args.gear)?;

    let mut ctx = RepairContext::new(&gear, args.mode);
    for material in &args.materials {
        ctx = ctx.with_material(material.clone());
    }
    if let Some(kit) = args.kit.as_ref() {
        ctx = ctx.with_kit(kit);
    }

    match repair(&registry, &ctx)? {
        RepairOutcome::NoOp(reason) => {
            println!("nothing repaired ({:?})", reason);
        }
        RepairOutcome::Repaired(result) => {
            let snapshot = registry.snapshot();
            println!(
                "restored {} ({} from materials, {} from kit)",
                result.restored(),
                result.restored_by_materials,
                result.restored_by_kit
            );
            println!(
                "{}: {}/{}",
                durability_stat(result.gear.gear_type()),
                result.gear.remaining_durability(&snapshot),
                result.gear.max_durability(&snapshot)
            );
            for m in &result.rejected {
                println!("rejected {}", m.item.item);
            }
            if let Some(kit) = result.kit {
                println!("kit charge left: {}", kit.charge);
            }

            if args.write {
                fs::write(&args.gear, result.gear.to_json()?)
                    .with_context(|| format!("writing {}", args.gear.display()))?;
                info!(path = %args.gear.display(), "repaired gear written");
            }
        }
    }
    Ok(())
}

pub fn dump(args: DefsArgs) -> Result<()> {
    let registry = load_registry(&args)?;
    let bytes = registry.encode_snapshot()?;
    let records: serde_json::Value = serde_json::from_slice(&bytes)?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
