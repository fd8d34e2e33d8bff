//! Argument definitions

use clap::{Args, Parser, Subcommand};
use gear_core::repair::{LooseMaterial, RepairKit, RepairMode};
use gear_core::{Grade, ItemPayload};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gear-inspect", version, about = "Inspect gear definitions, stats, traits and repairs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print every stat of a gear item
    Stats(GearArgs),
    /// Print the effective traits of a gear item
    Traits(TraitsArgs),
    /// Run a repair against a gear item
    Repair(RepairArgs),
    /// Print the loaded catalog as the replication record list (JSON)
    Dump(DefsArgs),
}

#[derive(Args, Debug)]
pub struct DefsArgs {
    /// Definition file, or directory of `*.toml` definition files
    #[arg(long)]
    pub defs: PathBuf,

    /// Constants file (defaults apply when omitted)
    #[arg(long)]
    pub constants: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GearArgs {
    #[command(flatten)]
    pub defs: DefsArgs,

    /// Persisted gear item (JSON)
    #[arg(long)]
    pub gear: PathBuf,

    /// Show where each modifier of every stat came from
    #[arg(long)]
    pub breakdown: bool,
}

#[derive(Args, Debug)]
pub struct TraitsArgs {
    #[command(flatten)]
    pub defs: DefsArgs,

    #[arg(long)]
    pub gear: PathBuf,

    /// Resolve as if the wearer had a full matching armor set
    #[arg(long)]
    pub full_set: bool,
}

#[derive(Args, Debug)]
pub struct RepairArgs {
    #[command(flatten)]
    pub defs: DefsArgs,

    #[arg(long)]
    pub gear: PathBuf,

    /// Loose material as `item` or `item@GRADE`, repeatable
    #[arg(long = "material", value_parser = parse_material)]
    pub materials: Vec<LooseMaterial>,

    /// Repair kit as `charge:cap`
    #[arg(long, value_parser = parse_kit)]
    pub kit: Option<RepairKit>,

    #[arg(long, default_value = "quick")]
    pub mode: RepairMode,

    /// Write the repaired gear back to the gear file
    #[arg(long)]
    pub write: bool,
}

fn parse_material(s: &str) -> Result<LooseMaterial, String> {
    let (item, grade) = match s.split_once('@') {
        Some((item, grade)) => (item, grade.parse::<Grade>()?),
        None => (s, Grade::None),
    };
    if item.is_empty() {
        return Err("material item id is empty".to_string());
    }
    Ok(LooseMaterial::new(ItemPayload::new(item), grade))
}

fn parse_kit(s: &str) -> Result<RepairKit, String> {
    let (charge, cap) = s
        .split_once(':')
        .ok_or_else(|| format!("expected charge:cap, got '{}'", s))?;
    let charge = charge.parse().map_err(|e| format!("bad kit charge: {}", e))?;
    let cap = cap.parse().map_err(|e| format!("bad kit cap: {}", e))?;
    Ok(RepairKit::new(charge, cap))
}
