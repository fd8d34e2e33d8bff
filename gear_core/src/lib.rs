//! gear_core - Composite gear built from parts and materials
//!
//! This library provides:
//! - Registry: hot-reloadable Part/Material catalog published as immutable snapshots
//! - Assembly: one gear instance as an arena of part references, with validation
//! - Stat aggregation: fixed-order modifier pipeline with grade scaling and synergy
//! - Trait resolution: summed, clamped and condition-gated trait levels
//! - Repair: loose-material and repair-kit durability restoration

pub mod assembly;
pub mod config;
pub mod gear;
pub mod prelude;
pub mod registry;
pub mod repair;
pub mod stat;
pub mod traits;
pub mod types;

// Re-export core types for convenience
pub use assembly::{Assembly, AssemblyBuilder, MaterialRef, PartRef, ValidationResult};
pub use config::GearConstants;
pub use gear::{excluded_stats, relevant_stats, Gear};
pub use registry::{Definition, LoadError, LoadReport, RawRecord, Registry, ReloadError, Snapshot};
pub use repair::{repair, RepairContext, RepairKit, RepairMode, RepairOutcome};
pub use stat::{StatId, StatModifier, StatOp, StatResult};
pub use traits::{EffectiveTraits, TraitContext};
pub use types::{DefinitionId, GearType, Grade, ItemPayload, PartType};
