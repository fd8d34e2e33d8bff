//! Prelude module for convenient imports
//!
//! ```rust
//! use gear_core::prelude::*;
//! ```

// Core types
pub use crate::types::{DefinitionId, GearGroup, GearType, Grade, ItemPayload, PartType};

// Registry
pub use crate::registry::{Definition, LoadReport, RawRecord, Registry, Snapshot};

// Assembly
pub use crate::assembly::{craft_compound, Assembly, AssemblyBuilder, MaterialRef, PartRef};

// Stats and traits
pub use crate::stat::{StatId, StatMap, StatOp, StatResult};
pub use crate::traits::{EffectiveTraits, TraitContext};

// Gear and repair
pub use crate::gear::Gear;
pub use crate::repair::{repair, LooseMaterial, RepairContext, RepairKit, RepairMode, RepairOutcome};

// Config
pub use crate::config::{load_definitions, load_definitions_dir, GearConstants};
