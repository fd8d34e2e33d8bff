//! Load-time error taxonomy

use super::LoadReport;
use crate::stat::{StatId, StatOp};
use crate::types::{DefinitionId, IdError};
use thiserror::Error;

/// A definition referencing something the catalogs do not declare
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataIntegrityError {
    #[error("unknown stat '{0}'")]
    UnknownStat(StatId),
    #[error("stat '{stat}' does not support operation '{op}'")]
    UnsupportedOperation { stat: StatId, op: StatOp },
    #[error("unknown trait '{0}'")]
    UnknownTrait(DefinitionId),
    #[error("trait '{0}' has level 0")]
    ZeroTraitLevel(DefinitionId),
}

/// Why a single definition was rejected; never aborts the batch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    InvalidId(#[from] IdError),
    #[error("duplicate id ({occurrences} definitions in one batch)")]
    Duplicate { occurrences: usize },
    #[error("parent '{0}' is missing or failed to load")]
    MissingParent(String),
    #[error("parent chain forms a cycle")]
    ParentCycle,
    #[error("invalid definition: {0}")]
    Invalid(String),
    #[error("data integrity: {0}")]
    Integrity(#[from] DataIntegrityError),
}

/// A reload that did not publish a new snapshot
#[derive(Error, Debug)]
pub enum ReloadError {
    #[error("reload batch is empty")]
    Empty,
    #[error("no definition in the batch loaded ({} errors)", .report.errors.len())]
    NothingLoaded { report: LoadReport },
    #[error("failed to decode snapshot stream: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A snapshot that could not be written to the replication stream
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("failed to encode record: {0}")]
    Record(#[from] toml::ser::Error),
    #[error("failed to encode snapshot stream: {0}")]
    Stream(#[from] serde_json::Error),
}
