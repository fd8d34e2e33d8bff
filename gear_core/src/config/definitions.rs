//! Definition files - TOML documents turned into raw registry records

use super::ConfigError;
use crate::registry::{RawRecord, RecordKind};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One definition document; every array is optional
#[derive(Debug, Default, Deserialize)]
struct DefinitionsFile {
    #[serde(default)]
    stat: Vec<toml::Value>,
    #[serde(default, rename = "trait")]
    traits: Vec<toml::Value>,
    #[serde(default)]
    part: Vec<toml::Value>,
    #[serde(default)]
    material: Vec<toml::Value>,
}

/// Parse a definition document into raw records (stats, traits, parts, materials)
pub fn parse_definitions(content: &str) -> Result<Vec<RawRecord>, ConfigError> {
    let file: DefinitionsFile = super::parse_toml(content)?;

    let mut records = Vec::new();
    for (kind, bodies) in [
        (RecordKind::Stat, file.stat),
        (RecordKind::Trait, file.traits),
        (RecordKind::Part, file.part),
        (RecordKind::Material, file.material),
    ] {
        for (index, body) in bodies.into_iter().enumerate() {
            let id = body
                .get("id")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    ConfigError::Invalid(format!("{} entry #{} has no id", kind, index + 1))
                })?;
            records.push(RawRecord { kind, id, body });
        }
    }

    Ok(records)
}

/// Load one definition file
pub fn load_definitions(path: &Path) -> Result<Vec<RawRecord>, ConfigError> {
    parse_definitions(&super::read_file(path)?)
}

/// Load every `*.toml` file of a directory, in sorted path order
pub fn load_definitions_dir(dir: &Path) -> Result<Vec<RawRecord>, ConfigError> {
    let entries = fs::read_dir(dir).map_err(|source| ConfigError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    let mut records = Vec::new();
    for path in paths {
        records.extend(load_definitions(&path)?);
    }
    Ok(records)
}
