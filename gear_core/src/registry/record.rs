//! Raw records - the flat, format-neutral form definitions travel in

use super::LoadError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which catalog a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Stat,
    Trait,
    Part,
    Material,
}

impl RecordKind {
    pub fn name(self) -> &'static str {
        match self {
            RecordKind::Stat => "stat",
            RecordKind::Trait => "trait",
            RecordKind::Part => "part",
            RecordKind::Material => "material",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One definition as handed over by an external loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub kind: RecordKind,
    pub id: String,
    pub body: toml::Value,
}

impl RawRecord {
    pub fn new(kind: RecordKind, id: impl Into<String>, body: toml::Value) -> Self {
        RawRecord {
            kind,
            id: id.into(),
            body,
        }
    }

    /// Build a record from a typed body; the id is written into the body too
    pub fn encode<T: Serialize>(
        kind: RecordKind,
        id: impl Into<String>,
        body: &T,
    ) -> Result<Self, toml::ser::Error> {
        let id = id.into();
        let mut value = toml::Value::try_from(body)?;
        if let toml::Value::Table(table) = &mut value {
            table.insert("id".to_string(), toml::Value::String(id.clone()));
        }
        Ok(RawRecord::new(kind, id, value))
    }

    /// Deserialize the body into a typed record; the record id fills a missing `id` key
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, LoadError> {
        let mut body = self.body.clone();
        match &mut body {
            toml::Value::Table(table) => {
                table
                    .entry("id")
                    .or_insert_with(|| toml::Value::String(self.id.clone()));
            }
            other => {
                return Err(LoadError::Parse(format!(
                    "expected a table, found {}",
                    other.type_str()
                )))
            }
        }
        body.try_into::<T>()
            .map_err(|e| LoadError::Parse(e.to_string()))
    }
}
