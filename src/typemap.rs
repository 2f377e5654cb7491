//! Registry type → PHP type name.
//!
//! Two tables, one per position. They only disagree on the array kinds: an
//! argument accepts either a list or a single element, a result is always a
//! plain `array`.
use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::config::{GeneratorConfig, UnknownTypePolicy};
use crate::registry::{Fundamental, TypeDescriptor};

pub const UNKNOWN_TYPE: &str = "<unknown type>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Argument,
    Result,
}

#[derive(Debug, Clone)]
pub struct TypeTable {
    by_name: IndexMap<String, String>,
    by_kind: BTreeMap<Fundamental, String>,
}

#[derive(Debug, Clone)]
pub struct TypeMapper {
    argument: TypeTable,
    result: TypeTable,
    policy: UnknownTypePolicy,
}

/// Raised only under [`UnknownTypePolicy::Fail`].
#[derive(Debug, thiserror::Error)]
#[error("no host type for {0}")]
pub struct UnmappedType(pub String);

impl TypeTable {
    pub fn new(by_kind: BTreeMap<Fundamental, String>, by_name: IndexMap<String, String>) -> Self {
        Self { by_name, by_kind }
    }

    pub fn argument_defaults() -> BTreeMap<Fundamental, String> {
        let mut table = Self::scalar_defaults();
        table.insert(Fundamental::ArrayInt, "integer[]|integer".to_string());
        table.insert(Fundamental::ArrayDouble, "float[]|float".to_string());
        table.insert(Fundamental::ArrayImage, "Image[]|Image".to_string());
        table
    }

    pub fn result_defaults() -> BTreeMap<Fundamental, String> {
        let mut table = Self::scalar_defaults();
        for kind in [Fundamental::ArrayInt, Fundamental::ArrayDouble, Fundamental::ArrayImage] {
            table.insert(kind, "array".to_string());
        }
        table
    }

    fn scalar_defaults() -> BTreeMap<Fundamental, String> {
        [
            (Fundamental::Bool, "bool"),
            (Fundamental::Int, "integer"),
            (Fundamental::Double, "float"),
            (Fundamental::String, "string"),
            (Fundamental::RefString, "string"),
            (Fundamental::Enum, "string"),
            (Fundamental::Flags, "integer"),
            (Fundamental::Object, "string"),
            (Fundamental::Image, "Image"),
            (Fundamental::Blob, "string"),
        ]
        .into_iter()
        .map(|(kind, name)| (kind, name.to_string()))
        .collect()
    }

    /// Exact type name first, then the fundamental kind.
    pub fn lookup(&self, ty: &TypeDescriptor) -> Option<&str> {
        let exact = ty.name.as_deref().and_then(|name| self.by_name.get(name));
        exact
            .or_else(|| self.by_kind.get(&ty.fundamental))
            .map(String::as_str)
    }
}

impl TypeMapper {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            argument: TypeTable::new(TypeTable::argument_defaults(), config.argument_overrides.clone()),
            result: TypeTable::new(TypeTable::result_defaults(), config.result_overrides.clone()),
            policy: config.unknown_types,
        }
    }

    pub fn map_type(&self, ty: &TypeDescriptor, position: Position) -> Result<&str, UnmappedType> {
        let table = match position {
            Position::Argument => &self.argument,
            Position::Result => &self.result,
        };
        if let Some(name) = table.lookup(ty) {
            return Ok(name);
        }
        let shown = ty.name.clone().unwrap_or_else(|| format!("{:?}", ty.fundamental));
        match self.policy {
            UnknownTypePolicy::Sentinel => {
                tracing::warn!(ty = %shown, "no host type mapping, emitting sentinel");
                Ok(UNKNOWN_TYPE)
            }
            UnknownTypePolicy::Fail => Err(UnmappedType(shown)),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
