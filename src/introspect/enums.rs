use std::collections::HashSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::ir::{EnumConstant, EnumDoc};
use crate::registry::{Registry, RegistryError};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

/// `dest-over` → `DEST_OVER`, then the reserved-name table.
pub fn constant_name(value: &str, reserved: &IndexMap<String, String>) -> String {
    let name = value.replace('-', "_").to_uppercase();
    match reserved.get(&name) {
        Some(replacement) => replacement.clone(),
        None => name,
    }
}

/// Constants for one enum type, in registration order. Literal values are
/// the registry strings, untouched.
pub fn enum_doc<R>(registry: &R, type_name: &str, config: &GeneratorConfig) -> Result<EnumDoc, GenerateError>
where
    R: Registry + ?Sized,
{
    let ty = registry
        .type_from_name(type_name)
        .ok_or_else(|| RegistryError::UnknownType(type_name.to_string()))?;
    let values = registry.enum_values(ty)?;

    let mut seen = HashSet::new();
    let mut constants = Vec::with_capacity(values.len());
    for value in values {
        let name = constant_name(&value, &config.reserved_names);
        if !IDENTIFIER.is_match(&name) || !seen.insert(name.clone()) {
            return Err(GenerateError::InvalidConstant {
                enum_name: type_name.to_string(),
                value,
                constant: name,
            });
        }
        constants.push(EnumConstant { name, value });
    }

    Ok(EnumDoc {
        host_name: config.strip_prefix(type_name).to_string(),
        constants,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{registry_from, sample_registry};
    use serde_json::json;

    #[test]
    fn reserved_names_are_rewritten_but_values_are_not() {
        let registry = registry_from(json!({
            "types": [{ "name": "VipsLevel", "parent": "GEnum" }],
            "enums": { "VipsLevel": ["error", "warning", "default"] }
        }));
        let doc = enum_doc(&registry, "VipsLevel", &GeneratorConfig::default()).unwrap();
        assert_eq!(doc.host_name, "Level");
        let pairs: Vec<(&str, &str)> = doc
            .constants
            .iter()
            .map(|c| (c.name.as_str(), c.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("ERROR", "error"), ("WARNING", "warning"), ("DEFAULT1", "default")]);
    }

    #[test]
    fn every_registered_value_becomes_one_constant() {
        let registry = sample_registry();
        let config = GeneratorConfig::default();
        let doc = enum_doc(&registry, "VipsOperationBoolean", &config).unwrap();
        let ty = registry.type_from_name("VipsOperationBoolean").unwrap();
        let values = registry.enum_values(ty).unwrap();

        assert_eq!(doc.constants.len(), values.len());
        for constant in &doc.constants {
            assert!(values.contains(&constant.value));
        }
        let names: Vec<&str> = doc.constants.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["AND1", "OR1", "EOR", "LSHIFT", "RSHIFT"]);
    }

    #[test]
    fn hyphens_become_underscores() {
        let reserved = GeneratorConfig::default().reserved_names;
        assert_eq!(constant_name("dest-over", &reserved), "DEST_OVER");
        assert_eq!(constant_name("xor", &reserved), "XOR1");
        assert_eq!(constant_name("rgb-cmyk", &reserved), "RGB_CMYK");
    }

    #[test]
    fn colliding_or_invalid_constants_are_fatal() {
        let registry = registry_from(json!({
            "types": [
                { "name": "VipsClash", "parent": "GEnum" },
                { "name": "VipsDigits", "parent": "GEnum" }
            ],
            "enums": {
                "VipsClash": ["dest-over", "dest_over"],
                "VipsDigits": ["8bit"]
            }
        }));
        let config = GeneratorConfig::default();
        let err = enum_doc(&registry, "VipsClash", &config).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidConstant { constant, .. } if constant == "DEST_OVER"));
        let err = enum_doc(&registry, "VipsDigits", &config).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidConstant { value, .. } if value == "8bit"));
    }
}
