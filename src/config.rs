//! Generator configuration.
//!
//! Every table the generator consults (deny-list, synonyms, reserved
//! names, type overrides) lives here and is handed to the components that
//! need it. Defaults reproduce the php-vips layout; a JSON file passed with
//! `--config` overrides any subset of fields.
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::path_de::{self, PathError};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Stripped from type names in `@see` lines and enum file names.
    pub library_prefix: String,
    pub namespace: String,
    pub operation_root: String,
    pub enum_root: String,
    pub autodoc_class: String,
    /// Operations the host binding implements by hand.
    pub deny_list: Vec<String>,
    /// Nicknames documented even though the walk does not find them.
    pub synonyms: Vec<String>,
    /// Enum types that must be registered before the walk can see them.
    pub lazy_enum_types: Vec<String>,
    pub reserved_names: IndexMap<String, String>,
    pub unknown_types: UnknownTypePolicy,
    /// Exact type name → host type, argument position.
    pub argument_overrides: IndexMap<String, String>,
    /// Exact type name → host type, result position.
    pub result_overrides: IndexMap<String, String>,
    pub header: HeaderConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTypePolicy {
    /// Emit `<unknown type>` and keep going.
    #[default]
    Sentinel,
    /// Abort on the first unmapped type.
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub php_version: String,
    pub copyright_year: String,
    pub copyright_holder: String,
    pub category: String,
    pub author: String,
    pub license: String,
    pub link: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Decode(#[from] PathError),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Default for GeneratorConfig {
    fn default() -> Self {
        let reserved_names = [("DEFAULT", "DEFAULT1"), ("XOR", "XOR1"), ("AND", "AND1"), ("OR", "OR1")]
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        Self {
            library_prefix: "Vips".to_string(),
            namespace: "Jcupitt\\Vips".to_string(),
            operation_root: "VipsOperation".to_string(),
            enum_root: "GEnum".to_string(),
            autodoc_class: "ImageAutodoc".to_string(),
            deny_list: strings(&[
                "bandjoin",
                "bandrank",
                "ifthenelse",
                "add",
                "subtract",
                "multiply",
                "divide",
                "remainder",
            ]),
            synonyms: strings(&["crop"]),
            lazy_enum_types: strings(&["VipsToken", "VipsSaveable", "VipsImageType"]),
            reserved_names,
            unknown_types: UnknownTypePolicy::default(),
            argument_overrides: IndexMap::new(),
            result_overrides: IndexMap::new(),
            header: HeaderConfig::default(),
        }
    }
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            php_version: "7".to_string(),
            copyright_year: "2016".to_string(),
            copyright_holder: "John Cupitt".to_string(),
            category: "Images".to_string(),
            author: "John Cupitt <jcupitt@gmail.com>".to_string(),
            license: "https://opensource.org/licenses/MIT MIT".to_string(),
            link: "https://github.com/jcupitt/php-vips".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Ok(path_de::from_str_with_path(&source)?)
    }

    /// `Vips` + `BlendMode` → `BlendMode`; names without the prefix pass through.
    pub fn strip_prefix<'a>(&self, type_name: &'a str) -> &'a str {
        type_name
            .strip_prefix(self.library_prefix.as_str())
            .unwrap_or(type_name)
    }
}

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|x| x.to_string()).collect()
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
