//! Declaration files.
//!
//! One aggregate autodoc file (every documented operation as an `@method`
//! line, then the image's default properties as `@property` lines) plus one
//! file per enum type. Files are handed to a sink one at a time, so a
//! failure part-way leaves every earlier file complete.
pub mod header;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::introspect::enums::enum_doc;
use crate::introspect::host_name;
use crate::introspect::operation::{OperationIntrospector, enum_ref_name};
use crate::ir::{EnumDoc, PropertyDoc};
use crate::registry::Registry;
use crate::typemap::{Position, TypeMapper};
use crate::walk::{self, NicknameSet};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    pub file_name: String,
    pub contents: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Fresh,
    Stale,
    Missing,
}

pub struct Emitter<'a, R: Registry + ?Sized> {
    registry: &'a R,
    config: &'a GeneratorConfig,
    mapper: TypeMapper,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl<'a, R: Registry + ?Sized> Emitter<'a, R> {
    pub fn new(registry: &'a R, config: &'a GeneratorConfig) -> Self {
        Self { registry, config, mapper: TypeMapper::new(config) }
    }

    pub fn nicknames(&self) -> Result<NicknameSet, GenerateError> {
        walk::operation_nicknames(self.registry, self.config)
    }

    /// Enum types to document. Lazily registered enums are forced first,
    /// otherwise the walk cannot see them.
    pub fn enum_names(&self) -> Result<Vec<String>, GenerateError> {
        for name in &self.config.lazy_enum_types {
            if let Err(error) = self.registry.force_registration(name) {
                warn!(%name, %error, "cannot force enum registration");
            }
        }
        walk::enum_type_names(self.registry, self.config)
    }

    pub fn properties(&self) -> Result<Vec<PropertyDoc>, GenerateError> {
        let properties = self.registry.image_properties()?;
        properties
            .iter()
            .map(|prop| {
                let host_type = self
                    .mapper
                    .map_type(&prop.ty, Position::Argument)
                    .map_err(|unmapped| GenerateError::UnmappedType {
                        context: "image property".to_string(),
                        field: prop.name.clone(),
                        ty: unmapped.0,
                    })?
                    .to_string();
                let enum_name = if prop.ty.is_enum() {
                    Some(enum_ref_name(self.config, "image property", &prop.name, &prop.ty)?)
                } else {
                    None
                };
                Ok(PropertyDoc {
                    name: host_name(&prop.name),
                    host_type,
                    blurb: prop.blurb.clone(),
                    enum_name,
                })
            })
            .collect()
    }

    pub fn autodoc(&self) -> Result<EmittedFile, GenerateError> {
        let nicknames = self.nicknames()?;
        let introspector = OperationIntrospector::new(self.registry, self.config, &self.mapper);

        let config = self.config;
        let mut out = header::preamble(&config.header, &config.namespace);
        out.push('\n');
        out.push_str(&format!("namespace {};\n\n", config.namespace));
        out.push_str("/**\n");
        out.push_str(" * Autodocs for the Image class.\n");
        out.push_str(&header::class_tags(&config.header, &config.namespace));
        out.push_str(" *\n");
        for nickname in nicknames.iter() {
            debug!(%nickname, "documenting operation");
            out.push_str(&introspector.introspect(nickname)?);
        }
        out.push_str(" *\n");
        for prop in self.properties()? {
            out.push_str(&format!(" * @property {} ${} {}\n", prop.host_type, prop.name, prop.blurb));
            if let Some(enum_name) = &prop.enum_name {
                out.push_str(&format!(" *     @see {enum_name} for possible values\n"));
            }
        }
        out.push_str(" */\n");
        out.push_str(&format!("abstract class {}\n{{\n}}\n", config.autodoc_class));

        Ok(EmittedFile {
            file_name: format!("{}.php", config.autodoc_class),
            contents: out,
        })
    }

    pub fn enum_file(&self, type_name: &str) -> Result<EmittedFile, GenerateError> {
        let doc = enum_doc(self.registry, type_name, self.config)?;
        Ok(EmittedFile {
            file_name: format!("{}.php", doc.host_name),
            contents: render_enum(&doc, self.config),
        })
    }

    /// Autodoc first, then enums in name order. Returns the file count.
    pub fn emit_all(
        &self,
        mut sink: impl FnMut(EmittedFile) -> Result<(), GenerateError>,
    ) -> Result<usize, GenerateError> {
        sink(self.autodoc()?)?;
        let enum_names = self.enum_names()?;
        for name in &enum_names {
            sink(self.enum_file(name)?)?;
        }
        Ok(1 + enum_names.len())
    }
}

pub fn render_enum(doc: &EnumDoc, config: &GeneratorConfig) -> String {
    let mut out = header::preamble(&config.header, &config.namespace);
    out.push('\n');
    out.push_str(&format!("namespace {};\n\n", config.namespace));
    out.push_str("/**\n");
    out.push_str(&format!(" * The {} enum.\n", doc.host_name));
    out.push_str(&header::class_tags(&config.header, &config.namespace));
    out.push_str(" */\n");
    out.push_str(&format!("abstract class {}\n{{\n", doc.host_name));
    for constant in &doc.constants {
        out.push_str(&format!(
            "    const {} = '{}';\n",
            constant.name,
            php_single_quoted(&constant.value)
        ));
    }
    out.push_str("}\n");
    out
}

/// Writes one file in full before returning.
pub fn write_file(dir: &Path, file: &EmittedFile) -> Result<PathBuf, GenerateError> {
    let path = dir.join(&file.file_name);
    info!("Generating {} ...", path.display());
    std::fs::create_dir_all(dir).map_err(|source| GenerateError::Io { path: dir.to_path_buf(), source })?;
    std::fs::write(&path, &file.contents).map_err(|source| GenerateError::Io { path: path.clone(), source })?;
    Ok(path)
}

pub fn check_file(dir: &Path, file: &EmittedFile) -> Result<FileStatus, GenerateError> {
    let path = dir.join(&file.file_name);
    match std::fs::read_to_string(&path) {
        Ok(existing) if existing == file.contents => Ok(FileStatus::Fresh),
        Ok(_) => Ok(FileStatus::Stale),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(FileStatus::Missing),
        Err(source) => Err(GenerateError::Io { path, source }),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn php_single_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{registry_from, sample_registry};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn autodoc_lists_operations_then_properties() {
        let registry = sample_registry();
        let config = GeneratorConfig::default();
        let file = Emitter::new(&registry, &config).autodoc().unwrap();
        assert_eq!(file.file_name, "ImageAutodoc.php");

        let text = &file.contents;
        assert!(text.contains("\nnamespace Jcupitt\\Vips;\n\n/**\n * Autodocs for the Image class.\n"));
        assert!(text.ends_with(
            " * @property integer $page_height Page height in pixels\n \
             */\nabstract class ImageAutodoc\n{\n}\n"
        ));
        assert!(text.contains(
            " * @property string $format Pixel format in image\n \
             *     @see BandFormat for possible values\n"
        ));

        let methods: Vec<&str> = text
            .lines()
            .filter_map(|line| line.strip_prefix(" * @method "))
            .map(|rest| {
                let open = rest.find('(').unwrap();
                rest[..open].rsplit(' ').next().unwrap()
            })
            .collect();
        let mut sorted = methods.clone();
        sorted.sort();
        assert_eq!(methods, sorted);
        assert!(methods.contains(&"crop"));
        assert!(!methods.contains(&"bandjoin"));
        assert!(!methods.contains(&"ifthenelse"));
        assert!(!methods.contains(&"add"));
        assert!(!methods.contains(&"im_old"));
    }

    #[test]
    fn generation_is_deterministic() {
        let config = GeneratorConfig::default();
        let mut first = Vec::new();
        let mut second = Vec::new();
        let a = sample_registry();
        Emitter::new(&a, &config)
            .emit_all(|file| {
                first.push(file);
                Ok(())
            })
            .unwrap();
        let b = sample_registry();
        Emitter::new(&b, &config)
            .emit_all(|file| {
                second.push(file);
                Ok(())
            })
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn every_enum_gets_its_own_file() {
        let registry = sample_registry();
        let config = GeneratorConfig::default();
        let mut names = Vec::new();
        let count = Emitter::new(&registry, &config)
            .emit_all(|file| {
                names.push(file.file_name);
                Ok(())
            })
            .unwrap();
        assert_eq!(count, names.len());
        assert_eq!(
            names,
            vec![
                "ImageAutodoc.php",
                "BandFormat.php",
                "BlendMode.php",
                "Direction.php",
                "FailOn.php",
                "ImageType.php",
                "OperationBoolean.php",
                "OperationRelational.php",
                "Saveable.php",
                "Token.php",
            ]
        );
    }

    #[test]
    fn enum_file_layout() {
        let registry = sample_registry();
        let config = GeneratorConfig::default();
        let file = Emitter::new(&registry, &config).enum_file("VipsBlendMode").unwrap();
        assert_eq!(file.file_name, "BlendMode.php");
        assert!(file.contents.starts_with("<?php\n"));
        assert!(file.contents.ends_with(
            "\nnamespace Jcupitt\\Vips;\n\n/**\n * The BlendMode enum.\n \
             * @category  Images\n \
             * @package   Jcupitt\\Vips\n \
             * @author    John Cupitt <jcupitt@gmail.com>\n \
             * @copyright 2016 John Cupitt\n \
             * @license   https://opensource.org/licenses/MIT MIT\n \
             * @link      https://github.com/jcupitt/php-vips\n \
             */\nabstract class BlendMode\n{\n    \
             const CLEAR = 'clear';\n    \
             const SOURCE = 'source';\n    \
             const OVER = 'over';\n    \
             const XOR1 = 'xor';\n    \
             const DEST_OVER = 'dest-over';\n\
             }\n"
        ));
    }

    #[test]
    fn failures_keep_earlier_files() {
        let registry = registry_from(json!({
            "types": [
                { "name": "VipsOperation", "parent": "GObject", "abstract": true },
                { "name": "VipsAaa", "parent": "GEnum" },
                { "name": "VipsBad", "parent": "GEnum" }
            ],
            "enums": { "VipsAaa": ["one"], "VipsBad": ["8bit"] }
        }));
        let config = GeneratorConfig { synonyms: vec![], ..Default::default() };
        let dir = tempfile::tempdir().unwrap();
        let err = Emitter::new(&registry, &config)
            .emit_all(|file| write_file(dir.path(), &file).map(|_| ()))
            .unwrap_err();
        assert!(err.to_string().contains("VipsBad"));
        assert!(dir.path().join("ImageAutodoc.php").exists());
        assert!(dir.path().join("Aaa.php").exists());
        assert!(!dir.path().join("Bad.php").exists());
    }

    #[test]
    fn io_failures_abort_the_run() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let out_dir = blocker.join("out");

        let file = EmittedFile { file_name: "Direction.php".to_string(), contents: "<?php\n".to_string() };
        let err = write_file(&out_dir, &file).unwrap_err();
        assert!(matches!(&err, GenerateError::Io { path, .. } if *path == out_dir));
        assert!(err.to_string().contains(&out_dir.display().to_string()));

        let registry = sample_registry();
        let config = GeneratorConfig::default();
        let mut attempted = Vec::new();
        let err = Emitter::new(&registry, &config)
            .emit_all(|file| {
                attempted.push(file.file_name.clone());
                write_file(&out_dir, &file).map(|_| ())
            })
            .unwrap_err();
        assert!(matches!(err, GenerateError::Io { .. }));
        assert_eq!(attempted, vec!["ImageAutodoc.php"]);
        assert!(!root.path().join("BandFormat.php").exists());
    }

    #[test]
    fn check_detects_drift() {
        let dir = tempfile::tempdir().unwrap();
        let file = EmittedFile { file_name: "Direction.php".to_string(), contents: "<?php\n".to_string() };
        assert_eq!(check_file(dir.path(), &file).unwrap(), FileStatus::Missing);
        write_file(dir.path(), &file).unwrap();
        assert_eq!(check_file(dir.path(), &file).unwrap(), FileStatus::Fresh);
        let changed = EmittedFile { contents: "<?php\n// edited\n".to_string(), ..file };
        assert_eq!(check_file(dir.path(), &changed).unwrap(), FileStatus::Stale);
    }

    #[test]
    fn quotes_in_values_are_escaped() {
        let doc = EnumDoc {
            host_name: "Odd".to_string(),
            constants: vec![crate::ir::EnumConstant { name: "IT_S".to_string(), value: "it's".to_string() }],
        };
        let text = render_enum(&doc, &GeneratorConfig::default());
        assert!(text.contains("    const IT_S = 'it\\'s';\n"));
    }
}
