//! CLI: snapshot → (PHP declaration files | operation report | name lists)
use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::info;

use vips_stubgen::config::{GeneratorConfig, UnknownTypePolicy};
use vips_stubgen::emit::{self, Emitter, FileStatus};
use vips_stubgen::introspect::{self, OperationIntrospector};
use vips_stubgen::registry::{Snapshot, SnapshotRegistry};
use vips_stubgen::typemap::TypeMapper;
use vips_stubgen::{jq_exec, path_de};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate PHP stub declarations (magic methods, properties, enum constants) from a libvips registry snapshot
#[derive(Parser, Debug)]
#[command(version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// write the autodoc file and one file per enum
    Generate(GenerateOut),
    /// print how one operation's arguments are classified
    Introspect(IntrospectOut),
    /// print the operation nicknames or enum types that would be documented
    List(ListOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JQ pre-process filter for each snapshot document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// JSON generator config; unset fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// One or more snapshot documents. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output directory
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// compare with the files on disk instead of writing
    #[arg(long)]
    check: bool,

    /// fail on registry types with no PHP mapping
    #[arg(long)]
    strict_types: bool,
}

#[derive(clap::Parser, Debug)]
struct IntrospectOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// operation nickname (e.g. `flip`)
    nickname: String,

    /// also print the rendered @method block
    #[arg(long)]
    signature: bool,
}

#[derive(clap::Parser, Debug)]
struct ListOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[arg(value_enum)]
    what: ListKind,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ListKind {
    Operations,
    Enums,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_process(&self, mut apply: impl FnMut(serde_json::Value) -> Result<()>) -> Result<()> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = if source_path_str == "-" {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer).context("failed to read stdin")?;
                buffer
            } else {
                std::fs::read_to_string(&source_path)
                    .with_context(|| format!("failed to read snapshot file ({source_path_str})"))?
            };
            let json_value = serde_json::from_str::<serde_json::Value>(&source)
                .with_context(|| format!("failed to parse JSON snapshot file ({source_path_str})"))?;
            match self.jq_expr.as_ref() {
                None => apply(json_value)?,
                Some(jq_expr) => {
                    let result = jq_exec::run_jaq(jq_expr, &json_value).with_context(|| {
                        format!("failed to apply jq expression to snapshot file ({source_path_str})")
                    })?;
                    for json_value in result {
                        apply(json_value)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn load_registry(&self) -> Result<SnapshotRegistry> {
        let mut documents = Vec::<Snapshot>::new();
        self.load_process(|value| {
            let document = path_de::from_value_with_path::<Snapshot>(value)
                .context("invalid snapshot document")?;
            documents.push(document);
            Ok(())
        })?;
        info!(documents = documents.len(), "loaded registry snapshot");
        Ok(SnapshotRegistry::from_documents(documents)?)
    }

    fn load_config(&self) -> Result<GeneratorConfig> {
        match self.config.as_ref() {
            None => Ok(GeneratorConfig::default()),
            Some(path) => GeneratorConfig::load(path)
                .with_context(|| format!("failed to load config ({})", path.display())),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                let registry = target.input_settings.load_registry()?;
                let mut config = target.input_settings.load_config()?;
                if target.strict_types {
                    config.unknown_types = UnknownTypePolicy::Fail;
                }
                let emitter = Emitter::new(&registry, &config);
                let out_dir = &target.out_dir;

                if target.check {
                    let mut drift = Vec::<(String, FileStatus)>::new();
                    let count = emitter.emit_all(|file| {
                        let status = emit::check_file(out_dir, &file)?;
                        if status != FileStatus::Fresh {
                            drift.push((file.file_name, status));
                        }
                        Ok(())
                    })?;
                    for (file_name, status) in &drift {
                        let label = match status {
                            FileStatus::Missing => "missing".red(),
                            _ => "stale".yellow(),
                        };
                        eprintln!("{label:>8} {}", out_dir.join(file_name).display());
                    }
                    if !drift.is_empty() {
                        bail!("{} of {count} generated files are out of date", drift.len());
                    }
                    info!(count, "all generated files are up to date");
                } else {
                    let count = emitter.emit_all(|file| emit::write_file(out_dir, &file).map(|_| ()))?;
                    info!(count, dir = %out_dir.display(), "done");
                }
            }
            Command::Introspect(target) => {
                let registry = target.input_settings.load_registry()?;
                let config = target.input_settings.load_config()?;
                print!("{}", introspect::dump(&registry, &target.nickname)?);
                if target.signature {
                    let mapper = TypeMapper::new(&config);
                    let introspector = OperationIntrospector::new(&registry, &config, &mapper);
                    print!("{}", introspector.introspect(&target.nickname)?);
                }
            }
            Command::List(target) => {
                let registry = target.input_settings.load_registry()?;
                let config = target.input_settings.load_config()?;
                let emitter = Emitter::new(&registry, &config);
                match target.what {
                    ListKind::Operations => {
                        for nickname in emitter.nicknames()?.iter() {
                            println!("{nickname}");
                        }
                    }
                    ListKind::Enums => {
                        for name in emitter.enum_names()? {
                            println!("{name}");
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            // Treat as a glob pattern, sorted so merge order is stable
            let mut matched = Vec::new();
            for entry in glob::glob(pattern)? {
                matched.push(entry?);
            }
            if matched.is_empty() {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
            matched.sort();
            out.extend(matched);
        } else {
            // Treat as a literal path (or '-')
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        CommandLineInterface::command().debug_assert();
    }

    #[test]
    fn generate_accepts_only_documented_flags() {
        let parsed = CommandLineInterface::try_parse_from([
            "vips-stubgen", "generate", "--input", "snapshot.json", "--no-op",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn literal_paths_pass_through_and_empty_globs_fail() {
        let paths = resolve_file_path_patterns(["snapshot.json", "-"]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("snapshot.json"), PathBuf::from("-")]);

        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.json", dir.path().display());
        assert!(resolve_file_path_patterns([pattern.as_str()]).is_err());
    }

    #[test]
    fn globs_expand_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.json"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        let pattern = format!("{}/*.json", dir.path().display());
        let paths = resolve_file_path_patterns([pattern.as_str()]).unwrap();
        assert_eq!(paths, vec![dir.path().join("a.json"), dir.path().join("b.json")]);
    }

    #[test]
    fn generate_then_check_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/vips-snapshot.json");
        let out_dir = dir.path().display().to_string();

        let generate = CommandLineInterface::parse_from([
            "vips-stubgen", "generate", "--input", snapshot, "--out-dir", &out_dir,
        ]);
        generate.run().unwrap();
        assert!(dir.path().join("ImageAutodoc.php").exists());
        assert!(dir.path().join("Token.php").exists());

        let check = CommandLineInterface::parse_from([
            "vips-stubgen", "generate", "--input", snapshot, "--out-dir", &out_dir, "--check",
        ]);
        check.run().unwrap();

        std::fs::write(dir.path().join("Direction.php"), "<?php\n").unwrap();
        assert!(check.run().is_err());
    }

    #[test]
    fn strict_types_reject_unmapped_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/vips-snapshot.json");
        let out_dir = dir.path().display().to_string();
        let generate = CommandLineInterface::parse_from([
            "vips-stubgen", "generate", "--input", snapshot, "--out-dir", &out_dir, "--strict-types",
        ]);
        let err = generate.run().unwrap_err();
        assert!(format!("{err:#}").contains("eval_hook"));
    }
}
