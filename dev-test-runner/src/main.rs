//! Renders every declaration file twice from the same snapshot and fails on
//! any byte difference.
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;

use vips_stubgen::registry::Snapshot;
use vips_stubgen::{path_de, EmittedFile, Emitter, GeneratorConfig, SnapshotRegistry};

#[derive(Parser, Debug)]
struct Args {
    /// snapshot documents, merged in order
    #[arg(default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures/vips-snapshot.json"))]
    snapshots: Vec<PathBuf>,

    /// number of independent runs to compare
    #[arg(long, default_value_t = 2)]
    runs: usize,
}

fn render(snapshots: &[PathBuf]) -> Result<Vec<EmittedFile>> {
    let mut documents = Vec::<Snapshot>::new();
    for path in snapshots {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        documents.push(
            path_de::from_str_with_path(&source)
                .with_context(|| format!("invalid snapshot {}", path.display()))?,
        );
    }
    // fresh registry per run so lazy registration state cannot leak between runs
    let registry = SnapshotRegistry::from_documents(documents)?;
    let config = GeneratorConfig::default();
    let mut files = Vec::new();
    Emitter::new(&registry, &config).emit_all(|file| {
        files.push(file);
        Ok(())
    })?;
    Ok(files)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let baseline = render(&args.snapshots)?;
    for run in 1..args.runs {
        let next = render(&args.snapshots)?;
        if next.len() != baseline.len() {
            bail!("run {run}: {} files, expected {}", next.len(), baseline.len());
        }
        for (left, right) in baseline.iter().zip(&next) {
            if left != right {
                eprintln!("{} {}", "differs:".red().bold(), left.file_name);
                bail!("run {run} is not byte-identical to run 0");
            }
        }
    }
    for file in &baseline {
        println!("{} {} ({} bytes)", "ok".green(), file.file_name, file.contents.len());
    }
    println!("{} {} files identical across {} runs", "✓".green().bold(), baseline.len(), args.runs);
    Ok(())
}
