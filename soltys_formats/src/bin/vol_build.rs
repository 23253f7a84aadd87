use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use soltys_formats::VolumeWriter;
use soltys_formats::vol::DEFAULT_SEED;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(about = "Pack a directory of assets into a catalog/data volume pair", version)]
struct Args {
    /// Directory whose files become volume entries (keyed by file name)
    #[arg(long)]
    input: PathBuf,

    /// Directory to write <stem>.cat and <stem>.dat into
    #[arg(long, default_value = ".")]
    dest: PathBuf,

    /// Volume stem
    #[arg(long, default_value = "vol")]
    stem: String,

    /// Scramble seed byte for the data volume
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut paths = Vec::new();
    for entry in WalkDir::new(&args.input).into_iter().filter_map(|res| res.ok()) {
        if entry.file_type().is_file() {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    if paths.is_empty() {
        bail!("no files under {}", args.input.display());
    }

    fs::create_dir_all(&args.dest)
        .with_context(|| format!("creating destination {}", args.dest.display()))?;

    let mut writer = VolumeWriter::create(&args.dest, &args.stem, args.seed)?;
    let mut packed = 0usize;
    for path in &paths {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            eprintln!(
                "[soltys_formats] warning: skipping {} (name is not UTF-8)",
                path.display()
            );
            continue;
        };
        let payload =
            fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        writer
            .append(name, &payload)
            .with_context(|| format!("packing {}", path.display()))?;
        packed += 1;
    }
    writer.finish()?;

    println!(
        "Packed {} entries into {} ({stem}.cat + {stem}.dat)",
        packed,
        args.dest.display(),
        stem = args.stem
    );
    Ok(())
}
