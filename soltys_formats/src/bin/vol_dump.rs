use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use soltys_formats::Volume;

#[derive(Serialize)]
struct EntryManifest {
    name: String,
    mark: u32,
    size: u16,
}

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let dir = args.next().context("usage: vol_dump <dir> <stem> [--json]")?;
    let stem = args.next().context("usage: vol_dump <dir> <stem> [--json]")?;
    let as_json = args.next().as_deref() == Some("--json");

    let mut volume = Volume::open(&PathBuf::from(dir), &stem)?;
    let entries = volume.entries()?;

    if as_json {
        let manifest: Vec<EntryManifest> = entries
            .iter()
            .map(|pack| EntryManifest {
                name: pack.key.as_str(),
                mark: pack.mark,
                size: pack.size,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }

    println!(
        "{} entries in {}",
        entries.len(),
        volume.data_path().display()
    );
    for pack in &entries {
        println!(
            "{name:<16} {mark:>10} {size:>6}",
            name = pack.key.as_str(),
            mark = pack.mark,
            size = pack.size
        );
    }
    Ok(())
}
