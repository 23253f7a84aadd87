use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use soltys_formats::Volume;

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let usage = "usage: vol_extract <dir> <stem> <entry> <dest>";
    let dir = args.next().context(usage)?;
    let stem = args.next().context(usage)?;
    let entry = args.next().context(usage)?;
    let dest = PathBuf::from(args.next().context(usage)?);

    let mut volume = Volume::open(&PathBuf::from(dir), &stem)?;
    let Some(bytes) = volume.read(&entry)? else {
        bail!("{entry} is not in the catalog");
    };

    fs::write(&dest, &bytes).with_context(|| format!("writing {}", dest.display()))?;
    println!("Extracted {} bytes of {} to {}", bytes.len(), entry, dest.display());
    Ok(())
}
