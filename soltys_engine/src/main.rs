mod cli;

use std::fs;

use anyhow::{Context, Result, bail};
use log::info;
use serde::Serialize;
use soltys_engine::script::ScriptSession;
use soltys_engine::text::{DEFAULT_CACHE_SIZE, TextBank};
use soltys_formats::Volume;

use cli::{Command, ScriptArgs, TextArgs, VolumeArgs};

#[derive(Serialize)]
struct VolumeManifest {
    volume: String,
    entries: Vec<EntryManifest>,
}

#[derive(Serialize)]
struct EntryManifest {
    name: String,
    mark: u32,
    size: u16,
}

#[derive(Serialize)]
struct TextManifest {
    bank: String,
    cached: usize,
    lines: Vec<LineManifest>,
}

#[derive(Serialize)]
struct LineManifest {
    ref_id: u32,
    text: Option<String>,
}

#[derive(Serialize)]
struct ScriptManifest {
    script: Option<String>,
    eval: Option<String>,
    result: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    match cli::parse()? {
        Command::Volume(args) => run_volume(args),
        Command::Text(args) => run_text(args),
        Command::Script(args) => run_script(args),
    }
}

fn run_volume(args: VolumeArgs) -> Result<()> {
    let mut volume = Volume::open(&args.data_root, &args.stem)?;
    let entries = volume.entries()?;

    println!("{} entries in volume {}", entries.len(), args.stem);
    if args.verbose {
        for pack in &entries {
            println!(
                "  {name:<16} {mark:>10} {size:>6}",
                name = pack.key.as_str(),
                mark = pack.mark,
                size = pack.size
            );
        }
    }

    if let Some((name, dest)) = args.extract.as_ref() {
        let Some(bytes) = volume.read(name)? else {
            bail!("{name} is not in volume {}", args.stem);
        };
        fs::write(dest, &bytes).with_context(|| format!("writing {}", dest.display()))?;
        info!("extracted {} bytes of {name}", bytes.len());
        println!("Extracted {name} to {}", dest.display());
    }

    if let Some(path) = args.manifest_json.as_ref() {
        let manifest = VolumeManifest {
            volume: args.stem.clone(),
            entries: entries
                .iter()
                .map(|pack| EntryManifest {
                    name: pack.key.as_str(),
                    mark: pack.mark,
                    size: pack.size,
                })
                .collect(),
        };
        let json =
            serde_json::to_string_pretty(&manifest).context("serializing volume manifest")?;
        fs::write(path, json).with_context(|| format!("writing manifest to {}", path.display()))?;
        println!("Saved volume manifest to {}", path.display());
    }

    Ok(())
}

fn run_text(args: TextArgs) -> Result<()> {
    let say_path = args
        .say
        .clone()
        .unwrap_or_else(|| args.data_root.join("soltys.say"));
    let mut bank = TextBank::open(&say_path, DEFAULT_CACHE_SIZE)?;
    if args.verbose {
        println!("Dialogue bank: {}", bank.path().display());
    }

    if let Some((from, upto)) = args.preload {
        bank.preload(from, upto)?;
        println!(
            "Preloaded references {from}..{upto}: {} slot(s) in use",
            bank.cached_count()
        );
    }

    let mut lines = Vec::new();
    if let Some(ref_id) = args.text {
        let line = bank.get_text(ref_id)?.map(str::to_string);
        match line.as_deref() {
            Some(text) => println!("{ref_id}: {text}"),
            None => println!("{ref_id}: <no such line>"),
        }
        lines.push(LineManifest {
            ref_id,
            text: line,
        });
    }

    if let Some(path) = args.manifest_json.as_ref() {
        let manifest = TextManifest {
            bank: bank.path().display().to_string(),
            cached: bank.cached_count(),
            lines,
        };
        let json = serde_json::to_string_pretty(&manifest).context("serializing text manifest")?;
        fs::write(path, json).with_context(|| format!("writing manifest to {}", path.display()))?;
        println!("Saved text manifest to {}", path.display());
    }

    Ok(())
}

fn run_script(args: ScriptArgs) -> Result<()> {
    let session = ScriptSession::new()?;

    if let Some(path) = args.script.as_ref() {
        session.exec_file(path)?;
        if args.verbose {
            println!("Ran {}", path.display());
        }
    }

    let mut result = None;
    if let Some(expr) = args.eval.as_ref() {
        let rendered = session.eval(expr)?;
        println!("{rendered}");
        result = Some(rendered);
    }

    if let Some(path) = args.manifest_json.as_ref() {
        let manifest = ScriptManifest {
            script: args
                .script
                .as_ref()
                .map(|script| script.display().to_string()),
            eval: args.eval.clone(),
            result,
        };
        let json =
            serde_json::to_string_pretty(&manifest).context("serializing script manifest")?;
        fs::write(path, json).with_context(|| format!("writing manifest to {}", path.display()))?;
        println!("Saved script manifest to {}", path.display());
    }

    Ok(())
}
