use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    about = "Host tool for Soltys volumes, dialogue banks, and script extensions",
    version
)]
pub struct Args {
    /// Directory holding catalog/data volumes and dialogue banks
    #[arg(long, default_value = "data")]
    pub data_root: PathBuf,

    /// Volume stem to inspect (expects <stem>.cat and <stem>.dat under the data root)
    #[arg(long)]
    pub volume: Option<String>,

    /// Entry to extract from the volume (requires --volume and --out)
    #[arg(long)]
    pub extract: Option<String>,

    /// Destination file for --extract
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Dialogue bank file (defaults to <data-root>/soltys.say)
    #[arg(long)]
    pub say: Option<PathBuf>,

    /// Dialogue reference to print
    #[arg(long)]
    pub text: Option<u32>,

    /// Warm the dialogue cache with references FROM..UPTO first
    #[arg(long, num_args = 2, value_names = ["FROM", "UPTO"])]
    pub preload: Option<Vec<u32>>,

    /// Script file to run with the Math and Keyboard extensions installed
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Expression to evaluate after the script file (or on its own)
    #[arg(long)]
    pub eval: Option<String>,

    /// Path to write a JSON manifest of the run
    #[arg(long)]
    pub manifest_json: Option<PathBuf>,

    /// Chatty per-step reporting
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug)]
pub enum Command {
    Volume(VolumeArgs),
    Text(TextArgs),
    Script(ScriptArgs),
}

#[derive(Debug)]
pub struct VolumeArgs {
    pub data_root: PathBuf,
    pub stem: String,
    pub extract: Option<(String, PathBuf)>,
    pub manifest_json: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug)]
pub struct TextArgs {
    pub data_root: PathBuf,
    pub say: Option<PathBuf>,
    pub text: Option<u32>,
    pub preload: Option<(u32, u32)>,
    pub manifest_json: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug)]
pub struct ScriptArgs {
    pub script: Option<PathBuf>,
    pub eval: Option<String>,
    pub manifest_json: Option<PathBuf>,
    pub verbose: bool,
}

pub fn parse() -> Result<Command> {
    Args::parse().into_command()
}

impl Args {
    pub fn into_command(self) -> Result<Command> {
        if let Some(stem) = self.volume {
            let extract = match (self.extract, self.out) {
                (Some(name), Some(dest)) => Some((name, dest)),
                (None, None) => None,
                (Some(_), None) => bail!("--extract requires --out"),
                (None, Some(_)) => bail!("--out requires --extract"),
            };
            return Ok(Command::Volume(VolumeArgs {
                data_root: self.data_root,
                stem,
                extract,
                manifest_json: self.manifest_json,
                verbose: self.verbose,
            }));
        }
        if self.extract.is_some() || self.out.is_some() {
            bail!("--extract and --out require --volume");
        }

        if self.text.is_some() || self.preload.is_some() {
            let preload = match self.preload.as_deref() {
                Some([from, upto]) => Some((*from, *upto)),
                Some(_) => bail!("--preload takes exactly FROM and UPTO"),
                None => None,
            };
            return Ok(Command::Text(TextArgs {
                data_root: self.data_root,
                say: self.say,
                text: self.text,
                preload,
                manifest_json: self.manifest_json,
                verbose: self.verbose,
            }));
        }

        if self.script.is_some() || self.eval.is_some() {
            return Ok(Command::Script(ScriptArgs {
                script: self.script,
                eval: self.eval,
                manifest_json: self.manifest_json,
                verbose: self.verbose,
            }));
        }

        bail!("nothing to do: pass --volume, --text/--preload, or --script/--eval");
    }
}
