// src/cli.rs

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser};

/// Password cache maintenance
#[derive(Parser)]
#[command(name = "preset-passphrase", version)]
#[command(group(ArgGroup::new("operation").required(true).args(["preset", "forget"])))]
pub struct Cli {
    /// Preset passphrase
    #[arg(short = 'c', long)]
    pub preset: bool,

    /// Forget passphrase
    #[arg(short = 'f', long)]
    pub forget: bool,

    /// Use passphrase STRING instead of reading it from stdin
    #[arg(short = 'P', long, value_name = "STRING")]
    pub passphrase: Option<String>,

    /// Put into the restricted cache
    #[arg(long)]
    pub restricted: bool,

    /// Verbose (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(long, value_name = "DIR", hide = true)]
    pub homedir: Option<PathBuf>,

    /// Keygrip of the key whose passphrase is cached
    #[arg(value_name = "KEYGRIP")]
    pub keygrip: String,
}
