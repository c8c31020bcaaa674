//! Command-line definitions.
//!
//! Flags that mirror configuration fields are collected into a raw bag using
//! their condarc spellings, so the same normalize-and-validate path handles
//! flags, files and environment variables alike. A flag left at its default
//! contributes nothing, keeping the command line a sparse source.

use std::path::PathBuf;

use clap::Parser;
use serde_json::{json, Value};

use crate::fragment::RawFragment;

/// Show the effective configuration resolved from every source
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Additional channel to search for packages (may be given repeatedly)
    #[arg(short = 'c', long = "channel")]
    pub channel: Vec<String>,

    /// Only use channels given on the command line
    #[arg(long)]
    pub override_channels: bool,

    /// Use locally built packages
    #[arg(long)]
    pub use_local: bool,

    /// Answer yes to any confirmation prompt
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,

    /// Emit structured JSON instead of YAML
    #[arg(long)]
    pub json: bool,

    /// Work offline, using only cached content
    #[arg(long)]
    pub offline: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase output verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Additional configuration file, highest file precedence (repeatable)
    #[arg(long = "file")]
    pub file: Vec<PathBuf>,

    /// Show only these configuration fields
    pub keys: Vec<String>,
}

impl Cli {
    /// The command line's configuration contribution. Only flags the user
    /// actually passed appear in the bag.
    pub fn to_bag(&self) -> RawFragment {
        let mut bag = RawFragment::new();
        if !self.channel.is_empty() {
            bag.insert("channel".to_string(), json!(self.channel));
        }
        if self.override_channels {
            bag.insert("override_channels".to_string(), Value::Bool(true));
        }
        if self.use_local {
            bag.insert("use_local".to_string(), Value::Bool(true));
        }
        if self.yes {
            bag.insert("yes".to_string(), Value::Bool(true));
        }
        if self.json {
            bag.insert("json".to_string(), Value::Bool(true));
        }
        if self.offline {
            bag.insert("offline".to_string(), Value::Bool(true));
        }
        if self.quiet {
            bag.insert("quiet".to_string(), Value::Bool(true));
        }
        if self.verbose > 0 {
            bag.insert("verbose".to_string(), json!(self.verbose));
        }
        bag
    }
}
