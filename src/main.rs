//! condarc — resolve and display the effective configuration.

use anyhow::Result;
use clap::Parser;
use condarc::cli::Cli;
use condarc::context::Context;
use condarc::error::ConfigError;
use serde_json::Value;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose > 0 {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: logging already initialized");
    }

    if let Err(err) = run(&cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = Context::resolve(cli.to_bag(), &cli.file)?;

    let mut view = serde_json::Map::new();
    if cli.keys.is_empty() {
        view = ctx.snapshot();
        // The derived channel list replaces the raw field in the full view.
        match ctx.channels() {
            Ok(channels) => {
                view.insert("channels".to_string(), serde_json::json!(channels));
            }
            Err(err @ (ConfigError::OperationNotAllowed(_) | ConfigError::Argument(_))) => {
                return Err(err.into());
            }
            Err(_) => {}
        }
    } else {
        for key in &cli.keys {
            let value = if key == "channels" {
                serde_json::json!(ctx.channels()?)
            } else {
                ctx.get(key)?
            };
            view.insert(key.clone(), value);
        }
    }

    print_view(&Value::Object(view), cli.json)?;
    Ok(())
}

fn print_view(view: &Value, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        print!("{}", serde_yaml::to_string(view)?);
    }
    Ok(())
}
