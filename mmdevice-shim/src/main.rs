//! mmdevice-probe: print the declared contract table or run endpoint discovery.
//!
//! ```text
//! mmdevice-probe shapes
//! mmdevice-probe [discover] [--config <path>]
//! ```

use anyhow::{bail, Context, Result};
use mmdevice_shim::interfaces::{canonical_string, CONTRACTS, IUNKNOWN_SLOTS};
use mmdevice_shim::audio::ComGuard;
use mmdevice_shim::{discover, logging, DeviceEnumerator, DiscoveryConfig, DiscoveryReport};
use std::fmt::Write as _;
use std::path::PathBuf;

const USAGE: &str = "usage: mmdevice-probe shapes\n       mmdevice-probe [discover] [--config <path>]";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Shapes,
    Discover { config: Option<PathBuf> },
    Help,
}

fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();

    match args.peek().map(String::as_str) {
        Some("shapes") => {
            args.next();
            if let Some(extra) = args.next() {
                bail!("unexpected argument `{extra}`\n{USAGE}");
            }
            return Ok(Command::Shapes);
        }
        Some("discover") => {
            args.next();
        }
        _ => {}
    }

    let mut config = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--help" | "-h" => return Ok(Command::Help),
            other => bail!("unexpected argument `{other}`\n{USAGE}"),
        }
    }

    Ok(Command::Discover { config })
}

fn format_shapes() -> String {
    let mut out = String::new();
    for contract in CONTRACTS.iter() {
        let _ = writeln!(out, "{} {{{}}}", contract.name, canonical_string(&contract.iid));
        for slot in 0..IUNKNOWN_SLOTS {
            let name = ["QueryInterface", "AddRef", "Release"][slot];
            let _ = writeln!(out, "  {slot:>2}  {name}  (IUnknown)");
        }
        for operation in contract.operations {
            if let Some(slot) = contract.slot(operation) {
                let _ = writeln!(out, "  {slot:>2}  {operation}");
            }
        }
    }
    out
}

fn run_discovery(config: &DiscoveryConfig) -> Result<DiscoveryReport> {
    // Declared first so COM outlives the enumerator and any registration
    let _com = ComGuard::new().context("Failed to initialize COM")?;
    let enumerator = DeviceEnumerator::new().context("Failed to activate the device enumerator")?;

    let discovery = discover(&enumerator, config).context("Endpoint discovery failed")?;
    if let Some(watcher) = &discovery.watcher {
        for event in watcher.pending_events() {
            tracing::info!(?event, "device event during discovery");
        }
    }

    Ok(discovery.report)
}

fn main() -> Result<()> {
    match parse_args(std::env::args().skip(1))? {
        Command::Help => {
            println!("{USAGE}");
        }
        Command::Shapes => {
            print!("{}", format_shapes());
        }
        Command::Discover { config } => {
            let config = match config {
                Some(path) => DiscoveryConfig::from_file(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?,
                None => DiscoveryConfig::default(),
            };
            logging::init(config.log_filter.as_deref());

            let report = run_discovery(&config)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
