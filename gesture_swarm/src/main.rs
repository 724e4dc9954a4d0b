//! gesture_swarm: command-line entry point.

use std::path::PathBuf;

use anyhow::Context;
use gesture_swarm::app::{run, RunOptions};
use gesture_swarm::config::Config;
use gesture_swarm::logging;
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
gesture_swarm: a particle swarm you steer with your hands

USAGE:
  gesture_swarm [OPTIONS]

OPTIONS:
  --config PATH   Read settings from PATH instead of the default location
  --headless N    Run N frames without opening a window, then exit
  --seed N        Seed the random generators for a repeatable run
  -h, --help      Print this help

Set RUST_LOG=debug for once-per-second tracking diagnostics.
";

struct Args {
    config:  Option<PathBuf>,
    options: RunOptions,
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{}", HELP);
        return Ok(None);
    }

    let args = Args {
        config: pargs.opt_value_from_str("--config")?,
        options: RunOptions {
            headless: pargs.opt_value_from_str("--headless")?,
            seed:     pargs.opt_value_from_str("--seed")?,
        },
    };

    let rest = pargs.finish();
    if !rest.is_empty() {
        anyhow::bail!("unexpected arguments: {:?} (see --help)", rest);
    }
    Ok(Some(args))
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let Some(args) = parse_args()? else { return Ok(()) };

    let (cfg, source) = Config::load(args.config.as_deref()).context("failed to load configuration")?;
    if source.is_none() {
        info!("no config file, using built-in defaults");
    }

    run(&cfg, args.options)
}
