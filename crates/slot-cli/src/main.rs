//! `slots` CLI: compute open appointment slots from a JSON scenario file.
//!
//! ## Usage
//!
//! ```sh
//! # Slots for one week, dropping blocked ones
//! slots availability -s scenario.json --from 2016-06-20 --to 2016-06-27
//!
//! # The full 24-hour grid in another timezone, with instants attached
//! slots availability -s scenario.json --from 2016-06-20 --to 2016-06-21 \
//!     --full-day --dates --tz America/New_York --pretty
//!
//! # Is this instant blocked?
//! slots blocked -s scenario.json --at "2016-06-21 14:00"
//!
//! # Dump the hour buckets
//! slots index -s scenario.json --pretty
//! ```

mod cli;
mod logging;
mod scenario;

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use slot_engine::GenerateOptions;

use crate::cli::{AvailabilityArgs, BlockedArgs, Cli, Command, IndexArgs};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Availability(args) => availability(args),
        Command::Blocked(args) => blocked(args),
        Command::Index(args) => index(args),
    }
}

fn availability(args: AvailabilityArgs) -> Result<()> {
    let av = scenario::open(&args.scenario)?;

    let time_zone = args
        .tz
        .as_deref()
        .map(slot_engine::parse_timezone)
        .transpose()
        .context("Invalid --tz")?;
    let options = GenerateOptions {
        include_full_day: args.full_day,
        dates: args.dates,
        next_unavailable_at: args.next_unavailable,
        time_zone,
    };

    let days = av
        .get_availability(args.from.as_str(), args.to.as_str(), &options)
        .context("Failed to compute availability")?;
    tracing::info!(days = days.len(), "computed availability");
    print_json(&days, args.pretty)
}

fn blocked(args: BlockedArgs) -> Result<()> {
    let av = scenario::open(&args.scenario)?;
    let hits = av
        .unavailable_at(args.at.as_str())
        .with_context(|| format!("Invalid --at value: {}", args.at))?;
    print_json(
        &json!({
            "blocked": !hits.is_empty(),
            "unavailable": hits,
        }),
        false,
    )
}

fn index(args: IndexArgs) -> Result<()> {
    let av = scenario::open(&args.scenario)?;
    print_json(av.unavailable(), args.pretty)
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
