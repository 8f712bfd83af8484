use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Bookable slots from regular hours and blocked time.
#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Compute open appointment slots from a scenario file"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the slots of every day in a date range.
    Availability(AvailabilityArgs),
    /// Print whether an instant is blocked, and by what.
    Blocked(BlockedArgs),
    /// Dump the hour-bucketed unavailability index.
    Index(IndexArgs),
}

/// Arguments for the `availability` subcommand.
#[derive(clap::Args)]
pub struct AvailabilityArgs {
    /// Path to the JSON scenario file.
    #[arg(short, long)]
    pub scenario: PathBuf,

    /// First day of the range (inclusive).
    #[arg(long)]
    pub from: String,

    /// Last day of the range (exclusive).
    #[arg(long)]
    pub to: String,

    /// Lay the grid over the whole day and flag the regular window.
    #[arg(long)]
    pub full_day: bool,

    /// Attach start/end instants to every slot.
    #[arg(long)]
    pub dates: bool,

    /// Attach the onset of the next block to every slot.
    #[arg(long)]
    pub next_unavailable: bool,

    /// IANA timezone for day boundaries and slot labels.
    #[arg(long)]
    pub tz: Option<String>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for the `blocked` subcommand.
#[derive(clap::Args)]
pub struct BlockedArgs {
    /// Path to the JSON scenario file.
    #[arg(short, long)]
    pub scenario: PathBuf,

    /// Instant to look up.
    #[arg(long)]
    pub at: String,
}

/// Arguments for the `index` subcommand.
#[derive(clap::Args)]
pub struct IndexArgs {
    /// Path to the JSON scenario file.
    #[arg(short, long)]
    pub scenario: PathBuf,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
}
