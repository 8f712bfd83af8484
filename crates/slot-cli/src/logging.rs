use tracing_subscriber::EnvFilter;

/// The binary itself and the engine it drives.
const CRATE_TARGETS: &[&str] = &["slots", "slot_engine"];

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// `-v` shows scenario loading and per-command summaries, `-vv` adds every
/// inserted block and generated range, `-vvv` adds one event per day walked.
/// A set `RUST_LOG` replaces the filter entirely. Events go to stderr; stdout
/// carries only the JSON result.
pub fn init(verbosity: u8) {
    let level = level_for(verbosity);
    let directives = CRATE_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
