// Metarithms composer: CLI entry point.
//
// Reads a JSON composition request, runs the pipeline, and prints the result
// as pretty JSON on stdout. Logs go to stderr (filter with RUST_LOG).
//
// Usage:
//   cargo run -p metarithms --bin compose -- [config.json] [--shift N]
//     [--seed N] [--out FILE]
//
// Without a config file the default request (a major scale, one octave,
// even durations) is used. `--seed` reseeds every LFSR source in the config.

use metarithms::{ComposeConfig, compose};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("compose: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> metarithms::Result<()> {
    let config_path = args
        .get(1)
        .filter(|s| !s.starts_with("--"))
        .map(Path::new);

    let mut config = match config_path {
        Some(path) => ComposeConfig::load(path)?,
        None => ComposeConfig::default(),
    };
    if let Some(shift) = parse_flag(args, "--shift") {
        config.shift = shift;
    }
    if let Some(seed) = parse_flag(args, "--seed") {
        config.reseed(seed);
    }

    let piece = compose(&config)?;
    let json = serde_json::to_string_pretty(&piece)?;
    match parse_flag::<String>(args, "--out") {
        Some(out) => {
            std::fs::write(&out, json)?;
            tracing::info!(path = %out, "wrote composition");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
