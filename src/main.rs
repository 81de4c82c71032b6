use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use online::{CheckerConfig, ConnectivityChecker, OnlineError, Result};

#[derive(Debug, Parser)]
#[command(
    name = "online",
    version,
    about = "Check whether this host can reach the internet",
    allow_negative_numbers = true
)]
struct Cli {
    /// Probe target; overrides the config file
    uri: Option<String>,

    /// Probe deadline in seconds; overrides the config file
    #[arg(long)]
    timeout: Option<f64>,

    /// Config file instead of $XDG_CONFIG_HOME/online/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a JSON report instead of a single word
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    uri: &'a str,
    online: bool,
    elapsed_ms: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("online: {}", e);
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let mut cfg = match &cli.config {
        Some(path) => CheckerConfig::load(path)?,
        None => CheckerConfig::discover()?,
    };
    if let Some(uri) = cli.uri {
        cfg.uri = uri;
    }
    if let Some(timeout) = cli.timeout {
        cfg.timeout_secs = timeout;
    }

    let checker = ConnectivityChecker::from_config(&cfg)?;
    let started = Instant::now();
    let status = checker.check()?;

    if cli.json {
        let report = Report {
            uri: checker.default_uri(),
            online: status,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        let out = serde_json::to_string(&report)
            .map_err(|e| OnlineError::invalid(format!("cannot encode report: {}", e)))?;
        println!("{}", out);
    } else {
        println!("{}", if status { "online" } else { "offline" });
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_overrides() {
        let cli = Cli::parse_from(["online", "http://example.com", "--timeout", "2.5", "--json"]);
        assert_eq!(cli.uri.as_deref(), Some("http://example.com"));
        assert_eq!(cli.timeout, Some(2.5));
        assert!(cli.json);
        assert!(cli.config.is_none());
    }

    #[test]
    fn invalid_uri_is_reported_before_any_probe() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = 1\n").unwrap();

        let cli = Cli::parse_from(["online", "not a uri", "--config", path.to_str().unwrap()]);
        assert!(run(cli).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["online", "--config", "/definitely/not/here.toml"]);
        assert!(matches!(run(cli), Err(OnlineError::Read { .. })));
    }
}
