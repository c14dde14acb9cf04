//! Command-line surface of the `flowgate` daemon.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

const LEVELS_HELP: &str = "\
Log levels:
  1  fatal
  2  error
  3  warning
  4  info
  5  debug

RUST_LOG, when set, overrides -v.";

/// Mirror an LWM2M button counter onto an LED and notify the device owner.
#[derive(Debug, Parser)]
#[command(name = "flowgate", version, about, after_help = LEVELS_HELP)]
pub struct Cli {
    /// Write logs to this file instead of stderr (truncated on start)
    #[arg(short = 'l', long = "log-file", value_name = "LOGFILE")]
    pub log_file: Option<PathBuf>,

    /// Log level: fatal(1), error(2), warning(3), info(4), debug(5)
    #[arg(
        short = 'v',
        long = "verbosity",
        value_name = "LEVEL",
        default_value_t = 4,
        value_parser = clap::value_parser!(u8).range(1..=5)
    )]
    pub verbosity: u8,

    /// Settings file (default: /etc/flowgate/flowgate.toml, optional)
    #[arg(short = 'c', long = "config", value_name = "PATH", env = "FLOWGATE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse the process arguments, exiting on error.
    ///
    /// A rejected option value is followed by the usage line, which clap
    /// leaves out for that kind of error.
    pub fn parse_or_exit() -> Self {
        Self::try_parse().unwrap_or_else(|err| {
            let _ = err.print();
            if wants_usage(err.kind()) {
                eprintln!("\n{}", Self::command().render_usage());
            }
            std::process::exit(err.exit_code())
        })
    }

    /// `EnvFilter` directive for the selected level.
    pub fn level_filter(&self) -> &'static str {
        match self.verbosity {
            1 | 2 => "error",
            3 => "warn",
            5 => "debug",
            _ => "info",
        }
    }
}

fn wants_usage(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::ValueValidation | ErrorKind::InvalidValue)
}
