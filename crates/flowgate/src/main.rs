//! `flowgate`: button/LED gateway daemon.
//!
//! Polls the button counter through the device-management server daemon,
//! mirrors its parity onto the LED object on both daemons, and notifies the
//! device owner through the cloud service when registration succeeded.
//!
//! Runs on a single-threaded runtime until the gateway falls through, then
//! exits with status -1.

mod cli;
mod error;

use std::convert::Infallible;
use std::fs::File;

use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use flowgate_config::{CredentialsFile, load_settings};
use flowgate_core::{CloudRegistrar, Gateway, GatewayConfig, IpcConnector, ScriptIndicator};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse_or_exit();
    let guard = init_tracing(&cli);

    match run(&cli).await {
        Ok(never) => match never {},
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            drop(guard);
            std::process::exit(code);
        }
    }
}

/// Install the subscriber. Holds the log file writer's guard when `-l` is used.
fn init_tracing(cli: &Cli) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.level_filter()));

    // `File::create` truncates, matching a fresh log per run.
    let (writer, guard, open_error) = match cli.log_file.as_deref().map(File::create) {
        Some(Ok(file)) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            (BoxMakeWriter::new(non_blocking), Some(guard), None)
        }
        Some(Err(e)) => (BoxMakeWriter::new(std::io::stderr), None, Some(e)),
        None => (BoxMakeWriter::new(std::io::stderr), None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(guard.is_none())
                .with_target(false),
        )
        .init();

    if let (Some(path), Some(e)) = (&cli.log_file, open_error) {
        error!(path = %path.display(), error = %e, "cannot open log file, logging to stderr");
    }
    guard
}

async fn run(cli: &Cli) -> Result<Infallible, CliError> {
    let settings = load_settings(cli.config.as_deref())?;
    let GatewayConfig {
        ipc,
        cloud,
        heartbeat_script,
        timings,
    } = settings.to_gateway_config()?;

    info!(
        client = %ipc.client_addr(),
        server = %ipc.server_addr(),
        credentials = %cloud.credentials_path.display(),
        "starting gateway"
    );

    let credentials = CredentialsFile::new(cloud.credentials_path.clone());
    let gateway = Gateway::new(
        IpcConnector::new(ipc),
        CloudRegistrar::new(credentials, &cloud),
        ScriptIndicator::new(heartbeat_script),
    )
    .with_timings(timings);

    gateway.run().await.map_err(CliError::from)
}
