mod app;
mod cli;
mod error;
mod input_events;
mod video;

use clap::Parser;
use scuffle_signal::{SignalHandler, SignalKind};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Config};
use error::{ClientError, Result};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "client exited with an error");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = Config::from_cli(Cli::parse())?;
    tracing::info!(addr = %config.server_addr, "starting session");

    let (ctx, handle) = scuffle_context::Context::new();

    tokio::spawn(async move {
        let mut signals = SignalHandler::new()
            .with_signal(SignalKind::Interrupt)
            .with_signal(SignalKind::Terminate);

        signals.recv().await;
        tracing::info!("shutdown requested, cancelling session");
        handle.cancel();

        signals.recv().await;
        tracing::warn!("second shutdown signal received, forcing exit");
        std::process::exit(1);
    });

    let app = app::App::new(config).await.map_err(|err| {
        tracing::error!(error = %err, "failed to start session");
        err
    })?;

    app.run(ctx).await
}
