//! Launchpad CLI and HTTP API entry point.
//!
//! Binary name: `lpad`
//!
//! Parses CLI arguments, loads configuration and credentials, then dispatches
//! to the appropriate command handler or starts the HTTP API server.

mod cli;
mod http;
mod output;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flags when set.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,launchpad_core=debug,launchpad_infra=debug",
        _ => "trace",
    };
    launchpad_observe::tracing_setup::init_tracing(filter, cli.otel).map_err(anyhow::Error::from_boxed)?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "lpad", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    launchpad_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Chat {
            message,
            no_deploy,
            no_stream,
        } => {
            let state = AppState::init(!no_deploy).await?;
            let options = cli::chat::ChatOptions {
                stream: !no_stream,
                json: cli.json,
                quiet: cli.quiet,
            };
            cli::chat::chat(&state, message.join(" "), options).await?;
        }

        Commands::Deploy { file } => {
            let state = AppState::init(true).await?;
            cli::deploy::deploy(&state, &file, cli.json, cli.quiet).await?;
        }

        Commands::Status { id } => {
            let state = AppState::init(false).await?;
            cli::status::status(&state, &id, cli.json).await?;
        }

        Commands::Serve {
            port,
            host,
            no_deploy,
        } => {
            let state = AppState::init(!no_deploy).await?;
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Launchpad API listening on {}",
                    console::style("🚀").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }
            if let Some(reason) = state.chat_unavailable() {
                tracing::warn!(%reason, "chat endpoints will fail until a generation provider is configured");
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Completions { .. } => unreachable!("handled before state init"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
