//! CLI command definitions for the `lpad` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod deploy;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Describe an app, watch it being written, get a live URL.
#[derive(Parser)]
#[command(name = "lpad", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "LAUNCHPAD_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one message and deploy the app the reply describes.
    Chat {
        /// The message to send.
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        /// Show the reply but do not deploy its directive.
        #[arg(long)]
        no_deploy: bool,

        /// Wait for the whole reply instead of streaming it.
        #[arg(long)]
        no_stream: bool,
    },

    /// Deploy a directive from a file (JSON body or a reply containing a DEPLOY_CONFIG block).
    Deploy {
        /// Path to the directive file.
        file: PathBuf,
    },

    /// Show the current state of a deployment.
    Status {
        /// Deployment ID (e.g. dpl_...).
        id: String,
    },

    /// Start the HTTP API server.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Chat endpoints return replies without deploying them.
        #[arg(long)]
        no_deploy: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}
