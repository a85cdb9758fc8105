//! CLI definition using clap derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xapi-video", about = "xAPI video statement engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay a JSON-lines player event log through a statement session
    Replay(ReplayOpts),
    /// Compute progress of an encoded played-segments list
    Progress(ProgressOpts),
    /// Print the completion threshold for a media length
    Threshold(ThresholdOpts),
}

#[derive(clap::Args)]
pub struct ReplayOpts {
    /// Event log path, or `-` for stdin
    pub input: PathBuf,

    /// Treat the media as a live stream (no duration, no completion)
    #[arg(long)]
    pub live: bool,

    /// Print statements to stdout instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Record-store endpoint receiving one POST per statement
    #[arg(long, env = "XAPI_VIDEO_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Bearer credential for the endpoint
    #[arg(long, env = "XAPI_VIDEO_TOKEN", hide_env_values = true, default_value = "")]
    pub token: String,

    /// Session identifier (default: random UUID)
    #[arg(long, env = "XAPI_VIDEO_SESSION_ID")]
    pub session_id: Option<String>,

    /// Time left for in-flight deliveries before exit, in milliseconds
    #[arg(long, default_value = "500")]
    pub linger_ms: u64,
}

#[derive(clap::Args)]
pub struct ProgressOpts {
    /// Media length in seconds
    #[arg(long)]
    pub duration: f64,

    /// Encoded list, e.g. `0[.]5[,]10[.]22`
    pub segments: String,

    /// Also print the canonical merged list
    #[arg(long)]
    pub merged: bool,
}

#[derive(clap::Args)]
pub struct ThresholdOpts {
    /// Media length in seconds
    pub duration: f64,
}
