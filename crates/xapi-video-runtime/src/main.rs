//! xapi-video: drives the statement engine from recorded player events.

use clap::Parser;

mod cli;
mod cmd_inspect;
mod cmd_replay;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = std::env::var("XAPI_VIDEO_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();
    match args.command {
        cli::Command::Replay(opts) => cmd_replay::cmd_replay(opts).await?,
        cli::Command::Progress(opts) => {
            print!("{}", cmd_inspect::format_progress(&opts.segments, opts.duration, opts.merged));
        }
        cli::Command::Threshold(opts) => {
            println!("{}", cmd_inspect::format_threshold(opts.duration)?);
        }
    }

    Ok(())
}
