//! Site viewer replay entry point

use std::process::ExitCode;

use clap::Parser;
use sv_frontend::cli::{ReplayArgs, load_config};

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let args = ReplayArgs::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sv_frontend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(script = %args.script.display(), "Starting replay");

    let config = load_config(args.config.as_deref());
    match sv_frontend::replay::run_script(&args.script, config) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(%err, "Replay failed");
            ExitCode::FAILURE
        }
    }
}
