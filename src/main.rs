use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use webadvisor::app::App;
use webadvisor::cli::Args;
use webadvisor::config::Config;
use webadvisor::logging::setup_logging;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Config before logging so the level is known; report failures directly.
    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&config, args.tracing);

    match App::new(args, config).run().await {
        Ok(code) => code,
        Err(e) => {
            error!(error = ?e, "webadvisor failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
