use clap::Parser;
use frontup::cli::{run, Cli};
use frontup::load_config::load_config;
use frontup_core::DeployError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Help, version and usage errors all exit with 1.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };
    tracing::info!(config = ?cli.config, dry_run = cli.dry_run, "CLI arguments parsed");

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            eprintln!("frontup could not load a config file {}", cli.config.display());
            std::process::exit(1);
        }
    };

    match run(&cli, &config).await {
        Ok(report) => {
            tracing::info!(
                uploaded = report.uploaded,
                invalidation = ?report.invalidation_id,
                "CLI completed successfully"
            );
        }
        Err(e) => match e.downcast_ref::<DeployError>() {
            Some(DeployError::Planning(_)) => {
                eprintln!("{e}");
                std::process::exit(-1);
            }
            _ => {
                tracing::error!(error = %e, "CLI exited with error");
                eprintln!("Error: {e:#}");
                std::process::exit(1);
            }
        },
    }
}
