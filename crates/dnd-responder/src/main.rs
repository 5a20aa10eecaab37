//! DND Responder binary.
//!
//! Start the responder with:
//! ```bash
//! dnd-responder whitelist init
//! dnd-responder whitelist add "+1 555 123 4567" --name Mom
//! dnd-responder -v serve --utc-offset=-05:00 --zone-abbreviation EST
//! ```

mod cli;
mod serve;
mod whitelist;

use clap::Parser;
use responder_core::config;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ServeArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Env files first so env-backed flags pick them up
    let env_path = config::env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "dnd_responder=info,responder_runtime=info,responder_api=info,responder_core=info,responder_persistence=info",
        1 => "dnd_responder=debug,responder_runtime=debug,responder_api=debug,responder_core=debug,responder_persistence=debug",
        2 => "dnd_responder=trace,responder_runtime=trace,responder_api=trace,responder_core=trace,responder_persistence=trace,tower_http=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(filter))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = config::ensure_all_dirs() {
        tracing::warn!(error = %e, "Failed to create all directories");
    }

    let whitelist_path = cli.whitelist.clone().unwrap_or_else(config::whitelist_file);

    match cli.command {
        Some(Commands::Whitelist { command }) => {
            whitelist::run(&command, &whitelist_path, &mut std::io::stdout())
        }
        Some(Commands::Serve(args)) => serve::run(args, &whitelist_path).await,
        None => serve::run(ServeArgs::from_env(), &whitelist_path).await,
    }
}
