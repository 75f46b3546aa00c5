//! tikfetch CLI
//!
//! Resolves a chat message into a canonical media record. The delivery
//! layer normally consumes the library directly; this binary exists for
//! local testing and operator diagnosis.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tikfetch::{
    error::Result,
    models::{Config, FailureKind, Rejection, Resolution},
    pipeline::Resolver,
    services::MobileApiParser,
};

/// tikfetch - TikTok media resolver
#[derive(Parser, Debug)]
#[command(name = "tikfetch", version, about = "Resolves TikTok links into media URLs")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a message text into a media record
    Resolve {
        /// Message text that may contain a TikTok link
        text: String,

        /// Print the resolution as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Resolve { text, json } => {
            let resolver = Resolver::new(Arc::new(config));
            let resolution = resolver.resolve(&text).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&resolution)?);
            } else {
                print_summary(&resolution);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            match MobileApiParser::new(&config) {
                Ok(_) => log::info!("✓ Mobile API parser available (device identity present)"),
                Err(e) => log::warn!("Mobile API parser unavailable: {}", e),
            }

            log::info!("All validations passed!");
        }
    }

    Ok(())
}

fn print_summary(resolution: &Resolution) {
    match resolution {
        Resolution::Ignored => log::info!("No TikTok link in the text; nothing to do."),
        Resolution::NotRecognized => log::warn!("Link found but it is not a recognizable post."),
        Resolution::IdNotFound => log::warn!("Could not identify a post behind that link."),
        Resolution::Rejected(Rejection { kind, detail }) => match kind {
            FailureKind::Unknown(raw) => {
                log::error!("Upstream rejected the post with an unclassified message: {raw}");
            }
            _ => log::warn!("Upstream rejected the post: {kind:?} ({detail})"),
        },
        Resolution::Media { id, media } => {
            log::info!("Resolved post {id}:");
            log::info!("{}", serde_json::to_string_pretty(media).unwrap_or_default());
        }
    }
}
