//! anbud CLI
//!
//! Local entry point: serve the ingestion endpoints, run a one-shot fetch,
//! or validate the configuration.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use anbud::error::Result;
use anbud::handler::{self, ResultsEnvelope};
use anbud::models::{Config, SearchPayload, SourceKind};
use anbud::pipeline::run_aggregation;

/// anbud - Procurement Notice Aggregator
#[derive(Parser, Debug)]
#[command(name = "anbud", version, about = "Procurement Notice Aggregator")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP ingestion endpoints
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run one ingestion and print or write the result envelope
    Fetch {
        /// Source to ingest from: api or browser
        #[arg(long, default_value = "api")]
        source: String,

        /// Inclusive start date (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Inclusive end date (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Optional location code
        #[arg(long)]
        location: Option<String>,

        /// CPV target code (repeatable)
        #[arg(long = "cpv")]
        cpv: Vec<String>,

        /// Write the envelope to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate configuration files
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
        Command::Serve { bind } => {
            config.validate()?;
            let mut config = config;
            if let Some(bind) = bind {
                config.server.bind_addr = bind;
            }
            handler::serve(Arc::new(config)).await?;
        }

        Command::Fetch {
            source,
            from,
            to,
            location,
            cpv,
            output,
        } => {
            config.validate()?;
            let source: SourceKind = source.parse()?;
            let payload = SearchPayload {
                from,
                to,
                location,
                cpv: (!cpv.is_empty()).then_some(cpv),
            };
            let request = payload.into_request()?;

            let results = run_aggregation(&config, source, &request).await?;
            log::info!("fetched {} notices", results.len());

            let envelope = ResultsEnvelope { results };
            let json = serde_json::to_string_pretty(&envelope)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    log::info!("wrote result envelope to {}", path.display());
                }
                None => println!("{json}"),
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("All validations passed!");
        }
    }

    Ok(())
}
