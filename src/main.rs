use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedpulse::config::{Config, ConfigLoader};
use feedpulse::model::ModelAdapter;
use feedpulse::pipeline;
use feedpulse::store::FsBlobStore;

#[derive(Parser)]
#[command(name = "feedpulse")]
#[command(
    version,
    about = "Scheduled social-feed digest pipeline: LLM classification, sentiment, and summaries"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, help = "Path to config file (defaults to feedpulse.toml)")]
    config: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify raw feed blobs into category outputs
    Classify {
        #[arg(long, help = "Model identifier override")]
        model: Option<String>,
    },

    /// Run the sentiment digest and persist the run report
    Digest {
        #[arg(long, help = "Sentiment model identifier override")]
        model: Option<String>,
        #[arg(long, help = "Trailing eligibility window in days")]
        window_days: Option<i64>,
    },

    /// Show the merged configuration
    Config {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Classify { model } => {
            let mut config = config;
            if let Some(model) = model {
                config.models.classify_model = model;
            }
            let response = rt.block_on(run_stage(config, Stage::Classify))?;
            Ok(print_response(response))
        }
        Commands::Digest { model, window_days } => {
            let mut config = config;
            if let Some(model) = model {
                config.models.sentiment_model = model;
            }
            if let Some(days) = window_days {
                config.discovery.window_days = days;
                config.validate()?;
            }
            let response = rt.block_on(run_stage(config, Stage::Digest))?;
            Ok(print_response(response))
        }
        Commands::Config { format } => {
            show_config(&config, &format)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

enum Stage {
    Classify,
    Digest,
}

async fn run_stage(config: Config, stage: Stage) -> anyhow::Result<pipeline::HandlerResponse> {
    let root = config.require_store_root()?.clone();
    let store = FsBlobStore::new(root);
    let adapter = ModelAdapter::from_config(&config.models)?;

    // The entrypoint event is opaque; the CLI sends an empty one.
    let event = serde_json::json!({});

    let response = match stage {
        Stage::Classify => {
            pipeline::handle_classification(&config, &store, &adapter, &event).await
        }
        Stage::Digest => pipeline::handle_digest(&config, &store, &adapter, &event).await,
    };

    Ok(response)
}

fn print_response(response: pipeline::HandlerResponse) -> ExitCode {
    let status = response.body["status"].as_str().unwrap_or("unknown");
    let header = if response.status_code == 200 {
        style(format!("status: {}", status)).green()
    } else {
        style(format!("status: {}", status)).red()
    };
    eprintln!("{}", header);
    println!("{}", serde_json::to_string_pretty(&response.body).unwrap_or_default());

    if response.status_code == 200 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn show_config(config: &Config, format: &str) -> anyhow::Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(config)?),
        _ => println!("{}", toml::to_string_pretty(config)?),
    }
    Ok(())
}
