use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use sales_pipeline::{Pipeline, PipelineConfig, PricePolicy, error_kind};
use std::path::PathBuf;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Sales Pipeline: rank the best-selling products in a CSV of sales transactions
#[derive(Parser)]
#[command(name = "sales-pipeline", version, styles = STYLES)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// CSV of sales transactions to read
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where to save the top sellers report
    #[arg(long)]
    top_output: Option<PathBuf>,

    /// Where to save the top sellers report with prices
    #[arg(long)]
    prices_output: Option<PathBuf>,

    /// Number of products to report
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// How to choose one unit price for a product sold at several prices
    #[arg(long, value_enum)]
    price_policy: Option<PricePolicy>,

    /// The dotenv file to source LOG_LEVEL from
    #[arg(short, long, global = true, default_value = ".env")]
    env: PathBuf,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute, runs the pipeline when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a configuration file with every setting at its default
    Init {
        /// The configuration file to generate
        #[arg(default_value = "pipeline.yml")]
        path: PathBuf,
    },
}

impl Cli {
    /// Defaults, then the config file, then command line flags
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::read(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(top_output) = &self.top_output {
            config.top_output = top_output.clone();
        }
        if let Some(prices_output) = &self.prices_output {
            config.prices_output = prices_output.clone();
        }
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
        if let Some(policy) = self.price_policy {
            config.price_policy = policy;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.env.exists() {
        dotenvy::from_path(&cli.env)?;
    }

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match &cli.command {
        Some(Commands::Init { path }) => {
            log::info!("Writing default configuration to {}", path.display().bright_black());
            PipelineConfig::default().write(path)?;
            log::info!("✓ Created {}", path.display());
        }
        None => {
            let pipeline = Pipeline::new(cli.pipeline_config()?)?;
            log::info!(
                "Reading {} with price policy {}",
                pipeline.config().input.display().bright_black(),
                pipeline.config().price_policy.cyan()
            );

            let mut stdout = std::io::stdout().lock();
            if let Err(e) = pipeline.run(&mut stdout) {
                let kind = error_kind(&e)
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "Error".to_string());
                log::error!("Pipeline failed with {}: {}", kind.red(), e);
                return Err(e);
            }
            log::info!("✓ Pipeline executed successfully");
        }
    }

    Ok(())
}
