use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use actuarial_etl::api::ExchangeRateClient;
use actuarial_etl::models::Config;
use actuarial_etl::pipeline::{run_exchange_rate_pipeline, run_loss_pipeline, LossRunOptions};

/// Load actuarial loss workbooks into the warehouse and build the spot-rate table
#[derive(Debug, Parser)]
#[command(name = "actuarial-etl", version, about)]
struct Cli {
    /// Path to the JSON config file holding db_url and api_key
    #[arg(long, env = "ETL_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Enable debug logging (including table previews)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load factstatistical and factdata from the loss workbook and render the chart
    LoadLosses(LossArgs),
    /// Fetch the latest USD spot rates and write the rate table
    ExchangeRates(RateArgs),
    /// Run both pipelines one after the other
    All {
        #[command(flatten)]
        losses: LossArgs,
        #[command(flatten)]
        rates: RateArgs,
    },
}

#[derive(Debug, Args)]
struct LossArgs {
    /// Workbook to read instead of the configured one
    #[arg(long)]
    workbook: Option<String>,

    /// Worksheet to load (repeatable); defaults to the configured sheets
    #[arg(long = "sheet")]
    sheets: Vec<String>,

    /// Worksheet whose booked data is charted
    #[arg(long)]
    chart_sheet: Option<String>,

    /// Output workbook for the chart
    #[arg(long)]
    chart_output: Option<String>,

    /// Also export both tables as CSV into this directory
    #[arg(long)]
    csv_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RateArgs {
    /// Output workbook for the exchange-rate table
    #[arg(long)]
    output: Option<String>,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "actuarial_etl=debug"
    } else {
        "actuarial_etl=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("❌ Configuration Error: {}", e);
            eprintln!("Make sure {} contains db_url and api_key.", cli.config.display());
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::LoadLosses(args) => load_losses(&mut config, args).await,
        Command::ExchangeRates(args) => exchange_rates(&mut config, args).await,
        Command::All { losses, rates } => {
            load_losses(&mut config, losses).await;
            exchange_rates(&mut config, rates).await;
        }
    }

    Ok(())
}

async fn load_losses(config: &mut Config, args: LossArgs) {
    if let Some(workbook) = args.workbook {
        config.workbook_path = workbook;
    }
    if !args.sheets.is_empty() {
        config.sheets = args.sheets;
    }
    if let Some(chart_sheet) = args.chart_sheet {
        config.chart_sheet = Some(chart_sheet);
    }
    if let Some(chart_output) = args.chart_output {
        config.chart_output = chart_output;
    }

    let options = LossRunOptions {
        csv_dir: args.csv_dir,
    };
    let summary = run_loss_pipeline(config, &options).await;
    if !summary.failed_steps.is_empty() {
        error!("Steps that failed: {}", summary.failed_steps.join(", "));
    }
}

async fn exchange_rates(config: &mut Config, args: RateArgs) {
    if let Some(output) = args.output {
        config.rates_output = output;
    }

    let client = match ExchangeRateClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create exchange rate client: {}", e);
            return;
        }
    };

    let today = Local::now().date_naive();
    let output = PathBuf::from(&config.rates_output);
    if let Some(rows) = run_exchange_rate_pipeline(&client, &output, today).await {
        info!("Wrote {} exchange rates to {}", rows, output.display());
    }
}
