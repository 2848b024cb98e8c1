use clap::{Parser, Subcommand, builder::styling};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use tableport::{
    cli,
    config::{CsvConfig, DatabaseConfig, WarehouseConfig},
    warehouse::DEFAULT_BATCH_ROWS,
};

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// tableport: move whole tables between MySQL, BigQuery and CSV files
#[derive(Parser)]
#[command(name = "tableport", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source credentials from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging, including the SQL that is issued
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replicate every table of the source database into BigQuery, replacing existing tables
    #[command(alias = "gbq")]
    Warehouse {
        /// Maximum rows per INSERT statement
        #[arg(long, default_value_t = DEFAULT_BATCH_ROWS)]
        batch_rows: usize,
    },

    /// Append every CSV file of the data directory to the same-named database table
    #[command(alias = "load-db")]
    Load {
        /// Directory holding the CSV files. Defaults to $DATA_DIRECTORY.
        directory: Option<String>,
    },

    /// Test connectivity without loading anything
    Check {
        /// Also authenticate to the BigQuery warehouse
        #[arg(short, long)]
        warehouse: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match dotenvy::from_filename(&cli.env) {
        Ok(path) => log::debug!("Sourced environment from {}", path.display()),
        Err(e) if e.not_found() => {
            log::debug!("No {} file, using the process environment", cli.env)
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", cli.env)),
    }

    match cli.command {
        Commands::Warehouse { batch_rows } => {
            let database = DatabaseConfig::from_env()?;
            let warehouse = WarehouseConfig::from_env()?;
            log::info!(
                "Syncing database {} into {}",
                database.database.bright_black(),
                format!("{}.{}", warehouse.project_id, warehouse.dataset).bright_black()
            );
            cli::sync_to_warehouse(&database, &warehouse, batch_rows).await?;
        }
        Commands::Load { directory } => {
            let database = DatabaseConfig::from_env()?;
            let csv = match directory {
                Some(directory) => CsvConfig::new(directory),
                None => CsvConfig::from_env()?,
            };
            cli::load_csv_directory(&database, &csv).await?;
        }
        Commands::Check { warehouse } => {
            let database = DatabaseConfig::from_env()?;
            let warehouse = match warehouse {
                true => Some(WarehouseConfig::from_env()?),
                false => None,
            };
            cli::check_connections(&database, warehouse.as_ref()).await?;
        }
    }

    Ok(())
}
