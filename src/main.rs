//! Command-line interface for table-bench
//!
//! # Usage Examples
//!
//! ## Table setup
//! ```bash
//! # Create the table with the columns of data.json
//! table-bench --schema data.json create-table simulated_data
//!
//! # Remove all rows (asks for confirmation unless --yes)
//! table-bench clear-table simulated_data --yes
//! ```
//!
//! ## Populate
//! ```bash
//! # Use simulation_config from config.json
//! table-bench populate simulated_data
//!
//! # Override the run shape and keep a JSON report
//! table-bench populate simulated_data \
//!   --batch-size 500 --total-batches 40 --concurrency 8 \
//!   --batch-timeout 2m --report-json report.json
//! ```
//!
//! ## Connection
//! `db_config` from the configuration file is used unless
//! `--postgresql-connection-string` (or `POSTGRESQL_CONNECTION_STRING`) is set.

use clap::{Parser, Subcommand};
use loadtest_populate::CommonPopulateArgs;
use loadtest_populate_postgresql::{
    PostgreSQLConnectionArgs, PostgreSQLConnectionProvider, TableAdmin,
};
use std::path::PathBuf;
use table_bench::config::BenchConfig;
use table_bench::loadtest::{populate, table};

#[derive(Parser)]
#[command(name = "table-bench")]
#[command(about = "Create, populate and inspect a PostgreSQL benchmark table")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file (.json, .yaml, .yml or .toml); ./config.json is used when present
    #[arg(long, global = true, env = "TABLE_BENCH_CONFIG")]
    config: Option<PathBuf>,

    /// Column schema file (.json, .yaml or .yml)
    #[arg(long, global = true, default_value = "data.json", env = "TABLE_BENCH_SCHEMA")]
    schema: PathBuf,

    #[command(flatten)]
    connection: PostgreSQLConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a table with an `id SERIAL PRIMARY KEY` plus the schema columns
    CreateTable {
        /// Table name
        table: String,
    },

    /// Insert simulated data in concurrent batches
    Populate {
        /// Table name
        table: String,

        #[command(flatten)]
        args: CommonPopulateArgs,
    },

    /// Delete every row of a table, keeping its structure
    ClearTable {
        /// Table name
        table: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Drop a table completely
    DropTable {
        /// Table name
        table: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// List the tables of the public schema
    ListTables,

    /// Count the rows of a table
    CountRows {
        /// Table name
        table: String,
    },

    /// Print the first rows of a table
    ShowRows {
        /// Table name
        table: String,

        /// Number of rows (defaults to analysis_config.query_limit)
        #[arg(long)]
        limit: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = BenchConfig::load(cli.config.as_deref())?;
    let connection_string = cli.connection.postgresql_connection_string.as_deref();

    if let Commands::Populate { table, args } = &cli.command {
        let report =
            populate::run_populate(&config, &cli.schema, connection_string, table, args).await?;
        if let Some(report) = report {
            if !report.is_success() {
                anyhow::bail!(
                    "Populate finished with {} failed batch(es) out of {}",
                    report.failures(),
                    report.total_batches
                );
            }
        }
        return Ok(());
    }

    let connection = config.connection(connection_string)?;
    tracing::debug!("Connection: {}", connection.display);
    let admin = TableAdmin::new(PostgreSQLConnectionProvider::new(connection.config));

    match cli.command {
        Commands::CreateTable { table } => table::create_table(&admin, &cli.schema, &table).await?,
        Commands::ClearTable { table, yes } => table::clear_table(&admin, &table, yes).await?,
        Commands::DropTable { table, yes } => table::drop_table(&admin, &table, yes).await?,
        Commands::ListTables => table::list_tables(&admin).await?,
        Commands::CountRows { table } => table::count_rows(&admin, &table).await?,
        Commands::ShowRows { table, limit } => {
            let limit = limit.unwrap_or(config.analysis_config.query_limit);
            table::show_rows(&admin, &table, limit).await?
        }
        Commands::Populate { .. } => {}
    }

    Ok(())
}
