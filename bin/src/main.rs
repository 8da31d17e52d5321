//! CLI for the tsgen synthetic time series generator.
//!
//! This binary loads a JSON generator configuration, generates the table and
//! prints it or writes it as CSV.

use clap::{Parser, Subcommand};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fmt::{self, Write};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tsgen::{FactorInfo, FactorKind, Generator, GeneratorConfig};

#[derive(Parser)]
#[command(name = "tsgen")]
#[command(about = "Synthetic time series from composable factors", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a table from a JSON configuration
    Generate {
        /// Configuration file
        #[arg(long)]
        config: PathBuf,
        /// Write the table to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Rows to print
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Show the factors, features and size of a configuration
    Info {
        /// Configuration file
        #[arg(long)]
        config: PathBuf,
    },
    /// Generate the built-in store sales demo
    Demo {
        /// Write the table to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Rows to print
        #[arg(long, default_value_t = 10)]
        rows: usize,
        /// Print the demo configuration as JSON instead of generating
        #[arg(long)]
        print_config: bool,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli.command) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(command: Commands) -> tsgen::Result<()> {
    match command {
        Commands::Generate {
            config,
            output,
            rows,
        } => {
            let config = GeneratorConfig::from_json_file(&config)?;
            generate(&config, output.as_deref(), rows)
        }
        Commands::Info { config } => {
            let config = GeneratorConfig::from_json_file(&config)?;
            let mut summary = String::new();
            describe(&Generator::from_config(&config)?, &mut summary)
                .map_err(|e| tsgen::GeneratorError::Computation(e.to_string()))?;
            print!("{summary}");
            Ok(())
        }
        Commands::Demo {
            output,
            rows,
            print_config,
        } => {
            let config = GeneratorConfig::store_sales_demo();
            if print_config {
                println!("{}", config.to_json_string()?);
                return Ok(());
            }
            generate(&config, output.as_deref(), rows)
        }
    }
}

/// Generate a table, print its head and optionally write it to CSV.
fn generate(config: &GeneratorConfig, output: Option<&Path>, rows: usize) -> tsgen::Result<()> {
    let mut generator = Generator::from_config(config)?;
    let table = generator.generate()?;

    if rows > 0 {
        println!("{}", table.head(Some(rows)));
    }
    if let Some(path) = output {
        write_csv(table, path)?;
        info!(path = %path.display(), rows = table.height(), "wrote table");
    }
    Ok(())
}

/// Write a table as CSV with a header row.
fn write_csv(table: &DataFrame, path: &Path) -> tsgen::Result<()> {
    let mut file = File::create(path)?;
    let mut table = table.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut table)?;
    Ok(())
}

/// Human-readable summary of a generator, factors grouped by kind.
fn describe(generator: &Generator, out: &mut impl Write) -> fmt::Result {
    let range = generator.date_range();
    writeln!(
        out,
        "Dates: {} to {} ({} dates)",
        range.start(),
        range.end(),
        range.len()
    )?;
    writeln!(out, "Features:")?;
    for name in generator.features().names() {
        let values = generator.features().values(name).unwrap_or_default();
        writeln!(out, "  {} = [{}]", name, values.join(", "))?;
    }
    writeln!(out, "Rows: {}", generator.row_count())?;
    writeln!(out, "Base value: {}", generator.base_value())?;

    let mut by_kind: BTreeMap<FactorKind, Vec<FactorInfo>> = BTreeMap::new();
    for info in generator.factors().all_info() {
        by_kind.entry(info.kind).or_default().push(info);
    }

    writeln!(out, "\nFactors ({} total)", generator.factors().len())?;
    for (kind, factors) in by_kind {
        writeln!(out, "{kind}:")?;
        for info in factors {
            writeln!(
                out,
                "  {} - {} [{}]",
                info.name,
                info.description,
                info.required_columns.join(", ")
            )?;
        }
    }

    let noise = generator.noiser().map_or("none", |noiser| noiser.name());
    writeln!(out, "\nNoise: {noise}")
}
