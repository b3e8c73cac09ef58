#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the per-ZIP heat island dataset.
//!
//! Running without a subcommand builds the cleaned dataset from the
//! default input paths.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use heat_island_uhii::load::load_inputs;
use heat_island_uhii::output::write_output;
use heat_island_uhii::paths::{
    DEFAULT_GEOGRAPHY_PATH, DEFAULT_HEAT_INDEX_PATH, DEFAULT_METRO_PATH, DEFAULT_OUTPUT_PATH,
    InputPaths,
};
use heat_island_uhii::summary::{compare, metro_zips, read_output, summarize};
use heat_island_uhii_models::{ComparisonKind, OutputRow, SummaryReport};

#[derive(Parser)]
#[command(name = "heat_island", about = "Per-ZIP urban heat island dataset builder")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Join the heat index, CBSA and ZIP geography tables into one CSV
    Clean(CleanArgs),
    /// Rank metro areas of a cleaned dataset by mean UHII
    Metros {
        /// Cleaned dataset to summarize
        #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
        input: PathBuf,
        /// Number of metros to list
        #[arg(long, default_value = "10")]
        top: usize,
        /// Compare one metro with the hottest metros and list its ZIPs
        #[arg(long)]
        metro: Option<String>,
    },
}

#[derive(Args)]
struct CleanArgs {
    /// ZIP-level heat island index CSV
    #[arg(long, default_value = DEFAULT_HEAT_INDEX_PATH)]
    heat_index: PathBuf,
    /// Census CBSA delineation CSV (Latin-1, two preamble lines)
    #[arg(long, default_value = DEFAULT_METRO_PATH)]
    metro: PathBuf,
    /// ZIP geography CSV
    #[arg(long, default_value = DEFAULT_GEOGRAPHY_PATH)]
    geography: PathBuf,
    /// Where to write the cleaned dataset
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,
}

impl Default for CleanArgs {
    fn default() -> Self {
        let paths = InputPaths::default();
        Self {
            heat_index: paths.heat_index,
            metro: paths.metro,
            geography: paths.geography,
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        None => clean(CleanArgs::default())?,
        Some(Commands::Clean(args)) => clean(args)?,
        Some(Commands::Metros { input, top, metro }) => metros(&input, top, metro.as_deref())?,
    }

    Ok(())
}

fn clean(args: CleanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let paths = InputPaths {
        heat_index: args.heat_index,
        metro: args.metro,
        geography: args.geography,
    };

    let inputs = load_inputs(&paths)?;
    println!("CBSA columns: {:?}", inputs.metro.columns);

    let cleaned = heat_island_uhii::clean(&inputs)?;
    write_output(&args.output, &cleaned.rows)?;

    log::info!(
        "Cleaned {} of {} heat-index rows in {:.2?}",
        cleaned.stats.output_rows,
        cleaned.stats.heat_index_rows,
        start.elapsed()
    );
    println!(
        "Cleaned UHII CSV with city and state added created: {}",
        args.output.display()
    );

    Ok(())
}

fn metros(
    input: &Path,
    top: usize,
    metro: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = read_output(input)?;
    let report = summarize(&rows);

    if let Some(name) = metro {
        return metro_detail(&report, &rows, name);
    }

    match report.national_average {
        Some(avg) => println!("National average UHII: {avg:.2} ({} metros)", report.metros.len()),
        None => println!("No metro areas with UHII values in {}", input.display()),
    }
    println!();
    println!("{:<6} {:>8} {:>6}  METRO", "RANK", "UHII", "ZIPS");
    println!("{}", "-".repeat(60));
    for (i, metro) in report.top(top).iter().enumerate() {
        let states: Vec<&str> = metro.states.iter().map(String::as_str).collect();
        println!(
            "{:<6} {:>8.2} {:>6}  {} [{}]",
            i + 1,
            metro.mean_uhii,
            metro.zip_count,
            metro.name,
            states.join(", ")
        );
    }

    Ok(())
}

fn metro_detail(
    report: &SummaryReport,
    rows: &[OutputRow],
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let comparison = compare(report, name)
        .ok_or_else(|| format!("No metro area named '{name}' with UHII values"))?;

    println!(
        "{}: mean UHII {:.2}, rank {} of {}, {:+.2} vs national average {:.2}",
        comparison.metro.name,
        comparison.metro.mean_uhii,
        comparison.rank,
        comparison.ranked,
        comparison.difference,
        comparison.national_average
    );
    println!();
    println!("{:>8}  COMPARISON", "UHII");
    println!("{}", "-".repeat(60));
    for entry in &comparison.entries {
        let marker = match entry.kind {
            ComparisonKind::Selected => " *",
            ComparisonKind::NationalAverage | ComparisonKind::Peer => "",
        };
        println!("{:>8.2}  {}{marker}", entry.mean_uhii, entry.label);
    }

    let zips = metro_zips(rows, name);
    log::debug!("{} ZIP rows for {}", zips.len(), comparison.metro.name);
    println!();
    println!("{:<6}{:>8} {:>10} {:>10}  CITY", "ZIP", "UHII", "DENSITY", "POP");
    println!("{}", "-".repeat(60));
    for row in zips {
        println!(
            "{:05} {:>8} {:>10} {:>10}  {}, {}",
            row.zip,
            row.uhii.map_or_else(|| "-".to_string(), |v| format!("{v:.2}")),
            row.density.map_or_else(|| "-".to_string(), |v| format!("{v:.1}")),
            row.population.map_or_else(|| "-".to_string(), |v| v.to_string()),
            row.city,
            row.state_id
        );
    }

    Ok(())
}
