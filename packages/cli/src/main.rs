#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the migration/crime panel analysis toolchain.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crime_trends_cli::RunOptions;
use crime_trends_forecast::ArimaOrder;

#[derive(Parser)]
#[command(name = "crime_trends", about = "Migration and crime panel analysis")]
struct Cli {
    /// Path to the panel CSV dataset
    #[arg(long, global = true, default_value = "data/merged_goc_suc.csv")]
    data: PathBuf,

    /// TOML schema file overriding the default column names
    #[arg(long, global = true)]
    schema: Option<PathBuf>,

    /// Output directory for chart payloads and score tables
    #[arg(long, global = true, default_value = "results")]
    out: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast total crime for a single country
    ForecastCountry {
        /// Country to forecast (e.g., "Germany")
        country: String,
        /// Number of future years to extrapolate
        #[arg(long, default_value_t = 3)]
        steps: usize,
        /// ARIMA order as "p,d,q"
        #[arg(long, default_value = "1,1,1")]
        order: ArimaOrder,
    },
    /// Forecast total crime for two or more countries on one chart
    ForecastPair {
        /// Countries to forecast; members with no data are skipped
        #[arg(num_args = 2.., default_values_t = ["Spain".to_string(), "Hungary".to_string()])]
        countries: Vec<String>,
        /// Number of future years to extrapolate
        #[arg(long, default_value_t = 3)]
        steps: usize,
        /// ARIMA order as "p,d,q"
        #[arg(long, default_value = "1,1,1")]
        order: ArimaOrder,
    },
    /// Forecast the whole-region total-crime series
    ForecastRegion {
        /// Number of future years to extrapolate
        #[arg(long, default_value_t = 3)]
        steps: usize,
        /// ARIMA order as "p,d,q"
        #[arg(long, default_value = "1,1,1")]
        order: ArimaOrder,
    },
    /// Fit migration against total crime for selected countries
    RelevanceCountries {
        /// Countries to fit; members that cannot be fitted are skipped
        #[arg(num_args = 1.., default_values_t = ["Spain".to_string(), "Hungary".to_string()])]
        countries: Vec<String>,
        /// Ensemble size override
        #[arg(long)]
        trees: Option<u16>,
        /// Ensemble seed override
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Rank every country by how well migration explains its total crime
    RelevanceAllCountries {
        /// Ensemble size override
        #[arg(long)]
        trees: Option<u16>,
        /// Ensemble seed override
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Rank crime categories region-wide by migration relevance
    RelevanceCrimeTypes {
        /// Ensemble size override
        #[arg(long)]
        trees: Option<u16>,
        /// Ensemble seed override
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Rank every (country, crime category) pair by migration relevance
    RelevanceCountryCrimeTypes {
        /// Ensemble size override
        #[arg(long)]
        trees: Option<u16>,
        /// Ensemble seed override
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let opts = RunOptions {
        data: cli.data,
        schema: cli.schema,
        out: cli.out,
    };

    match cli.command {
        Commands::ForecastCountry {
            country,
            steps,
            order,
        } => crime_trends_cli::forecast_country(&opts, &country, steps, order),
        Commands::ForecastPair {
            countries,
            steps,
            order,
        } => crime_trends_cli::forecast_pair(&opts, &countries, steps, order),
        Commands::ForecastRegion { steps, order } => {
            crime_trends_cli::forecast_region(&opts, steps, order)
        }
        Commands::RelevanceCountries {
            countries,
            trees,
            seed,
        } => crime_trends_cli::relevance_countries(&opts, &countries, trees, seed),
        Commands::RelevanceAllCountries { trees, seed } => {
            crime_trends_cli::relevance_all_countries(&opts, trees, seed)
        }
        Commands::RelevanceCrimeTypes { trees, seed } => {
            crime_trends_cli::relevance_crime_types(&opts, trees, seed)
        }
        Commands::RelevanceCountryCrimeTypes { trees, seed } => {
            crime_trends_cli::relevance_country_crime_types(&opts, trees, seed)
        }
    }
}
