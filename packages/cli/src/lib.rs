#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analysis entry points for the migration/crime panel toolchain.
//!
//! Each function re-runs the full load → aggregate → partition pipeline
//! on the configured dataset and hands the unit results to the reporter.
//! Multi-unit runs (pair, all-countries, per-crime-type) skip units that
//! fail to fit and continue; single-unit runs surface the failure.

use std::path::PathBuf;

use crime_trends_forecast::{ArimaOrder, ForecastResult, forecast_series};
use crime_trends_panel::partition::{self, RelevanceTarget};
use crime_trends_panel::{PanelError, loader, schema};
use crime_trends_panel_models::{CountryYearRecord, PanelSchema, RelevanceTable};
use crime_trends_relevance::{RelevanceFit, RelevanceParams, fit_unit};
use crime_trends_report::{
    ForecastChart, RankedScore, RelevanceChart, ensure_out_dir, rank, write_json,
    write_ranked_csv,
};

type BoxError = Box<dyn std::error::Error>;

/// Dataset and output configuration shared by every entry point.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Path to the panel CSV.
    pub data: PathBuf,
    /// Optional TOML schema override; `None` uses the default schema.
    pub schema: Option<PathBuf>,
    /// Root output directory (`arima/` and `rf/` subtrees are created
    /// beneath it).
    pub out: PathBuf,
}

impl RunOptions {
    fn load(&self) -> Result<(PanelSchema, Vec<CountryYearRecord>), PanelError> {
        let panel_schema = match &self.schema {
            Some(path) => schema::load_schema(path)?,
            None => PanelSchema::default(),
        };
        let records = loader::load_panel(&self.data, &panel_schema)?;
        Ok((panel_schema, records))
    }

    fn forecast_dir(&self) -> PathBuf {
        self.out.join("arima")
    }

    fn relevance_dir(&self) -> PathBuf {
        self.out.join("rf")
    }
}

/// Forecasts total crime for a single country.
///
/// # Errors
///
/// Fatal on structural load errors, an empty unit, or an unfittable
/// series; there is no fallback unit in a single-country run.
pub fn forecast_country(
    opts: &RunOptions,
    country: &str,
    horizon: usize,
    order: ArimaOrder,
) -> Result<(), BoxError> {
    let (panel_schema, records) = opts.load()?;
    let series = partition::country_series(&records, &panel_schema, country)?;
    let result = forecast_series(&series, order, horizon)?;
    print_forecast(&result);

    let dir = opts.forecast_dir();
    ensure_out_dir(&dir)?;
    let chart = ForecastChart::from_result(&result);
    write_json(&dir.join(format!("arima_{}.json", chart.slug)), &chart)?;
    Ok(())
}

/// Forecasts total crime for each of two (or more) countries
/// independently, one chart payload for the combined figure.
///
/// A member with no rows or an unfittable series is skipped with a
/// warning; the run fails only if no member produces a forecast.
///
/// # Errors
///
/// Fatal on structural load errors or when every member is skipped.
pub fn forecast_pair(
    opts: &RunOptions,
    countries: &[String],
    horizon: usize,
    order: ArimaOrder,
) -> Result<(), BoxError> {
    let (panel_schema, records) = opts.load()?;

    let mut charts = Vec::new();
    for country in countries {
        match partition::country_series(&records, &panel_schema, country)
            .map_err(BoxError::from)
            .and_then(|series| forecast_series(&series, order, horizon).map_err(BoxError::from))
        {
            Ok(result) => {
                print_forecast(&result);
                charts.push(ForecastChart::from_result(&result));
            }
            Err(e) => log::warn!("skipping {country}: {e}"),
        }
    }

    if charts.is_empty() {
        return Err("no country produced a forecast".into());
    }

    let dir = opts.forecast_dir();
    ensure_out_dir(&dir)?;
    write_json(&dir.join("two_countries.json"), &charts)?;
    Ok(())
}

/// Forecasts the whole-region total-crime series.
///
/// # Errors
///
/// Fatal on structural load errors, an empty region series, or an
/// unfittable series.
pub fn forecast_region(
    opts: &RunOptions,
    horizon: usize,
    order: ArimaOrder,
) -> Result<(), BoxError> {
    let (panel_schema, records) = opts.load()?;
    let series = partition::region_series(&records, &panel_schema)?;
    let result = forecast_series(&series, order, horizon)?;
    print_forecast(&result);

    let dir = opts.forecast_dir();
    ensure_out_dir(&dir)?;
    write_json(&dir.join("europe.json"), &ForecastChart::from_result(&result))?;
    Ok(())
}

/// Fits migration → total crime for selected countries and emits actual
/// vs predicted curves.
///
/// # Errors
///
/// Fatal on structural load errors or when every country is skipped.
pub fn relevance_countries(
    opts: &RunOptions,
    countries: &[String],
    trees: Option<u16>,
    seed: Option<u64>,
) -> Result<(), BoxError> {
    let (panel_schema, records) = opts.load()?;
    let params = resolve(RelevanceParams::country_level(), trees, seed);

    let mut charts = Vec::new();
    for country in countries {
        match fit_country(&records, &panel_schema, country, params) {
            Ok((table, fit)) => {
                println!("{}: R² = {:.4}", fit.unit, fit.score);
                charts.push(RelevanceChart::from_fit(&table, &fit));
            }
            Err(e) => log::warn!("skipping {country}: {e}"),
        }
    }

    if charts.is_empty() {
        return Err("no country produced a fit".into());
    }

    let dir = opts.relevance_dir();
    ensure_out_dir(&dir)?;
    write_json(&dir.join("selected_countries.json"), &charts)?;
    Ok(())
}

/// Ranks every country in the dataset by how well migration explains its
/// total crime.
///
/// # Errors
///
/// Fatal on structural load errors or when every country is skipped.
pub fn relevance_all_countries(
    opts: &RunOptions,
    trees: Option<u16>,
    seed: Option<u64>,
) -> Result<(), BoxError> {
    let (panel_schema, records) = opts.load()?;
    let params = resolve(RelevanceParams::country_level(), trees, seed);

    let mut scores = Vec::new();
    for country in partition::countries(&records) {
        match fit_country(&records, &panel_schema, &country, params) {
            Ok((_, fit)) => scores.push(RankedScore {
                unit: fit.unit,
                score: fit.score,
            }),
            Err(e) => log::warn!("skipping {country}: {e}"),
        }
    }

    let ranked = rank(scores);
    if ranked.is_empty() {
        return Err("no country produced a fit".into());
    }
    print_ranking(&ranked);

    let dir = opts.relevance_dir();
    ensure_out_dir(&dir)?;
    write_ranked_csv(&dir.join("all_countries_r2.csv"), &["country", "r2"], &ranked)?;
    Ok(())
}

/// Ranks crime categories region-wide by how well migration explains
/// them.
///
/// # Errors
///
/// Fatal on structural load errors or when every category is skipped.
pub fn relevance_crime_types(
    opts: &RunOptions,
    trees: Option<u16>,
    seed: Option<u64>,
) -> Result<(), BoxError> {
    let (panel_schema, records) = opts.load()?;
    let params = resolve(RelevanceParams::category_level(), trees, seed);

    let mut scores = Vec::new();
    for category in &panel_schema.categories {
        let target = RelevanceTarget::Category(category.clone());
        match fit_target(&records, &panel_schema, &target, None, params) {
            Ok((_, fit)) => scores.push(RankedScore {
                unit: fit.unit,
                score: fit.score,
            }),
            Err(e) => log::warn!("skipping {category}: {e}"),
        }
    }

    let ranked = rank(scores);
    if ranked.is_empty() {
        return Err("no crime type produced a fit".into());
    }
    print_ranking(&ranked);

    let dir = opts.relevance_dir();
    ensure_out_dir(&dir)?;
    write_ranked_csv(
        &dir.join("europe_by_crimetype.csv"),
        &["crime_type", "r2"],
        &ranked,
    )?;
    Ok(())
}

/// Ranks every (country, crime category) pair by how well migration
/// explains the category within that country.
///
/// # Errors
///
/// Fatal on structural load errors or when every pair is skipped.
pub fn relevance_country_crime_types(
    opts: &RunOptions,
    trees: Option<u16>,
    seed: Option<u64>,
) -> Result<(), BoxError> {
    let (panel_schema, records) = opts.load()?;
    let params = resolve(RelevanceParams::category_level(), trees, seed);

    let mut scores = Vec::new();
    for country in partition::countries(&records) {
        for category in &panel_schema.categories {
            let target = RelevanceTarget::Category(category.clone());
            match fit_target(&records, &panel_schema, &target, Some(country.as_str()), params) {
                Ok((_, fit)) => scores.push(RankedScore {
                    unit: fit.unit,
                    score: fit.score,
                }),
                Err(e) => log::trace!("skipping {country}/{category}: {e}"),
            }
        }
    }

    let ranked = rank(scores);
    if ranked.is_empty() {
        return Err("no (country, crime type) pair produced a fit".into());
    }
    print_ranking(&ranked);

    let dir = opts.relevance_dir();
    ensure_out_dir(&dir)?;
    write_ranked_csv(
        &dir.join("country_by_crimetype.csv"),
        &["country", "crime_type", "r2"],
        &ranked,
    )?;
    Ok(())
}

fn fit_country(
    records: &[CountryYearRecord],
    panel_schema: &PanelSchema,
    country: &str,
    params: RelevanceParams,
) -> Result<(RelevanceTable, RelevanceFit), BoxError> {
    fit_target(
        records,
        panel_schema,
        &RelevanceTarget::TotalCrime,
        Some(country),
        params,
    )
}

fn fit_target(
    records: &[CountryYearRecord],
    panel_schema: &PanelSchema,
    target: &RelevanceTarget,
    country: Option<&str>,
    params: RelevanceParams,
) -> Result<(RelevanceTable, RelevanceFit), BoxError> {
    let table = partition::relevance_table(records, panel_schema, target, country)?;
    let fit = fit_unit(&table, params)?;
    Ok((table, fit))
}

const fn resolve(base: RelevanceParams, trees: Option<u16>, seed: Option<u64>) -> RelevanceParams {
    RelevanceParams {
        trees: match trees {
            Some(trees) => trees,
            None => base.trees,
        },
        seed: match seed {
            Some(seed) => seed,
            None => base.seed,
        },
    }
}

fn print_forecast(result: &ForecastResult) {
    let unit = &result.observed.unit;
    println!(
        "{unit}: ARIMA {} on {} observations",
        result.order,
        result.observed.len()
    );
    for point in &result.forecast {
        println!("  {} -> {:.2}", point.year, point.value);
    }
}

fn print_ranking(ranked: &[RankedScore]) {
    for row in ranked {
        println!("{}: R² = {:.4}", row.unit, row.score);
    }
}
