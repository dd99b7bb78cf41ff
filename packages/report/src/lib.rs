#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result reporter: assembles engine outputs into chart-ready payloads
//! and persists ranked score tables.
//!
//! The charting collaborator consumes JSON payloads (observed series +
//! forecast continuation, or actual vs predicted curves); ranked
//! relevance tables are additionally persisted as flat CSV. File slugs
//! derive deterministically from the unit identifier. All computation
//! stays in the engine crates; this crate only shapes and writes.

use std::path::Path;

use crime_trends_forecast::ForecastResult;
use crime_trends_panel_models::{RelevanceTable, UnitId};
use crime_trends_relevance::RelevanceFit;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from report persistence.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Output file or directory could not be written.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV output could not be written.
    #[error("CSV error at {path}: {source}")]
    Csv {
        /// Path to the CSV file.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// JSON payload could not be serialized.
    #[error("JSON error at {path}: {source}")]
    Json {
        /// Path to the JSON file.
        path: String,
        /// Underlying serialization error.
        source: serde_json::Error,
    },
}

/// A (years, values) pair ready for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Observation years, ascending.
    pub years: Vec<i32>,
    /// Values, in year order.
    pub values: Vec<f64>,
}

/// Chart payload for one forecast unit: the observed series and its
/// forecast continuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastChart {
    /// Deterministic file slug for this unit.
    pub slug: String,
    /// Display name of the unit.
    pub unit: String,
    /// Model order, e.g. `"(1,1,1)"`.
    pub order: String,
    /// The fitted series.
    pub observed: ChartSeries,
    /// The extrapolated continuation (first year = last observed + 1).
    pub forecast: ChartSeries,
}

impl ForecastChart {
    /// Shapes a [`ForecastResult`] for the charting collaborator.
    #[must_use]
    pub fn from_result(result: &ForecastResult) -> Self {
        Self {
            slug: result.observed.unit.slug(),
            unit: result.observed.unit.to_string(),
            order: result.order.to_string(),
            observed: ChartSeries {
                years: result.observed.years(),
                values: result.observed.values(),
            },
            forecast: ChartSeries {
                years: result.forecast.iter().map(|p| p.year).collect(),
                values: result.forecast.iter().map(|p| p.value).collect(),
            },
        }
    }
}

/// Chart payload for one relevance unit: actual vs in-sample predicted
/// curves plus the fit score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceChart {
    /// Deterministic file slug for this unit.
    pub slug: String,
    /// Display name of the unit.
    pub unit: String,
    /// In-sample R² of the fit (descriptive, not validation).
    pub score: f64,
    /// Row years (chart x-axis).
    pub years: Vec<i32>,
    /// Actual target values, in row order.
    pub actual: Vec<f64>,
    /// In-sample predictions, in row order.
    pub predicted: Vec<f64>,
}

impl RelevanceChart {
    /// Shapes a fit and its input table for the charting collaborator.
    #[must_use]
    pub fn from_fit(table: &RelevanceTable, fit: &RelevanceFit) -> Self {
        Self {
            slug: fit.unit.slug(),
            unit: fit.unit.to_string(),
            score: fit.score,
            years: table.rows.iter().map(|r| r.year).collect(),
            actual: table.rows.iter().map(|r| r.target).collect(),
            predicted: fit.predicted.clone(),
        }
    }
}

/// One row of a ranked relevance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedScore {
    /// The scored unit.
    pub unit: UnitId,
    /// In-sample R².
    pub score: f64,
}

/// Sorts scores descending, breaking ties by unit identifier so repeated
/// runs emit byte-identical tables.
#[must_use]
pub fn rank(mut rows: Vec<RankedScore>) -> Vec<RankedScore> {
    rows.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.unit.cmp(&b.unit))
    });
    rows
}

/// Key cells identifying a unit in a ranked CSV row.
///
/// One cell for single-grain units, two (country, crime type) for the
/// per-country-per-crime-type grain.
#[must_use]
pub fn key_cells(unit: &UnitId) -> Vec<String> {
    match unit {
        UnitId::Region => vec!["Europe".to_string()],
        UnitId::Country { country } => vec![country.clone()],
        UnitId::CrimeType { crime_type } => vec![crime_type.clone()],
        UnitId::CountryCrimeType {
            country,
            crime_type,
        } => vec![country.clone(), crime_type.clone()],
    }
}

/// Writes a ranked score table as CSV: `header` columns, then one row
/// per score with its unit key cells followed by the score.
///
/// # Errors
///
/// Returns [`ReportError::Csv`] if the file cannot be written.
pub fn write_ranked_csv(
    path: &Path,
    header: &[&str],
    rows: &[RankedScore],
) -> Result<(), ReportError> {
    let display = path.display().to_string();
    let csv_err = |source| ReportError::Csv {
        path: display.clone(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(header).map_err(csv_err)?;

    for row in rows {
        let mut cells = key_cells(&row.unit);
        cells.push(row.score.to_string());
        writer.write_record(&cells).map_err(csv_err)?;
    }

    writer.flush().map_err(|source| ReportError::Io {
        path: display.clone(),
        source,
    })?;

    log::info!("wrote {} ranked rows to {display}", rows.len());
    Ok(())
}

/// Serializes a chart payload as pretty JSON.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if the file cannot be created and
/// [`ReportError::Json`] if serialization fails.
pub fn write_json<T: Serialize>(path: &Path, payload: &T) -> Result<(), ReportError> {
    let display = path.display().to_string();

    let file = std::fs::File::create(path).map_err(|source| ReportError::Io {
        path: display.clone(),
        source,
    })?;

    serde_json::to_writer_pretty(file, payload).map_err(|source| ReportError::Json {
        path: display.clone(),
        source,
    })?;

    log::info!("wrote chart payload to {display}");
    Ok(())
}

/// Creates the output directory (and parents) if needed.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if creation fails.
pub fn ensure_out_dir(dir: &Path) -> Result<(), ReportError> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crime_trends_forecast::{ArimaOrder, forecast_series};
    use crime_trends_panel_models::{Series, SeriesPoint};

    fn unit(country: &str) -> UnitId {
        UnitId::Country {
            country: country.to_string(),
        }
    }

    #[test]
    fn ranks_descending_with_stable_ties() {
        let rows = vec![
            RankedScore {
                unit: unit("Spain"),
                score: 0.5,
            },
            RankedScore {
                unit: unit("Hungary"),
                score: 0.9,
            },
            RankedScore {
                unit: unit("Austria"),
                score: 0.5,
            },
        ];
        let ranked = rank(rows);
        assert_eq!(key_cells(&ranked[0].unit), vec!["Hungary"]);
        // Tied scores fall back to unit order.
        assert_eq!(key_cells(&ranked[1].unit), vec!["Austria"]);
        assert_eq!(key_cells(&ranked[2].unit), vec!["Spain"]);
    }

    #[test]
    fn forecast_chart_splits_observed_and_continuation() {
        let series = Series {
            unit: unit("Germany"),
            points: vec![
                SeriesPoint {
                    year: 2018,
                    value: 8.0,
                },
                SeriesPoint {
                    year: 2019,
                    value: 10.0,
                },
            ],
        };
        let result = forecast_series(&series, ArimaOrder::default(), 2).unwrap();
        let chart = ForecastChart::from_result(&result);
        assert_eq!(chart.slug, "Germany");
        assert_eq!(chart.observed.years, vec![2018, 2019]);
        assert_eq!(chart.forecast.years, vec![2020, 2021]);
        assert_eq!(chart.order, "(1,1,1)");
    }

    #[test]
    fn ranked_csv_round_trips() {
        let dir = std::env::temp_dir().join("crime_trends_report_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scores.csv");

        let rows = rank(vec![
            RankedScore {
                unit: unit("Spain"),
                score: 0.25,
            },
            RankedScore {
                unit: unit("Hungary"),
                score: 0.75,
            },
        ]);
        write_ranked_csv(&path, &["country", "r2"], &rows).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "country,r2");
        assert_eq!(lines[1], "Hungary,0.75");
        assert_eq!(lines[2], "Spain,0.25");
    }

    #[test]
    fn two_grain_rows_write_both_key_cells() {
        let dir = std::env::temp_dir().join("crime_trends_report_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("country_category.csv");

        let rows = vec![RankedScore {
            unit: UnitId::CountryCrimeType {
                country: "Spain".to_string(),
                crime_type: "Theft".to_string(),
            },
            score: 0.5,
        }];
        write_ranked_csv(&path, &["country", "crime_type", "r2"], &rows).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Spain,Theft,0.5"));
    }

    #[test]
    fn json_payload_round_trips() {
        let dir = std::env::temp_dir().join("crime_trends_report_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("chart.json");

        let chart = RelevanceChart {
            slug: "Spain".to_string(),
            unit: "Spain".to_string(),
            score: 0.8,
            years: vec![2018, 2019],
            actual: vec![8.0, 10.0],
            predicted: vec![8.2, 9.9],
        };
        write_json(&path, &chart).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: RelevanceChart = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed, chart);
    }
}
