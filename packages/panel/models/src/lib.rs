#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Schema and record types for the migration/crime panel dataset.
//!
//! The dataset is a country × year panel: one row per (country, year)
//! observation, one numeric column per tracked crime category, plus a
//! migration indicator column. [`PanelSchema`] names those columns so the
//! category set is swappable per dataset rather than baked into the
//! pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Column-name configuration for a panel dataset.
///
/// Deserializable from TOML so alternate datasets can supply their own
/// column names and category list. The default mirrors the merged
/// Eurostat migration/crime extract this tool was built around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSchema {
    /// Header of the country identifier column.
    #[serde(default = "default_country_column")]
    pub country_column: String,
    /// Header of the observation-year column.
    #[serde(default = "default_year_column")]
    pub year_column: String,
    /// Header of the migration indicator column.
    #[serde(default = "default_migration_column")]
    pub migration_column: String,
    /// Headers of the tracked crime-category columns, in report order.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

fn default_country_column() -> String {
    "ülke".to_string()
}

fn default_year_column() -> String {
    "yıl".to_string()
}

fn default_migration_column() -> String {
    "göç".to_string()
}

fn default_categories() -> Vec<String> {
    [
        "Assault",
        "Corruption",
        "Cybercrime",
        "Drug offences",
        "Fraud",
        "Homicide",
        "Kidnapping",
        "Money laundering",
        "Organized crime",
        "Rape",
        "Robbery",
        "Sexual violence",
        "Theft",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Default for PanelSchema {
    fn default() -> Self {
        Self {
            country_column: default_country_column(),
            year_column: default_year_column(),
            migration_column: default_migration_column(),
            categories: default_categories(),
        }
    }
}

/// One cleaned (country, year) observation.
///
/// Produced by the loader. Every record has a defined year; rows whose
/// year could not be coerced never make it out of the loader. Category
/// values that were missing or unparsable in the source are simply absent
/// from `categories` — absent is distinct from zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryYearRecord {
    /// Country identifier, verbatim from the source.
    pub country: String,
    /// Observation year.
    pub year: i32,
    /// Present crime-category values, keyed by schema category name.
    pub categories: BTreeMap<String, f64>,
    /// Migration indicator, if present.
    pub migration: Option<f64>,
}

/// One (year, value) observation in an analysis series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Observation year.
    pub year: i32,
    /// Observed value.
    pub value: f64,
}

/// An ordered value series for one analysis unit.
///
/// Points are sorted ascending by year with no duplicate years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// The unit this series describes.
    pub unit: UnitId,
    /// Year-ascending observations.
    pub points: Vec<SeriesPoint>,
}

impl Series {
    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` if the series has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Observation years, in order.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        self.points.iter().map(|p| p.year).collect()
    }

    /// Observation values, in year order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Last observed year, if any.
    #[must_use]
    pub fn last_year(&self) -> Option<i32> {
        self.points.last().map(|p| p.year)
    }
}

/// One (migration, target) sample for a relevance fit.
///
/// The year is carried only as a row label for charting; it is not a
/// model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceRow {
    /// Observation year (row label, not a feature).
    pub year: i32,
    /// Migration indicator (model feature).
    pub migration: f64,
    /// Crime measure being predicted (model target).
    pub target: f64,
}

/// The (migration, target) samples for one analysis unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceTable {
    /// The unit these samples describe.
    pub unit: UnitId,
    /// Samples, one per retained source row.
    pub rows: Vec<RelevanceRow>,
}

/// The granularity at which a model is independently fit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum UnitId {
    /// The whole-region union of all countries.
    Region,
    /// A single country.
    Country {
        /// Country identifier.
        country: String,
    },
    /// One crime category across the whole region.
    CrimeType {
        /// Category name.
        crime_type: String,
    },
    /// One crime category within one country.
    CountryCrimeType {
        /// Country identifier.
        country: String,
        /// Category name.
        crime_type: String,
    },
}

impl UnitId {
    /// Deterministic file-name slug for this unit (spaces become `_`).
    #[must_use]
    pub fn slug(&self) -> String {
        match self {
            Self::Region => "europe".to_string(),
            Self::Country { country } => country.replace(' ', "_"),
            Self::CrimeType { crime_type } => crime_type.replace(' ', "_"),
            Self::CountryCrimeType {
                country,
                crime_type,
            } => format!("{}_{}", country.replace(' ', "_"), crime_type.replace(' ', "_")),
        }
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Region => write!(f, "Europe"),
            Self::Country { country } => write!(f, "{country}"),
            Self::CrimeType { crime_type } => write!(f, "{crime_type}"),
            Self::CountryCrimeType {
                country,
                crime_type,
            } => write!(f, "{country} / {crime_type}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_tracks_thirteen_categories() {
        let schema = PanelSchema::default();
        assert_eq!(schema.categories.len(), 13);
        assert_eq!(schema.country_column, "ülke");
        assert_eq!(schema.year_column, "yıl");
        assert_eq!(schema.migration_column, "göç");
    }

    #[test]
    fn slugs_replace_spaces() {
        let unit = UnitId::CountryCrimeType {
            country: "United Kingdom".to_string(),
            crime_type: "Drug offences".to_string(),
        };
        assert_eq!(unit.slug(), "United_Kingdom_Drug_offences");
        assert_eq!(unit.to_string(), "United Kingdom / Drug offences");
    }

    #[test]
    fn series_accessors_follow_point_order() {
        let series = Series {
            unit: UnitId::Region,
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
        assert_eq!(series.years(), vec![2018, 2019]);
        assert_eq!(series.values(), vec![8.0, 10.0]);
        assert_eq!(series.last_year(), Some(2019));
    }
}
