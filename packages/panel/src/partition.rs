//! Partitioner: cleaned records to per-unit analysis inputs.
//!
//! Each function filters the panel down to one analysis unit and emits
//! either a year-ordered [`Series`] (forecasting input) or a
//! [`RelevanceTable`] of (migration, target) samples (relevance input).
//! Units are independent; multi-unit callers invoke these per member and
//! skip [`PanelError::EmptyUnit`] failures.

use std::collections::BTreeMap;

use crime_trends_panel_models::{
    CountryYearRecord, PanelSchema, RelevanceRow, RelevanceTable, Series, SeriesPoint, UnitId,
};

use crate::PanelError;
use crate::aggregate::{total_crime, totals_by_year};

/// The crime measure a relevance table predicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelevanceTarget {
    /// The derived total-crime measure.
    TotalCrime,
    /// One raw category column.
    Category(String),
}

/// Distinct countries in first-appearance order.
#[must_use]
pub fn countries(records: &[CountryYearRecord]) -> Vec<String> {
    let mut seen = Vec::new();
    for record in records {
        if !seen.contains(&record.country) {
            seen.push(record.country.clone());
        }
    }
    seen
}

/// One country's total-crime series, year-ascending.
///
/// Rows whose total is undefined are excluded. When the source carries
/// duplicate (country, year) rows, the later row wins so the series
/// never holds duplicate years.
///
/// # Errors
///
/// Returns [`PanelError::EmptyUnit`] if no row yields a defined total
/// for the country.
pub fn country_series(
    records: &[CountryYearRecord],
    schema: &PanelSchema,
    country: &str,
) -> Result<Series, PanelError> {
    let unit = UnitId::Country {
        country: country.to_string(),
    };

    let mut by_year = BTreeMap::new();
    for record in records.iter().filter(|r| r.country == country) {
        if let Some(total) = total_crime(record, schema) {
            by_year.insert(record.year, total);
        }
    }

    series_from_map(unit, by_year)
}

/// The whole-region total-crime series: per-year sums across all
/// countries, year-ascending.
///
/// # Errors
///
/// Returns [`PanelError::EmptyUnit`] if no year has a defined total.
pub fn region_series(
    records: &[CountryYearRecord],
    schema: &PanelSchema,
) -> Result<Series, PanelError> {
    series_from_map(UnitId::Region, totals_by_year(records, schema))
}

/// One raw category column as a series, optionally filtered to a country.
///
/// No aggregation is applied: the category value itself is the series
/// value. Rows where the category is absent are excluded.
///
/// # Errors
///
/// Returns [`PanelError::EmptyUnit`] if no row carries the category.
pub fn category_series(
    records: &[CountryYearRecord],
    category: &str,
    country: Option<&str>,
) -> Result<Series, PanelError> {
    let unit = match country {
        Some(country) => UnitId::CountryCrimeType {
            country: country.to_string(),
            crime_type: category.to_string(),
        },
        None => UnitId::CrimeType {
            crime_type: category.to_string(),
        },
    };

    let mut by_year = BTreeMap::new();
    for record in filtered(records, country) {
        if let Some(value) = record.categories.get(category) {
            by_year.insert(record.year, *value);
        }
    }

    series_from_map(unit, by_year)
}

/// The (migration, target) samples for one unit, year-ascending.
///
/// Rows missing either the migration indicator or the target value are
/// dropped. Duplicate years are kept: each retained source row is one
/// sample.
///
/// # Errors
///
/// Returns [`PanelError::EmptyUnit`] if no row has both fields present.
pub fn relevance_table(
    records: &[CountryYearRecord],
    schema: &PanelSchema,
    target: &RelevanceTarget,
    country: Option<&str>,
) -> Result<RelevanceTable, PanelError> {
    let unit = match (target, country) {
        (RelevanceTarget::TotalCrime, Some(country)) => UnitId::Country {
            country: country.to_string(),
        },
        (RelevanceTarget::TotalCrime, None) => UnitId::Region,
        (RelevanceTarget::Category(category), Some(country)) => UnitId::CountryCrimeType {
            country: country.to_string(),
            crime_type: category.clone(),
        },
        (RelevanceTarget::Category(category), None) => UnitId::CrimeType {
            crime_type: category.clone(),
        },
    };

    let mut rows = Vec::new();
    for record in filtered(records, country) {
        let Some(migration) = record.migration else {
            continue;
        };
        let value = match target {
            RelevanceTarget::TotalCrime => total_crime(record, schema),
            RelevanceTarget::Category(category) => record.categories.get(category).copied(),
        };
        if let Some(target) = value {
            rows.push(RelevanceRow {
                year: record.year,
                migration,
                target,
            });
        }
    }

    if rows.is_empty() {
        return Err(PanelError::EmptyUnit {
            unit: unit.to_string(),
        });
    }

    rows.sort_by_key(|row| row.year);
    Ok(RelevanceTable { unit, rows })
}

fn filtered<'a>(
    records: &'a [CountryYearRecord],
    country: Option<&'a str>,
) -> impl Iterator<Item = &'a CountryYearRecord> {
    records
        .iter()
        .filter(move |r| country.is_none_or(|c| r.country == c))
}

fn series_from_map(unit: UnitId, by_year: BTreeMap<i32, f64>) -> Result<Series, PanelError> {
    if by_year.is_empty() {
        return Err(PanelError::EmptyUnit {
            unit: unit.to_string(),
        });
    }

    let points = by_year
        .into_iter()
        .map(|(year, value)| SeriesPoint { year, value })
        .collect();

    Ok(Series { unit, points })
}
