//! Dataset loader: raw CSV to cleaned (country, year) records.
//!
//! Coercion policy mirrors three granularities: the file itself and the
//! country/year columns are structural (fatal if broken); individual
//! rows with an uncoercible year are dropped; individual numeric cells
//! that fail coercion become absent for that field only. Missing
//! *category* columns are tolerated — those categories are simply absent
//! for every row.

use std::collections::BTreeMap;
use std::path::Path;

use crime_trends_panel_models::{CountryYearRecord, PanelSchema};

use crate::PanelError;

/// Loads the panel CSV at `path` into cleaned records.
///
/// Every returned record has a defined year. Rows whose year cell cannot
/// be coerced to an integer are dropped (logged at `trace`); category and
/// migration cells that cannot be coerced are recorded as absent.
///
/// # Errors
///
/// Returns [`PanelError::Csv`] if the file cannot be opened or its header
/// read, and [`PanelError::MissingColumn`] if the country or year column
/// named by `schema` is not present.
pub fn load_panel(path: &Path, schema: &PanelSchema) -> Result<Vec<CountryYearRecord>, PanelError> {
    let display = path.display().to_string();

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| PanelError::Csv {
            path: display.clone(),
            source: e,
        })?;

    let headers = reader
        .headers()
        .map_err(|e| PanelError::Csv {
            path: display.clone(),
            source: e,
        })?
        .clone();

    let position = |column: &str| headers.iter().position(|h| h.trim() == column);

    let country_idx =
        position(&schema.country_column).ok_or_else(|| PanelError::MissingColumn {
            column: schema.country_column.clone(),
            path: display.clone(),
        })?;
    let year_idx = position(&schema.year_column).ok_or_else(|| PanelError::MissingColumn {
        column: schema.year_column.clone(),
        path: display.clone(),
    })?;

    // Optional columns: a dataset without them just has those fields absent.
    let migration_idx = position(&schema.migration_column);
    let category_idx: Vec<(String, usize)> = schema
        .categories
        .iter()
        .filter_map(|name| position(name).map(|idx| (name.clone(), idx)))
        .collect();

    if category_idx.len() < schema.categories.len() {
        log::warn!(
            "{display}: {} of {} category columns present",
            category_idx.len(),
            schema.categories.len()
        );
    }

    let mut records = Vec::new();
    let mut dropped = 0u64;

    for result in reader.records() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                log::trace!("skipping malformed row: {e}");
                dropped += 1;
                continue;
            }
        };

        let Some(year) = row.get(year_idx).and_then(parse_year) else {
            log::trace!("skipping row with uncoercible year");
            dropped += 1;
            continue;
        };

        let country = row.get(country_idx).unwrap_or_default().trim().to_string();

        let mut categories = BTreeMap::new();
        for (name, idx) in &category_idx {
            if let Some(value) = row.get(*idx).and_then(parse_cell) {
                categories.insert(name.clone(), value);
            }
        }

        let migration = migration_idx
            .and_then(|idx| row.get(idx))
            .and_then(parse_cell);

        records.push(CountryYearRecord {
            country,
            year,
            categories,
            migration,
        });
    }

    log::info!(
        "{display}: loaded {} records ({dropped} rows dropped)",
        records.len()
    );

    Ok(records)
}

/// Coerces a year cell to an integer.
///
/// Accepts plain integers and float text with a zero fractional part
/// (`"2018"`, `"2018.0"`). Returns `None` for anything else.
#[must_use]
pub fn parse_year(cell: &str) -> Option<i32> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    if let Ok(year) = cell.parse::<i32>() {
        return Some(year);
    }
    let value = cell.parse::<f64>().ok()?;
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let year = value as i32;
    Some(year)
}

/// Coerces a numeric cell to a finite value. Missing, unparsable, and
/// non-finite cells are all absent, never zero.
#[must_use]
pub fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("crime_trends_loader_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn schema() -> PanelSchema {
        PanelSchema {
            country_column: "country".to_string(),
            year_column: "year".to_string(),
            migration_column: "migration".to_string(),
            categories: vec!["Assault".to_string(), "Theft".to_string()],
        }
    }

    #[test]
    fn loads_clean_rows() {
        let path = write_csv(
            "clean.csv",
            "country,year,Assault,Theft,migration\n\
             Germany,2018,5,3,100\n\
             Germany,2019,6,4,110\n",
        );
        let records = load_panel(&path, &schema()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, 2018);
        assert_eq!(records[0].categories["Assault"], 5.0);
        assert_eq!(records[0].migration, Some(100.0));
    }

    #[test]
    fn drops_rows_with_bad_year() {
        let path = write_csv(
            "bad_year.csv",
            "country,year,Assault,Theft,migration\n\
             Germany,not-a-year,5,3,100\n\
             Germany,2019.0,6,4,110\n\
             Germany,2019.5,7,5,120\n",
        );
        let records = load_panel(&path, &schema()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 2019);
    }

    #[test]
    fn bad_cells_become_absent_not_zero() {
        let path = write_csv(
            "bad_cells.csv",
            "country,year,Assault,Theft,migration\n\
             Germany,2018,oops,3,\n",
        );
        let records = load_panel(&path, &schema()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].categories.contains_key("Assault"));
        assert_eq!(records[0].categories["Theft"], 3.0);
        assert_eq!(records[0].migration, None);
    }

    #[test]
    fn tolerates_missing_category_column() {
        let path = write_csv(
            "no_theft.csv",
            "country,year,Assault,migration\n\
             Germany,2018,5,100\n",
        );
        let records = load_panel(&path, &schema()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].categories.contains_key("Theft"));
    }

    #[test]
    fn missing_year_column_is_fatal() {
        let path = write_csv(
            "no_year.csv",
            "country,Assault,Theft,migration\nGermany,5,3,100\n",
        );
        let err = load_panel(&path, &schema()).unwrap_err();
        assert!(matches!(
            err,
            PanelError::MissingColumn { ref column, .. } if column == "year"
        ));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_panel(Path::new("/nonexistent/panel.csv"), &schema()).unwrap_err();
        assert!(matches!(err, PanelError::Csv { .. }));
    }

    #[test]
    fn parses_year_variants() {
        assert_eq!(parse_year("2018"), Some(2018));
        assert_eq!(parse_year(" 2018.0 "), Some(2018));
        assert_eq!(parse_year("2018.5"), None);
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("NaN"), None);
    }

    #[test]
    fn rejects_non_finite_cells() {
        assert_eq!(parse_cell("NaN"), None);
        assert_eq!(parse_cell("inf"), None);
        assert_eq!(parse_cell("3.5"), Some(3.5));
    }
}
