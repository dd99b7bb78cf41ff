//! Total-crime aggregation.
//!
//! The derived `total_crime` measure distinguishes "no data" from "zero
//! crime": a record with no present category values has an undefined
//! total and is excluded from any series built from it, never coerced to
//! zero. A record with at least one present value treats its absent
//! categories as contributing 0 to the sum.

use std::collections::BTreeMap;

use crime_trends_panel_models::{CountryYearRecord, PanelSchema};

/// Sum of the record's present category values.
///
/// `None` when no category value is present for the record.
#[must_use]
pub fn total_crime(record: &CountryYearRecord, schema: &PanelSchema) -> Option<f64> {
    let mut total = None;
    for name in &schema.categories {
        if let Some(value) = record.categories.get(name) {
            *total.get_or_insert(0.0) += value;
        }
    }
    total
}

/// Per-year sums of `total_crime` across the given records.
///
/// Records whose total is undefined contribute nothing; a year where
/// every record's total is undefined does not appear in the result at
/// all. The grouping is order-independent: summing per-country year
/// totals yields the same map as summing all rows directly.
#[must_use]
pub fn totals_by_year<'a>(
    records: impl IntoIterator<Item = &'a CountryYearRecord>,
    schema: &PanelSchema,
) -> BTreeMap<i32, f64> {
    let mut totals = BTreeMap::new();
    for record in records {
        if let Some(total) = total_crime(record, schema) {
            *totals.entry(record.year).or_insert(0.0) += total;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> PanelSchema {
        PanelSchema {
            country_column: "country".to_string(),
            year_column: "year".to_string(),
            migration_column: "migration".to_string(),
            categories: vec!["Assault".to_string(), "Theft".to_string()],
        }
    }

    fn record(country: &str, year: i32, values: &[(&str, f64)]) -> CountryYearRecord {
        CountryYearRecord {
            country: country.to_string(),
            year,
            categories: values
                .iter()
                .map(|(name, v)| ((*name).to_string(), *v))
                .collect(),
            migration: None,
        }
    }

    #[test]
    fn sums_present_categories() {
        let r = record("Germany", 2018, &[("Assault", 5.0), ("Theft", 3.0)]);
        assert_eq!(total_crime(&r, &schema()), Some(8.0));
    }

    #[test]
    fn absent_categories_contribute_zero() {
        let r = record("Germany", 2018, &[("Theft", 3.0)]);
        assert_eq!(total_crime(&r, &schema()), Some(3.0));
    }

    #[test]
    fn all_absent_is_undefined_not_zero() {
        let r = record("Germany", 2018, &[]);
        assert_eq!(total_crime(&r, &schema()), None);
    }

    #[test]
    fn year_groups_exclude_all_undefined_years() {
        let schema = schema();
        let records = vec![
            record("Germany", 2018, &[("Assault", 5.0)]),
            record("France", 2018, &[("Theft", 2.0)]),
            record("Germany", 2019, &[]),
            record("France", 2019, &[]),
        ];
        let totals = totals_by_year(&records, &schema);
        assert_eq!(totals.get(&2018), Some(&7.0));
        assert!(!totals.contains_key(&2019));
    }

    #[test]
    fn grouping_is_order_independent() {
        let schema = schema();
        let records = vec![
            record("Germany", 2018, &[("Assault", 5.0), ("Theft", 3.0)]),
            record("France", 2018, &[("Assault", 1.0)]),
            record("Germany", 2019, &[("Theft", 4.0)]),
            record("France", 2019, &[("Assault", 2.0), ("Theft", 2.0)]),
        ];

        let direct = totals_by_year(&records, &schema);

        let mut by_country: BTreeMap<i32, f64> = BTreeMap::new();
        for country in ["Germany", "France"] {
            let own = totals_by_year(
                records.iter().filter(|r| r.country == country),
                &schema,
            );
            for (year, total) in own {
                *by_country.entry(year).or_insert(0.0) += total;
            }
        }

        assert_eq!(direct, by_country);
    }
}
