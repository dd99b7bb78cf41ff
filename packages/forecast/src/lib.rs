#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! ARIMA forecast engine.
//!
//! Fits an ARIMA(p,d,q) model to one ordered series and extrapolates a
//! requested number of future points. Fitting is fully deterministic
//! (closed-form moment estimators, no randomized initialization), so
//! identical input and order always reproduce identical forecasts.
//!
//! The engine models the *values* only. Observation years are assumed
//! contiguous and evenly spaced; this precondition is not verified —
//! gaps in the source years would silently bias the extrapolation.

pub mod arima;

use crime_trends_panel_models::{Series, SeriesPoint};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::arima::{Arima, ArimaOrder};

/// Errors from ARIMA fitting and forecasting.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A model order component is out of its supported range.
    #[error("invalid order: {reason}")]
    InvalidOrder {
        /// What is wrong with the order.
        reason: String,
    },

    /// The series is shorter than the order requires.
    #[error("series too short: {actual} observations, order requires {required}")]
    SeriesTooShort {
        /// Minimum observations for the order.
        required: usize,
        /// Observations supplied.
        actual: usize,
    },

    /// The series contains NaN or infinite values.
    #[error("series contains non-finite values")]
    NonFiniteValue,

    /// The series is constant; the model cannot converge on it.
    #[error("degenerate series: all {len} observations equal {value}")]
    DegenerateSeries {
        /// The repeated value.
        value: f64,
        /// Series length.
        len: usize,
    },

    /// The requested horizon is zero.
    #[error("forecast horizon must be positive")]
    InvalidHorizon,
}

/// A fitted series plus its forecast continuation.
///
/// Forecast years run from the last observed year + 1, contiguously, one
/// per requested horizon step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// The observed series the model was fitted to.
    pub observed: Series,
    /// Extrapolated points, years ascending with no gap.
    pub forecast: Vec<SeriesPoint>,
    /// The order the model was fitted with.
    pub order: ArimaOrder,
}

/// Fits an ARIMA model to `series` and extrapolates `horizon` points.
///
/// # Errors
///
/// Returns [`ForecastError::InvalidHorizon`] for a zero horizon, and any
/// [`Arima::fit`] error for an unfittable series (too short, non-finite,
/// or constant).
pub fn forecast_series(
    series: &Series,
    order: ArimaOrder,
    horizon: usize,
) -> Result<ForecastResult, ForecastError> {
    if horizon == 0 {
        return Err(ForecastError::InvalidHorizon);
    }

    let model = Arima::fit(order, &series.values())?;
    let values = model.forecast(horizon);

    // fit() rejects empty series, so a last year always exists.
    let last_year = series.last_year().unwrap_or_default();
    let forecast = values
        .into_iter()
        .enumerate()
        .map(|(i, value)| SeriesPoint {
            year: last_year + 1 + i32::try_from(i).unwrap_or(i32::MAX),
            value,
        })
        .collect();

    log::debug!(
        "forecast {}: {} observed, {horizon} extrapolated",
        series.unit,
        series.len()
    );

    Ok(ForecastResult {
        observed: series.clone(),
        forecast,
        order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crime_trends_panel_models::UnitId;

    fn series(values: &[f64]) -> Series {
        Series {
            unit: UnitId::Region,
            points: values
                .iter()
                .enumerate()
                .map(|(i, &value)| SeriesPoint {
                    year: 2010 + i32::try_from(i).unwrap(),
                    value,
                })
                .collect(),
        }
    }

    #[test]
    fn forecast_years_are_contiguous() {
        let s = series(&[3.0, 5.0, 4.0, 6.0, 5.0, 7.0, 6.0, 8.0]);
        let result = forecast_series(&s, ArimaOrder::default(), 3).unwrap();
        assert_eq!(
            result.forecast.iter().map(|p| p.year).collect::<Vec<_>>(),
            vec![2018, 2019, 2020]
        );
        assert!(result.forecast.iter().all(|p| p.value.is_finite()));
    }

    #[test]
    fn two_point_series_fits_default_order() {
        let s = series(&[8.0, 10.0]);
        let result = forecast_series(&s, ArimaOrder::default(), 1).unwrap();
        assert_eq!(result.forecast.len(), 1);
        assert_eq!(result.forecast[0].year, 2012);
        assert!(result.forecast[0].value.is_finite());
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let s = series(&[8.0, 10.0]);
        assert!(matches!(
            forecast_series(&s, ArimaOrder::default(), 0),
            Err(ForecastError::InvalidHorizon)
        ));
    }

    #[test]
    fn horizon_sets_forecast_length() {
        let s = series(&[1.0, 2.0, 4.0, 3.0, 5.0, 4.0, 6.0]);
        for horizon in [1, 2, 5] {
            let result = forecast_series(&s, ArimaOrder::default(), horizon).unwrap();
            assert_eq!(result.forecast.len(), horizon);
        }
    }

    #[test]
    fn repeated_fits_are_identical() {
        let s = series(&[3.0, 5.0, 4.0, 6.0, 5.0, 7.0]);
        let a = forecast_series(&s, ArimaOrder::default(), 3).unwrap();
        let b = forecast_series(&s, ArimaOrder::default(), 3).unwrap();
        assert_eq!(a, b);
    }
}
