#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Relevance engine: how well does migration explain crime levels?
//!
//! Fits a seeded random-forest regression predicting a crime measure
//! from the migration indicator for one analysis unit, then scores the
//! fit in-sample. The score is R² over the same rows used for fitting —
//! a descriptive goodness-of-fit measure, NOT a held-out validation
//! metric. A fixed ensemble seed makes repeated runs on identical input
//! reproduce identical scores.

use crime_trends_panel_models::{RelevanceTable, UnitId};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use thiserror::Error;

/// Errors from relevance fitting.
#[derive(Debug, Error)]
pub enum RelevanceError {
    /// Not enough samples to fit the ensemble.
    #[error("too few rows to fit: {actual}")]
    TooFewRows {
        /// Samples supplied.
        actual: usize,
    },

    /// The target takes a single value across the unit's rows; variance
    /// explained is undefined.
    #[error("target is constant across {rows} rows")]
    ConstantTarget {
        /// Samples supplied.
        rows: usize,
    },

    /// The underlying ensemble failed to fit or predict.
    #[error("ensemble error: {0}")]
    Ensemble(#[from] smartcore::error::Failed),
}

/// Ensemble size and seed for a relevance fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceParams {
    /// Number of trees in the forest.
    pub trees: u16,
    /// Seed for the ensemble's bootstrap sampling.
    pub seed: u64,
}

impl RelevanceParams {
    /// Defaults for country-level fits (total crime from migration).
    #[must_use]
    pub const fn country_level() -> Self {
        Self {
            trees: 300,
            seed: 42,
        }
    }

    /// Defaults for per-crime-type fits.
    #[must_use]
    pub const fn category_level() -> Self {
        Self {
            trees: 100,
            seed: 42,
        }
    }
}

impl Default for RelevanceParams {
    fn default() -> Self {
        Self::country_level()
    }
}

/// A scored relevance fit for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceFit {
    /// The unit that was fitted.
    pub unit: UnitId,
    /// In-sample R². Descriptive only; can be negative for a poor fit,
    /// and is not clamped.
    pub score: f64,
    /// In-sample predictions, one per table row, in row order.
    pub predicted: Vec<f64>,
}

/// Fits the ensemble on one unit's (migration, target) samples and
/// scores it in-sample.
///
/// # Errors
///
/// Returns [`RelevanceError::TooFewRows`] for fewer than two samples,
/// [`RelevanceError::ConstantTarget`] when the target never varies, and
/// [`RelevanceError::Ensemble`] if the underlying fit fails.
pub fn fit_unit(
    table: &RelevanceTable,
    params: RelevanceParams,
) -> Result<RelevanceFit, RelevanceError> {
    if table.rows.len() < 2 {
        return Err(RelevanceError::TooFewRows {
            actual: table.rows.len(),
        });
    }

    let first = table.rows[0].target;
    if table.rows.iter().all(|row| row.target == first) {
        return Err(RelevanceError::ConstantTarget {
            rows: table.rows.len(),
        });
    }

    let features: Vec<Vec<f64>> = table.rows.iter().map(|row| vec![row.migration]).collect();
    let targets: Vec<f64> = table.rows.iter().map(|row| row.target).collect();

    let x = DenseMatrix::from_2d_vec(&features);
    let model = RandomForestRegressor::fit(
        &x,
        &targets,
        RandomForestRegressorParameters::default()
            .with_n_trees(params.trees.into())
            .with_seed(params.seed),
    )?;
    let predicted = model.predict(&x)?;

    let score = r_squared(&targets, &predicted);
    log::debug!(
        "relevance {}: {} rows, {} trees, R² = {score:.4}",
        table.unit,
        table.rows.len(),
        params.trees
    );

    Ok(RelevanceFit {
        unit: table.unit.clone(),
        score,
        predicted,
    })
}

/// Coefficient of determination of `predicted` against `actual`.
///
/// 1.0 is a perfect fit, 0.0 matches predicting the mean, negative is
/// worse than the mean. `NaN` on length mismatch or empty input.
#[must_use]
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;

    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    if ss_tot < 1e-10 {
        return 1.0;
    }

    1.0 - ss_res / ss_tot
}
