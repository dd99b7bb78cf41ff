//! ARIMA(p,d,q) model: differencing, Yule-Walker AR estimation, and
//! residual-based MA estimation.
//!
//! AR coefficients come from the Yule-Walker equations solved with
//! Levinson-Durbin recursion on the differenced series; MA coefficients
//! from the autocorrelation of the AR residuals, clamped for stability.
//! Forecasts are generated recursively on the differenced scale with
//! future residuals taken as zero, then cumulated back to the original
//! scale.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ForecastError;

const MAX_AR_ORDER: usize = 10;
const MAX_DIFFERENCING: usize = 2;
const MAX_MA_ORDER: usize = 10;

/// Model order triple: autoregressive lag, differencing degree, moving
/// average lag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// Autoregressive order.
    pub p: usize,
    /// Differencing degree.
    pub d: usize,
    /// Moving-average order.
    pub q: usize,
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self { p: 1, d: 1, q: 1 }
    }
}

impl ArimaOrder {
    /// Minimum series length this order can be fitted to: the series
    /// must survive `d` rounds of differencing with at least one point
    /// left, and a forecast from a single observation is meaningless.
    #[must_use]
    pub const fn min_observations(&self) -> usize {
        if self.d + 1 > 2 { self.d + 1 } else { 2 }
    }

    fn validate(self) -> Result<Self, ForecastError> {
        if self.p > MAX_AR_ORDER {
            return Err(ForecastError::InvalidOrder {
                reason: format!("AR order {} exceeds {MAX_AR_ORDER}", self.p),
            });
        }
        if self.d > MAX_DIFFERENCING {
            return Err(ForecastError::InvalidOrder {
                reason: format!("differencing degree {} exceeds {MAX_DIFFERENCING}", self.d),
            });
        }
        if self.q > MAX_MA_ORDER {
            return Err(ForecastError::InvalidOrder {
                reason: format!("MA order {} exceeds {MAX_MA_ORDER}", self.q),
            });
        }
        Ok(self)
    }
}

impl std::fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

impl FromStr for ArimaOrder {
    type Err = String;

    /// Parses `"p,d,q"` (e.g. `"1,1,1"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [p, d, q] = parts.as_slice() else {
            return Err(format!("expected p,d,q but got '{s}'"));
        };
        let parse = |part: &str, name: &str| {
            part.parse::<usize>()
                .map_err(|_| format!("invalid {name} component '{part}'"))
        };
        Ok(Self {
            p: parse(p, "AR")?,
            d: parse(d, "differencing")?,
            q: parse(q, "MA")?,
        })
    }
}

/// A fitted ARIMA model.
///
/// Construction via [`Arima::fit`] is the only way to obtain one, so
/// every instance is ready to forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arima {
    order: ArimaOrder,
    ar_coeffs: Vec<f64>,
    ma_coeffs: Vec<f64>,
    constant: f64,
    original: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
}

impl Arima {
    /// Fits the model to `values` with the given order.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InvalidOrder`] for an out-of-range
    /// order, [`ForecastError::SeriesTooShort`] when the series cannot
    /// support the differencing degree,
    /// [`ForecastError::NonFiniteValue`] when the series contains NaN
    /// or infinities, and [`ForecastError::DegenerateSeries`] for a
    /// constant series.
    pub fn fit(order: ArimaOrder, values: &[f64]) -> Result<Self, ForecastError> {
        let order = order.validate()?;

        let required = order.min_observations();
        if values.len() < required {
            return Err(ForecastError::SeriesTooShort {
                required,
                actual: values.len(),
            });
        }

        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::NonFiniteValue);
        }

        let spread = values.iter().fold(f64::NEG_INFINITY, |m, v| m.max(*v))
            - values.iter().fold(f64::INFINITY, |m, v| m.min(*v));
        if spread == 0.0 {
            return Err(ForecastError::DegenerateSeries {
                value: values[0],
                len: values.len(),
            });
        }

        let differenced = difference(values, order.d);
        let ar_coeffs = yule_walker(&differenced, order.p);

        #[allow(clippy::cast_precision_loss)]
        let constant = differenced.iter().sum::<f64>() / differenced.len() as f64;

        // One-step-ahead AR residuals; the first p points have none.
        let mut residuals = vec![0.0; differenced.len()];
        for i in order.p..differenced.len() {
            let mut prediction = constant;
            for (j, coeff) in ar_coeffs.iter().enumerate() {
                prediction += coeff * (differenced[i - j - 1] - constant);
            }
            residuals[i] = differenced[i] - prediction;
        }

        let ma_coeffs = residual_autocorrelation(&residuals, order.q);

        Ok(Self {
            order,
            ar_coeffs,
            ma_coeffs,
            constant,
            original: values.to_vec(),
            differenced,
            residuals,
        })
    }

    /// The order this model was fitted with.
    #[must_use]
    pub const fn order(&self) -> ArimaOrder {
        self.order
    }

    /// AR coefficients of the fitted model.
    #[must_use]
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coeffs
    }

    /// MA coefficients of the fitted model.
    #[must_use]
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coeffs
    }

    /// Extrapolates `steps` values beyond the fitted series.
    ///
    /// Forecasts are produced recursively on the differenced scale
    /// (future residuals zero) and cumulated back to the original scale.
    /// A zero `steps` yields an empty vector.
    #[must_use]
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let fitted_len = self.differenced.len();
        let mut extended = self.differenced.clone();
        let mut residuals = self.residuals.clone();

        for _ in 0..steps {
            let mut next = self.constant;

            // Lags reaching past the start of the series contribute 0.
            for (j, coeff) in self.ar_coeffs.iter().enumerate() {
                if extended.len() > j {
                    let idx = extended.len() - j - 1;
                    next += coeff * (extended[idx] - self.constant);
                }
            }

            for (j, coeff) in self.ma_coeffs.iter().enumerate() {
                if residuals.len() > j {
                    let idx = residuals.len() - j - 1;
                    next += coeff * residuals[idx];
                }
            }

            extended.push(next);
            residuals.push(0.0);
        }

        self.undifference(&extended[fitted_len..])
    }

    /// Reverses differencing, anchoring each cumulation round at the
    /// last original observation.
    fn undifference(&self, forecasts: &[f64]) -> Vec<f64> {
        if self.order.d == 0 {
            return forecasts.to_vec();
        }

        let mut result = forecasts.to_vec();
        let last = self.original[self.original.len() - 1];

        for _ in 0..self.order.d {
            let mut cumulated = Vec::with_capacity(result.len());
            let mut acc = last;
            for value in &result {
                acc += value;
                cumulated.push(acc);
            }
            result = cumulated;
        }

        result
    }
}

/// Applies `order` rounds of first differencing.
fn difference(values: &[f64], order: usize) -> Vec<f64> {
    let mut result = values.to_vec();
    for _ in 0..order {
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Estimates AR coefficients via Yule-Walker, solved with
/// Levinson-Durbin recursion. Returns zeros when the series carries no
/// usable autocovariance.
fn yule_walker(values: &[f64], p: usize) -> Vec<f64> {
    if p == 0 || values.is_empty() {
        return vec![0.0; p];
    }

    let n = values.len();
    #[allow(clippy::cast_precision_loss)]
    let mean = values.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = values.iter().map(|v| v - mean).collect();

    let mut autocov = vec![0.0; p + 1];
    for (k, cov) in autocov.iter_mut().enumerate() {
        let mut sum = 0.0;
        for i in k..n {
            sum += centered[i] * centered[i - k];
        }
        #[allow(clippy::cast_precision_loss)]
        {
            *cov = sum / n as f64;
        }
    }

    let mut coeffs = vec![0.0; p];
    if autocov[0].abs() <= 1e-10 {
        return coeffs;
    }

    coeffs[0] = autocov[1] / autocov[0];

    for k in 1..p {
        let mut numerator = autocov[k + 1];
        for j in 0..k {
            numerator -= coeffs[j] * autocov[k - j];
        }

        let mut denominator = autocov[0];
        for j in 0..k {
            denominator -= coeffs[j] * autocov[j + 1];
        }

        if denominator.abs() <= 1e-10 {
            continue;
        }

        let reflection = numerator / denominator;
        let previous = coeffs.clone();
        coeffs[k] = reflection;
        for j in 0..k {
            coeffs[j] = previous[j] - reflection * previous[k - 1 - j];
        }
    }

    coeffs
}

/// Estimates MA coefficients from the autocorrelation of the AR
/// residuals, clamped to (-0.99, 0.99) for stability.
fn residual_autocorrelation(residuals: &[f64], q: usize) -> Vec<f64> {
    let mut coeffs = vec![0.0; q];
    if q == 0 || residuals.is_empty() {
        return coeffs;
    }

    let n = residuals.len();
    #[allow(clippy::cast_precision_loss)]
    let mean = residuals.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = residuals.iter().map(|v| v - mean).collect();

    #[allow(clippy::cast_precision_loss)]
    let variance = centered.iter().map(|v| v * v).sum::<f64>() / n as f64;
    if variance.abs() <= 1e-10 {
        return coeffs;
    }

    for (k, coeff) in coeffs.iter_mut().enumerate() {
        let mut sum = 0.0;
        for i in (k + 1)..n {
            sum += centered[i] * centered[i - k - 1];
        }
        #[allow(clippy::cast_precision_loss)]
        {
            *coeff = ((sum / n as f64) / variance).clamp(-0.99, 0.99);
        }
    }

    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_order() {
        let err = Arima::fit(ArimaOrder { p: 11, d: 1, q: 1 }, &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidOrder { .. }));

        let err = Arima::fit(ArimaOrder { p: 1, d: 3, q: 1 }, &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidOrder { .. }));
    }

    #[test]
    fn rejects_short_series() {
        let err = Arima::fit(ArimaOrder::default(), &[5.0]).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::SeriesTooShort {
                required: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn rejects_non_finite_series() {
        let err = Arima::fit(ArimaOrder::default(), &[1.0, f64::NAN, 3.0]).unwrap_err();
        assert!(matches!(err, ForecastError::NonFiniteValue));
    }

    #[test]
    fn rejects_constant_series() {
        let err = Arima::fit(ArimaOrder::default(), &[5.0, 5.0, 5.0, 5.0]).unwrap_err();
        assert!(matches!(err, ForecastError::DegenerateSeries { .. }));
    }

    #[test]
    fn fits_two_point_series() {
        let model = Arima::fit(ArimaOrder::default(), &[8.0, 10.0]).unwrap();
        let forecast = model.forecast(1);
        assert_eq!(forecast.len(), 1);
        assert!(forecast[0].is_finite());
    }

    #[test]
    fn trending_series_forecast_continues_upward() {
        let values: Vec<f64> = (1..=20).map(f64::from).collect();
        let model = Arima::fit(ArimaOrder { p: 1, d: 1, q: 0 }, &values).unwrap();
        let forecast = model.forecast(3);
        assert_eq!(forecast.len(), 3);
        assert!(forecast[0] > 20.0);
        assert!(forecast[1] > forecast[0]);
    }

    #[test]
    fn zero_differencing_forecasts_on_raw_scale() {
        let values = vec![4.0, 6.0, 5.0, 7.0, 6.0, 8.0];
        let model = Arima::fit(ArimaOrder { p: 1, d: 0, q: 0 }, &values).unwrap();
        let forecast = model.forecast(2);
        assert_eq!(forecast.len(), 2);
        assert!(forecast.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn ma_coefficients_stay_in_stability_bounds() {
        let values = vec![3.0, 9.0, 2.0, 8.0, 1.0, 7.0, 2.0, 9.0, 3.0, 8.0];
        let model = Arima::fit(ArimaOrder { p: 1, d: 0, q: 2 }, &values).unwrap();
        assert!(model.ma_coefficients().iter().all(|c| c.abs() < 1.0));
    }

    #[test]
    fn parses_order_from_string() {
        assert_eq!(
            "2, 1, 0".parse::<ArimaOrder>().unwrap(),
            ArimaOrder { p: 2, d: 1, q: 0 }
        );
        assert!("1,1".parse::<ArimaOrder>().is_err());
        assert!("a,b,c".parse::<ArimaOrder>().is_err());
    }

    #[test]
    fn zero_steps_yields_empty_forecast() {
        let model = Arima::fit(ArimaOrder::default(), &[8.0, 10.0, 9.0]).unwrap();
        assert!(model.forecast(0).is_empty());
    }
}
