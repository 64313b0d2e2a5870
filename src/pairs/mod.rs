//! Pairs Analyzer (spec §4.5): cointegration and z-score statistical
//! arbitrage signal over two aligned price series.

mod error;
mod regression;

pub use error::AnalyzerError;

use regression::{diff, ols_no_intercept_1, ols_no_intercept_2, ols_with_intercept};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

const MIN_OBSERVATIONS: usize = 10;

/// Critical values for the ADF test statistic at the three standard
/// significance levels (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

impl Default for CriticalValues {
    fn default() -> Self {
        Self {
            one_pct: -3.43,
            five_pct: -2.86,
            ten_pct: -2.57,
        }
    }
}

/// Full statistical profile of one pair (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairStatistics {
    /// Pearson correlation of `prices_x`/`prices_y` over the full window.
    pub correlation: f64,
    /// OLS hedge ratio: `y = beta * x + alpha`.
    pub beta: f64,
    pub alpha: f64,
    /// Engle-Granger ADF test statistic on the hedge-ratio residuals.
    pub adf_statistic: f64,
    pub critical_values: CriticalValues,
    /// `adf_statistic < critical_values.five_pct`.
    pub cointegrated: bool,
    pub spread_mean: f64,
    pub spread_stddev: f64,
    /// Z-score of the most recent residual against `spread_mean`/`spread_stddev`.
    pub current_z_score: f64,
    /// Expected bars for the spread to revert halfway to its mean; `0` when
    /// the AR(1) fit shows no mean reversion.
    pub half_life: i64,
}

/// Stateless analyzer: `analyze` is a pure function of its two input series.
#[derive(Debug, Default, Clone, Copy)]
pub struct PairsAnalyzer;

impl PairsAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Runs the full Engle-Granger cointegration and z-score pipeline over
    /// `prices_x`/`prices_y`.
    ///
    /// # Errors
    /// [`AnalyzerError::InsufficientData`] when the series differ in length
    /// or have fewer than 10 points; [`AnalyzerError::SingularRegression`]
    /// when any regression step's design matrix is singular.
    pub fn analyze(&self, prices_x: &[f64], prices_y: &[f64]) -> Result<PairStatistics, AnalyzerError> {
        if prices_x.len() != prices_y.len() || prices_x.len() < MIN_OBSERVATIONS {
            return Err(AnalyzerError::InsufficientData {
                x_len: prices_x.len(),
                y_len: prices_y.len(),
            });
        }

        let correlation = pearson(prices_x, prices_y);
        let (beta, alpha) = ols_with_intercept(prices_x, prices_y, "hedge ratio")?;

        let residuals: Vec<f64> = prices_x
            .iter()
            .zip(prices_y)
            .map(|(&x, &y)| y - (beta * x + alpha))
            .collect();

        let adf_statistic = adf_test_lag1(&residuals)?;
        let critical_values = CriticalValues::default();
        let cointegrated = adf_statistic < critical_values.five_pct;

        let spread_mean = residuals.clone().mean();
        let spread_stddev = residuals.clone().std_dev();
        let current_z_score = if spread_stddev == 0.0 {
            0.0
        } else {
            (residuals[residuals.len() - 1] - spread_mean) / spread_stddev
        };

        let half_life = half_life(&residuals)?;

        Ok(PairStatistics {
            correlation,
            beta,
            alpha,
            adf_statistic,
            critical_values,
            cointegrated,
            spread_mean,
            spread_stddev,
            current_z_score,
            half_life,
        })
    }
}

/// Pearson correlation coefficient of `x` and `y` over their full window.
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let x_bar = x.iter().sum::<f64>() / n;
    let y_bar = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        cov += (xi - x_bar) * (yi - y_bar);
        var_x += (xi - x_bar).powi(2);
        var_y += (yi - y_bar).powi(2);
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 { 0.0 } else { cov / denom }
}

/// Augmented Dickey-Fuller test with lag 1 on `residuals` (spec §4.5 step 3):
/// regress `delta_e[t] = rho * e[t-1] + gamma * delta_e[t-1] + eps`, return
/// `t = rho_hat / SE(rho_hat)`.
fn adf_test_lag1(residuals: &[f64]) -> Result<f64, AnalyzerError> {
    let delta_e = diff(residuals);
    // delta_e[t] for t = 2..N-1 regressed on e[t-1], delta_e[t-1].
    let y = &delta_e[1..];
    let x1 = &residuals[1..residuals.len() - 1];
    let x2 = &delta_e[..delta_e.len() - 1];

    let (rho, _gamma, se_rho) = ols_no_intercept_2(x1, x2, y, "augmented Dickey-Fuller")?;
    Ok(rho / se_rho)
}

/// Half-life of mean reversion (spec §4.5 step 5): fit `delta_e[t] = lambda *
/// e[t-1]`; `half_life = round(-ln(2) / lambda)` when `lambda < 0`, else 0.
fn half_life(residuals: &[f64]) -> Result<i64, AnalyzerError> {
    let delta_e = diff(residuals);
    let e_lag = &residuals[..residuals.len() - 1];
    let lambda = ols_no_intercept_1(e_lag, &delta_e, "half-life")?;
    if lambda < 0.0 {
        Ok((-std::f64::consts::LN_2 / lambda).round() as i64)
    } else {
        Ok(0)
    }
}
