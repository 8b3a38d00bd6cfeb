//! Error statistics for forecasts of continuous variables.

use crate::config::ContinuousStatistic;
use crate::error::VerifyError;
use crate::pairs::PairSeries;

/// Continuous statistics over one pair series.
///
/// Reference values for obs = [-1, 8, 12, 13, 18, 10, 16, 19, 23, 24] and
/// pred = [5, 10, 9, 15, 22, 13, 17, 17, 19, 23]: ME = 0.8, multiplicative
/// bias = 1.06, MAE = 2.8, MSE = 10, RMSE = 3.16, R = 0.914.
#[derive(Debug, Clone, Copy)]
pub struct ContinuousStats<'a> {
    series: &'a PairSeries,
}

impl<'a> ContinuousStats<'a> {
    pub fn new(series: &'a PairSeries) -> Self {
        Self { series }
    }

    fn errors(&self) -> impl Iterator<Item = f64> + 'a {
        self.series.iter().map(|(o, p)| p - o)
    }

    fn n(&self) -> f64 {
        self.series.len() as f64
    }

    /// Mean error, `mean(pred - obs)`. Perfect score: 0.
    pub fn me(&self) -> f64 {
        self.errors().sum::<f64>() / self.n()
    }

    /// Multiplicative bias, `mean(pred) / mean(obs)`. Perfect score: 1.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::DivisionByZero`] if the observed mean is zero
    /// up to the rounding error of summing the observations.
    pub fn bias_multiplicative(&self) -> Result<f64, VerifyError> {
        let obs = self.series.obs();
        let mean_obs = verif_stats::mean(obs);
        let magnitude = obs.iter().map(|v| v.abs()).sum::<f64>() / self.n();
        if mean_obs.abs() <= f64::EPSILON * magnitude * self.n() {
            return Err(VerifyError::division_by_zero(
                ContinuousStatistic::MultiplicativeBias.name(),
                "observed mean is zero",
            ));
        }
        Ok(verif_stats::mean(self.series.pred()) / mean_obs)
    }

    /// Mean absolute error. Perfect score: 0.
    pub fn mae(&self) -> f64 {
        self.errors().map(f64::abs).sum::<f64>() / self.n()
    }

    /// Mean squared error. Perfect score: 0.
    pub fn mse(&self) -> f64 {
        self.errors().map(|e| e * e).sum::<f64>() / self.n()
    }

    /// Root mean squared error. Perfect score: 0.
    pub fn rmse(&self) -> f64 {
        self.mse().sqrt()
    }

    /// Pearson correlation between predictions and observations, population
    /// centering. Perfect score: 1.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::DivisionByZero`] if either series is constant.
    pub fn r(&self) -> Result<f64, VerifyError> {
        verif_stats::pearson_correlation(self.series.pred(), self.series.obs()).ok_or_else(|| {
            VerifyError::division_by_zero(
                ContinuousStatistic::R.name(),
                "observations or predictions have zero variance",
            )
        })
    }

    /// Compute one statistic.
    pub fn compute(&self, statistic: ContinuousStatistic) -> Result<f64, VerifyError> {
        match statistic {
            ContinuousStatistic::Rmse => Ok(self.rmse()),
            ContinuousStatistic::R => self.r(),
            ContinuousStatistic::Me => Ok(self.me()),
            ContinuousStatistic::MultiplicativeBias => self.bias_multiplicative(),
            ContinuousStatistic::Mae => Ok(self.mae()),
            ContinuousStatistic::Mse => Ok(self.mse()),
        }
    }

    /// Compute every requested statistic independently, in request order.
    ///
    /// Returns parallel `(values, names)`; a degenerate statistic keeps its
    /// slot as an error so the other values stay aligned with their names.
    pub fn continuous_statistic(
        &self,
        requested: &[ContinuousStatistic],
    ) -> (Vec<Result<f64, VerifyError>>, Vec<String>) {
        requested
            .iter()
            .map(|&s| (self.compute(s), s.name().to_string()))
            .unzip()
    }
}
