//! Validated (observation, prediction) pairs for one entity.

use crate::error::VerifyError;
use crate::input::TimeSeries;

/// Index-aligned observation and prediction values for one entity.
///
/// Guarantees at least one pair, equal lengths and finite values, so every
/// score can index both sides without further checks.
#[derive(Debug, Clone, PartialEq)]
pub struct PairSeries {
    label: String,
    obs: Vec<f64>,
    pred: Vec<f64>,
}

impl PairSeries {
    /// Create a pair series from already clean sequences.
    ///
    /// # Errors
    ///
    /// - [`VerifyError::LengthMismatch`] if the sequences differ in length.
    /// - [`VerifyError::NonFiniteData`] if any value is NaN or infinite.
    /// - [`VerifyError::EmptyPairSeries`] if the sequences are empty.
    pub fn new(
        label: impl Into<String>,
        obs: Vec<f64>,
        pred: Vec<f64>,
    ) -> Result<Self, VerifyError> {
        let label = label.into();
        if obs.len() != pred.len() {
            return Err(VerifyError::LengthMismatch {
                obs_len: obs.len(),
                pred_len: pred.len(),
            });
        }
        if obs.iter().chain(pred.iter()).any(|v| !v.is_finite()) {
            return Err(VerifyError::NonFiniteData);
        }
        if obs.is_empty() {
            return Err(VerifyError::EmptyPairSeries { entity: label });
        }
        Ok(Self { label, obs, pred })
    }

    /// Create a pair series from raw sequences, dropping every pair where
    /// either side is NaN.
    ///
    /// # Errors
    ///
    /// Same as [`PairSeries::new`]; infinite values are still rejected.
    pub fn from_raw(
        label: impl Into<String>,
        obs: &[f64],
        pred: &[f64],
    ) -> Result<Self, VerifyError> {
        if obs.len() != pred.len() {
            return Err(VerifyError::LengthMismatch {
                obs_len: obs.len(),
                pred_len: pred.len(),
            });
        }
        let (obs, pred): (Vec<f64>, Vec<f64>) = obs
            .iter()
            .zip(pred.iter())
            .filter(|(o, p)| !o.is_nan() && !p.is_nan())
            .map(|(&o, &p)| (o, p))
            .unzip();
        Self::new(label, obs, pred)
    }

    /// Align two time series on their common timestamps and drop NaN pairs.
    ///
    /// Pairs follow the observation index order. Timestamps present on only
    /// one side are ignored.
    pub fn align(
        label: impl Into<String>,
        obs: &TimeSeries,
        pred: &TimeSeries,
    ) -> Result<Self, VerifyError> {
        let mut obs_values = Vec::new();
        let mut pred_values = Vec::new();
        for (time, o) in obs.iter() {
            if let Some(p) = pred.value_at(time) {
                obs_values.push(o);
                pred_values.push(p);
            }
        }
        Self::from_raw(label, &obs_values, &pred_values)
    }

    /// Concatenate several series, in the given order, into one pooled series.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::EmptyPairSeries`] if `parts` is empty.
    pub fn pooled<'a>(
        label: impl Into<String>,
        parts: impl IntoIterator<Item = &'a PairSeries>,
    ) -> Result<Self, VerifyError> {
        let mut obs = Vec::new();
        let mut pred = Vec::new();
        for part in parts {
            obs.extend_from_slice(&part.obs);
            pred.extend_from_slice(&part.pred);
        }
        Self::new(label, obs, pred)
    }

    /// Entity label (station code or aggregate label).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Observed values.
    pub fn obs(&self) -> &[f64] {
        &self.obs
    }

    /// Predicted values.
    pub fn pred(&self) -> &[f64] {
        &self.pred
    }

    /// Number of pairs (always >= 1).
    pub fn len(&self) -> usize {
        self.obs.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.obs.is_empty()
    }

    /// Iterate over `(obs, pred)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.obs.iter().copied().zip(self.pred.iter().copied())
    }
}
