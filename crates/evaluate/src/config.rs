//! Verification configuration: which score families to compute and how.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VerifyError;

/// Continuous-variable statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContinuousStatistic {
    #[serde(rename = "RMSE")]
    Rmse,
    #[serde(rename = "R")]
    R,
    #[serde(rename = "ME")]
    Me,
    #[serde(rename = "Multiplicative bias")]
    MultiplicativeBias,
    #[serde(rename = "MAE")]
    Mae,
    #[serde(rename = "MSE")]
    Mse,
}

impl ContinuousStatistic {
    /// Column name used in result tables.
    pub fn name(self) -> &'static str {
        match self {
            Self::Rmse => "RMSE",
            Self::R => "R",
            Self::Me => "ME",
            Self::MultiplicativeBias => "Multiplicative bias",
            Self::Mae => "MAE",
            Self::Mse => "MSE",
        }
    }
}

impl FromStr for ContinuousStatistic {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RMSE" => Ok(Self::Rmse),
            "R" => Ok(Self::R),
            "ME" => Ok(Self::Me),
            "Multiplicative bias" => Ok(Self::MultiplicativeBias),
            "MAE" => Ok(Self::Mae),
            "MSE" => Ok(Self::Mse),
            _ => Err(VerifyError::UnsupportedScore {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ContinuousStatistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dichotomous (yes/no event) score.
///
/// Variant order is the fixed output order of dichotomous results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DichotomousScore {
    #[serde(rename = "TS")]
    Ts,
    #[serde(rename = "PC")]
    Pc,
    #[serde(rename = "FAR")]
    Far,
    #[serde(rename = "POD")]
    Pod,
    #[serde(rename = "Frequency bias")]
    FrequencyBias,
}

impl DichotomousScore {
    /// Every score, in output order.
    pub const ALL: [Self; 5] = [Self::Ts, Self::Pc, Self::Far, Self::Pod, Self::FrequencyBias];

    /// Column name used in result tables.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ts => "TS",
            Self::Pc => "PC",
            Self::Far => "FAR",
            Self::Pod => "POD",
            Self::FrequencyBias => "Frequency bias",
        }
    }
}

impl FromStr for DichotomousScore {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TS" => Ok(Self::Ts),
            "PC" => Ok(Self::Pc),
            "FAR" => Ok(Self::Far),
            "POD" => Ok(Self::Pod),
            "Frequency bias" => Ok(Self::FrequencyBias),
            _ => Err(VerifyError::UnsupportedScore {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DichotomousScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comparison operator defining the event side of a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Event when value >= threshold.
    Ge,
    /// Event when value > threshold.
    Gt,
    /// Event when value <= threshold.
    Le,
    /// Event when value < threshold.
    Lt,
}

impl Operator {
    /// Short name (`ge`, `gt`, `le`, `lt`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Ge => "ge",
            Self::Gt => "gt",
            Self::Le => "le",
            Self::Lt => "lt",
        }
    }

    /// Returns true if `value` falls on the event side of `threshold`.
    #[inline]
    pub fn is_event(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Ge => value >= threshold,
            Self::Gt => value > threshold,
            Self::Le => value <= threshold,
            Self::Lt => value < threshold,
        }
    }
}

impl FromStr for Operator {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ge" | ">=" => Ok(Self::Ge),
            "gt" | ">" => Ok(Self::Gt),
            "le" | "<=" => Ok(Self::Le),
            "lt" | "<" => Ok(Self::Lt),
            _ => Err(VerifyError::UnsupportedOperator {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Diagnostic plot handed to a plot sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    /// Observation and prediction against lead time, side by side.
    Eyeball,
    /// Prediction against observation with the 1:1 line.
    Scatter,
    /// Box plots of the observation and prediction distributions.
    Box,
}

fn default_statistics() -> Vec<ContinuousStatistic> {
    vec![ContinuousStatistic::Rmse]
}

fn default_scores() -> Vec<DichotomousScore> {
    vec![DichotomousScore::Ts, DichotomousScore::Pc]
}

fn default_bounds() -> Vec<f64> {
    vec![2.0, 1.0]
}

/// One requested family of scores with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ScoreFamily {
    /// Continuous statistics, reported in request order.
    Continuous {
        #[serde(default = "default_statistics")]
        statistics: Vec<ContinuousStatistic>,
        #[serde(default)]
        output: Option<String>,
    },
    /// Dichotomous event scores, reported in TS, PC, FAR, POD, frequency
    /// bias order.
    Dichotomous {
        threshold: f64,
        operator: Operator,
        #[serde(default = "default_scores")]
        scores: Vec<DichotomousScore>,
        #[serde(default)]
        output: Option<String>,
    },
    /// Share of pairs with absolute error strictly below each bound.
    TemperatureAccuracy {
        #[serde(default = "default_bounds")]
        bounds: Vec<f64>,
        #[serde(default)]
        output: Option<String>,
    },
}

impl ScoreFamily {
    /// Continuous statistics family.
    pub fn continuous(statistics: Vec<ContinuousStatistic>) -> Self {
        Self::Continuous {
            statistics,
            output: None,
        }
    }

    /// Dichotomous family with the given threshold, operator and scores.
    pub fn dichotomous(threshold: f64, operator: Operator, scores: Vec<DichotomousScore>) -> Self {
        Self::Dichotomous {
            threshold,
            operator,
            scores,
            output: None,
        }
    }

    /// Temperature accuracy family with the default 2 and 1 degree bounds.
    pub fn temperature_accuracy() -> Self {
        Self::TemperatureAccuracy {
            bounds: default_bounds(),
            output: None,
        }
    }

    /// Set the output tag used in the table name.
    pub fn with_output(mut self, tag: impl Into<String>) -> Self {
        match &mut self {
            Self::Continuous { output, .. }
            | Self::Dichotomous { output, .. }
            | Self::TemperatureAccuracy { output, .. } => *output = Some(tag.into()),
        }
        self
    }

    /// Short family name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Continuous { .. } => "continuous",
            Self::Dichotomous { .. } => "dichotomous",
            Self::TemperatureAccuracy { .. } => "temperature_accuracy",
        }
    }

    /// Name of the exported table for this family.
    pub fn table_name(&self) -> String {
        match self {
            Self::Continuous { output, .. } => {
                format!("verif_continuous_{}", output.as_deref().unwrap_or(""))
            }
            Self::Dichotomous {
                threshold,
                operator,
                output,
                ..
            } => format!(
                "verif_dichotomous_{}_{}_{}",
                output.as_deref().unwrap_or(""),
                operator,
                threshold
            ),
            Self::TemperatureAccuracy { output, .. } => format!(
                "verif_temperature_accuracy_cma_{}",
                output.as_deref().unwrap_or("")
            ),
        }
    }

    /// Score column names, in the order values are reported.
    pub fn columns(&self) -> Vec<String> {
        match self {
            Self::Continuous { statistics, .. } => {
                statistics.iter().map(|s| s.name().to_string()).collect()
            }
            Self::Dichotomous { scores, .. } => {
                let mut ordered = scores.clone();
                ordered.sort();
                ordered.iter().map(|s| s.name().to_string()).collect()
            }
            Self::TemperatureAccuracy { bounds, .. } => {
                bounds.iter().map(|b| accuracy_label(*b)).collect()
            }
        }
    }

    fn collect_errors(&self, index: usize, errors: &mut Vec<String>) {
        let prefix = format!("family {} ({})", index, self.name());
        match self {
            Self::Continuous { statistics, .. } => {
                if statistics.is_empty() {
                    errors.push(format!("{}: no statistics requested", prefix));
                }
                for (i, s) in statistics.iter().enumerate() {
                    if statistics[..i].contains(s) {
                        errors.push(format!("{}: statistic '{}' requested twice", prefix, s));
                    }
                }
            }
            Self::Dichotomous {
                threshold, scores, ..
            } => {
                if !threshold.is_finite() {
                    errors.push(format!("{}: threshold {} is not finite", prefix, threshold));
                }
                if scores.is_empty() {
                    errors.push(format!("{}: no scores requested", prefix));
                }
                for (i, s) in scores.iter().enumerate() {
                    if scores[..i].contains(s) {
                        errors.push(format!("{}: score '{}' requested twice", prefix, s));
                    }
                }
            }
            Self::TemperatureAccuracy { bounds, .. } => {
                if bounds.is_empty() {
                    errors.push(format!("{}: no bounds requested", prefix));
                }
                for b in bounds {
                    if !b.is_finite() || *b <= 0.0 {
                        errors.push(format!("{}: bound {} must be finite and > 0", prefix, b));
                    }
                }
            }
        }
    }
}

/// Column label for an absolute-error accuracy bound, e.g. `PC(<=2℃)`.
pub fn accuracy_label(bound: f64) -> String {
    format!("PC(<={}℃)", bound)
}

/// Configuration for a verification run.
///
/// Use the builder methods to add score families and diagnostics, then
/// [`VerifyConfig::validate`] (done by the session) before running.
///
/// # Example
///
/// ```
/// use verif_evaluate::{ContinuousStatistic, Operator, VerifyConfig};
///
/// let config = VerifyConfig::new()
///     .with_continuous(vec![ContinuousStatistic::Rmse, ContinuousStatistic::Me])
///     .with_dichotomous(35.0, Operator::Ge, vec![]);
///
/// assert!(config.validate().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyConfig {
    #[serde(default)]
    families: Vec<ScoreFamily>,
    #[serde(default)]
    plots: Vec<PlotKind>,
    #[serde(default)]
    parallel: bool,
}

impl VerifyConfig {
    /// Creates an empty configuration: no families, no plots, sequential.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a score family.
    pub fn with_family(mut self, family: ScoreFamily) -> Self {
        self.families.push(family);
        self
    }

    /// Adds a continuous statistics family.
    pub fn with_continuous(self, statistics: Vec<ContinuousStatistic>) -> Self {
        self.with_family(ScoreFamily::continuous(statistics))
    }

    /// Adds a dichotomous family.
    pub fn with_dichotomous(
        self,
        threshold: f64,
        operator: Operator,
        scores: Vec<DichotomousScore>,
    ) -> Self {
        self.with_family(ScoreFamily::dichotomous(threshold, operator, scores))
    }

    /// Adds the temperature accuracy family with the default bounds.
    pub fn with_temperature_accuracy(self) -> Self {
        self.with_family(ScoreFamily::temperature_accuracy())
    }

    /// Enables a diagnostic plot.
    pub fn with_plot(mut self, kind: PlotKind) -> Self {
        if !self.plots.contains(&kind) {
            self.plots.push(kind);
        }
        self
    }

    /// Computes entities on the rayon thread pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Requested score families, in request order.
    pub fn families(&self) -> &[ScoreFamily] {
        &self.families
    }

    /// Enabled diagnostic plots.
    pub fn plots(&self) -> &[PlotKind] {
        &self.plots
    }

    /// Returns true if entities are computed in parallel.
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Validates every requested family.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Validation`] listing every problem found.
    pub fn validate(&self) -> Result<(), VerifyError> {
        let mut errors = Vec::new();
        if self.families.is_empty() && self.plots.is_empty() {
            errors.push("no score families or plots requested".to_string());
        }
        let table_names: Vec<String> = self.families.iter().map(|f| f.table_name()).collect();
        for (i, family) in self.families.iter().enumerate() {
            family.collect_errors(i, &mut errors);
            if let Some(first) = table_names[..i].iter().position(|n| *n == table_names[i]) {
                errors.push(format!(
                    "family {} ({}): table '{}' already written by family {}; set a distinct output",
                    i,
                    family.name(),
                    table_names[i],
                    first
                ));
            }
        }
        if !errors.is_empty() {
            return Err(VerifyError::Validation {
                count: errors.len(),
                details: errors.join("; "),
            });
        }
        Ok(())
    }
}
