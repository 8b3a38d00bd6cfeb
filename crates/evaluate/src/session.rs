//! Multi-entity verification run: per-entity rows plus a pooled aggregate.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::{ScoreFamily, VerifyConfig};
use crate::contingency::{self, ContingencyTable};
use crate::continuous::ContinuousStats;
use crate::error::VerifyError;
use crate::input::SeriesSource;
use crate::output::{
    AGGREGATE_LABEL, FamilyReport, ResultRow, ResultTable, ScoreFailure, SkipReason,
    SkippedEntity, VerificationReport,
};
use crate::pairs::PairSeries;
use crate::sink::PlotSink;

/// Scores of one series for every requested family, in family order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesScores {
    pub rows: Vec<ResultRow>,
    pub failures: Vec<ScoreFailure>,
}

/// A validated verification configuration ready to run.
#[derive(Debug, Clone)]
pub struct VerificationSession {
    config: VerifyConfig,
}

impl VerificationSession {
    /// Create a session after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Validation`] if the configuration is invalid.
    pub fn new(config: VerifyConfig) -> Result<Self, VerifyError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Verify every station without diagnostics.
    pub fn run<O, P>(&self, stations: &[impl AsRef<str>], obs: &O, pred: &P) -> VerificationReport
    where
        O: SeriesSource + ?Sized,
        P: SeriesSource + ?Sized,
    {
        self.run_inner(stations, obs, pred, None)
    }

    /// Verify every station and hand the enabled diagnostic plots to `plots`,
    /// per entity in station order and then for the pooled pairs.
    pub fn run_with_plots<O, P>(
        &self,
        stations: &[impl AsRef<str>],
        obs: &O,
        pred: &P,
        plots: &mut dyn PlotSink,
    ) -> VerificationReport
    where
        O: SeriesSource + ?Sized,
        P: SeriesSource + ?Sized,
    {
        self.run_inner(stations, obs, pred, Some(plots))
    }

    #[tracing::instrument(skip_all, fields(n_stations = stations.len(), parallel = self.config.parallel()))]
    fn run_inner<O, P>(
        &self,
        stations: &[impl AsRef<str>],
        obs: &O,
        pred: &P,
        mut plots: Option<&mut dyn PlotSink>,
    ) -> VerificationReport
    where
        O: SeriesSource + ?Sized,
        P: SeriesSource + ?Sized,
    {
        // Step 1: align each station, skipping what cannot be verified
        let mut skipped = Vec::new();
        let mut series = Vec::new();
        for station in stations {
            let station: &str = station.as_ref();
            match pair_station(station, obs, pred) {
                Ok(s) => series.push(s),
                Err(reason) => {
                    info!(station, %reason, "station skipped");
                    skipped.push(SkippedEntity {
                        entity: station.to_string(),
                        reason,
                    });
                }
            }
        }

        // Step 2: score each surviving station
        let scored: Vec<SeriesScores> = if self.config.parallel() {
            series.par_iter().map(|s| self.score_series(s)).collect()
        } else {
            series.iter().map(|s| self.score_series(s)).collect()
        };

        if let Some(sink) = plots.as_deref_mut() {
            for s in &series {
                self.emit_plots(sink, s);
            }
        }

        // Step 3: pooled aggregate over at least two stations
        let pooled = if series.len() >= 2 {
            PairSeries::pooled(AGGREGATE_LABEL, series.iter()).ok()
        } else {
            None
        };
        let aggregate = pooled.as_ref().map(|p| self.score_series(p));
        if let (Some(sink), Some(p)) = (plots.as_deref_mut(), pooled.as_ref()) {
            self.emit_plots(sink, p);
        }

        // Step 4: one table per family, aggregate kept apart
        let mut failures = Vec::new();
        let mut families: Vec<FamilyReport> = self
            .config
            .families()
            .iter()
            .map(|f| FamilyReport {
                family: f.name().to_string(),
                table: ResultTable::new(f.table_name(), f.columns()),
                aggregate: None,
            })
            .collect();

        for entity in scored {
            for (report, row) in families.iter_mut().zip(entity.rows) {
                report.table.rows.push(row);
            }
            failures.extend(entity.failures);
        }
        if let Some(agg) = aggregate {
            for (report, row) in families.iter_mut().zip(agg.rows) {
                report.aggregate = Some(row);
            }
            failures.extend(agg.failures);
        }

        info!(
            n_entities = series.len(),
            n_skipped = skipped.len(),
            n_failures = failures.len(),
            "verification complete"
        );

        VerificationReport {
            n_entities: series.len(),
            families,
            skipped,
            failures,
        }
    }

    /// Compute every requested family on one series.
    ///
    /// Undefined scores become `None` in the row and are listed in
    /// `failures`.
    pub fn score_series(&self, series: &PairSeries) -> SeriesScores {
        let mut rows = Vec::with_capacity(self.config.families().len());
        let mut failures = Vec::new();

        for family in self.config.families() {
            let (results, names) = compute_family(family, series);
            let mut values = Vec::with_capacity(results.len());
            for (result, name) in results.into_iter().zip(names) {
                match result {
                    Ok(v) => values.push(Some(v)),
                    Err(e) => {
                        warn!(entity = series.label(), score = %name, error = %e, "score undefined");
                        failures.push(ScoreFailure {
                            entity: series.label().to_string(),
                            family: family.name().to_string(),
                            score: name,
                            reason: e.to_string(),
                        });
                        values.push(None);
                    }
                }
            }
            rows.push(ResultRow {
                entity: series.label().to_string(),
                values,
                attributes: Vec::new(),
            });
        }

        SeriesScores { rows, failures }
    }

    fn emit_plots(&self, sink: &mut dyn PlotSink, series: &PairSeries) {
        for &kind in self.config.plots() {
            sink.plot(kind, series);
        }
    }
}

fn pair_station<O, P>(station: &str, obs: &O, pred: &P) -> Result<PairSeries, SkipReason>
where
    O: SeriesSource + ?Sized,
    P: SeriesSource + ?Sized,
{
    let obs_series = obs.series(station).ok_or(SkipReason::MissingObservations)?;
    let pred_series = pred.series(station).ok_or(SkipReason::MissingPredictions)?;
    PairSeries::align(station, obs_series, pred_series).map_err(|e| match e {
        VerifyError::NonFiniteData => SkipReason::NonFiniteData,
        _ => SkipReason::NoValidPairs,
    })
}

fn compute_family(
    family: &ScoreFamily,
    series: &PairSeries,
) -> (Vec<Result<f64, VerifyError>>, Vec<String>) {
    match family {
        ScoreFamily::Continuous { statistics, .. } => {
            ContinuousStats::new(series).continuous_statistic(statistics)
        }
        ScoreFamily::Dichotomous {
            threshold,
            operator,
            scores,
            ..
        } => ContingencyTable::build(series, *threshold, *operator).dichotomous(scores),
        ScoreFamily::TemperatureAccuracy { bounds, .. } => bounds
            .iter()
            .map(|&b| {
                (
                    Ok(contingency::tmp_cma(series, b)),
                    crate::config::accuracy_label(b),
                )
            })
            .unzip(),
    }
}
