//! 2x2 contingency tables for dichotomous (yes/no) forecasts, and the
//! absolute-error accuracy score.

use std::ops::{Add, AddAssign};

use serde::Serialize;

use crate::config::{DichotomousScore, Operator};
use crate::error::VerifyError;
use crate::pairs::PairSeries;

/// Counts of the four forecast/observation outcomes.
///
/// ```text
///                 observed yes   observed no
/// forecast yes        A              B
/// forecast no         C              D
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContingencyCounts {
    /// A: event forecast and observed.
    pub hits: usize,
    /// B: event forecast, not observed.
    pub false_alarms: usize,
    /// C: event observed, not forecast.
    pub misses: usize,
    /// D: event neither forecast nor observed.
    pub correct_negatives: usize,
}

impl ContingencyCounts {
    /// Total number of classified pairs.
    pub fn total(&self) -> usize {
        self.hits + self.false_alarms + self.misses + self.correct_negatives
    }

    /// Accuracy `(A + D) / (A + B + C + D) * 100`.
    pub fn pc(&self) -> Result<f64, VerifyError> {
        ratio(
            self.hits + self.correct_negatives,
            self.total(),
            DichotomousScore::Pc.name(),
            "no pairs were classified",
        )
        .map(|v| v * 100.0)
    }

    /// Threat score `A / (A + B + C) * 100`.
    pub fn ts(&self) -> Result<f64, VerifyError> {
        ratio(
            self.hits,
            self.hits + self.false_alarms + self.misses,
            DichotomousScore::Ts.name(),
            "no observed or forecast events",
        )
        .map(|v| v * 100.0)
    }

    /// False alarm ratio `B / (A + B) * 100`.
    pub fn far(&self) -> Result<f64, VerifyError> {
        ratio(
            self.false_alarms,
            self.hits + self.false_alarms,
            DichotomousScore::Far.name(),
            "no forecast events",
        )
        .map(|v| v * 100.0)
    }

    /// Probability of detection `A / (A + C)`, as a fraction.
    pub fn pod(&self) -> Result<f64, VerifyError> {
        ratio(
            self.hits,
            self.hits + self.misses,
            DichotomousScore::Pod.name(),
            "no observed events",
        )
    }

    /// Frequency bias `(A + B) / (A + C)`. Perfect score: 1.
    pub fn frequency_bias(&self) -> Result<f64, VerifyError> {
        ratio(
            self.hits + self.false_alarms,
            self.hits + self.misses,
            DichotomousScore::FrequencyBias.name(),
            "no observed events",
        )
    }

    /// Compute one dichotomous score.
    pub fn score(&self, score: DichotomousScore) -> Result<f64, VerifyError> {
        match score {
            DichotomousScore::Ts => self.ts(),
            DichotomousScore::Pc => self.pc(),
            DichotomousScore::Far => self.far(),
            DichotomousScore::Pod => self.pod(),
            DichotomousScore::FrequencyBias => self.frequency_bias(),
        }
    }
}

fn ratio(num: usize, denom: usize, score: &str, reason: &str) -> Result<f64, VerifyError> {
    if denom == 0 {
        return Err(VerifyError::division_by_zero(score, reason));
    }
    Ok(num as f64 / denom as f64)
}

impl Add for ContingencyCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            hits: self.hits + rhs.hits,
            false_alarms: self.false_alarms + rhs.false_alarms,
            misses: self.misses + rhs.misses,
            correct_negatives: self.correct_negatives + rhs.correct_negatives,
        }
    }
}

impl AddAssign for ContingencyCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Contingency table of one pair series under one threshold and operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContingencyTable {
    threshold: f64,
    operator: Operator,
    counts: ContingencyCounts,
}

impl ContingencyTable {
    /// Classify every pair of `series` into exactly one cell.
    pub fn build(series: &PairSeries, threshold: f64, operator: Operator) -> Self {
        let mut counts = ContingencyCounts::default();
        for (obs, pred) in series.iter() {
            let observed = operator.is_event(obs, threshold);
            let forecast = operator.is_event(pred, threshold);
            match (forecast, observed) {
                (true, true) => counts.hits += 1,
                (true, false) => counts.false_alarms += 1,
                (false, true) => counts.misses += 1,
                (false, false) => counts.correct_negatives += 1,
            }
        }
        Self {
            threshold,
            operator,
            counts,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn counts(&self) -> ContingencyCounts {
        self.counts
    }

    /// Compute the requested scores in the fixed order TS, PC, FAR, POD,
    /// frequency bias.
    ///
    /// Returns parallel `(values, names)`; request order and duplicates do
    /// not affect the output.
    pub fn dichotomous(
        &self,
        scores: &[DichotomousScore],
    ) -> (Vec<Result<f64, VerifyError>>, Vec<String>) {
        DichotomousScore::ALL
            .into_iter()
            .filter(|s| scores.contains(s))
            .map(|s| (self.counts.score(s), s.name().to_string()))
            .unzip()
    }
}

/// Compute dichotomous scores for `series` under `threshold` and `operator`.
pub fn dichotomous(
    series: &PairSeries,
    scores: &[DichotomousScore],
    threshold: f64,
    operator: Operator,
) -> (Vec<Result<f64, VerifyError>>, Vec<String>) {
    ContingencyTable::build(series, threshold, operator).dichotomous(scores)
}

/// Share of pairs whose absolute error is strictly below `bound`, in [0, 1].
///
/// This is the CMA temperature accuracy (e.g. within 2 ℃ and 1 ℃). A pair
/// with error exactly equal to `bound` counts as a miss.
pub fn tmp_cma(series: &PairSeries, bound: f64) -> f64 {
    let good = series
        .iter()
        .filter(|(obs, pred)| (obs - pred).abs() < bound)
        .count();
    good as f64 / series.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(obs: &[f64], pred: &[f64]) -> PairSeries {
        PairSeries::new("t", obs.to_vec(), pred.to_vec()).unwrap()
    }

    #[test]
    fn test_ge_classification() {
        // obs:  36 36 30 30
        // pred: 35 20 40 10
        let s = series(&[36.0, 36.0, 30.0, 30.0], &[35.0, 20.0, 40.0, 10.0]);
        let c = ContingencyTable::build(&s, 35.0, Operator::Ge).counts();
        assert_eq!(
            c,
            ContingencyCounts {
                hits: 1,
                false_alarms: 1,
                misses: 1,
                correct_negatives: 1,
            }
        );
    }

    #[test]
    fn test_boundary_placement() {
        let s = series(&[35.0], &[35.0]);
        assert_eq!(ContingencyTable::build(&s, 35.0, Operator::Ge).counts().hits, 1);
        assert_eq!(
            ContingencyTable::build(&s, 35.0, Operator::Gt)
                .counts()
                .correct_negatives,
            1
        );
        assert_eq!(ContingencyTable::build(&s, 35.0, Operator::Le).counts().hits, 1);
        assert_eq!(
            ContingencyTable::build(&s, 35.0, Operator::Lt)
                .counts()
                .correct_negatives,
            1
        );
    }

    #[test]
    fn test_le_inverts_event_side() {
        // Cold event: value <= 0.
        let s = series(&[-2.0, -1.0, 3.0, 4.0], &[-3.0, 2.0, -1.0, 5.0]);
        let c = ContingencyTable::build(&s, 0.0, Operator::Le).counts();
        assert_eq!(c.hits, 1);
        assert_eq!(c.misses, 1);
        assert_eq!(c.false_alarms, 1);
        assert_eq!(c.correct_negatives, 1);
    }

    #[test]
    fn test_counts_cover_every_pair() {
        let obs: Vec<f64> = (0..50).map(|i| (i as f64 * 0.7).sin() * 10.0).collect();
        let pred: Vec<f64> = (0..50).map(|i| (i as f64 * 0.5).cos() * 10.0).collect();
        let s = series(&obs, &pred);
        for op in [Operator::Ge, Operator::Gt, Operator::Le, Operator::Lt] {
            for t in [-20.0, -5.0, 0.0, 2.5, 20.0] {
                let c = ContingencyTable::build(&s, t, op).counts();
                assert_eq!(c.total(), s.len());
            }
        }
    }

    #[test]
    fn test_scores() {
        let c = ContingencyCounts {
            hits: 2,
            false_alarms: 1,
            misses: 1,
            correct_negatives: 6,
        };
        assert_relative_eq!(c.pc().unwrap(), 80.0, epsilon = 1e-10);
        assert_relative_eq!(c.ts().unwrap(), 50.0, epsilon = 1e-10);
        assert_relative_eq!(c.far().unwrap(), 100.0 / 3.0, epsilon = 1e-10);
        assert_relative_eq!(c.pod().unwrap(), 2.0 / 3.0, epsilon = 1e-10);
        assert_relative_eq!(c.frequency_bias().unwrap(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_perfect_forecast_scores() {
        let s = series(&[30.0, 36.0, 40.0], &[30.0, 36.0, 40.0]);
        let (values, names) = dichotomous(
            &s,
            &[DichotomousScore::Ts, DichotomousScore::Pc, DichotomousScore::Far],
            35.0,
            Operator::Ge,
        );
        assert_eq!(names, vec!["TS", "PC", "FAR"]);
        assert_eq!(values[0].as_ref().unwrap(), &100.0);
        assert_eq!(values[1].as_ref().unwrap(), &100.0);
        assert_eq!(values[2].as_ref().unwrap(), &0.0);
    }

    #[test]
    fn test_no_events_degenerate() {
        let s = series(&[20.0, 25.0, 30.0], &[21.0, 24.0, 33.0]);
        let (values, names) = dichotomous(
            &s,
            &[DichotomousScore::Far, DichotomousScore::Pc, DichotomousScore::Ts],
            35.0,
            Operator::Ge,
        );
        assert_eq!(names, vec!["TS", "PC", "FAR"]);
        assert!(matches!(values[0], Err(VerifyError::DivisionByZero { .. })));
        assert_eq!(values[1].as_ref().unwrap(), &100.0);
        assert!(matches!(values[2], Err(VerifyError::DivisionByZero { .. })));
    }

    #[test]
    fn test_detection_scores_follow_far() {
        // obs:  36 36 36 30
        // pred: 40 20 35 38  -> A=2, B=1, C=1, D=0
        let s = series(&[36.0, 36.0, 36.0, 30.0], &[40.0, 20.0, 35.0, 38.0]);
        let (values, names) = dichotomous(
            &s,
            &[DichotomousScore::FrequencyBias, DichotomousScore::Pod, DichotomousScore::Ts],
            35.0,
            Operator::Ge,
        );
        assert_eq!(names, vec!["TS", "POD", "Frequency bias"]);
        assert_relative_eq!(*values[0].as_ref().unwrap(), 50.0, epsilon = 1e-10);
        assert_relative_eq!(*values[1].as_ref().unwrap(), 2.0 / 3.0, epsilon = 1e-10);
        assert_relative_eq!(*values[2].as_ref().unwrap(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_detection_scores_no_observed_events() {
        let s = series(&[20.0, 25.0], &[36.0, 24.0]);
        let (values, _) = dichotomous(
            &s,
            &[DichotomousScore::Pod, DichotomousScore::FrequencyBias],
            35.0,
            Operator::Ge,
        );
        assert!(matches!(
            &values[0],
            Err(VerifyError::DivisionByZero { score, .. }) if score == "POD"
        ));
        assert!(values[1].is_err());
    }

    #[test]
    fn test_empty_counts_pc_degenerate() {
        assert!(ContingencyCounts::default().pc().is_err());
    }

    #[test]
    fn test_ts_not_above_pc() {
        let obs: Vec<f64> = (0..40).map(|i| (i % 7) as f64 * 6.0).collect();
        let pred: Vec<f64> = (0..40).map(|i| (i % 5) as f64 * 8.0).collect();
        let s = series(&obs, &pred);
        for t in [5.0, 12.0, 20.0, 30.0] {
            let c = ContingencyTable::build(&s, t, Operator::Gt).counts();
            if let (Ok(ts), Ok(pc)) = (c.ts(), c.pc()) {
                assert!(ts <= pc);
            }
        }
    }

    #[test]
    fn test_counts_add() {
        let a = ContingencyCounts {
            hits: 1,
            false_alarms: 2,
            misses: 3,
            correct_negatives: 4,
        };
        let mut b = a;
        b += a;
        assert_eq!(b, a + a);
        assert_eq!(b.total(), 20);
    }

    #[test]
    fn test_pooled_counts_equal_sum() {
        let a = series(&[30.0, 36.0, 37.0], &[36.0, 34.0, 40.0]);
        let b = series(&[35.0, 10.0], &[35.0, 50.0]);
        let pooled = PairSeries::pooled("all", [&a, &b]).unwrap();
        for op in [Operator::Ge, Operator::Lt] {
            let sum = ContingencyTable::build(&a, 35.0, op).counts()
                + ContingencyTable::build(&b, 35.0, op).counts();
            assert_eq!(ContingencyTable::build(&pooled, 35.0, op).counts(), sum);
        }
    }

    #[test]
    fn test_tmp_cma() {
        // errors: 0.5, 1.0, 1.5, 2.0, 3.0
        let s = series(&[10.0, 10.0, 10.0, 10.0, 10.0], &[10.5, 11.0, 8.5, 12.0, 7.0]);
        assert_relative_eq!(tmp_cma(&s, 2.0), 0.6, epsilon = 1e-12);
        assert_relative_eq!(tmp_cma(&s, 1.0), 0.2, epsilon = 1e-12);
        assert_eq!(tmp_cma(&s, 0.1), 0.0);
        assert_eq!(tmp_cma(&s, 10.0), 1.0);
    }

    #[test]
    fn test_tmp_cma_monotonic() {
        let obs: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let pred: Vec<f64> = (0..30).map(|i| i as f64 + ((i * 7) % 5) as f64 - 2.0).collect();
        let s = series(&obs, &pred);
        let mut prev = 0.0;
        for step in 0..40 {
            let v = tmp_cma(&s, step as f64 * 0.25);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_table_accessors() {
        let s = series(&[1.0], &[2.0]);
        let table = ContingencyTable::build(&s, 1.5, Operator::Gt);
        assert_eq!(table.threshold(), 1.5);
        assert_eq!(table.operator(), Operator::Gt);
        assert_eq!(table.counts().false_alarms, 1);
    }
}
