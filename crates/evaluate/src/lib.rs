//! Forecast verification: compare predictions against observations.
//!
//! Turns aligned (observation, prediction) pairs into standard
//! meteorological verification scores, per station and pooled across
//! stations.
//!
//! # Pipeline
//!
//! ```text
//!  ┌──────────────┐     ┌──────────────┐     ┌────────────────────┐
//!  │ SeriesSource │────▶│  PairSeries  │────▶│ ContinuousStats    │
//!  │ (obs, pred)  │     │ (align, NaN) │     │ ContingencyTable   │
//!  └──────────────┘     └──────────────┘     │ tmp_cma            │
//!                                            └─────────┬──────────┘
//!                                                      ▼
//!                                            ┌────────────────────┐
//!                                            │ VerificationReport │
//!                                            └────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use verif_evaluate::{ContinuousStats, PairSeries};
//!
//! let series = PairSeries::new(
//!     "54511",
//!     vec![-1.0, 8.0, 12.0, 13.0, 18.0, 10.0, 16.0, 19.0, 23.0, 24.0],
//!     vec![5.0, 10.0, 9.0, 15.0, 22.0, 13.0, 17.0, 17.0, 19.0, 23.0],
//! )
//! .unwrap();
//!
//! let stats = ContinuousStats::new(&series);
//! assert!((stats.mse() - 10.0).abs() < 1e-10);
//! ```

mod config;
mod contingency;
mod continuous;
mod error;
mod input;
mod output;
mod pairs;
mod session;
mod sink;

pub use config::{
    ContinuousStatistic, DichotomousScore, Operator, PlotKind, ScoreFamily, VerifyConfig,
    accuracy_label,
};
pub use contingency::{ContingencyCounts, ContingencyTable, dichotomous, tmp_cma};
pub use continuous::ContinuousStats;
pub use error::VerifyError;
pub use input::{MultiSiteSeries, SeriesSource, StationMetadata, StationTable, TimeSeries};
pub use output::{
    AGGREGATE_LABEL, FamilyReport, ResultRow, ResultTable, ScoreFailure, SkipReason,
    SkippedEntity, VerificationReport, to_json,
};
pub use pairs::PairSeries;
pub use session::{SeriesScores, VerificationSession};
pub use sink::{MemorySink, PlotSink, ResultSink};
