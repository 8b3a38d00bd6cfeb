//! Forecast verification for station observation/prediction pairs.
//!
//! Re-exports the scoring core from `verif_evaluate` and adds the
//! boundary pieces: tracing setup, a JSON result sink and a plot
//! recorder.
//!
//! ```no_run
//! use verif::{
//!     ContinuousStatistic, JsonDirSink, MultiSiteSeries, Operator, DichotomousScore,
//!     VerificationSession, VerifyConfig,
//! };
//!
//! verif::logging::init(1);
//!
//! let obs = MultiSiteSeries::default();
//! let pred = MultiSiteSeries::default();
//! let config = VerifyConfig::new()
//!     .with_continuous(vec![ContinuousStatistic::Rmse, ContinuousStatistic::R])
//!     .with_dichotomous(35.0, Operator::Ge, vec![DichotomousScore::Ts, DichotomousScore::Pc]);
//!
//! let session = VerificationSession::new(config).unwrap();
//! let report = session.run(&["54511", "57494"], &obs, &pred);
//! report.export(&mut JsonDirSink::new("reports"), None).unwrap();
//! ```

pub mod logging;
pub mod plot;
pub mod sink;

pub use plot::{PlotRecorder, PlotRequest};
pub use sink::JsonDirSink;
pub use verif_evaluate::*;
