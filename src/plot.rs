//! Recording plot sink.

use serde::Serialize;
use verif_evaluate::{PairSeries, PlotKind, PlotSink};

/// One requested diagnostic plot with the data to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotRequest {
    pub kind: PlotKind,
    pub label: String,
    pub obs: Vec<f64>,
    pub pred: Vec<f64>,
}

/// Collects plot requests so a renderer can draw them after the run.
#[derive(Debug, Clone, Default)]
pub struct PlotRecorder {
    requests: Vec<PlotRequest>,
}

impl PlotRecorder {
    pub fn requests(&self) -> &[PlotRequest] {
        &self.requests
    }

    pub fn into_requests(self) -> Vec<PlotRequest> {
        self.requests
    }
}

impl PlotSink for PlotRecorder {
    fn plot(&mut self, kind: PlotKind, series: &PairSeries) {
        self.requests.push(PlotRequest {
            kind,
            label: series.label().to_string(),
            obs: series.obs().to_vec(),
            pred: series.pred().to_vec(),
        });
    }
}
