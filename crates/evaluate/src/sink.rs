//! Collaborator hooks for persisting tables and rendering plots.

use crate::config::PlotKind;
use crate::error::VerifyError;
use crate::output::ResultTable;
use crate::pairs::PairSeries;

/// Accepts result tables and persists or displays them.
pub trait ResultSink {
    fn write_table(&mut self, table: &ResultTable) -> Result<(), VerifyError>;
}

/// Accepts aligned pairs for a diagnostic plot. The series label names the
/// entity, or the aggregate for pooled pairs.
pub trait PlotSink {
    fn plot(&mut self, kind: PlotKind, series: &PairSeries);
}

impl<F> PlotSink for F
where
    F: FnMut(PlotKind, &PairSeries),
{
    fn plot(&mut self, kind: PlotKind, series: &PairSeries) {
        self(kind, series)
    }
}

/// Keeps written tables in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    tables: Vec<ResultTable>,
}

impl MemorySink {
    /// Tables written so far, in write order.
    pub fn tables(&self) -> &[ResultTable] {
        &self.tables
    }
}

impl ResultSink for MemorySink {
    fn write_table(&mut self, table: &ResultTable) -> Result<(), VerifyError> {
        self.tables.push(table.clone());
        Ok(())
    }
}
