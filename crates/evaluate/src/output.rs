//! Result tables and the verification report.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::VerifyError;
use crate::input::StationMetadata;
use crate::sink::ResultSink;

/// Label of the pooled aggregate row.
pub const AGGREGATE_LABEL: &str = "all";

/// Scores for one entity (or the pooled aggregate).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub entity: String,
    /// One value per score column; `None` where the score was undefined.
    pub values: Vec<Option<f64>>,
    /// Station attributes, parallel to the table's attribute columns.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

/// Ordered entity rows with a fixed column set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    pub name: String,
    /// Score column names, parallel to every row's `values`.
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attribute_columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            attribute_columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Look up one score value by entity and column name.
    pub fn value(&self, entity: &str, column: &str) -> Option<f64> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|r| r.entity == entity)
            .and_then(|r| r.values.get(col).copied().flatten())
    }

    /// Entity labels in row order.
    pub fn entities(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.entity.as_str()).collect()
    }

    /// Join station attributes onto the rows.
    ///
    /// Rows whose entity has no metadata are dropped (inner join).
    pub fn enrich(&self, stations: &dyn StationMetadata) -> ResultTable {
        let attribute_columns = stations.attribute_names().to_vec();
        let rows = self
            .rows
            .iter()
            .filter_map(|row| match stations.attributes(&row.entity) {
                Some(attrs) => Some(ResultRow {
                    entity: row.entity.clone(),
                    values: row.values.clone(),
                    attributes: attribute_columns
                        .iter()
                        .map(|c| attrs.get(c).cloned().unwrap_or_default())
                        .collect(),
                }),
                None => {
                    debug!(entity = %row.entity, table = %self.name, "no station metadata: row dropped");
                    None
                }
            })
            .collect();
        ResultTable {
            name: self.name.clone(),
            columns: self.columns.clone(),
            attribute_columns,
            rows,
        }
    }
}

/// Results of one score family: entity table plus a separate aggregate row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyReport {
    pub family: String,
    pub table: ResultTable,
    /// Scores over the pooled pairs; present only with at least two entities.
    pub aggregate: Option<ResultRow>,
}

/// Why an entity was left out of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingObservations,
    MissingPredictions,
    NoValidPairs,
    NonFiniteData,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingObservations => f.write_str("observations do not have this station"),
            Self::MissingPredictions => f.write_str("predictions do not have this station"),
            Self::NoValidPairs => f.write_str("no valid observation/prediction pairs"),
            Self::NonFiniteData => f.write_str("observations or predictions contain infinite values"),
        }
    }
}

/// An entity left out of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntity {
    pub entity: String,
    pub reason: SkipReason,
}

/// A score that could not be computed for one entity (or the aggregate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreFailure {
    pub entity: String,
    pub family: String,
    pub score: String,
    pub reason: String,
}

/// Everything a verification run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    /// Number of entities that produced rows.
    pub n_entities: usize,
    /// One report per requested family, in request order.
    pub families: Vec<FamilyReport>,
    pub skipped: Vec<SkippedEntity>,
    pub failures: Vec<ScoreFailure>,
}

impl VerificationReport {
    /// Report for a family by its table name.
    pub fn family(&self, table_name: &str) -> Option<&FamilyReport> {
        self.families.iter().find(|f| f.table.name == table_name)
    }

    /// Write every family table to `sink`, enriched with station metadata
    /// when given. Aggregate rows are not part of the exported tables.
    pub fn export(
        &self,
        sink: &mut dyn ResultSink,
        stations: Option<&dyn StationMetadata>,
    ) -> Result<(), VerifyError> {
        for family in &self.families {
            match stations {
                Some(meta) => sink.write_table(&family.table.enrich(meta))?,
                None => sink.write_table(&family.table)?,
            }
        }
        Ok(())
    }
}

/// Serialize a verification report to a JSON string.
pub fn to_json(report: &VerificationReport) -> Result<String, VerifyError> {
    serde_json::to_string_pretty(report).map_err(|e| VerifyError::Serialization {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::StationTable;
    use crate::sink::MemorySink;
    use std::collections::BTreeMap;

    fn table() -> ResultTable {
        let mut t = ResultTable::new("verif_continuous_", vec!["RMSE".into(), "R".into()]);
        t.rows.push(ResultRow {
            entity: "54511".into(),
            values: vec![Some(1.5), None],
            attributes: vec![],
        });
        t.rows.push(ResultRow {
            entity: "57494".into(),
            values: vec![Some(2.0), Some(0.9)],
            attributes: vec![],
        });
        t
    }

    fn stations() -> StationTable {
        let mut s = StationTable::new(vec!["name".into()]);
        s.insert(
            "54511",
            BTreeMap::from([("name".to_string(), "Beijing".to_string())]),
        )
        .unwrap();
        s
    }

    #[test]
    fn test_value_lookup() {
        let t = table();
        assert_eq!(t.value("54511", "RMSE"), Some(1.5));
        assert_eq!(t.value("54511", "R"), None);
        assert_eq!(t.value("57494", "R"), Some(0.9));
        assert_eq!(t.value("99999", "RMSE"), None);
        assert_eq!(t.value("54511", "MAE"), None);
        assert_eq!(t.entities(), vec!["54511", "57494"]);
    }

    #[test]
    fn test_enrich_inner_join() {
        let enriched = table().enrich(&stations());
        assert_eq!(enriched.attribute_columns, vec!["name"]);
        assert_eq!(enriched.rows.len(), 1);
        assert_eq!(enriched.rows[0].entity, "54511");
        assert_eq!(enriched.rows[0].attributes, vec!["Beijing"]);
    }

    #[test]
    fn test_export_writes_every_family() {
        let report = VerificationReport {
            n_entities: 2,
            families: vec![FamilyReport {
                family: "continuous".into(),
                table: table(),
                aggregate: None,
            }],
            skipped: vec![],
            failures: vec![],
        };
        let mut sink = MemorySink::default();
        report.export(&mut sink, None).unwrap();
        assert_eq!(sink.tables().len(), 1);
        assert_eq!(sink.tables()[0].rows.len(), 2);

        let meta = stations();
        let mut sink = MemorySink::default();
        report
            .export(&mut sink, Some(&meta as &dyn StationMetadata))
            .unwrap();
        assert_eq!(sink.tables()[0].rows.len(), 1);
        assert!(report.family("verif_continuous_").is_some());
        assert!(report.family("verif_dichotomous_").is_none());
    }

    #[test]
    fn test_to_json() {
        let report = VerificationReport {
            n_entities: 2,
            families: vec![FamilyReport {
                family: "continuous".into(),
                table: table(),
                aggregate: Some(ResultRow {
                    entity: AGGREGATE_LABEL.into(),
                    values: vec![Some(1.8), Some(0.7)],
                    attributes: vec![],
                }),
            }],
            skipped: vec![SkippedEntity {
                entity: "58362".into(),
                reason: SkipReason::MissingPredictions,
            }],
            failures: vec![],
        };
        let json = to_json(&report).unwrap();
        assert!(json.contains("\"n_entities\": 2"));
        assert!(json.contains("\"missing_predictions\""));
        assert!(json.contains("\"entity\": \"all\""));
        assert!(json.contains("null"));
        assert!(!json.contains("attribute_columns"));
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(
            SkipReason::MissingObservations.to_string(),
            "observations do not have this station"
        );
    }
}
