//! Observation, prediction and station metadata sources.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::VerifyError;

// ---------------------------------------------------------------------------
// TimeSeries
// ---------------------------------------------------------------------------

/// Time-indexed values for one entity. NaN marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    times: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a time series after validating its index.
    ///
    /// # Errors
    ///
    /// - [`VerifyError::Validation`] if `times` and `values` differ in length.
    /// - [`VerifyError::UnorderedIndex`] if `times` is not strictly increasing.
    pub fn new(times: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<Self, VerifyError> {
        if times.len() != values.len() {
            return Err(VerifyError::Validation {
                count: 1,
                details: format!(
                    "time index has {} entries, values have {}",
                    times.len(),
                    values.len()
                ),
            });
        }
        if let Some(position) = times.windows(2).position(|w| w[0] >= w[1]) {
            return Err(VerifyError::UnorderedIndex {
                position: position + 1,
            });
        }
        Ok(Self { times, values })
    }

    /// Timestamps in increasing order.
    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// Values parallel to [`TimeSeries::times`].
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of time steps, missing values included.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns true if the series has no time steps.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Value at an exact timestamp, if present.
    pub fn value_at(&self, time: NaiveDateTime) -> Option<f64> {
        self.times
            .binary_search(&time)
            .ok()
            .map(|idx| self.values[idx])
    }

    /// Iterate over `(time, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// Series sources
// ---------------------------------------------------------------------------

/// Keyed access to per-entity time series (observations or predictions).
pub trait SeriesSource {
    /// Returns true if the source holds a series for `entity`.
    fn contains(&self, entity: &str) -> bool {
        self.series(entity).is_some()
    }

    /// The series for `entity`, if present.
    fn series(&self, entity: &str) -> Option<&TimeSeries>;
}

/// In-memory series source keyed by entity identifier.
#[derive(Debug, Clone, Default)]
pub struct MultiSiteSeries {
    sites: BTreeMap<String, TimeSeries>,
}

impl MultiSiteSeries {
    /// Create a source from an entity map.
    pub fn new(sites: BTreeMap<String, TimeSeries>) -> Self {
        Self { sites }
    }

    /// Add or replace the series for one entity.
    pub fn insert(&mut self, entity: impl Into<String>, series: TimeSeries) {
        self.sites.insert(entity.into(), series);
    }

    /// Returns the number of entities.
    pub fn n_sites(&self) -> usize {
        self.sites.len()
    }

    /// Returns an iterator over entity identifiers.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.sites.keys()
    }
}

impl SeriesSource for MultiSiteSeries {
    fn contains(&self, entity: &str) -> bool {
        self.sites.contains_key(entity)
    }

    fn series(&self, entity: &str) -> Option<&TimeSeries> {
        self.sites.get(entity)
    }
}

impl SeriesSource for BTreeMap<String, TimeSeries> {
    fn series(&self, entity: &str) -> Option<&TimeSeries> {
        self.get(entity)
    }
}

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// Descriptive attributes per entity, used only to enrich exported rows.
pub trait StationMetadata {
    /// Attribute column names, in export order.
    fn attribute_names(&self) -> &[String];

    /// Attributes for `entity`, keyed by attribute name.
    fn attributes(&self, entity: &str) -> Option<&BTreeMap<String, String>>;
}

/// In-memory station metadata table.
///
/// Deserializable so a caller can load it once from its own storage and
/// pass it by reference into an export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StationTable {
    columns: Vec<String>,
    stations: BTreeMap<String, BTreeMap<String, String>>,
}

impl StationTable {
    /// Create an empty table with the given attribute columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            stations: BTreeMap::new(),
        }
    }

    /// Add one station row.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Validation`] if an attribute is not one of the
    /// table's columns or a column is missing.
    pub fn insert(
        &mut self,
        station: impl Into<String>,
        attributes: BTreeMap<String, String>,
    ) -> Result<(), VerifyError> {
        let station = station.into();
        let mut errors = Vec::new();
        for key in attributes.keys() {
            if !self.columns.contains(key) {
                errors.push(format!("station '{}' has unknown attribute '{}'", station, key));
            }
        }
        for col in &self.columns {
            if !attributes.contains_key(col) {
                errors.push(format!("station '{}' is missing attribute '{}'", station, col));
            }
        }
        if !errors.is_empty() {
            return Err(VerifyError::Validation {
                count: errors.len(),
                details: errors.join("; "),
            });
        }
        self.stations.insert(station, attributes);
        Ok(())
    }

    /// Returns the number of stations.
    pub fn n_stations(&self) -> usize {
        self.stations.len()
    }
}

impl StationMetadata for StationTable {
    fn attribute_names(&self) -> &[String] {
        &self.columns
    }

    fn attributes(&self, entity: &str) -> Option<&BTreeMap<String, String>> {
        self.stations.get(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 1, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_time_series_valid() {
        let ts = TimeSeries::new(vec![t(1), t(2), t(3)], vec![1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(ts.len(), 3);
        assert!(!ts.is_empty());
        assert_eq!(ts.value_at(t(3)), Some(3.0));
        assert_eq!(ts.value_at(t(4)), None);
        assert!(ts.value_at(t(2)).unwrap().is_nan());
    }

    #[test]
    fn test_time_series_length_mismatch() {
        let err = TimeSeries::new(vec![t(1)], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, VerifyError::Validation { count: 1, .. }));
    }

    #[test]
    fn test_time_series_unordered() {
        let err = TimeSeries::new(vec![t(1), t(3), t(2)], vec![1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, VerifyError::UnorderedIndex { position: 2 });
    }

    #[test]
    fn test_time_series_duplicate_time() {
        let err = TimeSeries::new(vec![t(1), t(1)], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(err, VerifyError::UnorderedIndex { position: 1 });
    }

    #[test]
    fn test_multi_site_membership() {
        let mut source = MultiSiteSeries::default();
        source.insert("54511", TimeSeries::new(vec![t(1)], vec![1.0]).unwrap());
        assert!(source.contains("54511"));
        assert!(!source.contains("57494"));
        assert_eq!(source.n_sites(), 1);
        assert_eq!(source.keys().next().map(String::as_str), Some("54511"));
    }

    #[test]
    fn test_btreemap_is_a_source() {
        let mut map = BTreeMap::new();
        map.insert(
            "a".to_string(),
            TimeSeries::new(vec![t(1)], vec![1.0]).unwrap(),
        );
        assert!(SeriesSource::contains(&map, "a"));
        assert!(map.series("b").is_none());
    }

    #[test]
    fn test_station_table_insert() {
        let mut table = StationTable::new(vec!["lat".to_string(), "lon".to_string()]);
        let attrs = BTreeMap::from([
            ("lat".to_string(), "39.8".to_string()),
            ("lon".to_string(), "116.5".to_string()),
        ]);
        table.insert("54511", attrs).unwrap();
        assert_eq!(table.n_stations(), 1);
        assert_eq!(table.attributes("54511").unwrap()["lat"], "39.8");
        assert!(table.attributes("99999").is_none());
    }

    #[test]
    fn test_station_table_rejects_unknown_and_missing() {
        let mut table = StationTable::new(vec!["lat".to_string(), "lon".to_string()]);
        let attrs = BTreeMap::from([("alt".to_string(), "31".to_string())]);
        match table.insert("54511", attrs) {
            Err(VerifyError::Validation { count, details }) => {
                assert_eq!(count, 3);
                assert!(details.contains("unknown attribute 'alt'"));
                assert!(details.contains("missing attribute 'lon'"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_station_table_deserializes() {
        let json = r#"{
            "columns": ["name"],
            "stations": {"54511": {"name": "Beijing"}}
        }"#;
        let table: StationTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.attribute_names(), &["name".to_string()]);
        assert_eq!(table.attributes("54511").unwrap()["name"], "Beijing");
    }
}
