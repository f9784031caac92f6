use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keeps only format entries that look like benchmark bodies. Producers also
/// emit marker entries (for example an error string under `vortex_error`).
fn lenient_formats<'de, D>(deserializer: D) -> Result<BTreeMap<String, FormatReport>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    let mut formats = BTreeMap::new();
    for (name, body) in raw {
        if !body.is_object() {
            warn!(format = %name, "skipping non-object format entry");
            continue;
        }
        match serde_json::from_value::<FormatReport>(body) {
            Ok(report) => {
                formats.insert(name, report);
            }
            Err(err) => warn!(format = %name, error = %err, "skipping malformed format entry"),
        }
    }
    Ok(formats)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub datasets: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestEntry {
    pub name: String,
    pub report: String,
}

impl Manifest {
    pub fn report_for(&self, name: &str) -> Option<&str> {
        self.datasets
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.report.as_str())
    }

    /// Updates the report path of an existing entry in place, or appends a new one.
    /// Returns true when a new entry was added.
    pub fn upsert(&mut self, name: &str, report: &str) -> bool {
        if let Some(entry) = self.datasets.iter_mut().find(|entry| entry.name == name) {
            entry.report = report.to_string();
            return false;
        }
        self.datasets.push(ManifestEntry {
            name: name.to_string(),
            report: report.to_string(),
        });
        true
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetInfo {
    pub name: Option<String>,
    pub input: Option<String>,
    pub rows: Option<u64>,
    pub input_rows: Option<u64>,
    pub dropped_rows: Option<u64>,
    pub input_size_bytes: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub column_type_counts: BTreeMap<String, u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub ndv_ratio_by_type: BTreeMap<String, Option<f64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetReport {
    #[serde(deserialize_with = "null_as_default")]
    pub dataset: DatasetInfo,
    #[serde(deserialize_with = "lenient_formats")]
    pub formats: BTreeMap<String, FormatReport>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatReport {
    pub compression_ratio: Option<f64>,
    pub write: Option<WriteStats>,
    #[serde(deserialize_with = "null_as_default")]
    pub queries: QueryStats,
    #[serde(deserialize_with = "null_as_default")]
    pub encodings: Encodings,
    pub validation: Option<Validation>,
    pub note: Option<String>,
    pub best_select_col: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteStats {
    pub output_size_bytes: Option<f64>,
    pub compression_time_s: Option<f64>,
    pub compression_speed_mb_s: Option<f64>,
    pub decompression_time_s: Option<f64>,
    pub decompression_speed_mb_s: Option<f64>,
    pub row_group_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryStats {
    pub full_scan_min: Option<QueryTiming>,
    pub selective_predicate: Option<QueryTiming>,
    pub random_access: Option<QueryTiming>,
    #[serde(deserialize_with = "null_as_default")]
    pub selectivity_by_col: BTreeMap<String, Vec<SelectivityPoint>>,
    #[serde(deserialize_with = "null_as_default")]
    pub like_by_col: BTreeMap<String, Vec<LikeMeasurement>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryTiming {
    pub median_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub cold_ms: Option<f64>,
    pub runs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectivityPoint {
    pub p: f64,
    pub median_ms: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LikeMeasurement {
    pub pattern_type: Option<String>,
    pub pattern: Option<String>,
    pub median_ms: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Encodings {
    #[serde(deserialize_with = "null_as_default")]
    pub per_column: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Validation {
    pub count_match: Option<bool>,
    pub min_match: Option<bool>,
    pub filtered_count_match: Option<bool>,
}

impl Validation {
    pub fn has_mismatch(&self) -> bool {
        [self.count_match, self.min_match, self.filtered_count_match]
            .iter()
            .any(|check| *check == Some(false))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverallSummary {
    pub dataset_count: usize,
    #[serde(deserialize_with = "null_as_default")]
    pub datasets: Vec<DatasetSummary>,
    #[serde(deserialize_with = "null_as_default")]
    pub formats: BTreeMap<String, FormatSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSummary {
    pub name: String,
    pub input: Option<String>,
    pub rows: Option<u64>,
    pub input_rows: Option<u64>,
    pub dropped_rows: Option<u64>,
    pub input_size_bytes: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub column_type_counts: BTreeMap<String, u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub ndv_ratio_by_type: BTreeMap<String, Option<f64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSummary {
    pub datasets: usize,
    pub compression_ratio_geomean: Option<f64>,
    pub compression_time_s_geomean: Option<f64>,
    pub compression_speed_mb_s_geomean: Option<f64>,
    pub decompression_time_s_geomean: Option<f64>,
    pub decompression_speed_mb_s_geomean: Option<f64>,
    pub output_size_bytes_geomean: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub query_median_ms_geomean: QueryGeomeans,
    #[serde(deserialize_with = "null_as_default")]
    pub like_median_ms_geomean: LikeGeomeans,
    #[serde(deserialize_with = "null_as_default")]
    pub cold_query_ms_stats: ColdQueryStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueryGeomeans {
    pub full_scan_min: Option<f64>,
    pub selective_predicate: Option<f64>,
    pub random_access: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LikeGeomeans {
    pub prefix: Option<f64>,
    pub suffix: Option<f64>,
    pub contains: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColdQueryStats {
    pub full_scan_min: Option<ColdStat>,
    pub selective_predicate: Option<ColdStat>,
    pub random_access: Option<ColdStat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColdStat {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub geomean: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricDescriptor {
    pub key: String,
    pub label: String,
    pub unit: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RowScalingSummary {
    pub dataset: String,
    pub row_counts: Vec<u64>,
    pub generated_at: String,
    pub metrics: Vec<MetricDescriptor>,
    pub formats: Vec<String>,
    pub series: BTreeMap<String, BTreeMap<String, Vec<Option<f64>>>>,
    pub reports: BTreeMap<String, String>,
}

impl RowScalingSummary {
    pub fn values(&self, metric_key: &str, format: &str) -> &[Option<f64>] {
        self.series
            .get(metric_key)
            .and_then(|by_format| by_format.get(format))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Last good copy of an input, kept so rendering can proceed when the source is unreadable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSnapshot<T> {
    pub cached_at: String,
    pub source_path: String,
    pub source_sha256: String,
    pub payload: T,
}
