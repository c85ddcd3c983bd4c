// Alarm classification domain model
use serde::{Deserialize, Serialize};

/// Classification of one metric against its alarm range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Unknown,
    Safe,
    Critical,
}

/// Inclusive [min, max] band inside which a metric is considered safe.
/// Ranges are injected from configuration, keyed by metric name.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AlarmRange {
    pub min: f64,
    pub max: f64,
}

impl AlarmRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// A labeled sub-band of a chart's value axis, drawn behind the series for
/// visual context. Distinct from the alarm range used for classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmZone {
    pub label: String,
    pub color: String,
    pub min: f64,
    pub max: f64,
}

/// Classify a value against an inclusive range. Absent or non-finite values
/// are `Unknown`, never `Safe` or `Critical`.
pub fn classify(value: Option<f64>, range: AlarmRange) -> Status {
    match value {
        Some(v) if v.is_finite() => {
            if range.min <= v && v <= range.max {
                Status::Safe
            } else {
                Status::Critical
            }
        }
        _ => Status::Unknown,
    }
}

/// Aggregate banner rule: critical wins over everything, unknown neither
/// triggers nor suppresses.
pub fn any_critical(statuses: &[Status]) -> bool {
    statuses.contains(&Status::Critical)
}
