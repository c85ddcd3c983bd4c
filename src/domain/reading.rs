// Sensor reading domain model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder shown for a channel that has no usable value.
pub const NO_VALUE: &str = "--";

/// One timestamped snapshot of all sensor channels, as stored in the
/// external store. Every channel is optional: a probe that was offline when
/// the row was written simply leaves its column null, which must stay
/// distinct from a zero reading or an empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub ph_value: Option<f64>,
    #[serde(default)]
    pub ph_voltage: Option<f64>,
    #[serde(default)]
    pub tank_temperature_1: Option<f64>,
    #[serde(default)]
    pub tank_temperature_2: Option<f64>,
    #[serde(default)]
    pub ambient_temperature: Option<f64>,
    #[serde(default)]
    pub ambient_humidity: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub gas_resistance: Option<f64>,
    #[serde(default)]
    pub methane_ppm: Option<f64>,
    #[serde(default)]
    pub methane_percent: Option<f64>,
    #[serde(default)]
    pub methane_temperature: Option<f64>,
    #[serde(default)]
    pub diagnostics: Option<Vec<String>>,
    #[serde(default)]
    pub faults: Option<Vec<String>>,
}

impl SensorReading {
    /// An empty snapshot at the given time. Tests and defaults fill in the
    /// channels they care about.
    pub fn empty(recorded_at: DateTime<Utc>) -> Self {
        Self {
            recorded_at,
            ph_value: None,
            ph_voltage: None,
            tank_temperature_1: None,
            tank_temperature_2: None,
            ambient_temperature: None,
            ambient_humidity: None,
            pressure: None,
            gas_resistance: None,
            methane_ppm: None,
            methane_percent: None,
            methane_temperature: None,
            diagnostics: None,
            faults: None,
        }
    }
}

/// A numeric sensor channel, addressable by its config/column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricField {
    PhValue,
    PhVoltage,
    TankTemperature1,
    TankTemperature2,
    AmbientTemperature,
    AmbientHumidity,
    Pressure,
    GasResistance,
    MethanePpm,
    MethanePercent,
    MethaneTemperature,
}

impl MetricField {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "ph_value" => Some(Self::PhValue),
            "ph_voltage" => Some(Self::PhVoltage),
            "tank_temperature_1" => Some(Self::TankTemperature1),
            "tank_temperature_2" => Some(Self::TankTemperature2),
            "ambient_temperature" => Some(Self::AmbientTemperature),
            "ambient_humidity" => Some(Self::AmbientHumidity),
            "pressure" => Some(Self::Pressure),
            "gas_resistance" => Some(Self::GasResistance),
            "methane_ppm" => Some(Self::MethanePpm),
            "methane_percent" => Some(Self::MethanePercent),
            "methane_temperature" => Some(Self::MethaneTemperature),
            _ => None,
        }
    }

    pub fn read(self, reading: &SensorReading) -> Option<f64> {
        match self {
            Self::PhValue => reading.ph_value,
            Self::PhVoltage => reading.ph_voltage,
            Self::TankTemperature1 => reading.tank_temperature_1,
            Self::TankTemperature2 => reading.tank_temperature_2,
            Self::AmbientTemperature => reading.ambient_temperature,
            Self::AmbientHumidity => reading.ambient_humidity,
            Self::Pressure => reading.pressure,
            Self::GasResistance => reading.gas_resistance,
            Self::MethanePpm => reading.methane_ppm,
            Self::MethanePercent => reading.methane_percent,
            Self::MethaneTemperature => reading.methane_temperature,
        }
    }
}

/// Format a channel value for display. Absent or non-finite values render
/// as the placeholder, never as "0.00" or "NaN".
pub fn format_value(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.precision$}"),
        _ => NO_VALUE.to_string(),
    }
}
