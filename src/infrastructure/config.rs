use crate::domain::alarm::{AlarmRange, AlarmZone};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub store: StoreSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub host: String,
    pub api_key: String,
    pub table: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub tiles: Vec<TileConfig>,
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
    #[serde(default = "default_alarms")]
    pub alarms: HashMap<String, AlarmRange>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TileConfig {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub precision: usize,
    pub field: String,
    /// Name of the alarm range this tile is classified against, if any.
    #[serde(default)]
    pub alarm: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    #[serde(default)]
    pub zones: Vec<AlarmZone>,
    #[serde(default)]
    pub series: Vec<SeriesConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeriesConfig {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub field: String,
}

/// Built-in alarm ranges, used when the `[alarms]` table is absent.
pub fn default_alarms() -> HashMap<String, AlarmRange> {
    HashMap::from([
        ("tank_temperature".to_string(), AlarmRange::new(30.0, 40.0)),
        ("acidity".to_string(), AlarmRange::new(6.0, 8.0)),
    ])
}

pub fn load_store_config() -> anyhow::Result<StoreConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/store"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
