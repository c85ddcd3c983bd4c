// Dashboard and charts view models
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::alarm::Status;
use super::chart::{ChartData, Window};

/// Addresses of the two views, included in every payload so the client can
/// link between them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Links {
    pub dashboard: &'static str,
    pub charts: &'static str,
}

impl Links {
    pub fn new() -> Self {
        Self {
            dashboard: "/",
            charts: "/charts",
        }
    }
}

impl Default for Links {
    fn default() -> Self {
        Self::new()
    }
}

/// The current-reading view. `loading` is true only before the first
/// reading resolves; afterwards the view always shows the last-known-good
/// reading, even if later fetches fail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub loading: bool,
    pub recorded_at: Option<DateTime<Utc>>,
    pub alert: bool,
    pub tiles: Vec<TileView>,
    pub diagnostics: Vec<String>,
    pub faults: Vec<String>,
    pub links: Links,
}

impl DashboardView {
    pub fn loading() -> Self {
        Self {
            loading: true,
            recorded_at: None,
            alert: false,
            tiles: Vec::new(),
            diagnostics: Vec::new(),
            faults: Vec::new(),
            links: Links::new(),
        }
    }
}

/// One metric display on the dashboard. `status` is present only for tiles
/// bound to an alarm range.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileView {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub value: Option<f64>,
    pub display: String,
    pub status: Option<Status>,
}

/// The historical charts view for one selected window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartsPage {
    pub title: String,
    pub window: &'static str,
    pub windows: Vec<WindowOption>,
    pub empty: bool,
    pub charts: Vec<ChartData>,
    pub links: Links,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl WindowOption {
    /// The five canonical windows, with the current one marked.
    pub fn all(selected: Window) -> Vec<Self> {
        Window::ALL
            .iter()
            .map(|w| WindowOption {
                value: w.as_str(),
                label: w.label(),
                selected: *w == selected,
            })
            .collect()
    }
}
