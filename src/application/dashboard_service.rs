// Dashboard service - Use case for rendering the current-reading view
use crate::application::live_feed::FeedState;
use crate::domain::alarm::{AlarmRange, Status, any_critical, classify};
use crate::domain::dashboard::{DashboardView, Links, TileView};
use crate::domain::reading::{MetricField, SensorReading, format_value};
use crate::infrastructure::config::TileConfig;
use std::collections::HashMap;

#[derive(Clone)]
pub struct DashboardService {
    tiles: Vec<ResolvedTile>,
}

/// Tile configuration with its field and alarm range resolved up front so
/// rendering stays a pure lookup.
#[derive(Clone)]
struct ResolvedTile {
    id: String,
    title: String,
    unit: String,
    precision: usize,
    field: MetricField,
    alarm: Option<AlarmRange>,
}

impl DashboardService {
    pub fn new(tiles: &[TileConfig], alarms: &HashMap<String, AlarmRange>) -> Self {
        let tiles = tiles
            .iter()
            .filter_map(|tile| {
                let Some(field) = MetricField::parse(&tile.field) else {
                    tracing::warn!("Skipping tile {} - unknown field {}", tile.id, tile.field);
                    return None;
                };
                let alarm = tile.alarm.as_ref().and_then(|key| {
                    let range = alarms.get(key).copied();
                    if range.is_none() {
                        tracing::warn!("Tile {} references unknown alarm range {}", tile.id, key);
                    }
                    range
                });
                Some(ResolvedTile {
                    id: tile.id.clone(),
                    title: tile.title.clone(),
                    unit: tile.unit.clone(),
                    precision: tile.precision,
                    field,
                    alarm,
                })
            })
            .collect();

        Self { tiles }
    }

    pub fn render(&self, feed: &FeedState) -> DashboardView {
        match feed.reading() {
            None => DashboardView::loading(),
            Some(reading) => self.render_reading(reading),
        }
    }

    fn render_reading(&self, reading: &SensorReading) -> DashboardView {
        let tiles: Vec<TileView> = self
            .tiles
            .iter()
            .map(|tile| {
                let value = tile.field.read(reading);
                TileView {
                    id: tile.id.clone(),
                    title: tile.title.clone(),
                    unit: tile.unit.clone(),
                    value,
                    display: format_value(value, tile.precision),
                    status: tile.alarm.map(|range| classify(value, range)),
                }
            })
            .collect();

        let statuses: Vec<Status> = tiles.iter().filter_map(|tile| tile.status).collect();

        DashboardView {
            loading: false,
            recorded_at: Some(reading.recorded_at),
            alert: any_critical(&statuses),
            tiles,
            diagnostics: reading.diagnostics.clone().unwrap_or_default(),
            faults: reading.faults.clone().unwrap_or_default(),
            links: Links::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::default_alarms;
    use chrono::{TimeZone, Utc};

    fn tile(id: &str, field: &str, alarm: Option<&str>) -> TileConfig {
        TileConfig {
            id: id.to_string(),
            title: id.to_string(),
            unit: String::new(),
            precision: 2,
            field: field.to_string(),
            alarm: alarm.map(str::to_string),
        }
    }

    fn service() -> DashboardService {
        DashboardService::new(
            &[
                tile("temp1", "tank_temperature_1", Some("tank_temperature")),
                tile("temp2", "tank_temperature_2", Some("tank_temperature")),
                tile("ph", "ph_value", Some("acidity")),
                tile("pressure", "pressure", None),
            ],
            &default_alarms(),
        )
    }

    fn reading(temp1: Option<f64>, temp2: Option<f64>, ph: Option<f64>) -> SensorReading {
        let ts = Utc.with_ymd_and_hms(2024, 5, 12, 9, 0, 0).unwrap();
        let mut reading = SensorReading::empty(ts);
        reading.tank_temperature_1 = temp1;
        reading.tank_temperature_2 = temp2;
        reading.ph_value = ph;
        reading
    }

    #[test]
    fn test_loading_state_before_first_reading() {
        let view = service().render(&FeedState::Loading);
        assert!(view.loading);
        assert!(!view.alert);
        assert!(view.tiles.is_empty());
    }

    #[test]
    fn test_banner_shows_when_any_metric_is_critical() {
        let view = service().render(&FeedState::Ready(reading(
            Some(41.0),
            Some(35.0),
            Some(7.0),
        )));
        assert!(view.alert);
        assert_eq!(view.tiles[0].status, Some(Status::Critical));
        assert_eq!(view.tiles[1].status, Some(Status::Safe));
    }

    #[test]
    fn test_banner_clears_when_replacement_reading_is_safe() {
        let svc = service();
        let critical = svc.render(&FeedState::Ready(reading(Some(41.0), None, Some(7.0))));
        assert!(critical.alert);

        // The pushed replacement brings temp1 back inside the range.
        let safe = svc.render(&FeedState::Ready(reading(Some(35.0), None, Some(7.0))));
        assert!(!safe.alert);
    }

    #[test]
    fn test_unknown_values_never_trigger_the_banner() {
        let view = service().render(&FeedState::Ready(reading(None, None, None)));
        assert!(!view.alert);
        assert_eq!(view.tiles[0].status, Some(Status::Unknown));
        assert_eq!(view.tiles[0].display, "--");
    }

    #[test]
    fn test_unclassified_tile_has_no_status() {
        let view = service().render(&FeedState::Ready(reading(Some(35.0), None, None)));
        let pressure = view.tiles.iter().find(|t| t.id == "pressure").unwrap();
        assert_eq!(pressure.status, None);
    }

    #[test]
    fn test_absent_and_empty_fault_lists_render_the_same() {
        let svc = service();

        let absent = svc.render(&FeedState::Ready(reading(Some(35.0), None, None)));
        assert!(absent.faults.is_empty());

        let mut with_empty = reading(Some(35.0), None, None);
        with_empty.faults = Some(Vec::new());
        let empty = svc.render(&FeedState::Ready(with_empty));
        assert!(empty.faults.is_empty());
    }

    #[test]
    fn test_tile_display_uses_generic_formatter() {
        let view = service().render(&FeedState::Ready(reading(Some(42.567), None, None)));
        assert_eq!(view.tiles[0].display, "42.57");
    }
}
