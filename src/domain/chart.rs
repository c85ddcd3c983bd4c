// Chart transformation domain model
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::alarm::AlarmZone;
use super::reading::{MetricField, SensorReading};

/// Minimum absolute axis padding, in value units.
const MIN_PADDING: f64 = 0.1;
/// Minimum visible span for short windows when the data barely moves.
const MIN_VISIBLE_SPAN: f64 = 2.0;

/// A relative time span bounding a historical query. Only these five are
/// addressable from the charts view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    OneHour,
    TwelveHours,
    OneDay,
    OneWeek,
    OneMonth,
}

impl Window {
    pub const ALL: [Window; 5] = [
        Window::OneHour,
        Window::TwelveHours,
        Window::OneDay,
        Window::OneWeek,
        Window::OneMonth,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "1h" => Some(Self::OneHour),
            "12h" => Some(Self::TwelveHours),
            "1d" => Some(Self::OneDay),
            "1w" => Some(Self::OneWeek),
            "1m" => Some(Self::OneMonth),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::TwelveHours => "12h",
            Self::OneDay => "1d",
            Self::OneWeek => "1w",
            Self::OneMonth => "1m",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OneHour => "Last hour",
            Self::TwelveHours => "Last 12 hours",
            Self::OneDay => "Last day",
            Self::OneWeek => "Last week",
            Self::OneMonth => "Last month",
        }
    }

    pub fn hours(self) -> i64 {
        match self {
            Self::OneHour => 1,
            Self::TwelveHours => 12,
            Self::OneDay => 24,
            Self::OneWeek => 24 * 7,
            Self::OneMonth => 24 * 30,
        }
    }

    /// Positional decimation stride. The long windows keep every 10th
    /// reading by index; the short ones render at full resolution.
    pub fn stride(self) -> usize {
        match self {
            Self::OneWeek | Self::OneMonth => 10,
            _ => 1,
        }
    }

    /// Fraction of the raw value range added as axis headroom on each side.
    fn pad_fraction(self) -> f64 {
        match self {
            Self::OneHour => 0.05,
            Self::TwelveHours => 0.08,
            Self::OneDay => 0.12,
            Self::OneWeek => 0.20,
            Self::OneMonth => 0.25,
        }
    }

    /// Short windows get their axis re-centered and widened so small real
    /// fluctuations stay legible instead of rendering flat.
    fn is_short(self) -> bool {
        matches!(self, Self::OneHour | Self::TwelveHours)
    }

    /// Decimal places for value-axis ticks; coarser for longer windows.
    pub fn value_precision(self) -> u8 {
        match self {
            Self::OneHour | Self::TwelveHours => 2,
            Self::OneDay | Self::OneWeek => 1,
            Self::OneMonth => 0,
        }
    }

    /// Target number of labeled time-axis ticks; denser for short windows.
    fn target_labels(self) -> usize {
        match self {
            Self::OneHour => 10,
            Self::TwelveHours => 8,
            Self::OneDay => 6,
            Self::OneWeek => 5,
            Self::OneMonth => 4,
        }
    }

    /// Abbreviated time-axis label. The exact timestamp stays on every
    /// point for hover detail.
    pub fn format_label(self, at: DateTime<Utc>) -> String {
        let fmt = match self {
            Self::OneHour | Self::TwelveHours => "%H:%M",
            Self::OneDay => "%m/%d %H:%M",
            Self::OneWeek | Self::OneMonth => "%m/%d",
        };
        at.format(fmt).to_string()
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Definition of one chart: which channels it plots and how its value axis
/// is scaled. Resolved from configuration at startup.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub fixed_domain: Option<(f64, f64)>,
    pub zones: Vec<AlarmZone>,
    pub series: Vec<SeriesSpec>,
}

#[derive(Debug, Clone)]
pub struct SeriesSpec {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub field: MetricField,
}

/// A renderable chart: scaled axis, zone bands, and gap-preserving series.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub y_min: f64,
    pub y_max: f64,
    pub fraction_digits: u8,
    pub label_stride: usize,
    pub zones: Vec<AlarmZone>,
    pub series: Vec<ChartSeries>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub points: Vec<SeriesPoint>,
}

/// One plotted point. `value: None` marks an explicit gap in this series;
/// the renderer breaks the line there instead of interpolating.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

/// Build one chart from the working set of a window. Readings must already
/// be in ascending timestamp order. Returns `None` when no reading has a
/// plottable value for any of the chart's channels.
pub fn build_chart(spec: &ChartSpec, readings: &[SensorReading], window: Window) -> Option<ChartData> {
    let sampled = readings.iter().step_by(window.stride());

    // A reading stays on this chart if at least one tracked channel has a
    // usable value.
    let visible: Vec<&SensorReading> = sampled
        .filter(|r| {
            spec.series
                .iter()
                .any(|s| s.field.read(r).is_some_and(f64::is_finite))
        })
        .collect();

    if visible.is_empty() {
        return None;
    }

    let (y_min, y_max) = match spec.fixed_domain {
        Some((min, max)) => (min, max),
        None => {
            let values: Vec<f64> = visible
                .iter()
                .flat_map(|r| spec.series.iter().map(|s| s.field.read(r)))
                .flatten()
                .filter(|v| v.is_finite())
                .collect();
            auto_domain(&values, window)
        }
    };

    let series = spec
        .series
        .iter()
        .map(|s| ChartSeries {
            id: s.id.clone(),
            name: s.name.clone(),
            color: s.color.clone(),
            points: visible
                .iter()
                .map(|r| SeriesPoint {
                    label: window.format_label(r.recorded_at),
                    timestamp: r.recorded_at,
                    value: s.field.read(r).filter(|v| v.is_finite()),
                })
                .collect(),
        })
        .collect();

    Some(ChartData {
        id: spec.id.clone(),
        title: spec.title.clone(),
        unit: spec.unit.clone(),
        y_min,
        y_max,
        fraction_digits: window.value_precision(),
        label_stride: label_stride(window, visible.len()),
        zones: spec.zones.clone(),
        series,
    })
}

/// Compute the value-axis domain from the visible values. Padding scales
/// with the window; short windows are additionally re-centered on the data
/// midpoint and widened to a minimum visible span.
fn auto_domain(values: &[f64], window: Window) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    let pad = (range * window.pad_fraction()).max(MIN_PADDING);
    let (lo, hi) = (min - pad, max + pad);

    if !window.is_short() {
        return (lo, hi);
    }

    let span = if range >= 1.0 {
        (hi - lo).max(range * 1.5)
    } else {
        MIN_VISIBLE_SPAN
    };
    let mid = (min + max) / 2.0;
    (mid - span / 2.0, mid + span / 2.0)
}

/// Label every Nth point so the time axis keeps roughly the target tick
/// count for the window.
fn label_stride(window: Window, points: usize) -> usize {
    points.div_ceil(window.target_labels()).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 12, 9, 0, 0).unwrap()
    }

    fn temp_reading(index: usize, value: f64) -> SensorReading {
        let mut reading = SensorReading::empty(base_time() + Duration::minutes(index as i64));
        reading.tank_temperature_1 = Some(value);
        reading
    }

    fn temp_spec(fixed_domain: Option<(f64, f64)>) -> ChartSpec {
        ChartSpec {
            id: "tank_temperature".to_string(),
            title: "Tank Temperature".to_string(),
            unit: Some("°C".to_string()),
            fixed_domain,
            zones: vec![],
            series: vec![SeriesSpec {
                id: "temp1".to_string(),
                name: "Tank 1".to_string(),
                color: None,
                field: MetricField::TankTemperature1,
            }],
        }
    }

    #[test]
    fn test_window_parse() {
        assert_eq!(Window::parse("1h"), Some(Window::OneHour));
        assert_eq!(Window::parse("12h"), Some(Window::TwelveHours));
        assert_eq!(Window::parse("1d"), Some(Window::OneDay));
        assert_eq!(Window::parse("1w"), Some(Window::OneWeek));
        assert_eq!(Window::parse("1m"), Some(Window::OneMonth));
        assert_eq!(Window::parse("2h"), None);
    }

    #[test]
    fn test_window_hours() {
        assert_eq!(Window::OneHour.hours(), 1);
        assert_eq!(Window::TwelveHours.hours(), 12);
        assert_eq!(Window::OneDay.hours(), 24);
        assert_eq!(Window::OneWeek.hours(), 168);
        assert_eq!(Window::OneMonth.hours(), 720);
    }

    #[test]
    fn test_long_windows_keep_every_tenth_point() {
        let readings: Vec<SensorReading> =
            (0..100).map(|i| temp_reading(i, 35.0 + i as f64 * 0.01)).collect();
        let spec = temp_spec(None);

        for window in [Window::OneWeek, Window::OneMonth] {
            let chart = build_chart(&spec, &readings, window).unwrap();
            let points = &chart.series[0].points;
            assert_eq!(points.len(), 10);
            for (n, point) in points.iter().enumerate() {
                assert_eq!(point.timestamp, readings[n * 10].recorded_at);
            }
        }
    }

    #[test]
    fn test_short_windows_render_full_resolution() {
        let readings: Vec<SensorReading> =
            (0..100).map(|i| temp_reading(i, 35.0)).collect();
        let spec = temp_spec(None);

        for window in [Window::OneHour, Window::TwelveHours, Window::OneDay] {
            let chart = build_chart(&spec, &readings, window).unwrap();
            assert_eq!(chart.series[0].points.len(), 100);
        }
    }

    #[test]
    fn test_fixed_domain_ignores_data_range() {
        let readings: Vec<SensorReading> =
            (0..10).map(|i| temp_reading(i, 500.0 + i as f64)).collect();
        let chart = build_chart(&temp_spec(Some((0.0, 80.0))), &readings, Window::OneDay).unwrap();
        assert_eq!(chart.y_min, 0.0);
        assert_eq!(chart.y_max, 80.0);
    }

    #[test]
    fn test_auto_domain_short_window_recenters_and_widens() {
        // Values between 20 and 22: raw range 2, padded span 2.2, widened
        // to 3 and centered on 21.
        let readings: Vec<SensorReading> =
            (0..4).map(|i| temp_reading(i, 20.0 + (i % 3) as f64)).collect();
        let chart = build_chart(&temp_spec(None), &readings, Window::OneHour).unwrap();

        let span = chart.y_max - chart.y_min;
        let mid = (chart.y_max + chart.y_min) / 2.0;
        assert!(span >= 2.0);
        assert!((mid - 21.0).abs() < 1e-9);
        assert!((span - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_auto_domain_flat_data_gets_fixed_span() {
        let readings: Vec<SensorReading> = (0..4).map(|i| temp_reading(i, 21.0)).collect();
        let chart = build_chart(&temp_spec(None), &readings, Window::OneHour).unwrap();
        assert!((chart.y_min - 20.0).abs() < 1e-9);
        assert!((chart.y_max - 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_auto_domain_long_window_pads_without_recentering() {
        let readings = vec![temp_reading(0, 10.0), temp_reading(1, 30.0)];
        let chart = build_chart(&temp_spec(None), &readings, Window::OneMonth).unwrap();
        // Range 20, 25% padding on each side.
        assert!((chart.y_min - 5.0).abs() < 1e-9);
        assert!((chart.y_max - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_readings_without_any_tracked_value_are_excluded() {
        let mut readings = vec![temp_reading(0, 35.0)];
        readings.push(SensorReading::empty(base_time() + Duration::minutes(1)));
        readings.push(temp_reading(2, 36.0));

        let chart = build_chart(&temp_spec(None), &readings, Window::OneDay).unwrap();
        assert_eq!(chart.series[0].points.len(), 2);
    }

    #[test]
    fn test_chart_with_no_plottable_values_is_omitted() {
        let readings = vec![SensorReading::empty(base_time())];
        assert!(build_chart(&temp_spec(None), &readings, Window::OneDay).is_none());
    }

    #[test]
    fn test_per_series_gaps_are_preserved() {
        let mut spec = temp_spec(None);
        spec.series.push(SeriesSpec {
            id: "temp2".to_string(),
            name: "Tank 2".to_string(),
            color: None,
            field: MetricField::TankTemperature2,
        });

        let mut with_both = temp_reading(0, 35.0);
        with_both.tank_temperature_2 = Some(34.0);
        let only_first = temp_reading(1, 36.0);

        let chart = build_chart(&spec, &[with_both, only_first], Window::OneDay).unwrap();
        // The reading stays visible, but the second series carries an
        // explicit gap instead of a fabricated value.
        assert_eq!(chart.series[1].points[0].value, Some(34.0));
        assert_eq!(chart.series[1].points[1].value, None);
        assert_eq!(chart.series[0].points[1].value, Some(36.0));
    }

    #[test]
    fn test_labels_follow_window_format() {
        let reading = temp_reading(0, 35.0);
        let spec = temp_spec(None);

        let chart = build_chart(&spec, std::slice::from_ref(&reading), Window::OneHour).unwrap();
        assert_eq!(chart.series[0].points[0].label, "09:00");

        let chart = build_chart(&spec, std::slice::from_ref(&reading), Window::OneDay).unwrap();
        assert_eq!(chart.series[0].points[0].label, "05/12 09:00");

        let chart = build_chart(&spec, std::slice::from_ref(&reading), Window::OneMonth).unwrap();
        assert_eq!(chart.series[0].points[0].label, "05/12");
    }

    #[test]
    fn test_exact_timestamp_survives_label_abbreviation() {
        let reading = temp_reading(0, 35.0);
        let chart =
            build_chart(&temp_spec(None), std::slice::from_ref(&reading), Window::OneMonth).unwrap();
        assert_eq!(chart.series[0].points[0].timestamp, reading.recorded_at);
    }

    #[test]
    fn test_tick_density_is_monotonic_in_window() {
        assert_eq!(label_stride(Window::OneHour, 100), 10);
        assert_eq!(label_stride(Window::OneMonth, 100), 25);
        assert!(label_stride(Window::OneHour, 100) <= label_stride(Window::OneMonth, 100));
        assert_eq!(label_stride(Window::OneHour, 3), 1);

        assert!(Window::OneHour.value_precision() >= Window::OneDay.value_precision());
        assert!(Window::OneDay.value_precision() >= Window::OneMonth.value_precision());
    }
}
