// Chart service - Use case for the historical charts view
use crate::application::reading_repository::ReadingRepository;
use crate::domain::chart::{ChartSpec, SeriesSpec, Window, build_chart};
use crate::domain::dashboard::{ChartsPage, Links, WindowOption};
use crate::domain::reading::{MetricField, SensorReading};
use crate::infrastructure::config::ChartConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct ChartService {
    repository: Arc<dyn ReadingRepository>,
    specs: Arc<Vec<ChartSpec>>,
    inner: Arc<Inner>,
}

struct Inner {
    /// Bumped on every window selection. A fetch response only installs if
    /// its generation is still current, so a late response for a previously
    /// selected window is discarded instead of overwriting newer data.
    generation: AtomicU64,
    working: RwLock<WorkingSet>,
}

/// The in-memory working set for the currently selected window. Replaced
/// wholesale on each selection; never merged incrementally.
struct WorkingSet {
    window: Window,
    readings: Vec<SensorReading>,
}

impl ChartService {
    pub fn new(repository: Arc<dyn ReadingRepository>, charts: &[ChartConfig]) -> Self {
        let specs = charts.iter().filter_map(resolve_chart).collect();
        Self {
            repository,
            specs: Arc::new(specs),
            inner: Arc::new(Inner {
                generation: AtomicU64::new(0),
                working: RwLock::new(WorkingSet {
                    window: Window::OneDay,
                    readings: Vec::new(),
                }),
            }),
        }
    }

    /// Fetch the selected window and render the charts page. On fetch
    /// failure the previous working set is served unchanged.
    pub async fn select_window(&self, window: Window) -> ChartsPage {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        match self.repository.readings_since(window.hours()).await {
            Ok(mut readings) => {
                // The transformer and the stride decimation both depend on
                // ascending timestamp order.
                readings.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at));
                self.install(generation, window, readings).await;
            }
            Err(e) => tracing::warn!("history fetch for window {window} failed: {e:#}"),
        }

        self.page().await
    }

    /// Install a fetched working set unless a newer selection has been made
    /// since the fetch started.
    async fn install(&self, generation: u64, window: Window, readings: Vec<SensorReading>) -> bool {
        if generation != self.inner.generation.load(Ordering::SeqCst) {
            tracing::debug!(
                "Discarding stale response for window {window} (generation {generation})"
            );
            return false;
        }
        *self.inner.working.write().await = WorkingSet { window, readings };
        true
    }

    /// Render the page from whatever working set is current.
    pub async fn page(&self) -> ChartsPage {
        let working = self.inner.working.read().await;
        let charts = self
            .specs
            .iter()
            .filter_map(|spec| build_chart(spec, &working.readings, working.window))
            .collect();

        ChartsPage {
            title: format!("Digester History ({})", working.window.label()),
            window: working.window.as_str(),
            windows: WindowOption::all(working.window),
            empty: working.readings.is_empty(),
            charts,
            links: Links::new(),
        }
    }
}

fn resolve_chart(config: &ChartConfig) -> Option<ChartSpec> {
    let series: Vec<SeriesSpec> = config
        .series
        .iter()
        .filter_map(|s| {
            let Some(field) = MetricField::parse(&s.field) else {
                tracing::warn!(
                    "Skipping series {} for chart {} - unknown field {}",
                    s.id,
                    config.id,
                    s.field
                );
                return None;
            };
            Some(SeriesSpec {
                id: s.id.clone(),
                name: s.name.clone(),
                color: s.color.clone(),
                field,
            })
        })
        .collect();

    if series.is_empty() {
        tracing::warn!("Skipping chart {} - no usable series", config.id);
        return None;
    }

    let fixed_domain = match (config.y_min, config.y_max) {
        (Some(min), Some(max)) => Some((min, max)),
        (None, None) => None,
        _ => {
            tracing::warn!(
                "Chart {} has a half-open fixed domain, auto-scaling",
                config.id
            );
            None
        }
    };

    Some(ChartSpec {
        id: config.id.clone(),
        title: config.title.clone(),
        unit: config.unit.clone(),
        fixed_domain,
        zones: config.zones.clone(),
        series,
    })
}
