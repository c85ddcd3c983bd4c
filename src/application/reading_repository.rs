// Repository trait for sensor reading access
use crate::domain::reading::SensorReading;
use async_trait::async_trait;
use tokio::sync::mpsc;

#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// Fetch the single most recent reading (order by timestamp descending,
    /// limit one). `None` when the store holds no rows yet.
    async fn latest_reading(&self) -> anyhow::Result<Option<SensorReading>>;

    /// Fetch all readings with a timestamp within the last `hours`, in
    /// ascending timestamp order.
    async fn readings_since(&self, hours: i64) -> anyhow::Result<Vec<SensorReading>>;

    /// Subscribe to insert notifications. Each delivered reading has the
    /// same shape as a query row. The channel closes when the underlying
    /// push stream ends; callers decide whether to re-subscribe.
    async fn subscribe_inserts(&self) -> anyhow::Result<mpsc::Receiver<SensorReading>>;
}
