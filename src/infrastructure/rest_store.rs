// REST store adapter for the managed sensor database
use crate::application::reading_repository::ReadingRepository;
use crate::domain::reading::SensorReading;
use crate::infrastructure::config::StoreSettings;
use async_trait::async_trait;
use chrono::{Duration as TimeDelta, Utc};
use futures::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to sensor store failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sensor store returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed store row: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct RestStore {
    host: String,
    api_key: String,
    table: String,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            host: settings.host.trim_end_matches('/').to_string(),
            api_key: settings.api_key,
            table: settings.table,
            client: reqwest::Client::new(),
        }
    }

    fn latest_url(&self) -> String {
        format!(
            "{}/rest/v1/{}?select=*&order=recorded_at.desc&limit=1",
            self.host, self.table
        )
    }

    fn window_url(&self, cutoff: &str) -> String {
        format!(
            "{}/rest/v1/{}?select=*&recorded_at=gte.{}&order=recorded_at.asc",
            self.host,
            self.table,
            urlencoding::encode(cutoff)
        )
    }

    fn changes_url(&self) -> String {
        format!("{}/realtime/v1/{}", self.host, self.table)
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn fetch_rows(&self, url: &str) -> Result<Vec<SensorReading>, StoreError> {
        let response = self
            .request(url)
            .header("Accept", "application/json")
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<Vec<SensorReading>>().await?)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status { status, body })
}

/// Split complete newline-terminated records off the front of the buffer.
/// Incomplete trailing data stays buffered for the next chunk.
fn drain_lines(buffer: &mut Vec<u8>) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
        let mut line: Vec<u8> = buffer.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

fn parse_row(line: &[u8]) -> Result<SensorReading, StoreError> {
    Ok(serde_json::from_slice(line)?)
}

#[async_trait]
impl ReadingRepository for RestStore {
    async fn latest_reading(&self) -> anyhow::Result<Option<SensorReading>> {
        let rows = self.fetch_rows(&self.latest_url()).await?;
        Ok(rows.into_iter().next())
    }

    async fn readings_since(&self, hours: i64) -> anyhow::Result<Vec<SensorReading>> {
        let cutoff = (Utc::now() - TimeDelta::hours(hours)).to_rfc3339();
        Ok(self.fetch_rows(&self.window_url(&cutoff)).await?)
    }

    async fn subscribe_inserts(&self) -> anyhow::Result<mpsc::Receiver<SensorReading>> {
        let response = self
            .request(&self.changes_url())
            .header("Accept", "application/x-ndjson")
            .send()
            .await
            .map_err(StoreError::Transport)?;
        let response = check_status(response).await?;

        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();

            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!("insert feed transport error: {e}");
                        break;
                    }
                };
                buffer.extend_from_slice(&chunk);

                for line in drain_lines(&mut buffer) {
                    match parse_row(&line) {
                        Ok(reading) => {
                            // Receiver dropped: the subscriber went away.
                            if tx.send(reading).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            tracing::debug!("Skipping malformed insert notification: {e}");
                        }
                    }
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RestStore {
        RestStore::new(StoreSettings {
            host: "https://store.example.com/".to_string(),
            api_key: "secret".to_string(),
            table: "sensor_readings".to_string(),
        })
    }

    #[test]
    fn test_latest_url_orders_descending_with_limit_one() {
        assert_eq!(
            store().latest_url(),
            "https://store.example.com/rest/v1/sensor_readings?select=*&order=recorded_at.desc&limit=1"
        );
    }

    #[test]
    fn test_window_url_encodes_the_cutoff_timestamp() {
        let url = store().window_url("2024-05-12T09:00:00+00:00");
        assert_eq!(
            url,
            "https://store.example.com/rest/v1/sensor_readings?select=*&recorded_at=gte.2024-05-12T09%3A00%3A00%2B00%3A00&order=recorded_at.asc"
        );
    }

    #[test]
    fn test_drain_lines_handles_partial_chunks() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(b"{\"a\":1}\n{\"b\":");
        let lines = drain_lines(&mut buffer);
        assert_eq!(lines, vec![b"{\"a\":1}".to_vec()]);
        assert_eq!(buffer, b"{\"b\":".to_vec());

        buffer.extend_from_slice(b"2}\r\n");
        let lines = drain_lines(&mut buffer);
        assert_eq!(lines, vec![b"{\"b\":2}".to_vec()]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_drain_lines_skips_keepalive_blank_lines() {
        let mut buffer = b"\n\n{\"a\":1}\n".to_vec();
        let lines = drain_lines(&mut buffer);
        assert_eq!(lines, vec![b"{\"a\":1}".to_vec()]);
    }

    #[test]
    fn test_parse_row_decodes_a_notification_payload() {
        let line = br#"{"recorded_at":"2024-05-12T09:30:00Z","ph_value":6.8}"#;
        let reading = parse_row(line).unwrap();
        assert_eq!(reading.ph_value, Some(6.8));
    }

    #[test]
    fn test_parse_row_rejects_malformed_payloads() {
        assert!(matches!(
            parse_row(b"not json"),
            Err(StoreError::Decode(_))
        ));
    }
}
