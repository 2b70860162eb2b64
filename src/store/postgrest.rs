use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_RANGE;
use serde::Deserialize;
use tracing::debug;

use super::{RecordStore, StoreError};
use crate::model::NormalizedRecord;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct PropertyNumberRow {
    property_number: String,
}

/// Hosted table reached through its PostgREST endpoint (`/rest/v1/<table>`).
pub struct PostgrestStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl PostgrestStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            api_key: api_key.to_string(),
        })
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[async_trait]
impl RecordStore for PostgrestStore {
    async fn insert(&self, records: &[NormalizedRecord]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let response = self
            .authorized(self.client.post(&self.endpoint))
            .header("Prefer", "return=minimal")
            .json(records)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        debug!(endpoint = %self.endpoint, records = records.len(), "insert accepted");
        Ok(records.len())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let url = format!("{}?select=*", self.endpoint);
        let response = self
            .authorized(self.client.head(&url))
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: "count request failed".to_string(),
            });
        }

        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| StoreError::Response("missing Content-Range header".to_string()))?;

        parse_content_range_total(range)
            .ok_or_else(|| StoreError::Response(format!("unparseable Content-Range: {range}")))
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        // PostgREST refuses an unfiltered DELETE; every row has a property number.
        let url = format!("{}?property_number=not.is.null", self.endpoint);
        let response = self
            .authorized(self.client.delete(&url))
            .header("Prefer", "return=minimal")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        debug!(endpoint = %self.endpoint, "table cleared");
        Ok(())
    }

    async fn latest_property_number(&self, prefix: &str) -> Result<Option<String>, StoreError> {
        let url = format!(
            "{}?select=property_number&property_number=like.{prefix}*&order=property_number.desc&limit=1",
            self.endpoint
        );
        let response = self.authorized(self.client.get(&url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let rows: Vec<PropertyNumberRow> = response.json().await?;
        Ok(rows.into_iter().next().map(|row| row.property_number))
    }

    fn describe(&self) -> String {
        format!("postgrest:{}", self.endpoint)
    }
}

/// Total row count from a PostgREST `Content-Range` value such as `0-24/889`
/// or `*/0`. An unknown total (`*`) yields `None`.
pub(super) fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.parse::<u64>().ok()
}
