//! Storage layer backed by Supabase's PostgREST interface
//!
//! Every operation is a plain HTTP call against the `sleep_records` table.
//! The service keeps no local copy of any row between requests.

use anyhow::{anyhow, Context, Result};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::SleepRecord;

const TABLE: &str = "sleep_records";

/// Row payload for creating a day's record
#[derive(Debug, Serialize)]
pub struct NewSleepRecord {
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wake_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_time: Option<String>,
}

/// Partial update for an existing day's record; only set fields are sent
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct SleepRecordChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wake_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_duration: Option<f64>,
}

/// PostgREST client scoped to the sleep records table
pub struct SleepStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SleepStore {
    /// Create a client for the given Supabase project URL and API key
    pub fn new(supabase_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}/rest/v1", supabase_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }

    fn request(&self, method: Method) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, TABLE);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Fetch the record for an exact date, if one exists
    pub async fn find_by_date(&self, date: &str) -> Result<Option<SleepRecord>> {
        let filter = eq(date);
        let response = self
            .request(Method::GET)
            .query(&[("select", "*"), ("date", filter.as_str())])
            .send()
            .await
            .context("select by date failed")?;

        let rows: Vec<SleepRecord> = read_json(response).await?;
        Ok(rows.into_iter().next())
    }

    /// Fetch up to `limit` records, newest date first
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<SleepRecord>> {
        let limit = limit.to_string();
        let response = self
            .request(Method::GET)
            .query(&[
                ("select", "*"),
                ("order", "date.desc"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .context("select recent failed")?;

        read_json(response).await
    }

    /// Insert a new day's record
    pub async fn insert(&self, record: &NewSleepRecord) -> Result<()> {
        let response = self
            .request(Method::POST)
            .json(record)
            .send()
            .await
            .context("insert failed")?;

        check_status(response).await
    }

    /// Apply a partial update to the record for `date`
    pub async fn update(&self, date: &str, changes: &SleepRecordChanges) -> Result<()> {
        let filter = eq(date);
        let response = self
            .request(Method::PATCH)
            .query(&[("date", filter.as_str())])
            .json(changes)
            .send()
            .await
            .context("update failed")?;

        check_status(response).await
    }
}

/// PostgREST equality filter value
fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// Fail on non-2xx, keeping PostgREST's error body in the message
async fn check_status(response: Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(anyhow!("{status}: {body}"))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!("{status}: {body}"));
    }
    response.json().await.context("failed to decode response body")
}
