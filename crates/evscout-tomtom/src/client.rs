//! HTTP client for the TomTom Search API.
//!
//! Wraps `reqwest` with credential handling and the asynchronous batch-search
//! protocol: submit a grid of radius sub-queries as one batch, poll the job to
//! completion, and merge the per-cell results. The API key is attached only to
//! outer requests, never to individual batch items.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, Url};

use crate::error::TomTomError;
use crate::grid::{self, BoundingBox, GridCell};
use crate::merge::merge_batch;
use crate::poll::{BatchJob, JobHandle, PollConfig};
use crate::types::{BatchRequest, BatchResponse, StationRecord};

const DEFAULT_BASE_URL: &str = "https://api.tomtom.com/";
const BATCH_PATH: &str = "search/2/batch.json";
/// Boxes wider than this on either axis get a warning, not a rejection.
const OVERSIZED_BBOX_DEG: f64 = 5.0;

/// Characters that must be escaped when an id is embedded as a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// Outcome of a batch submission.
///
/// Small batches can complete synchronously; the provider then answers the
/// submission itself with the full result body and there is nothing to poll.
#[derive(Debug)]
pub enum SubmitOutcome {
    Completed(BatchResponse),
    Accepted(JobHandle),
}

/// Client for the TomTom Search API.
///
/// Manages the HTTP client, API key, and base URL. Use [`TomTomClient::new`]
/// for production or [`TomTomClient::with_base_url`] to point at a mock
/// server in tests.
pub struct TomTomClient {
    client: Client,
    api_key: String,
    base_url: Url,
    poll: PollConfig,
}

impl TomTomClient {
    /// Creates a new client pointed at the production TomTom API.
    ///
    /// # Errors
    ///
    /// Returns [`TomTomError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, TomTomError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`TomTomError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`TomTomError::InvalidUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, TomTomError> {
        let client = Client::builder()
            // A 303 submit response is the async job handle, not a redirect
            // to follow: submit_batch must see it to read the Location header.
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("evscout/0.1 (ev-station-search)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // join() appends to the path rather than replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| TomTomError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            poll: PollConfig::default(),
        })
    }

    /// Replaces the polling cadence and wait budget.
    #[must_use]
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// End-to-end bounding-box search: plan the grid, submit the batch, poll
    /// if the job is asynchronous, and merge into unique stations.
    ///
    /// An unusually large box is logged but still attempted; a box that plans
    /// to zero cells short-circuits to an empty result without touching the
    /// network.
    ///
    /// # Errors
    ///
    /// Propagates any [`TomTomError`] from submission or polling. Individual
    /// failed batch items are logged and excluded rather than surfaced.
    pub async fn find_stations(
        &self,
        bbox: &BoundingBox,
    ) -> Result<Vec<StationRecord>, TomTomError> {
        if bbox.wider_than(OVERSIZED_BBOX_DEG) {
            tracing::warn!(?bbox, "requested area is very large");
        }

        let cells = grid::plan(bbox);
        if cells.is_empty() {
            return Ok(Vec::new());
        }
        tracing::info!(
            cells = cells.len(),
            radius_m = cells.first().map_or(0, |c| c.radius_m),
            ?bbox,
            "submitting batch grid search"
        );

        let response = match self.submit_batch(&cells).await? {
            SubmitOutcome::Completed(response) => response,
            SubmitOutcome::Accepted(handle) => {
                tracing::info!(poll_url = %handle.poll_url, "batch accepted; polling");
                self.poll_batch(handle).await?
            }
        };

        let stations = merge_batch(&response);
        tracing::info!(unique_stations = stations.len(), "batch grid search complete");
        Ok(stations)
    }

    /// Submits one batch request covering all grid cells.
    ///
    /// The credential is attached as a query parameter on the batch request
    /// only. A 200 means the provider answered synchronously; 202/303 mean an
    /// asynchronous job whose poll location must be in the `Location` header.
    ///
    /// # Errors
    ///
    /// - [`TomTomError::MissingPollLocation`] if an async-accepted response
    ///   carries no poll location (fatal, not retried).
    /// - [`TomTomError::SubmitRejected`] on any other status.
    /// - [`TomTomError::Http`] on transport failure.
    pub async fn submit_batch(&self, cells: &[GridCell]) -> Result<SubmitOutcome, TomTomError> {
        let url = self.credentialed_url(BATCH_PATH)?;
        let request = BatchRequest::from_cells(cells);
        let response = self.client.post(url).json(&request).send().await?;

        match response.status().as_u16() {
            200 => {
                let body = response.text().await?;
                let parsed =
                    serde_json::from_str(&body).map_err(|e| TomTomError::Deserialize {
                        context: "synchronous batch response".to_owned(),
                        source: e,
                    })?;
                Ok(SubmitOutcome::Completed(parsed))
            }
            202 | 303 => {
                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or(TomTomError::MissingPollLocation)?;
                // The location is normally absolute; joining against the base
                // also tolerates a relative one.
                let poll_url = self
                    .base_url
                    .join(location)
                    .map_err(|e| TomTomError::InvalidUrl {
                        url: location.to_owned(),
                        reason: e.to_string(),
                    })?
                    .to_string();
                Ok(SubmitOutcome::Accepted(JobHandle { poll_url }))
            }
            status => {
                let detail = response.text().await.unwrap_or_default();
                Err(TomTomError::SubmitRejected { status, detail })
            }
        }
    }

    /// Drives an accepted batch job to completion under the configured budget.
    ///
    /// # Errors
    ///
    /// See [`BatchJob::run`].
    pub async fn poll_batch(&self, handle: JobHandle) -> Result<BatchResponse, TomTomError> {
        let mut job = BatchJob::new(handle, self.poll.clone());
        let result = job.run(&self.client).await;
        tracing::debug!(status = ?job.status(), "batch job reached terminal state");
        result
    }

    /// Real-time charging availability for one station: a pure passthrough.
    ///
    /// # Errors
    ///
    /// Returns [`TomTomError::Http`] on transport failure, or
    /// [`TomTomError::UnexpectedStatus`] on a non-2xx status with the
    /// provider's status and body preserved.
    pub async fn charging_availability(
        &self,
        availability_id: &str,
    ) -> Result<serde_json::Value, TomTomError> {
        let encoded = utf8_percent_encode(availability_id, PATH_SEGMENT);
        let url =
            self.credentialed_url(&format!("search/2/chargingAvailability/{encoded}.json"))?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TomTomError::UnexpectedStatus {
                status: status.as_u16(),
                detail,
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| TomTomError::Deserialize {
            context: format!("chargingAvailability({availability_id})"),
            source: e,
        })
    }

    /// Joins a relative path onto the base URL and appends the API key.
    fn credentialed_url(&self, path: &str) -> Result<Url, TomTomError> {
        let mut url = self.base_url.join(path).map_err(|e| TomTomError::InvalidUrl {
            url: path.to_owned(),
            reason: e.to_string(),
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> TomTomClient {
        TomTomClient::with_base_url("test-key", 30, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn credentialed_url_appends_key() {
        let client = test_client("https://api.tomtom.com");
        let url = client.credentialed_url(BATCH_PATH).expect("url");
        assert_eq!(
            url.as_str(),
            "https://api.tomtom.com/search/2/batch.json?key=test-key"
        );
    }

    #[test]
    fn credentialed_url_tolerates_trailing_slash() {
        let client = test_client("https://api.tomtom.com/");
        let url = client.credentialed_url(BATCH_PATH).expect("url");
        assert_eq!(
            url.as_str(),
            "https://api.tomtom.com/search/2/batch.json?key=test-key"
        );
    }

    #[test]
    fn credentialed_url_encodes_key() {
        let client = TomTomClient::with_base_url("key with spaces", 30, "https://api.tomtom.com")
            .expect("client");
        let url = client.credentialed_url(BATCH_PATH).expect("url");
        assert!(
            url.as_str().contains("key=key+with+spaces")
                || url.as_str().contains("key=key%20with%20spaces"),
            "key should be encoded: {url}"
        );
    }

    #[test]
    fn with_base_url_rejects_garbage() {
        let result = TomTomClient::with_base_url("k", 30, "not a url");
        assert!(matches!(result, Err(TomTomError::InvalidUrl { .. })));
    }
}
