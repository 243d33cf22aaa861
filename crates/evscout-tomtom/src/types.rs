//! TomTom batch-search wire types.
//!
//! Models the JSON bodies of the asynchronous batch endpoint: one outbound
//! `{"batchItems": [{"query": …}]}` request, and the per-item results the
//! completed job returns. Station payloads are kept opaque apart from the
//! `id` field used for deduplication.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::grid::GridCell;

/// Category search term for EV charging stations.
const CATEGORY: &str = "electric vehicle station";
/// TomTom POI category set id for EV charging stations.
const CATEGORY_SET: &str = "7309";
/// Per-cell result cap.
const RESULT_LIMIT: u32 = 100;
/// "No geographic text" — station names come back untranslated.
const LANGUAGE: &str = "NGT";

/// Body of the batch submission request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub batch_items: Vec<BatchItem>,
}

impl BatchRequest {
    /// Render one batch item per grid cell.
    #[must_use]
    pub fn from_cells(cells: &[GridCell]) -> Self {
        Self {
            batch_items: cells.iter().map(BatchItem::for_cell).collect(),
        }
    }
}

/// One sub-query inside a batch request.
///
/// The query is a relative search path with its own query string. Batch item
/// paths omit the service version prefix (`/search/2`), and must never carry
/// the API key — the credential travels only on the outer batch request.
#[derive(Debug, Serialize)]
pub struct BatchItem {
    pub query: String,
}

impl BatchItem {
    #[must_use]
    pub fn for_cell(cell: &GridCell) -> Self {
        // The category lands in a JSON body, not a URL, so the HTTP client
        // won't encode it for us.
        let category = utf8_percent_encode(CATEGORY, NON_ALPHANUMERIC);
        Self {
            query: format!(
                "/categorySearch/{category}.json?lat={lat}&lon={lon}&radius={radius}\
                 &limit={RESULT_LIMIT}&categorySet={CATEGORY_SET}&relatedPois=off&language={LANGUAGE}",
                lat = cell.lat,
                lon = cell.lon,
                radius = cell.radius_m,
            ),
        }
    }
}

/// Completed batch job body: one result per submitted item, in index order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    #[serde(default)]
    pub batch_items: Vec<BatchItemResult>,
}

/// Outcome of a single sub-query within the batch.
///
/// `response` is left as raw JSON: failed items carry an arbitrary error shape
/// in that slot, so it is only parsed as [`ItemResponse`] when `status_code`
/// indicates success.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResult {
    pub status_code: u16,
    #[serde(default)]
    pub response: serde_json::Value,
}

/// Successful sub-query payload: the inner category-search result list.
#[derive(Debug, Deserialize)]
pub struct ItemResponse {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

/// A charging station as returned by the provider.
///
/// Only `id` is interpreted; everything else round-trips untouched through
/// the flattened payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: String,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}
