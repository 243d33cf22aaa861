//! Batch result merging.
//!
//! Folds per-cell result sets into one collection deduplicated by station id.
//! Overlapping circles return the same station from several cells; all items
//! come from the same job snapshot, so last-write-wins is safe.

use std::collections::HashMap;

use crate::types::{BatchResponse, ItemResponse, StationRecord};

/// Merge the per-item results of a completed batch into unique stations.
///
/// Items are visited in index order. An item that failed (non-200 sub-status)
/// or carries an unparseable payload is logged and skipped without aborting
/// the merge; records missing a usable `id` are dropped individually. The
/// returned order is unspecified.
#[must_use]
pub fn merge_batch(response: &BatchResponse) -> Vec<StationRecord> {
    let mut stations: HashMap<String, StationRecord> = HashMap::new();

    for (index, item) in response.batch_items.iter().enumerate() {
        if item.status_code != 200 {
            tracing::error!(
                index,
                status = item.status_code,
                response = %item.response,
                "batch item failed; excluding from merge"
            );
            continue;
        }

        let inner: ItemResponse = match serde_json::from_value(item.response.clone()) {
            Ok(inner) => inner,
            Err(e) => {
                tracing::error!(index, error = %e, "batch item payload unparseable; skipping");
                continue;
            }
        };

        for value in inner.results {
            match serde_json::from_value::<StationRecord>(value) {
                Ok(record) => {
                    stations.insert(record.id.clone(), record);
                }
                Err(e) => {
                    tracing::debug!(index, error = %e, "result record has no usable id; dropping");
                }
            }
        }
    }

    stations.into_values().collect()
}
