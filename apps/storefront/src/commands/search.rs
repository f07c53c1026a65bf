//! # Photo Search
//!
//! ```text
//! image bytes ──► VisualClassifier::analyze ──► Option<VisualDetection>
//!                        (no lock held)                 │
//!                                                       ▼
//!                            rank_visual_matches(detection, catalog)
//!                                                       │
//!                                   PHOTO search log ◄──┴──► products
//! ```

use chrono::Utc;
use tracing::{debug, info};

use super::catalog::record_search;
use crate::classifier::VisualClassifier;
use crate::error::{ApiError, ApiResult};
use crate::state::{PersistJob, Storefront};
use loom_core::search::rank_visual_matches;
use loom_core::{Product, SearchLogType};

/// Finds catalog products that look like the photo, best match first.
///
/// When the classifier cannot tell what the photo shows, the first few
/// catalog products are returned unranked.
pub async fn visual_search(
    sf: &Storefront,
    classifier: &dyn VisualClassifier,
    client_id: &str,
    image: &[u8],
) -> ApiResult<Vec<Product>> {
    debug!(client_id = %client_id, bytes = image.len(), "visual_search command");

    if image.is_empty() {
        return Err(ApiError::validation("Image is empty"));
    }

    let detection = classifier.analyze(image).await;
    debug!(detection = ?detection, "Classifier finished");

    let (results, log) = sf.with_data(|data| {
        let ids = rank_visual_matches(detection.as_ref(), &data.products);
        let results: Vec<Product> = ids
            .iter()
            .filter_map(|id| data.products.iter().find(|p| &p.id == id).cloned())
            .collect();

        let log = record_search(data, client_id, SearchLogType::Photo, None, results.len(), Utc::now());
        (results, log)
    });

    info!(client_id = %client_id, results = results.len(), recognised = detection.is_some(), "Photo search");
    sf.persist(vec![PersistJob::CreateSearchLog(log)]).await;
    Ok(results)
}
