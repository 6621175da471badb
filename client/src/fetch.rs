//! One-shot fetches for the boundary dataset and the bundled static data.

use worldview_shared::overlay::LineCollection;
use worldview_shared::{BoundaryCollection, CountryCatalog, DatasetError};

async fn fetch_text(url: &str) -> Result<String, DatasetError> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| DatasetError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(DatasetError::Http {
            status: resp.status(),
        });
    }

    resp.text()
        .await
        .map_err(|e| DatasetError::Network(e.to_string()))
}

pub async fn fetch_boundaries(url: &str) -> Result<BoundaryCollection, DatasetError> {
    let raw = fetch_text(url).await?;
    BoundaryCollection::from_json(&raw)
}

/// Country metadata; failure is non-fatal and leaves the catalog empty.
pub async fn fetch_catalog(url: &str) -> Result<CountryCatalog, DatasetError> {
    let raw = fetch_text(url).await?;
    CountryCatalog::from_json(&raw).map_err(|e| DatasetError::Parse(e.to_string()))
}

pub async fn fetch_overlay(url: &str) -> Result<LineCollection, DatasetError> {
    let raw = fetch_text(url).await?;
    LineCollection::from_json(&raw).map_err(|e| DatasetError::Parse(e.to_string()))
}
