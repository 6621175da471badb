use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::GlobeConfig;
use crate::region::{BoundaryCollection, RegionSet};

pub const LOAD_FAILURE_MESSAGE: &str = "Could not load base map data. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response body: {0}")]
    Parse(String),
}

impl DatasetError {
    /// Text shown to the user; the technical cause only goes to the log.
    pub fn user_message(&self) -> &'static str {
        LOAD_FAILURE_MESSAGE
    }
}

impl BoundaryCollection {
    pub fn from_json(raw: &str) -> Result<Self, DatasetError> {
        serde_json::from_str(raw).map_err(|e| DatasetError::Parse(e.to_string()))
    }
}

/// Set when the view that started a fetch is torn down. Late results are dropped.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Lifecycle of the boundary dataset: `Loading` then exactly one terminal state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DatasetState {
    #[default]
    Loading,
    Ready(Arc<RegionSet>),
    Failed(String),
}

impl DatasetState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn regions(&self) -> Option<&Arc<RegionSet>> {
        match self {
            Self::Ready(regions) => Some(regions),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Apply a fetch result. Returns `false` (and leaves the state alone) when
    /// the owning view was torn down or the state is already terminal.
    pub fn settle(
        &mut self,
        cancel: &CancelFlag,
        result: Result<BoundaryCollection, DatasetError>,
        config: &GlobeConfig,
    ) -> bool {
        if cancel.is_cancelled() {
            tracing::debug!("dropping boundary dataset result after teardown");
            return false;
        }
        if !self.is_loading() {
            tracing::debug!("boundary dataset already settled");
            return false;
        }
        *self = match result {
            Ok(collection) => {
                let regions = RegionSet::from_collection(collection, config);
                tracing::info!(regions = regions.len(), "world GeoJSON data loaded");
                Self::Ready(Arc::new(regions))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch world GeoJSON data");
                Self::Failed(e.user_message().to_string())
            }
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_features() -> BoundaryCollection {
        BoundaryCollection::from_json(
            r#"{"features": [
                {"properties": {"ADMIN": "India", "ADM0_A3": "IND"}},
                {"properties": {"ADMIN": "Nepal", "ADM0_A3": "NPL"}}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn success_moves_to_ready() {
        let mut state = DatasetState::default();
        assert!(state.settle(&CancelFlag::new(), Ok(two_features()), &GlobeConfig::default()));
        assert_eq!(state.regions().map(|r| r.len()), Some(2));
    }

    #[test]
    fn failure_exposes_user_message() {
        let mut state = DatasetState::Loading;
        state.settle(
            &CancelFlag::new(),
            Err(DatasetError::Http { status: 500 }),
            &GlobeConfig::default(),
        );
        assert_eq!(state.error(), Some(LOAD_FAILURE_MESSAGE));
        assert!(state.regions().is_none());
    }

    #[test]
    fn cancelled_result_is_dropped() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let mut state = DatasetState::Loading;
        assert!(!state.settle(&cancel, Ok(two_features()), &GlobeConfig::default()));
        assert!(state.is_loading());
    }

    #[test]
    fn error_is_terminal() {
        let cancel = CancelFlag::new();
        let config = GlobeConfig::default();
        let mut state = DatasetState::Loading;
        state.settle(&cancel, Err(DatasetError::Network("offline".into())), &config);
        assert!(!state.settle(&cancel, Ok(two_features()), &config));
        assert!(state.error().is_some());
    }

    #[test]
    fn unparseable_body_is_a_parse_error() {
        assert!(matches!(
            BoundaryCollection::from_json("<html>"),
            Err(DatasetError::Parse(_))
        ));
    }
}
