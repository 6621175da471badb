use serde::{Deserialize, Serialize};

pub const BOUNDARY_GEOJSON_URL: &str = "https://raw.githubusercontent.com/vasturiano/react-globe.gl/master/example/datasets/ne_110m_admin_0_countries.geojson";

/// Country metadata shipped alongside the app as a static asset.
pub const CATALOG_URL: &str = "/data/countries.json";
/// Optional boundary-line overlay; absent file means no overlay.
pub const OVERLAY_URL: &str = "/data/boundary-overlay.geojson";

pub const GLOBE_IMAGE_URL_LIGHT: &str = "//unpkg.com/three-globe/example/img/earth-day.jpg";
pub const GLOBE_IMAGE_URL_DARK: &str = "//unpkg.com/three-globe/example/img/earth-night.jpg";
pub const BACKGROUND_IMAGE_URL: &str = "//unpkg.com/three-globe/example/img/night-sky.png";

pub const INITIAL_LAT: f64 = 20.0;
pub const INITIAL_LNG: f64 = 0.0;
pub const INITIAL_ALTITUDE: f64 = 2.5;
pub const HOVER_ALTITUDE: f64 = 0.03;
pub const REST_ALTITUDE: f64 = 0.01;
pub const CLICK_ZOOM_ALTITUDE: f64 = 1.2;
pub const FLY_TO_DURATION_MS: u32 = 1500;
pub const BBOX_ALTITUDE_MIN: f64 = 0.5;
pub const BBOX_ALTITUDE_MAX: f64 = CLICK_ZOOM_ALTITUDE + 0.5;
/// Degrees of bounding-box extent per unit of camera altitude.
pub const BBOX_EXTENT_DIVISOR: f64 = 40.0;
pub const AUTO_ROTATE_SPEED: f64 = 0.20;
pub const MIN_CAMERA_DISTANCE: f64 = 150.0;
pub const MAX_CAMERA_DISTANCE: f64 = 700.0;
pub const ATMOSPHERE_ALTITUDE: f64 = 0.28;
pub const POLYGON_TRANSITION_MS: u32 = 100;
pub const OVERLAY_ALTITUDE: f64 = 0.015;
pub const OVERLAY_STROKE: f64 = 1.5;
/// Antarctica projects badly at the poles.
pub const EXCLUDED_ISO_A2: &[&str] = &["AQ"];

/// Tunables for the globe core. Every field has a default, so hosts can
/// override any subset through JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub boundary_url: String,
    pub catalog_url: String,
    /// Empty disables the overlay layer.
    pub overlay_url: String,
    pub initial_lat: f64,
    pub initial_lng: f64,
    pub initial_altitude: f64,
    pub hover_altitude: f64,
    pub rest_altitude: f64,
    pub click_zoom_altitude: f64,
    pub fly_to_duration_ms: u32,
    pub bbox_altitude_min: f64,
    pub bbox_altitude_max: f64,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f64,
    pub min_camera_distance: f64,
    pub max_camera_distance: f64,
    pub excluded_iso_a2: Vec<String>,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            boundary_url: BOUNDARY_GEOJSON_URL.to_string(),
            catalog_url: CATALOG_URL.to_string(),
            overlay_url: OVERLAY_URL.to_string(),
            initial_lat: INITIAL_LAT,
            initial_lng: INITIAL_LNG,
            initial_altitude: INITIAL_ALTITUDE,
            hover_altitude: HOVER_ALTITUDE,
            rest_altitude: REST_ALTITUDE,
            click_zoom_altitude: CLICK_ZOOM_ALTITUDE,
            fly_to_duration_ms: FLY_TO_DURATION_MS,
            bbox_altitude_min: BBOX_ALTITUDE_MIN,
            bbox_altitude_max: BBOX_ALTITUDE_MAX,
            auto_rotate: true,
            auto_rotate_speed: AUTO_ROTATE_SPEED,
            min_camera_distance: MIN_CAMERA_DISTANCE,
            max_camera_distance: MAX_CAMERA_DISTANCE,
            excluded_iso_a2: EXCLUDED_ISO_A2.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid globe config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl GlobeConfig {
    /// Parse a host-supplied JSON override and normalize it.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let parsed: Self = serde_json::from_str(raw)?;
        Ok(parsed.validated())
    }

    /// Replace values that would break the scene with their defaults.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.boundary_url.trim().is_empty() {
            self.boundary_url = defaults.boundary_url;
        }
        if self.catalog_url.trim().is_empty() {
            self.catalog_url = defaults.catalog_url;
        }
        if self.fly_to_duration_ms == 0 {
            self.fly_to_duration_ms = defaults.fly_to_duration_ms;
        }
        if !(self.click_zoom_altitude > 0.0) {
            self.click_zoom_altitude = defaults.click_zoom_altitude;
        }
        if !(self.hover_altitude > self.rest_altitude) {
            self.hover_altitude = defaults.hover_altitude;
            self.rest_altitude = defaults.rest_altitude;
        }
        if !(self.bbox_altitude_min > 0.0) || self.bbox_altitude_min > self.bbox_altitude_max {
            self.bbox_altitude_min = defaults.bbox_altitude_min;
            self.bbox_altitude_max = defaults.bbox_altitude_max;
        }
        if self.min_camera_distance > self.max_camera_distance {
            self.min_camera_distance = defaults.min_camera_distance;
            self.max_camera_distance = defaults.max_camera_distance;
        }
        self
    }

    pub fn overlay_url(&self) -> Option<&str> {
        Some(self.overlay_url.trim()).filter(|url| !url.is_empty())
    }

    pub fn is_excluded(&self, iso_a2: Option<&str>) -> bool {
        iso_a2.is_some_and(|code| {
            self.excluded_iso_a2
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(code))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = GlobeConfig::from_json("{}").unwrap();
        assert_eq!(config, GlobeConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = GlobeConfig::from_json(r#"{"auto_rotate": false, "fly_to_duration_ms": 900}"#)
            .unwrap();
        assert!(!config.auto_rotate);
        assert_eq!(config.fly_to_duration_ms, 900);
        assert_eq!(config.click_zoom_altitude, CLICK_ZOOM_ALTITUDE);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = GlobeConfig::from_json(
            r#"{"fly_to_duration_ms": 0, "bbox_altitude_min": 3.0, "bbox_altitude_max": 1.0, "hover_altitude": 0.0}"#,
        )
        .unwrap();
        assert_eq!(config.fly_to_duration_ms, FLY_TO_DURATION_MS);
        assert_eq!(config.bbox_altitude_min, BBOX_ALTITUDE_MIN);
        assert_eq!(config.bbox_altitude_max, BBOX_ALTITUDE_MAX);
        assert!(config.hover_altitude > config.rest_altitude);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(GlobeConfig::from_json("{not json").is_err());
    }

    #[test]
    fn exclusion_matches_case_insensitively() {
        let config = GlobeConfig::default();
        assert!(config.is_excluded(Some("AQ")));
        assert!(config.is_excluded(Some("aq")));
        assert!(!config.is_excluded(Some("IN")));
        assert!(!config.is_excluded(None));
    }

    #[test]
    fn blank_overlay_url_disables_overlay() {
        let config = GlobeConfig::from_json(r#"{"overlay_url": "  ", "catalog_url": ""}"#).unwrap();
        assert_eq!(config.overlay_url(), None);
        assert_eq!(config.catalog_url, CATALOG_URL);
        assert_eq!(GlobeConfig::default().overlay_url(), Some(OVERLAY_URL));
    }
}
