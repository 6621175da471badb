use serde::{Deserialize, Deserializer, Serialize};

use crate::config::GlobeConfig;

/// Stable handle for a region: its index in the source feature collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionKey(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// GeoJSON order is `[lng, lat]`.
    pub fn from_lng_lat(coords: [f64; 2]) -> Option<Self> {
        let [lng, lat] = coords;
        (lat.is_finite() && lng.is_finite()).then_some(Self { lat, lng })
    }
}

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Accepts a GeoJSON `bbox` member: 4 numbers, or 6 with altitudes.
    pub fn from_geojson(values: &[f64]) -> Option<Self> {
        let (min_lng, min_lat, max_lng, max_lat) = match *values {
            [a, b, c, d] => (a, b, c, d),
            [a, b, _, d, e, _] => (a, b, d, e),
            _ => return None,
        };
        let bbox = Self {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        };
        [min_lng, min_lat, max_lng, max_lat]
            .iter()
            .all(|v| v.is_finite())
            .then_some(bbox)
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.min_lat + self.max_lat) / 2.0,
            lng: (self.min_lng + self.max_lng) / 2.0,
        }
    }

    /// Larger of the two side lengths, in degrees.
    pub fn extent(&self) -> f64 {
        (self.max_lng - self.min_lng).max(self.max_lat - self.min_lat)
    }
}

/// Raw boundary dataset as served (GeoJSON FeatureCollection).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoundaryCollection {
    #[serde(default)]
    pub features: Vec<BoundaryFeature>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoundaryFeature {
    #[serde(default)]
    pub properties: FeatureProperties,
    #[serde(default)]
    pub geometry: serde_json::Value,
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
}

/// The subset of Natural Earth admin-0 properties the globe reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeatureProperties {
    #[serde(rename = "ADM0_A3", default, deserialize_with = "lenient_string")]
    pub adm0_a3: Option<String>,
    #[serde(rename = "ISO_A3", default, deserialize_with = "lenient_string")]
    pub iso_a3: Option<String>,
    #[serde(rename = "ISO_A2", default, deserialize_with = "lenient_string")]
    pub iso_a2: Option<String>,
    #[serde(rename = "ADMIN", default, deserialize_with = "lenient_string")]
    pub admin: Option<String>,
    #[serde(rename = "NAME", default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "LABEL_COORD", default, deserialize_with = "lenient_pair")]
    pub label_coord: Option<[f64; 2]>,
    #[serde(rename = "LABEL_X", default, deserialize_with = "lenient_number")]
    pub label_x: Option<f64>,
    #[serde(rename = "LABEL_Y", default, deserialize_with = "lenient_number")]
    pub label_y: Option<f64>,
}

impl FeatureProperties {
    /// Primary admin code, falling back to the ISO code.
    pub fn identifier(&self) -> Option<&str> {
        self.adm0_a3.as_deref().or(self.iso_a3.as_deref())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.admin.as_deref().or(self.name.as_deref())
    }

    pub fn label_anchor(&self) -> Option<GeoPoint> {
        self.label_coord
            .and_then(GeoPoint::from_lng_lat)
            .or_else(|| match (self.label_x, self.label_y) {
                (Some(x), Some(y)) => GeoPoint::from_lng_lat([x, y]),
                _ => None,
            })
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string))
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

fn lenient_pair<'de, D>(deserializer: D) -> Result<Option<[f64; 2]>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let Some(items) = value.as_array() else {
        return Ok(None);
    };
    match items.as_slice() {
        [a, b, ..] => Ok(a.as_f64().zip(b.as_f64()).map(|(a, b)| [a, b])),
        _ => Ok(None),
    }
}

/// One renderable country/territory. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub key: RegionKey,
    pub identifier: Option<String>,
    pub name: Option<String>,
    pub iso_a2: Option<String>,
    pub label_anchor: Option<GeoPoint>,
    pub bbox: Option<BoundingBox>,
    pub geometry: serde_json::Value,
}

impl Region {
    pub fn from_feature(key: RegionKey, feature: BoundaryFeature) -> Self {
        let props = &feature.properties;
        Self {
            key,
            identifier: props.identifier().map(str::to_string),
            name: props.display_name().map(str::to_string),
            iso_a2: props.iso_a2.clone(),
            label_anchor: props.label_anchor(),
            bbox: feature.bbox.as_deref().and_then(BoundingBox::from_geojson),
            geometry: feature.geometry,
        }
    }

    /// Tooltip text: display name, else the identifier.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.identifier.as_deref())
            .unwrap_or_default()
    }

    pub fn is_malformed(&self) -> bool {
        self.identifier.is_none() && self.name.is_none()
    }
}

/// Regions kept for rendering, ordered by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    /// Build the rendered set, dropping excluded landmasses entirely.
    pub fn from_collection(collection: BoundaryCollection, config: &GlobeConfig) -> Self {
        let regions = collection
            .features
            .into_iter()
            .enumerate()
            .filter(|(_, feature)| !config.is_excluded(feature.properties.iso_a2.as_deref()))
            .map(|(idx, feature)| Region::from_feature(RegionKey(idx), feature))
            .collect();
        Self { regions }
    }

    pub fn get(&self, key: RegionKey) -> Option<&Region> {
        self.regions
            .binary_search_by_key(&key, |r| r.key)
            .ok()
            .map(|idx| &self.regions[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn as_slice(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
