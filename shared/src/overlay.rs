use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::colors::palette;
use crate::config::{OVERLAY_ALTITUDE, OVERLAY_STROKE};
use crate::theme::ThemeMode;

/// Supplementary boundary lines (GeoJSON FeatureCollection of line strings).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LineCollection {
    #[serde(default)]
    pub features: Vec<LineFeature>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineFeature {
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
    pub geometry: Option<LineGeometry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum LineGeometry {
    LineString(Vec<Vec<f64>>),
    MultiLineString(Vec<Vec<Vec<f64>>>),
}

impl LineCollection {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// One projected path in render order `[lat, lng, altitude]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayPath {
    pub name: String,
    pub points: Vec<[f64; 3]>,
    pub color: String,
    pub stroke: f64,
}

/// Swap GeoJSON `[lng, lat]` into `[lat, lng, alt]`. Short positions are skipped.
fn project_line(line: &[Vec<f64>]) -> Vec<[f64; 3]> {
    line.iter()
        .filter_map(|pos| match pos.as_slice() {
            [lng, lat, ..] => Some([*lat, *lng, OVERLAY_ALTITUDE]),
            _ => None,
        })
        .collect()
}

pub fn project_overlay(lines: &LineCollection, theme: ThemeMode) -> Vec<OverlayPath> {
    let color = palette(theme).overlay_line.css();
    let mut paths = Vec::new();
    for (idx, feature) in lines.features.iter().enumerate() {
        let name = feature
            .properties
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("boundary-{idx}"));
        let parts: Vec<&[Vec<f64>]> = match &feature.geometry {
            Some(LineGeometry::LineString(line)) => vec![line.as_slice()],
            Some(LineGeometry::MultiLineString(lines)) => {
                lines.iter().map(Vec::as_slice).collect()
            }
            None => {
                tracing::warn!(feature = idx, "boundary overlay feature has no geometry");
                continue;
            }
        };
        for part in parts {
            let points = project_line(part);
            if points.len() < 2 {
                continue;
            }
            paths.push(OverlayPath {
                name: name.clone(),
                points,
                color: color.clone(),
                stroke: OVERLAY_STROKE,
            });
        }
    }
    paths
}

/// Projected overlay cached per theme; recomputed only when the theme changes.
#[derive(Debug, Clone, Default)]
pub struct OverlayMemo {
    lines: LineCollection,
    cached: Option<(ThemeMode, Arc<[OverlayPath]>)>,
}

impl OverlayMemo {
    pub fn new(lines: LineCollection) -> Self {
        Self {
            lines,
            cached: None,
        }
    }

    pub fn paths(&mut self, theme: ThemeMode) -> Arc<[OverlayPath]> {
        if let Some((cached_theme, paths)) = &self.cached
            && *cached_theme == theme
        {
            return paths.clone();
        }
        let paths: Arc<[OverlayPath]> = project_overlay(&self.lines, theme).into();
        self.cached = Some((theme, paths.clone()));
        paths
    }
}
