//! Scene controller: turns pointer interaction into hover state, upward
//! events and camera motion, and computes per-region visual state.

use std::sync::Arc;

use crate::colors::{Rgba, palette};
use crate::config::GlobeConfig;
use crate::dataset::DatasetState;
use crate::region::{Region, RegionKey, RegionSet};
use crate::surface::{CameraTarget, Cursor, CursorElement, RenderSurface};
use crate::theme::ThemeMode;
use crate::viewport::ViewportSize;

pub const LOADING_TEXT: &str = "Loading Map Data...";
pub const INITIALIZING_TEXT: &str = "Initializing Map View...";

/// What the globe host shows. Placeholder priority: error, loading, initializing.
#[derive(Debug, Clone)]
pub enum SceneStatus {
    Failed(String),
    Loading,
    Initializing,
    Ready(Arc<RegionSet>),
}

impl SceneStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Placeholder text and whether it is an error.
    pub fn placeholder(&self) -> Option<(&str, bool)> {
        match self {
            Self::Failed(message) => Some((message.as_str(), true)),
            Self::Loading => Some((LOADING_TEXT, false)),
            Self::Initializing => Some((INITIALIZING_TEXT, false)),
            Self::Ready(_) => None,
        }
    }
}

/// `Ready` compares by dataset identity; the region set is never deep-compared.
impl PartialEq for SceneStatus {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Failed(a), Self::Failed(b)) => a == b,
            (Self::Loading, Self::Loading) | (Self::Initializing, Self::Initializing) => true,
            (Self::Ready(a), Self::Ready(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// An empty (or fully excluded) dataset still yields a ready, empty globe.
pub fn scene_status(dataset: &DatasetState, size: ViewportSize) -> SceneStatus {
    match dataset {
        DatasetState::Failed(message) => SceneStatus::Failed(message.clone()),
        DatasetState::Loading => SceneStatus::Loading,
        DatasetState::Ready(regions) if size.is_measurable() => SceneStatus::Ready(regions.clone()),
        DatasetState::Ready(_) => SceneStatus::Initializing,
    }
}

fn is_hovered(region: &Region, hovered: Option<RegionKey>) -> bool {
    hovered == Some(region.key)
}

pub fn cap_color(region: &Region, hovered: Option<RegionKey>, theme: ThemeMode) -> Rgba {
    let p = palette(theme);
    if is_hovered(region, hovered) {
        p.cap_hovered
    } else {
        p.cap_default
    }
}

pub fn side_color(theme: ThemeMode) -> Rgba {
    palette(theme).side
}

pub fn stroke_color(theme: ThemeMode) -> Rgba {
    palette(theme).stroke
}

/// Height above the sphere; hovered regions are raised.
pub fn altitude(region: &Region, hovered: Option<RegionKey>, config: &GlobeConfig) -> f64 {
    if is_hovered(region, hovered) {
        config.hover_altitude
    } else {
        config.rest_altitude
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStyle {
    pub cap: Rgba,
    pub side: Rgba,
    pub stroke: Rgba,
    pub altitude: f64,
}

pub fn region_style(
    region: &Region,
    hovered: Option<RegionKey>,
    theme: ThemeMode,
    config: &GlobeConfig,
) -> RegionStyle {
    RegionStyle {
        cap: cap_color(region, hovered, theme),
        side: side_color(theme),
        stroke: stroke_color(theme),
        altitude: altitude(region, hovered, config),
    }
}

/// Camera target for a clicked region: label anchor, else bbox center with
/// an extent-derived altitude, else altitude only.
pub fn fly_to_target(region: &Region, config: &GlobeConfig) -> CameraTarget {
    if let Some(anchor) = region.label_anchor {
        return CameraTarget::at(anchor.lat, anchor.lng, config.click_zoom_altitude);
    }
    if let Some(bbox) = region.bbox {
        let center = bbox.center();
        let altitude = (bbox.extent() / crate::config::BBOX_EXTENT_DIVISOR)
            .clamp(config.bbox_altitude_min, config.bbox_altitude_max);
        return CameraTarget::at(center.lat, center.lng, altitude);
    }
    CameraTarget::altitude_only(config.click_zoom_altitude)
}

/// Events the scene exposes to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    RegionHover(Option<String>),
    RegionClick {
        identifier: Option<String>,
        name: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlyToOutcome {
    Direct,
    Fallback,
    Failed,
}

/// Owns the render surface exclusively; nothing else touches camera or controls.
pub struct SceneController<S: RenderSurface> {
    surface: S,
    config: GlobeConfig,
    theme: ThemeMode,
    hovered: Option<RegionKey>,
    auto_rotate: bool,
}

impl<S: RenderSurface> SceneController<S> {
    pub fn new(surface: S, config: GlobeConfig, theme: ThemeMode) -> Self {
        Self {
            surface,
            auto_rotate: config.auto_rotate,
            config,
            theme,
            hovered: None,
        }
    }

    /// Apply initial control state once the scene is constructed.
    pub fn start(&mut self) {
        self.surface.set_auto_rotate(self.auto_rotate);
        self.set_cursor(Cursor::Grab);
    }

    /// Swing in to the configured initial point of view.
    pub fn show_initial_view(&mut self) -> FlyToOutcome {
        let target = CameraTarget::at(
            self.config.initial_lat,
            self.config.initial_lng,
            self.config.initial_altitude,
        );
        self.fly_to(target, self.config.fly_to_duration_ms / 2)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.theme = theme;
    }

    pub fn hovered(&self) -> Option<RegionKey> {
        self.hovered
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate
    }

    pub fn style_for(&self, region: &Region) -> RegionStyle {
        region_style(region, self.hovered, self.theme, &self.config)
    }

    /// Pointer entered a region (`Some`) or left all regions (`None`).
    pub fn handle_hover(&mut self, region: Option<&Region>) -> SceneEvent {
        self.hovered = region.map(|r| r.key);
        self.set_cursor(if region.is_some() {
            Cursor::Pointer
        } else {
            Cursor::Grab
        });
        SceneEvent::RegionHover(region.and_then(|r| r.identifier.clone()))
    }

    /// Confirm over a region. Regions with neither code nor name are dropped.
    pub fn handle_click(&mut self, region: Option<&Region>) -> Option<SceneEvent> {
        let region = region?;
        if region.is_malformed() {
            tracing::warn!(key = region.key.0, "could not extract country id or name from feature properties");
            return None;
        }

        if self.auto_rotate {
            self.auto_rotate = false;
            self.surface.set_auto_rotate(false);
        }
        self.set_cursor(Cursor::Pointer);

        let target = fly_to_target(region, &self.config);
        self.fly_to(target, self.config.fly_to_duration_ms);

        Some(SceneEvent::RegionClick {
            identifier: region.identifier.clone(),
            name: region.name.clone(),
        })
    }

    pub fn pointer_down(&mut self) {
        self.set_cursor(Cursor::Grabbing);
    }

    pub fn pointer_up(&mut self) {
        self.set_cursor(if self.hovered.is_some() {
            Cursor::Pointer
        } else {
            Cursor::Grab
        });
    }

    /// Animated transition; on failure retries with an altitude-only move so
    /// the camera never stays half-configured. A later call supersedes an
    /// in-flight one.
    pub fn fly_to(&mut self, target: CameraTarget, duration_ms: u32) -> FlyToOutcome {
        let Err(e) = self.surface.set_camera_target(target, duration_ms) else {
            return FlyToOutcome::Direct;
        };
        tracing::warn!(error = %e, ?target, "error during fly-to animation");

        let fallback = CameraTarget::altitude_only(self.config.click_zoom_altitude);
        match self.surface.set_camera_target(fallback, duration_ms) {
            Ok(()) => FlyToOutcome::Fallback,
            Err(e) => {
                tracing::error!(error = %e, "fallback camera transition failed");
                FlyToOutcome::Failed
            }
        }
    }

    fn set_cursor(&self, cursor: Cursor) {
        if let Some(el) = self.surface.cursor_element() {
            el.set_cursor(cursor);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::dataset::CancelFlag;
    use crate::region::{BoundaryCollection, BoundingBox, GeoPoint};
    use crate::surface::SurfaceError;

    #[derive(Clone, Default)]
    struct StubCursor(Rc<Cell<Option<Cursor>>>);

    impl CursorElement for StubCursor {
        fn set_cursor(&self, cursor: Cursor) {
            self.0.set(Some(cursor));
        }
    }

    #[derive(Default)]
    struct StubSurface {
        targets: RefCell<Vec<(CameraTarget, u32)>>,
        auto_rotate: Cell<Option<bool>>,
        cursor: StubCursor,
        /// Number of upcoming transitions that fail.
        failures: Cell<u32>,
    }

    impl RenderSurface for StubSurface {
        type Cursor = StubCursor;

        fn set_camera_target(
            &mut self,
            target: CameraTarget,
            duration_ms: u32,
        ) -> Result<(), SurfaceError> {
            if self.failures.get() > 0 {
                self.failures.set(self.failures.get() - 1);
                return Err(SurfaceError::Transition("boom".into()));
            }
            self.targets.borrow_mut().push((target, duration_ms));
            Ok(())
        }

        fn set_auto_rotate(&mut self, enabled: bool) {
            self.auto_rotate.set(Some(enabled));
        }

        fn cursor_element(&self) -> Option<StubCursor> {
            Some(self.cursor.clone())
        }
    }

    fn region(key: usize, identifier: Option<&str>, name: Option<&str>) -> Region {
        Region {
            key: RegionKey(key),
            identifier: identifier.map(str::to_string),
            name: name.map(str::to_string),
            iso_a2: None,
            label_anchor: None,
            bbox: None,
            geometry: serde_json::Value::Null,
        }
    }

    fn controller() -> SceneController<StubSurface> {
        SceneController::new(StubSurface::default(), GlobeConfig::default(), ThemeMode::Dark)
    }

    #[test]
    fn hovered_region_is_colored_and_raised() {
        let config = GlobeConfig::default();
        let a = region(1, Some("FRA"), Some("France"));
        let b = region(2, Some("DEU"), Some("Germany"));
        for theme in [ThemeMode::Light, ThemeMode::Dark] {
            for r in [&a, &b] {
                assert_ne!(
                    cap_color(r, Some(r.key), theme),
                    cap_color(r, Some(RegionKey(99)), theme)
                );
                assert_ne!(cap_color(r, Some(r.key), theme), cap_color(r, None, theme));
            }
        }
        assert!(altitude(&a, Some(a.key), &config) > altitude(&a, Some(b.key), &config));
        assert!(altitude(&a, Some(a.key), &config) > altitude(&a, None, &config));
    }

    #[test]
    fn status_priority_is_error_then_loading_then_initializing() {
        let ready = DatasetState::Ready(Arc::new(RegionSet::default()));
        let size = ViewportSize::new(800.0, 600.0);
        assert!(matches!(
            scene_status(&DatasetState::Failed("x".into()), ViewportSize::ZERO),
            SceneStatus::Failed(_)
        ));
        assert_eq!(scene_status(&DatasetState::Loading, size), SceneStatus::Loading);
        assert_eq!(scene_status(&ready, ViewportSize::ZERO), SceneStatus::Initializing);
        assert!(scene_status(&ready, size).is_ready());
        assert_eq!(SceneStatus::Loading.placeholder(), Some((LOADING_TEXT, false)));
    }

    #[test]
    fn fully_excluded_dataset_is_ready_without_placeholder() {
        let collection: BoundaryCollection = serde_json::from_value(serde_json::json!({
            "features": [
                {"properties": {"ADMIN": "Antarctica", "ADM0_A3": "ATA", "ISO_A2": "AQ"}}
            ]
        }))
        .unwrap();
        let mut dataset = DatasetState::Loading;
        assert!(dataset.settle(&CancelFlag::new(), Ok(collection), &GlobeConfig::default()));

        let status = scene_status(&dataset, ViewportSize::new(800.0, 600.0));
        assert!(status.is_ready());
        assert_eq!(status.placeholder(), None);
    }

    #[test]
    fn ready_status_compares_by_dataset_identity() {
        let regions = Arc::new(RegionSet::default());
        let same = SceneStatus::Ready(regions.clone());
        assert_eq!(SceneStatus::Ready(regions), same);
        assert_ne!(SceneStatus::Ready(Arc::new(RegionSet::default())), same);
        assert_ne!(SceneStatus::Loading, same);
        assert_eq!(SceneStatus::Failed("x".into()), SceneStatus::Failed("x".into()));
    }

    #[test]
    fn hover_emits_identifier_and_updates_cursor() {
        let mut scene = controller();
        let fra = region(3, Some("FRA"), Some("France"));
        assert_eq!(
            scene.handle_hover(Some(&fra)),
            SceneEvent::RegionHover(Some("FRA".into()))
        );
        assert_eq!(scene.hovered(), Some(RegionKey(3)));
        assert_eq!(scene.surface().cursor.0.get(), Some(Cursor::Pointer));

        assert_eq!(scene.handle_hover(None), SceneEvent::RegionHover(None));
        assert_eq!(scene.hovered(), None);
        assert_eq!(scene.surface().cursor.0.get(), Some(Cursor::Grab));
    }

    #[test]
    fn click_on_malformed_region_is_dropped() {
        let mut scene = controller();
        scene.start();
        assert_eq!(scene.handle_click(Some(&region(0, None, None))), None);
        assert!(scene.surface().targets.borrow().is_empty());
        assert!(scene.is_auto_rotating());
        assert_eq!(scene.handle_click(None), None);
    }

    #[test]
    fn click_stops_rotation_and_flies_to_label_anchor() {
        let mut scene = controller();
        scene.start();
        let mut ind = region(7, Some("IND"), Some("India"));
        ind.label_anchor = Some(GeoPoint::new(22.0, 78.0));

        let event = scene.handle_click(Some(&ind));
        assert_eq!(
            event,
            Some(SceneEvent::RegionClick {
                identifier: Some("IND".into()),
                name: Some("India".into()),
            })
        );
        assert!(!scene.is_auto_rotating());
        assert_eq!(scene.surface().auto_rotate.get(), Some(false));
        assert_eq!(
            scene.surface().targets.borrow().last(),
            Some(&(CameraTarget::at(22.0, 78.0, 1.2), 1500))
        );
    }

    #[test]
    fn name_only_region_still_emits_click() {
        let mut scene = controller();
        let event = scene.handle_click(Some(&region(4, None, Some("Somaliland"))));
        assert_eq!(
            event,
            Some(SceneEvent::RegionClick {
                identifier: None,
                name: Some("Somaliland".into()),
            })
        );
    }

    #[test]
    fn fly_to_target_uses_bbox_with_clamped_altitude() {
        let config = GlobeConfig::default();
        let mut r = region(1, Some("RUS"), Some("Russia"));
        r.bbox = BoundingBox::from_geojson(&[-180.0, 41.0, 180.0, 82.0]);
        let target = fly_to_target(&r, &config);
        assert_eq!(target.position, Some(GeoPoint::new(61.5, 0.0)));
        assert_eq!(target.altitude, config.bbox_altitude_max);

        r.bbox = BoundingBox::from_geojson(&[6.0, 49.4, 6.5, 50.2]);
        assert_eq!(fly_to_target(&r, &config).altitude, config.bbox_altitude_min);

        r.bbox = BoundingBox::from_geojson(&[0.0, 0.0, 40.0, 20.0]);
        assert_eq!(fly_to_target(&r, &config).altitude, 1.0);
    }

    #[test]
    fn fly_to_target_without_geometry_hints_keeps_position() {
        let config = GlobeConfig::default();
        let target = fly_to_target(&region(1, Some("XXK"), Some("Kosovo")), &config);
        assert_eq!(target, CameraTarget::altitude_only(config.click_zoom_altitude));
    }

    #[test]
    fn failed_transition_falls_back_to_altitude_only() {
        let mut scene = controller();
        scene.surface.failures.set(1);
        let outcome = scene.fly_to(CameraTarget::at(10.0, 10.0, 1.2), 1500);
        assert_eq!(outcome, FlyToOutcome::Fallback);
        assert_eq!(
            scene.surface().targets.borrow().as_slice(),
            &[(CameraTarget::altitude_only(1.2), 1500)]
        );

        scene.surface.failures.set(2);
        assert_eq!(
            scene.fly_to(CameraTarget::at(0.0, 0.0, 1.2), 1500),
            FlyToOutcome::Failed
        );
    }

    #[test]
    fn later_click_supersedes_earlier_fly_to() {
        let mut scene = controller();
        let mut a = region(1, Some("AAA"), Some("A"));
        a.label_anchor = Some(GeoPoint::new(1.0, 1.0));
        let mut b = region(2, Some("BBB"), Some("B"));
        b.label_anchor = Some(GeoPoint::new(2.0, 2.0));
        scene.handle_click(Some(&a));
        scene.handle_click(Some(&b));
        assert_eq!(
            scene.surface().targets.borrow().last().map(|(t, _)| *t),
            Some(CameraTarget::at(2.0, 2.0, 1.2))
        );
    }

    #[test]
    fn initial_view_uses_half_duration() {
        let mut scene = controller();
        assert_eq!(scene.show_initial_view(), FlyToOutcome::Direct);
        assert_eq!(
            scene.surface().targets.borrow().as_slice(),
            &[(CameraTarget::at(20.0, 0.0, 2.5), 750)]
        );
    }

    #[test]
    fn pointer_drag_toggles_grabbing_cursor() {
        let mut scene = controller();
        scene.pointer_down();
        assert_eq!(scene.surface().cursor.0.get(), Some(Cursor::Grabbing));
        scene.pointer_up();
        assert_eq!(scene.surface().cursor.0.get(), Some(Cursor::Grab));
    }
}
