//! Adapter over the globe.gl object exposed on `window.Globe`.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlElement;

use worldview_shared::colors::palette;
use worldview_shared::config::{
    ATMOSPHERE_ALTITUDE, BACKGROUND_IMAGE_URL, GLOBE_IMAGE_URL_DARK, GLOBE_IMAGE_URL_LIGHT,
    POLYGON_TRANSITION_MS,
};
use worldview_shared::overlay::OverlayPath;
use worldview_shared::scene::{RegionStyle, region_style};
use worldview_shared::{
    CameraTarget, Cursor, CursorElement, GlobeConfig, RegionKey, RegionSet, RenderSurface,
    SurfaceError, ThemeMode, ViewportSize,
};

const GLOBE_FACTORY: &str = "Globe";

/// Inputs the per-polygon accessors read when globe.gl re-evaluates them.
struct Paint {
    regions: Arc<RegionSet>,
    hovered: Option<RegionKey>,
    theme: ThemeMode,
    config: GlobeConfig,
}

impl Paint {
    fn style(&self, key: RegionKey) -> Option<RegionStyle> {
        let region = self.regions.get(key)?;
        Some(region_style(region, self.hovered, self.theme, &self.config))
    }
}

type Accessor = Closure<dyn Fn(JsValue) -> JsValue>;

/// Pointer callbacks wired into the globe; keys are `None` when the pointer
/// is over empty space.
pub struct GlobeHandlers {
    pub on_hover: Box<dyn Fn(Option<RegionKey>)>,
    pub on_click: Box<dyn Fn(Option<RegionKey>)>,
}

pub struct CanvasCursor(HtmlElement);

impl CursorElement for CanvasCursor {
    fn set_cursor(&self, cursor: Cursor) {
        self.0.style().set_property("cursor", cursor.as_css()).ok();
    }
}

pub struct GlobeSurface {
    globe: JsValue,
    canvas: Option<HtmlElement>,
    paint: Rc<RefCell<Paint>>,
    // Re-set after every hover/theme change so globe.gl re-reads them.
    styling: Vec<(&'static str, Accessor)>,
    _label: Accessor,
    _events: Vec<Closure<dyn Fn(JsValue)>>,
}

fn js_error(e: JsValue) -> SurfaceError {
    let message = e
        .dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| e.as_string())
        .unwrap_or_else(|| format!("{e:?}"));
    SurfaceError::Transition(message)
}

fn call(target: &JsValue, method: &str, args: &[JsValue]) -> Result<JsValue, SurfaceError> {
    let f = Reflect::get(target, &JsValue::from_str(method))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
        .ok_or(SurfaceError::Unavailable)?;
    let args: Array = args.iter().collect();
    f.apply(target, &args).map_err(js_error)
}

fn region_key(datum: &JsValue) -> Option<RegionKey> {
    if datum.is_null() || datum.is_undefined() {
        return None;
    }
    let key = Reflect::get(datum, &JsValue::from_str("key")).ok()?.as_f64()?;
    (key >= 0.0).then(|| RegionKey(key as usize))
}

fn to_js<T: Serialize>(value: &T) -> Option<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .ok()
}

impl GlobeSurface {
    /// Construct the globe inside `host` and bind polygons, styling and
    /// pointer handlers. Fails when globe.gl is not loaded.
    pub fn mount(
        host: &HtmlElement,
        regions: Arc<RegionSet>,
        config: &GlobeConfig,
        theme: ThemeMode,
        handlers: GlobeHandlers,
    ) -> Result<Self, SurfaceError> {
        let window = web_sys::window().ok_or(SurfaceError::Unavailable)?;
        let factory = Reflect::get(&window, &JsValue::from_str(GLOBE_FACTORY))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or(SurfaceError::Unavailable)?;
        let builder = factory
            .call0(&JsValue::UNDEFINED)
            .map_err(js_error)?
            .dyn_into::<Function>()
            .map_err(|_| SurfaceError::Unavailable)?;
        let globe = builder.call1(&JsValue::UNDEFINED, host).map_err(js_error)?;

        let polygons: Array = regions
            .iter()
            .filter(|r| !r.geometry.is_null())
            .filter_map(to_js)
            .collect();

        let paint = Rc::new(RefCell::new(Paint {
            regions,
            hovered: None,
            theme,
            config: config.clone(),
        }));

        let styling: Vec<(&'static str, Accessor)> = vec![
            ("polygonCapColor", style_accessor(&paint, |s| s.cap.css().into())),
            ("polygonSideColor", style_accessor(&paint, |s| s.side.css().into())),
            ("polygonStrokeColor", style_accessor(&paint, |s| s.stroke.css().into())),
            ("polygonAltitude", style_accessor(&paint, |s| s.altitude.into())),
        ];

        let label = {
            let paint = paint.clone();
            Closure::<dyn Fn(JsValue) -> JsValue>::new(move |d: JsValue| {
                let Ok(paint) = paint.try_borrow() else {
                    return JsValue::UNDEFINED;
                };
                region_key(&d)
                    .and_then(|k| paint.regions.get(k))
                    .map(|r| JsValue::from_str(r.label()))
                    .unwrap_or(JsValue::UNDEFINED)
            })
        };

        let GlobeHandlers { on_hover, on_click } = handlers;
        let hover = Closure::<dyn Fn(JsValue)>::new(move |d: JsValue| on_hover(region_key(&d)));
        let click = Closure::<dyn Fn(JsValue)>::new(move |d: JsValue| on_click(region_key(&d)));

        call(&globe, "polygonsData", &[polygons.into()])?;
        call(
            &globe,
            "polygonsTransitionDuration",
            &[JsValue::from(POLYGON_TRANSITION_MS)],
        )?;
        call(&globe, "polygonLabel", &[label.as_ref().clone()])?;
        call(&globe, "onPolygonHover", &[hover.as_ref().clone()])?;
        call(&globe, "onPolygonClick", &[click.as_ref().clone()])?;
        call(
            &globe,
            "backgroundImageUrl",
            &[JsValue::from_str(BACKGROUND_IMAGE_URL)],
        )?;
        call(&globe, "showAtmosphere", &[JsValue::TRUE])?;
        call(
            &globe,
            "atmosphereAltitude",
            &[JsValue::from(ATMOSPHERE_ALTITUDE)],
        )?;

        let canvas = call(&globe, "renderer", &[])
            .ok()
            .and_then(|r| Reflect::get(&r, &JsValue::from_str("domElement")).ok())
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());

        let surface = Self {
            globe,
            canvas,
            paint,
            styling,
            _label: label,
            _events: vec![hover, click],
        };
        surface.configure_controls(config);
        surface.apply_theme(theme);
        surface.repaint();
        Ok(surface)
    }

    pub fn regions(&self) -> Arc<RegionSet> {
        self.paint.borrow().regions.clone()
    }

    pub fn set_size(&self, size: ViewportSize) {
        if !size.is_measurable() {
            return;
        }
        call(&self.globe, "width", &[JsValue::from(size.width)]).ok();
        call(&self.globe, "height", &[JsValue::from(size.height)]).ok();
    }

    pub fn set_hovered(&self, hovered: Option<RegionKey>) {
        if let Ok(mut paint) = self.paint.try_borrow_mut() {
            paint.hovered = hovered;
        }
        self.repaint();
    }

    pub fn set_theme(&self, theme: ThemeMode) {
        if let Ok(mut paint) = self.paint.try_borrow_mut() {
            paint.theme = theme;
        }
        self.apply_theme(theme);
        self.repaint();
    }

    pub fn set_overlay(&self, paths: &[OverlayPath]) {
        let data: Array = paths.iter().filter_map(to_js).collect();
        let result = call(&self.globe, "pathsData", &[data.into()])
            .and_then(|_| call(&self.globe, "pathColor", &[JsValue::from_str("color")]))
            .and_then(|_| call(&self.globe, "pathStroke", &[JsValue::from_str("stroke")]))
            .and_then(|_| call(&self.globe, "pathTransitionDuration", &[JsValue::from(0)]));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to apply boundary overlay");
        }
    }

    fn repaint(&self) {
        for (method, accessor) in &self.styling {
            call(&self.globe, method, &[accessor.as_ref().clone()]).ok();
        }
    }

    fn apply_theme(&self, theme: ThemeMode) {
        let image = theme.pick(GLOBE_IMAGE_URL_LIGHT, GLOBE_IMAGE_URL_DARK);
        call(&self.globe, "globeImageUrl", &[JsValue::from_str(image)]).ok();
        call(
            &self.globe,
            "atmosphereColor",
            &[JsValue::from_str(palette(theme).atmosphere)],
        )
        .ok();
    }

    fn configure_controls(&self, config: &GlobeConfig) {
        let Ok(controls) = call(&self.globe, "controls", &[]) else {
            tracing::warn!("globe controls unavailable");
            return;
        };
        let settings = [
            ("autoRotate", JsValue::from_bool(config.auto_rotate)),
            ("autoRotateSpeed", JsValue::from(config.auto_rotate_speed)),
            ("enableZoom", JsValue::TRUE),
            ("minDistance", JsValue::from(config.min_camera_distance)),
            ("maxDistance", JsValue::from(config.max_camera_distance)),
            ("enablePan", JsValue::FALSE),
        ];
        for (key, value) in settings {
            Reflect::set(&controls, &JsValue::from_str(key), &value).ok();
        }
    }
}

fn style_accessor(paint: &Rc<RefCell<Paint>>, pick: fn(RegionStyle) -> JsValue) -> Accessor {
    let paint = paint.clone();
    Closure::<dyn Fn(JsValue) -> JsValue>::new(move |d: JsValue| {
        let Ok(paint) = paint.try_borrow() else {
            return JsValue::UNDEFINED;
        };
        region_key(&d)
            .and_then(|k| paint.style(k))
            .map(pick)
            .unwrap_or(JsValue::UNDEFINED)
    })
}

impl RenderSurface for GlobeSurface {
    type Cursor = CanvasCursor;

    fn set_camera_target(
        &mut self,
        target: CameraTarget,
        duration_ms: u32,
    ) -> Result<(), SurfaceError> {
        let pov = to_js(&PointOfView::from(target)).ok_or(SurfaceError::Unavailable)?;
        call(&self.globe, "pointOfView", &[pov, JsValue::from(duration_ms)]).map(|_| ())
    }

    fn set_auto_rotate(&mut self, enabled: bool) {
        let Ok(controls) = call(&self.globe, "controls", &[]) else {
            return;
        };
        Reflect::set(
            &controls,
            &JsValue::from_str("autoRotate"),
            &JsValue::from_bool(enabled),
        )
        .ok();
    }

    fn cursor_element(&self) -> Option<CanvasCursor> {
        self.canvas.clone().map(CanvasCursor)
    }
}

impl Drop for GlobeSurface {
    fn drop(&mut self) {
        call(&self.globe, "pauseAnimation", &[]).ok();
        call(&self.globe, "_destructor", &[]).ok();
    }
}

/// Wire shape of globe.gl's `pointOfView` argument. Omitted fields keep
/// their current value.
#[derive(Serialize)]
struct PointOfView {
    #[serde(skip_serializing_if = "Option::is_none")]
    lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lng: Option<f64>,
    altitude: f64,
}

impl From<CameraTarget> for PointOfView {
    fn from(target: CameraTarget) -> Self {
        Self {
            lat: target.position.map(|p| p.lat),
            lng: target.position.map(|p| p.lng),
            altitude: target.altitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn altitude_only_target_omits_position() {
        let pov = serde_json::to_value(PointOfView::from(CameraTarget::altitude_only(1.2))).unwrap();
        assert_eq!(pov, serde_json::json!({"altitude": 1.2}));
    }

    #[test]
    fn positioned_target_carries_lat_lng() {
        let pov = serde_json::to_value(PointOfView::from(CameraTarget::at(22.0, 78.0, 1.2))).unwrap();
        assert_eq!(pov, serde_json::json!({"lat": 22.0, "lng": 78.0, "altitude": 1.2}));
    }
}
