use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use serde_json::json;
use worldview_shared::detail::{DetailView, present};
use worldview_shared::overlay::{LineCollection, project_overlay};
use worldview_shared::scene::FlyToOutcome;
use worldview_shared::{
    BoundaryCollection, CameraTarget, CancelFlag, CountryCatalog, Cursor, CursorElement,
    DatasetError, DatasetState, GlobeConfig, InteractionState, RegionKey, RenderSurface,
    ResolvedRecord, SceneController, SceneEvent, SceneStatus, SurfaceError, ThemeMode,
    ViewportSize, resolve, scene_status,
};

#[derive(Clone, Default)]
struct RecordingCursor(Rc<Cell<Option<Cursor>>>);

impl CursorElement for RecordingCursor {
    fn set_cursor(&self, cursor: Cursor) {
        self.0.set(Some(cursor));
    }
}

#[derive(Default)]
struct RecordingSurface {
    targets: Rc<RefCell<Vec<CameraTarget>>>,
    auto_rotate: Rc<Cell<bool>>,
    cursor: RecordingCursor,
}

impl RenderSurface for RecordingSurface {
    type Cursor = RecordingCursor;

    fn set_camera_target(
        &mut self,
        target: CameraTarget,
        _duration_ms: u32,
    ) -> Result<(), SurfaceError> {
        self.targets.borrow_mut().push(target);
        Ok(())
    }

    fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate.set(enabled);
    }

    fn cursor_element(&self) -> Option<RecordingCursor> {
        Some(self.cursor.clone())
    }
}

fn world_with_india() -> BoundaryCollection {
    let mut features: Vec<serde_json::Value> = (0..199)
        .map(|i| {
            json!({
                "type": "Feature",
                "properties": {"ADM0_A3": format!("C{i:02}"), "ADMIN": format!("Country {i}"), "ISO_A2": "XX"},
                "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}
            })
        })
        .collect();
    features.push(json!({
        "type": "Feature",
        "properties": {"ADM0_A3": "IND", "ADMIN": "India", "ISO_A2": "IN", "LABEL_COORD": [78, 22]},
        "geometry": {"type": "Polygon", "coordinates": [[[68.0, 7.0], [97.0, 7.0], [97.0, 35.0], [68.0, 7.0]]]}
    }));
    serde_json::from_value(json!({"type": "FeatureCollection", "features": features})).unwrap()
}

fn catalog() -> CountryCatalog {
    CountryCatalog::from_json(
        &json!([
            {"cca3": "IND", "name": {"common": "India", "official": "Republic of India"},
             "capital": ["New Delhi"], "population": 1380004385u64, "region": "Asia"},
            {"cca3": "FRA", "name": {"common": "France"}}
        ])
        .to_string(),
    )
    .unwrap()
}

#[test]
fn click_on_india_flies_camera_and_resolves_record() {
    let config = GlobeConfig::default();
    let mut dataset = DatasetState::Loading;
    assert!(dataset.settle(&CancelFlag::new(), Ok(world_with_india()), &config));

    let status = scene_status(&dataset, ViewportSize::new(800.0, 600.0));
    let SceneStatus::Ready(regions) = status else {
        panic!("scene should be ready, got {status:?}");
    };
    assert_eq!(regions.len(), 200);

    let surface = RecordingSurface::default();
    let targets = surface.targets.clone();
    let rotating = surface.auto_rotate.clone();
    let mut scene = SceneController::new(surface, config, ThemeMode::Dark);
    scene.start();
    assert!(rotating.get());

    let india = regions.get(RegionKey(199)).expect("india is rendered");
    let event = scene.handle_click(Some(india)).expect("click emits selection");
    assert_eq!(targets.borrow().last(), Some(&CameraTarget::at(22.0, 78.0, 1.2)));
    assert!(!rotating.get());
    assert_eq!(scene.surface().cursor.0.get(), Some(Cursor::Pointer));

    let SceneEvent::RegionClick { identifier, name } = event else {
        panic!("expected click event");
    };
    assert_eq!(identifier.as_deref(), Some("IND"));
    assert_eq!(name.as_deref(), Some("India"));

    let mut interaction = InteractionState::new(Arc::new(catalog()));
    interaction.set_selection(identifier, name);
    let Some(ResolvedRecord::Full(record)) = interaction.resolved() else {
        panic!("expected India's full record");
    };
    assert_eq!(record.name.official.as_deref(), Some("Republic of India"));
    assert_eq!(record.population, Some(1_380_004_385));
}

#[test]
fn http_500_shows_error_and_no_regions() {
    let mut dataset = DatasetState::Loading;
    dataset.settle(
        &CancelFlag::new(),
        Err(DatasetError::Http { status: 500 }),
        &GlobeConfig::default(),
    );
    let status = scene_status(&dataset, ViewportSize::new(800.0, 600.0));
    assert!(!status.is_ready());
    let (text, is_error) = status.placeholder().expect("error placeholder");
    assert!(is_error);
    assert_eq!(text, "Could not load base map data. Please try again later.");
    assert!(dataset.regions().is_none());
}

#[test]
fn click_without_codes_emits_nothing() {
    let config = GlobeConfig::default();
    let mut dataset = DatasetState::Loading;
    let collection = BoundaryCollection::from_json(
        r#"{"features": [{"properties": {"ISO_A2": "-99"}, "geometry": null}]}"#,
    )
    .unwrap();
    dataset.settle(&CancelFlag::new(), Ok(collection), &config);
    let regions = dataset.regions().cloned().unwrap();

    let surface = RecordingSurface::default();
    let targets = surface.targets.clone();
    let mut scene = SceneController::new(surface, config, ThemeMode::Light);
    assert_eq!(scene.handle_click(regions.get(RegionKey(0))), None);
    assert!(targets.borrow().is_empty());
}

#[test]
fn hover_then_select_then_close() {
    let config = GlobeConfig::default();
    let mut dataset = DatasetState::Loading;
    dataset.settle(&CancelFlag::new(), Ok(world_with_india()), &config);
    let regions = dataset.regions().cloned().unwrap();

    let mut scene = SceneController::new(RecordingSurface::default(), config, ThemeMode::Dark);
    let mut interaction = InteractionState::new(Arc::new(catalog()));

    let first = regions.get(RegionKey(0)).unwrap();
    if let SceneEvent::RegionHover(id) = scene.handle_hover(Some(first)) {
        interaction.set_hover(id);
    }
    assert_eq!(interaction.hovered(), Some("C00"));
    assert!(scene.style_for(first).altitude > scene.style_for(regions.get(RegionKey(1)).unwrap()).altitude);

    if let SceneEvent::RegionHover(id) = scene.handle_hover(None) {
        interaction.set_hover(id);
    }
    assert_eq!(interaction.hovered(), None);

    interaction.set_selection(Some("C00".into()), Some("Country 0".into()));
    assert!(interaction.resolved().is_some_and(ResolvedRecord::is_degraded));
    interaction.clear_selection();
    interaction.clear_selection();
    assert!(interaction.resolved().is_none());
}

#[test]
fn fallback_outcome_is_reported() {
    struct Flaky(bool);
    struct NoCursor;
    impl CursorElement for NoCursor {
        fn set_cursor(&self, _cursor: Cursor) {}
    }
    impl RenderSurface for Flaky {
        type Cursor = NoCursor;
        fn set_camera_target(&mut self, t: CameraTarget, _: u32) -> Result<(), SurfaceError> {
            if t.position.is_some() && self.0 {
                return Err(SurfaceError::Transition("interrupted".into()));
            }
            Ok(())
        }
        fn set_auto_rotate(&mut self, _enabled: bool) {}
        fn cursor_element(&self) -> Option<NoCursor> {
            None
        }
    }

    let mut scene = SceneController::new(Flaky(true), GlobeConfig::default(), ThemeMode::Dark);
    assert_eq!(
        scene.fly_to(CameraTarget::at(1.0, 2.0, 1.2), 1500),
        FlyToOutcome::Fallback
    );
}

#[test]
fn bundled_data_files_load() {
    let catalog = CountryCatalog::from_json(include_str!("../../client/data/countries.json"))
        .expect("bundled catalog parses");
    let Some(ResolvedRecord::Full(india)) = resolve(&catalog, Some("ind"), Some("India")) else {
        panic!("India resolves to a full record");
    };
    let Some(DetailView::Full(detail)) = present(Some(&ResolvedRecord::Full(india))) else {
        panic!("full record presents full detail");
    };
    assert_eq!(detail.capital, "New Delhi");
    assert_eq!(detail.region, "Asia (Southern Asia)");
    assert!(detail.flag.is_some());

    let overlay =
        LineCollection::from_json(include_str!("../../client/data/boundary-overlay.geojson"))
            .expect("bundled overlay parses");
    assert!(project_overlay(&overlay, ThemeMode::Light).is_empty());
}
