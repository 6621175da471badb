use std::cell::RefCell;

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use worldview_shared::overlay::OverlayMemo;
use worldview_shared::viewport::{self, Subscription};
use worldview_shared::{
    CancelFlag, DatasetState, RegionKey, SceneController, SceneEvent, SceneStatus, ThemeMode,
    ViewportSize, scene_status,
};

use crate::app::{ConfigStore, Theme};
use crate::fetch;
use crate::globe::{GlobeHandlers, GlobeSurface};
use crate::resize::ObserverSource;

const INITIAL_VIEW_DELAY_MS: u32 = 100;

thread_local! {
    static SCENE: RefCell<Option<SceneController<GlobeSurface>>> = const { RefCell::new(None) };
    static OVERLAY: RefCell<Option<OverlayMemo>> = const { RefCell::new(None) };
    static RESIZE_BINDING: RefCell<Option<Subscription>> = const { RefCell::new(None) };
}

/// Run `f` against the live scene. Re-entrant calls (a JS callback fired while
/// the scene is already borrowed) are skipped.
fn with_scene<R>(f: impl FnOnce(&mut SceneController<GlobeSurface>) -> R) -> Option<R> {
    SCENE.with(|slot| {
        let Ok(mut slot) = slot.try_borrow_mut() else {
            return None;
        };
        slot.as_mut().map(f)
    })
}

fn scene_hover(key: Option<RegionKey>) -> Option<SceneEvent> {
    with_scene(|scene| {
        let regions = scene.surface().regions();
        let event = scene.handle_hover(key.and_then(|k| regions.get(k)));
        scene.surface().set_hovered(scene.hovered());
        event
    })
}

fn scene_click(key: Option<RegionKey>) -> Option<SceneEvent> {
    with_scene(|scene| {
        let regions = scene.surface().regions();
        scene.handle_click(key.and_then(|k| regions.get(k)))
    })
    .flatten()
}

fn teardown() {
    SCENE.with(|slot| {
        if let Ok(mut slot) = slot.try_borrow_mut() {
            slot.take();
        }
    });
    OVERLAY.with(|slot| slot.borrow_mut().take());
    RESIZE_BINDING.with(|slot| slot.borrow_mut().take());
}

/// Hosts the globe: loads boundaries, tracks the host size, shows the
/// placeholder until the scene can be built, then drives it.
#[component]
pub fn WorldMap(
    #[prop(into)] on_region_click: Callback<(Option<String>, Option<String>)>,
    #[prop(into)] on_region_hover: Callback<Option<String>>,
) -> impl IntoView {
    let Theme(theme) = expect_context();
    let ConfigStore(config) = expect_context();

    let dataset: RwSignal<DatasetState> = RwSignal::new(DatasetState::Loading);
    let size: RwSignal<ViewportSize> = RwSignal::new(ViewportSize::ZERO);
    let scene_mounted: RwSignal<bool> = RwSignal::new(false);
    let overlay_loaded: RwSignal<bool> = RwSignal::new(false);
    let host_ref = NodeRef::<leptos::html::Div>::new();

    let status = Memo::new(move |_| dataset.with(|d| scene_status(d, size.get())));

    // Boundary dataset: fetched once, late results dropped after teardown.
    Effect::new(move || {
        let cancel = CancelFlag::new();
        let task_cancel = cancel.clone();
        let url = config.with_value(|c| c.boundary_url.clone());
        spawn_local(async move {
            let result = fetch::fetch_boundaries(&url).await;
            let Some(cfg) = config.try_get_value() else {
                return;
            };
            dataset.try_update(|state| state.settle(&task_cancel, result, &cfg));
        });
        on_cleanup(move || cancel.cancel());
    });

    // Optional boundary-line overlay.
    Effect::new(move || {
        let Some(url) = config.with_value(|c| c.overlay_url().map(str::to_string)) else {
            return;
        };
        spawn_local(async move {
            match fetch::fetch_overlay(&url).await {
                Ok(lines) => {
                    tracing::info!(lines = lines.features.len(), "boundary overlay loaded");
                    OVERLAY.with(|slot| *slot.borrow_mut() = Some(OverlayMemo::new(lines)));
                    overlay_loaded.try_set(true);
                }
                Err(e) => tracing::warn!(error = %e, url = %url, "boundary overlay unavailable"),
            }
        });
    });

    // Size observer; replacing the binding drops (and disconnects) the old one.
    Effect::new(move || {
        let Some(host) = host_ref.get() else {
            return;
        };
        let host: web_sys::HtmlElement = host.into();
        let subscription = viewport::attach(&ObserverSource, &host, move |next| {
            size.try_set(next);
        });
        RESIZE_BINDING.with(|slot| *slot.borrow_mut() = Some(subscription));
    });

    // Build the scene lazily, once data and a measurable host are both present.
    Effect::new(move || {
        let SceneStatus::Ready(regions) = status.get() else {
            return;
        };
        if scene_mounted.get_untracked() {
            return;
        }
        let Some(host) = host_ref.get_untracked() else {
            return;
        };
        let host: web_sys::HtmlElement = host.into();
        let mode = theme.get_untracked();
        let cfg = config.get_value();

        let handlers = GlobeHandlers {
            on_hover: Box::new(move |key| {
                if let Some(SceneEvent::RegionHover(identifier)) = scene_hover(key) {
                    on_region_hover.run(identifier);
                }
            }),
            on_click: Box::new(move |key| {
                if let Some(SceneEvent::RegionClick { identifier, name }) = scene_click(key) {
                    on_region_click.run((identifier, name));
                }
            }),
        };

        let surface = match GlobeSurface::mount(&host, regions, &cfg, mode, handlers) {
            Ok(surface) => surface,
            Err(e) => {
                tracing::error!(error = %e, "failed to initialize globe");
                return;
            }
        };
        surface.set_size(size.get_untracked());
        let mut scene = SceneController::new(surface, cfg, mode);
        scene.start();
        SCENE.with(|slot| *slot.borrow_mut() = Some(scene));
        scene_mounted.set(true);

        gloo_timers::callback::Timeout::new(INITIAL_VIEW_DELAY_MS, || {
            with_scene(|scene| scene.show_initial_view());
        })
        .forget();
    });

    Effect::new(move || {
        let next = size.get();
        if scene_mounted.get() {
            with_scene(|scene| scene.surface().set_size(next));
        }
    });

    Effect::new(move || {
        let mode = theme.get();
        if !scene_mounted.get() {
            return;
        }
        with_scene(|scene| {
            scene.set_theme(mode);
            scene.surface().set_theme(mode);
        });
    });

    // Overlay follows the theme; projection is memoized per theme.
    Effect::new(move || {
        let mode: ThemeMode = theme.get();
        if !scene_mounted.get() || !overlay_loaded.get() {
            return;
        }
        let Some(paths) = OVERLAY.with(|slot| slot.borrow_mut().as_mut().map(|m| m.paths(mode)))
        else {
            return;
        };
        with_scene(|scene| scene.surface().set_overlay(&paths));
    });

    on_cleanup(teardown);

    view! {
        <div style="position: relative; width: 100%; height: 100%; overflow: hidden;">
            <div
                node_ref=host_ref
                class="globe-host"
                style="position: absolute; inset: 0;"
                on:pointerdown=move |_| {
                    with_scene(|scene| scene.pointer_down());
                }
                on:pointerup=move |_| {
                    with_scene(|scene| scene.pointer_up());
                }
            />
            {move || {
                let placeholder = status.with(|s| {
                    s.placeholder().map(|(text, is_error)| (text.to_string(), is_error))
                });
                let Some((text, is_error)) = placeholder else {
                    return ().into_any();
                };
                let color = if is_error {
                    "#dc2626"
                } else {
                    theme.get().pick("#4b5563", "#9ca3af")
                };
                view! {
                    <div
                        class="globe-placeholder"
                        role=if is_error { "alert" } else { "status" }
                        style:color=color
                        style="position: absolute; inset: 0; display: flex; align-items: center; justify-content: center; font-size: 1.1rem; pointer-events: none;"
                    >
                        {text}
                    </div>
                }
                .into_any()
            }}
        </div>
    }
}
