use std::cell::RefCell;
use std::sync::Arc;

use gloo_storage::Storage;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;

use worldview_shared::{GlobeConfig, InteractionState, ThemeMode};

use crate::detail_panel::DetailPanel;
use crate::fetch;
use crate::world_map::WorldMap;

/// `<script type="application/json">` block a host page may use to override defaults.
const CONFIG_ELEMENT_ID: &str = "worldview-config";
/// Written by the surrounding page; read-only here.
const THEME_STORAGE_KEY: &str = "theme";
const THEME_EVENT: &str = "worldview-theme";

struct ThemeBinding {
    window: web_sys::Window,
    handler: Closure<dyn Fn(web_sys::CustomEvent)>,
}

struct KeydownBinding {
    window: web_sys::Window,
    handler: Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static THEME_BINDING: RefCell<Option<ThemeBinding>> = const { RefCell::new(None) };
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

#[derive(Clone, Copy)]
pub(crate) struct Theme(pub RwSignal<ThemeMode>);
#[derive(Clone, Copy)]
pub(crate) struct ConfigStore(pub StoredValue<GlobeConfig>);

fn load_config() -> GlobeConfig {
    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return GlobeConfig::default();
    };
    match GlobeConfig::from_json(&raw) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring host config block");
            GlobeConfig::default()
        }
    }
}

fn stored_theme() -> ThemeMode {
    // Stored either as a bare string or JSON-encoded.
    gloo_storage::LocalStorage::raw()
        .get_item(THEME_STORAGE_KEY)
        .ok()
        .flatten()
        .and_then(|raw| raw.trim().trim_matches('"').parse().ok())
        .unwrap_or_default()
}

fn unbind_theme_listener() {
    THEME_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old
                .window
                .remove_event_listener_with_callback(THEME_EVENT, old.handler.as_ref().unchecked_ref());
        }
    });
}

fn unbind_keydown() {
    KEYDOWN_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old
                .window
                .remove_event_listener_with_callback("keydown", old.handler.as_ref().unchecked_ref());
        }
    });
}

/// Root component. Owns interaction state; the globe and detail panel only
/// report events and render what they are given.
#[component]
pub fn App() -> impl IntoView {
    let config = load_config();
    let catalog_url = config.catalog_url.clone();

    let theme: RwSignal<ThemeMode> = RwSignal::new(stored_theme());
    let interaction: RwSignal<InteractionState> = RwSignal::new(InteractionState::default());

    provide_context(Theme(theme));
    provide_context(ConfigStore(StoredValue::new(config)));

    let resolved = Memo::new(move |_| interaction.with(|s| s.resolved().cloned()));

    let on_region_click = Callback::new(move |(identifier, name): (Option<String>, Option<String>)| {
        interaction.update(|s| s.set_selection(identifier, name));
    });
    let on_region_hover = Callback::new(move |identifier: Option<String>| {
        interaction.update(|s| s.set_hover(identifier));
    });
    let close_panel = Callback::new(move |_: ()| {
        interaction.update(|s| s.clear_selection());
    });

    // Country metadata. Without it every selection resolves degraded.
    Effect::new(move || {
        let url = catalog_url.clone();
        spawn_local(async move {
            match fetch::fetch_catalog(&url).await {
                Ok(catalog) => {
                    tracing::info!(countries = catalog.len(), "country catalog loaded");
                    interaction.try_update(|s| s.set_catalog(Arc::new(catalog)));
                }
                Err(e) => tracing::warn!(error = %e, url = %url, "country catalog unavailable"),
            }
        });
    });

    // Theme changes come from the page chrome as a CustomEvent on window.
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };
        unbind_theme_listener();

        let handler = Closure::<dyn Fn(web_sys::CustomEvent)>::new(move |e: web_sys::CustomEvent| {
            let next = e
                .detail()
                .as_string()
                .and_then(|raw| raw.parse::<ThemeMode>().ok())
                .unwrap_or_else(stored_theme);
            if theme.get_untracked() != next {
                tracing::debug!(theme = %next, "theme changed");
                theme.set(next);
            }
        });
        if window
            .add_event_listener_with_callback(THEME_EVENT, handler.as_ref().unchecked_ref())
            .is_err()
        {
            return;
        }
        THEME_BINDING.with(|slot| *slot.borrow_mut() = Some(ThemeBinding { window, handler }));
    });

    // Escape closes the detail panel.
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };
        unbind_keydown();

        let handler = Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
            if e.key() != "Escape" {
                return;
            }
            let target_tag = e
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok())
                .map(|el| el.tag_name())
                .unwrap_or_default();
            if target_tag == "INPUT" || target_tag == "TEXTAREA" {
                return;
            }
            close_panel.run(());
        });
        if window
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .is_err()
        {
            return;
        }
        KEYDOWN_BINDING.with(|slot| *slot.borrow_mut() = Some(KeydownBinding { window, handler }));
    });

    on_cleanup(|| {
        unbind_theme_listener();
        unbind_keydown();
    });

    view! {
        <div style="position: relative; width: 100%; height: 100%;">
            <WorldMap on_region_click=on_region_click on_region_hover=on_region_hover />
            <DetailPanel record=resolved on_close=close_panel />
        </div>
    }
}
