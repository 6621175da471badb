use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{HtmlElement, ResizeObserver, ResizeObserverEntry};

use worldview_shared::ViewportSize;
use worldview_shared::viewport::{ResizeSource, Subscription};

/// `ResizeObserver`-backed size source reporting content-box dimensions.
pub struct ObserverSource;

impl ResizeSource for ObserverSource {
    type Element = HtmlElement;

    /// Fractional layout size, so the first observer report matches it.
    fn measure(&self, element: &HtmlElement) -> ViewportSize {
        let rect = element.get_bounding_client_rect();
        ViewportSize::new(rect.width(), rect.height())
    }

    fn subscribe(
        &self,
        element: &HtmlElement,
        mut on_size: Box<dyn FnMut(ViewportSize)>,
    ) -> Subscription {
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            // Only the latest entry matters; the filter drops repeats.
            let Some(entry) = entries
                .iter()
                .filter_map(|e| e.dyn_into::<ResizeObserverEntry>().ok())
                .last()
            else {
                return;
            };
            let rect = entry.content_rect();
            on_size(ViewportSize::new(rect.width(), rect.height()));
        });

        let Ok(observer) = ResizeObserver::new(callback.as_ref().unchecked_ref()) else {
            tracing::warn!("ResizeObserver unavailable, viewport size will not follow layout");
            return Subscription::new(|| {});
        };
        observer.observe(element);

        Subscription::new(move || {
            observer.disconnect();
            drop(callback);
        })
    }
}
