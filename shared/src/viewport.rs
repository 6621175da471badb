use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Measured size of the render host, in CSS pixels. Zero means "not yet measurable".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_measurable(&self) -> bool {
        is_measurable(*self)
    }
}

/// Both axes strictly positive. NaN fails.
pub fn is_measurable(size: ViewportSize) -> bool {
    size.width > 0.0 && size.height > 0.0
}

/// Publish only measurable sizes that differ from the last published one.
pub fn should_publish(last: Option<ViewportSize>, next: ViewportSize) -> bool {
    is_measurable(next) && last != Some(next)
}

/// Remembers the last published size.
#[derive(Debug, Clone, Default)]
pub struct SizeFilter {
    last: Option<ViewportSize>,
}

impl SizeFilter {
    pub fn offer(&mut self, next: ViewportSize) -> Option<ViewportSize> {
        if !should_publish(self.last, next) {
            return None;
        }
        self.last = Some(next);
        Some(next)
    }
}

/// Handle returned by [`ResizeSource::subscribe`]. Dropping it stops observation.
#[must_use = "dropping a Subscription stops observing immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

/// Host mechanism delivering content-box sizes for an element.
pub trait ResizeSource {
    type Element;

    /// Current geometry, read synchronously.
    fn measure(&self, element: &Self::Element) -> ViewportSize;

    fn subscribe(
        &self,
        element: &Self::Element,
        on_size: Box<dyn FnMut(ViewportSize)>,
    ) -> Subscription;
}

/// Attach a sizer: publishes once from current geometry, then on every
/// accepted observation until the returned subscription is dropped.
pub fn attach<S, F>(source: &S, element: &S::Element, publish: F) -> Subscription
where
    S: ResizeSource,
    F: FnMut(ViewportSize) + 'static,
{
    let sink = Rc::new(RefCell::new((SizeFilter::default(), publish)));

    let initial = source.measure(element);
    if is_measurable(initial) {
        let (filter, publish) = &mut *sink.borrow_mut();
        if let Some(size) = filter.offer(initial) {
            publish(size);
        }
    } else {
        tracing::warn!(
            width = initial.width,
            height = initial.height,
            "initial measurement yielded zero dimensions"
        );
    }

    let observer_sink = sink.clone();
    source.subscribe(
        element,
        Box::new(move |size| {
            let (filter, publish) = &mut *observer_sink.borrow_mut();
            if let Some(size) = filter.offer(size) {
                publish(size);
            }
        }),
    )
}
