mod headless;

pub use headless::{HeadlessHost, StripLayout, StripNodes};

use serde::{Deserialize, Serialize};

use crate::core::{CarouselId, ElementId, ScrollBehavior, ScrollMetrics, TimerHandle};

/// DOM events the controller subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Click,
    PointerEnter,
    PointerLeave,
    TouchStart,
    TouchEnd,
    Scroll,
    Resize,
}

impl EventKind {
    /// DOM event type name.
    #[must_use]
    pub fn dom_name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::PointerEnter => "mouseenter",
            Self::PointerLeave => "mouseleave",
            Self::TouchStart => "touchstart",
            Self::TouchEnd => "touchend",
            Self::Scroll => "scroll",
            Self::Resize => "resize",
        }
    }

    /// Listeners that never call `preventDefault` and can be passive.
    #[must_use]
    pub fn is_passive(self) -> bool {
        matches!(self, Self::TouchStart | Self::TouchEnd | Self::Scroll)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListenTarget {
    Element(ElementId),
    Window,
}

/// One listener registration, owned by a carousel instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Listener {
    pub carousel: CarouselId,
    pub target: ListenTarget,
    pub kind: EventKind,
}

/// Callback delivered by a host back into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostSignal {
    Dom {
        carousel: CarouselId,
        target: ListenTarget,
        kind: EventKind,
    },
    Visibility {
        carousel: CarouselId,
        visible: bool,
    },
    Timer(TimerHandle),
}

/// Contract implemented by any document backend.
///
/// A host owns the element tree, layout, scrolling, listeners, visibility
/// observation, and timers. Callbacks come back as [`HostSignal`]s passed to
/// [`crate::api::CarouselController::dispatch`]; hosts must never call into the
/// controller synchronously from inside one of these methods.
pub trait CarouselHost {
    /// Matches `selector` against descendants of `scope`, or the whole
    /// document when `scope` is `None`, in document order.
    fn query_all(&self, scope: Option<ElementId>, selector: &str) -> Vec<ElementId>;

    fn query_first(&self, scope: Option<ElementId>, selector: &str) -> Option<ElementId> {
        self.query_all(scope, selector).into_iter().next()
    }

    fn parent(&self, element: ElementId) -> Option<ElementId>;

    fn has_class(&self, element: ElementId, class_name: &str) -> bool;

    /// Creates a detached element with a space-separated class list.
    fn create_element(&mut self, tag: &str, class_name: &str) -> ElementId;

    /// Inserts `child` into `parent` before `reference`, or appends it when
    /// `reference` is `None`. An already attached `child` is moved.
    fn insert_before(&mut self, parent: ElementId, child: ElementId, reference: Option<ElementId>);

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str);

    fn set_text(&mut self, element: ElementId, text: &str);

    fn set_disabled(&mut self, element: ElementId, disabled: bool);

    fn toggle_class(&mut self, element: ElementId, class_name: &str, on: bool);

    /// Rendered border-box width.
    fn element_width(&self, element: ElementId) -> f64;

    /// Computed `column-gap`, when the element declares one.
    fn column_gap(&self, element: ElementId) -> Option<f64>;

    fn scroll_metrics(&self, element: ElementId) -> ScrollMetrics;

    fn scroll_by(&mut self, element: ElementId, delta_px: f64, behavior: ScrollBehavior);

    fn scroll_to(&mut self, element: ElementId, offset_px: f64, behavior: ScrollBehavior);

    fn listen(&mut self, listener: Listener);

    fn unlisten_all(&mut self, carousel: CarouselId);

    /// Starts reporting whether at least `threshold` of `element` is in view.
    fn observe_visibility(&mut self, element: ElementId, threshold: f64, carousel: CarouselId);

    fn unobserve_visibility(&mut self, carousel: CarouselId);

    fn set_interval(&mut self, period_ms: u32) -> TimerHandle;

    fn set_timeout(&mut self, delay_ms: u32) -> TimerHandle;

    /// Cancels a timer. Unknown or already fired handles are ignored.
    fn clear_timer(&mut self, handle: TimerHandle);
}
