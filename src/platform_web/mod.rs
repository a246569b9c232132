//! Browser host built on `web-sys`.
//!
//! Listener, observer, and timer callbacks are forwarded to the controller as
//! [`HostSignal`]s through a shared sink. All browser callbacks are
//! asynchronous, so the controller is never re-entered while it is borrowed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, EventTarget, HtmlButtonElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, Node,
    ScrollToOptions, Window,
};

use crate::api::{CarouselConfig, CarouselController};
use crate::core::{CarouselId, ElementId, ScrollBehavior, ScrollMetrics, TimerHandle};
use crate::host::{CarouselHost, EventKind, HostSignal, ListenTarget, Listener};

/// Id handed out when the browser refuses to create an element; every
/// operation on it is a no-op.
const DETACHED: ElementId = ElementId(u64::MAX);

pub type SignalSink = Rc<dyn Fn(HostSignal)>;

pub type SharedController = Rc<RefCell<CarouselController<WebHost>>>;

struct RegisteredListener {
    carousel: CarouselId,
    target: EventTarget,
    event_name: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

struct RegisteredObserver {
    observer: IntersectionObserver,
    closure: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
}

#[derive(Debug, Clone, Copy)]
enum JsTimer {
    Interval(i32),
    Timeout(i32),
}

/// [`CarouselHost`] over the live document of the current window.
pub struct WebHost {
    window: Window,
    document: Document,
    elements: RefCell<Vec<Element>>,
    // Element identity to registry index.
    index: js_sys::Map,
    listeners: Vec<RegisteredListener>,
    observers: IndexMap<CarouselId, RegisteredObserver>,
    timers: HashMap<TimerHandle, JsTimer>,
    next_timer: u64,
    // Single callback for every timer; the handle travels as the argument.
    timer_callback: Closure<dyn FnMut(JsValue)>,
    retired_listeners: Vec<Closure<dyn FnMut(web_sys::Event)>>,
    retired_observers: Vec<Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>>,
    sink: SignalSink,
}

impl fmt::Debug for WebHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebHost")
            .field("elements", &self.elements.borrow().len())
            .field("listeners", &self.listeners.len())
            .field("observers", &self.observers.len())
            .field("timers", &self.timers.len())
            .finish()
    }
}

impl WebHost {
    pub fn new(sink: SignalSink) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;

        let timer_sink = Rc::clone(&sink);
        let timer_callback = Closure::<dyn FnMut(JsValue)>::new(move |handle: JsValue| {
            if let Some(raw) = handle.as_f64() {
                timer_sink(HostSignal::Timer(TimerHandle(raw as u64)));
            }
        });

        Ok(Self {
            window,
            document,
            elements: RefCell::new(Vec::new()),
            index: js_sys::Map::new(),
            listeners: Vec::new(),
            observers: IndexMap::new(),
            timers: HashMap::new(),
            next_timer: 1,
            timer_callback,
            retired_listeners: Vec::new(),
            retired_observers: Vec::new(),
            sink,
        })
    }

    fn register(&self, element: Element) -> ElementId {
        if let Some(raw) = self.index.get(&element).as_f64() {
            return ElementId(raw as u64);
        }
        let mut elements = self.elements.borrow_mut();
        let id = ElementId(elements.len() as u64);
        self.index.set(&element, &JsValue::from_f64(id.0 as f64));
        elements.push(element);
        id
    }

    fn element(&self, id: ElementId) -> Option<Element> {
        self.elements.borrow().get(id.0 as usize).cloned()
    }

    fn event_target(&self, target: ListenTarget) -> Option<EventTarget> {
        match target {
            ListenTarget::Element(id) => self.element(id).map(EventTarget::from),
            ListenTarget::Window => Some(EventTarget::from(self.window.clone())),
        }
    }

    fn allocate_timer(&mut self) -> TimerHandle {
        let handle = TimerHandle(self.next_timer);
        self.next_timer += 1;
        handle
    }

    fn scroll_options(left: f64, behavior: ScrollBehavior) -> ScrollToOptions {
        let options = ScrollToOptions::new();
        options.set_left(left);
        options.set_behavior(match behavior {
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
        });
        options
    }
}

impl CarouselHost for WebHost {
    fn query_all(&self, scope: Option<ElementId>, selector: &str) -> Vec<ElementId> {
        let list = match scope {
            Some(scope) => match self.element(scope) {
                Some(element) => element.query_selector_all(selector),
                None => return Vec::new(),
            },
            None => self.document.query_selector_all(selector),
        };
        let list = match list {
            Ok(list) => list,
            Err(err) => {
                warn!(selector, error = ?err, "selector query failed");
                return Vec::new();
            }
        };

        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.register(element))
            .collect()
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        let parent = self.element(element)?.parent_element()?;
        Some(self.register(parent))
    }

    fn has_class(&self, element: ElementId, class_name: &str) -> bool {
        self.element(element)
            .is_some_and(|element| element.class_list().contains(class_name))
    }

    fn create_element(&mut self, tag: &str, class_name: &str) -> ElementId {
        match self.document.create_element(tag) {
            Ok(element) => {
                element.set_class_name(class_name);
                self.register(element)
            }
            Err(err) => {
                warn!(tag, error = ?err, "failed to create element");
                DETACHED
            }
        }
    }

    fn insert_before(&mut self, parent: ElementId, child: ElementId, reference: Option<ElementId>) {
        let (Some(parent), Some(child)) = (self.element(parent), self.element(child)) else {
            return;
        };
        let reference = reference.and_then(|id| self.element(id));
        let reference: Option<&Node> = reference.as_ref().map(|element| &**element);
        if let Err(err) = parent.insert_before(&child, reference) {
            warn!(error = ?err, "failed to insert element");
        }
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(element) = self.element(element) {
            if let Err(err) = element.set_attribute(name, value) {
                warn!(name, error = ?err, "failed to set attribute");
            }
        }
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        if let Some(element) = self.element(element) {
            element.set_text_content(Some(text));
        }
    }

    fn set_disabled(&mut self, element: ElementId, disabled: bool) {
        let Some(element) = self.element(element) else {
            return;
        };
        if let Some(button) = element.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
            return;
        }
        let result = if disabled {
            element.set_attribute("disabled", "")
        } else {
            element.remove_attribute("disabled")
        };
        if let Err(err) = result {
            warn!(error = ?err, "failed to toggle disabled attribute");
        }
    }

    fn toggle_class(&mut self, element: ElementId, class_name: &str, on: bool) {
        if let Some(element) = self.element(element) {
            if let Err(err) = element.class_list().toggle_with_force(class_name, on) {
                warn!(class_name, error = ?err, "failed to toggle class");
            }
        }
    }

    fn element_width(&self, element: ElementId) -> f64 {
        self.element(element)
            .map_or(0.0, |element| element.get_bounding_client_rect().width())
    }

    fn column_gap(&self, element: ElementId) -> Option<f64> {
        let element = self.element(element)?;
        let style = self.window.get_computed_style(&element).ok()??;
        let value = style.get_property_value("column-gap").ok()?;
        value.trim().trim_end_matches("px").trim().parse::<f64>().ok()
    }

    fn scroll_metrics(&self, element: ElementId) -> ScrollMetrics {
        let Some(element) = self.element(element) else {
            return ScrollMetrics::default();
        };
        ScrollMetrics::new(
            f64::from(element.scroll_left()),
            f64::from(element.scroll_width()),
            f64::from(element.client_width()),
        )
    }

    fn scroll_by(&mut self, element: ElementId, delta_px: f64, behavior: ScrollBehavior) {
        if let Some(element) = self.element(element) {
            element.scroll_by_with_scroll_to_options(&Self::scroll_options(delta_px, behavior));
        }
    }

    fn scroll_to(&mut self, element: ElementId, offset_px: f64, behavior: ScrollBehavior) {
        if let Some(element) = self.element(element) {
            element.scroll_to_with_scroll_to_options(&Self::scroll_options(offset_px, behavior));
        }
    }

    fn listen(&mut self, listener: Listener) {
        self.retired_listeners.clear();
        let Some(target) = self.event_target(listener.target) else {
            return;
        };

        let sink = Rc::clone(&self.sink);
        let Listener {
            carousel,
            target: listen_target,
            kind,
        } = listener;
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            sink(HostSignal::Dom {
                carousel,
                target: listen_target,
                kind,
            });
        });

        let options = AddEventListenerOptions::new();
        options.set_passive(kind.is_passive());
        let event_name = kind.dom_name();
        if let Err(err) = target.add_event_listener_with_callback_and_add_event_listener_options(
            event_name,
            closure.as_ref().unchecked_ref(),
            &options,
        ) {
            warn!(event_name, error = ?err, "failed to add event listener");
            return;
        }
        self.listeners.push(RegisteredListener {
            carousel,
            target,
            event_name,
            closure,
        });
    }

    fn unlisten_all(&mut self, carousel: CarouselId) {
        let (removed, kept): (Vec<_>, Vec<_>) = self
            .listeners
            .drain(..)
            .partition(|listener| listener.carousel == carousel);
        self.listeners = kept;
        for listener in removed {
            if let Err(err) = listener.target.remove_event_listener_with_callback(
                listener.event_name,
                listener.closure.as_ref().unchecked_ref(),
            ) {
                warn!(event_name = listener.event_name, error = ?err, "failed to remove listener");
            }
            self.retired_listeners.push(listener.closure);
        }
    }

    fn observe_visibility(&mut self, element: ElementId, threshold: f64, carousel: CarouselId) {
        self.retired_observers.clear();
        let Some(element) = self.element(element) else {
            return;
        };

        let sink = Rc::clone(&self.sink);
        let closure = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    let visible =
                        entry.is_intersecting() && entry.intersection_ratio() >= threshold;
                    sink(HostSignal::Visibility { carousel, visible });
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        let observer =
            match IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init) {
                Ok(observer) => observer,
                Err(err) => {
                    warn!(error = ?err, "intersection observer unavailable");
                    return;
                }
            };
        observer.observe(&element);
        if let Some(previous) = self
            .observers
            .insert(carousel, RegisteredObserver { observer, closure })
        {
            previous.observer.disconnect();
            self.retired_observers.push(previous.closure);
        }
    }

    fn unobserve_visibility(&mut self, carousel: CarouselId) {
        if let Some(registered) = self.observers.shift_remove(&carousel) {
            registered.observer.disconnect();
            self.retired_observers.push(registered.closure);
        }
    }

    fn set_interval(&mut self, period_ms: u32) -> TimerHandle {
        let handle = self.allocate_timer();
        let timeout = i32::try_from(period_ms).unwrap_or(i32::MAX);
        match self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_1(
                self.timer_callback.as_ref().unchecked_ref(),
                timeout,
                &JsValue::from_f64(handle.0 as f64),
            ) {
            Ok(id) => {
                self.timers.insert(handle, JsTimer::Interval(id));
            }
            Err(err) => warn!(error = ?err, "failed to schedule interval"),
        }
        handle
    }

    fn set_timeout(&mut self, delay_ms: u32) -> TimerHandle {
        let handle = self.allocate_timer();
        let timeout = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_1(
                self.timer_callback.as_ref().unchecked_ref(),
                timeout,
                &JsValue::from_f64(handle.0 as f64),
            ) {
            Ok(id) => {
                self.timers.insert(handle, JsTimer::Timeout(id));
            }
            Err(err) => warn!(error = ?err, "failed to schedule timeout"),
        }
        handle
    }

    fn clear_timer(&mut self, handle: TimerHandle) {
        match self.timers.remove(&handle) {
            Some(JsTimer::Interval(id)) => self.window.clear_interval_with_handle(id),
            Some(JsTimer::Timeout(id)) => self.window.clear_timeout_with_handle(id),
            None => {}
        }
    }
}

impl Drop for WebHost {
    fn drop(&mut self) {
        for (_, timer) in self.timers.drain() {
            match timer {
                JsTimer::Interval(id) => self.window.clear_interval_with_handle(id),
                JsTimer::Timeout(id) => self.window.clear_timeout_with_handle(id),
            }
        }
        for (_, registered) in self.observers.drain(..) {
            registered.observer.disconnect();
        }
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.event_name,
                listener.closure.as_ref().unchecked_ref(),
            );
        }
    }
}

/// Attaches every carousel in the current document.
///
/// The returned controller must be kept alive for as long as the carousels
/// should run; dropping it detaches all browser callbacks.
pub fn attach_document_carousels(config: CarouselConfig) -> Result<SharedController, JsValue> {
    let slot: Rc<RefCell<Weak<RefCell<CarouselController<WebHost>>>>> =
        Rc::new(RefCell::new(Weak::new()));

    let sink_slot = Rc::clone(&slot);
    let sink: SignalSink = Rc::new(move |signal: HostSignal| {
        let Some(controller) = sink_slot.borrow().upgrade() else {
            return;
        };
        match controller.try_borrow_mut() {
            Ok(mut controller) => controller.dispatch(signal),
            Err(_) => debug!(?signal, "controller busy, dropping host signal"),
        };
    });

    let host = WebHost::new(sink)?;
    let controller = CarouselController::new(host, config)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let controller = Rc::new(RefCell::new(controller));
    *slot.borrow_mut() = Rc::downgrade(&controller);

    let attached = controller.borrow_mut().attach_all();
    debug!(count = attached.len(), "document carousels attached");
    Ok(controller)
}

/// JavaScript entry point. Attaches every carousel on the page for the
/// page lifetime, optionally configured by a JSON string.
#[wasm_bindgen(js_name = attachCarousels)]
pub fn attach_carousels(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json {
        Some(json) => CarouselConfig::from_json_str(&json)
            .map_err(|err| JsValue::from_str(&err.to_string()))?,
        None => CarouselConfig::default(),
    };
    let controller = attach_document_carousels(config)?;
    // Page-lifetime ownership: the document tears everything down on unload.
    std::mem::forget(controller);
    Ok(())
}
