use std::collections::{BTreeMap, VecDeque};

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::api::CarouselController;
use crate::core::{CarouselId, ElementId, ScrollBehavior, ScrollMetrics, TimerHandle};

use super::{CarouselHost, EventKind, HostSignal, ListenTarget, Listener};

const ROOT: ElementId = ElementId(0);

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollBox {
    offset: f64,
    client_width: f64,
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    classes: SmallVec<[String; 4]>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    attributes: IndexMap<String, String>,
    text: String,
    disabled: bool,
    width: f64,
    column_gap: Option<f64>,
    scroll: Option<ScrollBox>,
    intersection_ratio: f64,
}

impl Node {
    fn new(tag: &str, class_name: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            classes: class_name.split_whitespace().map(str::to_owned).collect(),
            parent: None,
            children: Vec::new(),
            attributes: IndexMap::new(),
            text: String::new(),
            disabled: false,
            width: 0.0,
            column_gap: None,
            scroll: None,
            intersection_ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Observation {
    element: ElementId,
    threshold: f64,
    visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTimer {
    deadline_ms: u64,
    period_ms: Option<u64>,
}

/// Geometry of a card strip built by [`HeadlessHost::add_strip`].
#[derive(Debug, Clone, PartialEq)]
pub struct StripLayout {
    pub card_count: usize,
    pub card_width: f64,
    pub gap: f64,
    pub client_width: f64,
    pub section_class: String,
    pub strip_class: String,
    pub card_class: String,
}

impl StripLayout {
    /// Layout using the default related-posts markup classes.
    #[must_use]
    pub fn new(card_count: usize, card_width: f64, gap: f64, client_width: f64) -> Self {
        Self {
            card_count,
            card_width,
            gap,
            client_width,
            section_class: "related-posts".to_owned(),
            strip_class: "blog-cards-container".to_owned(),
            card_class: "blog-card".to_owned(),
        }
    }
}

/// Elements created by [`HeadlessHost::add_strip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripNodes {
    pub section: ElementId,
    pub strip: ElementId,
    pub cards: Vec<ElementId>,
}

/// In-memory document with a virtual millisecond clock.
///
/// Scrolling is applied immediately and clamped like a browser scroll
/// container; smooth behavior is recorded but not animated. Scroll,
/// listener, and visibility callbacks are queued as [`HostSignal`]s and
/// delivered by [`CarouselController::dispatch_pending`] or
/// [`CarouselController::advance_clock`].
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    nodes: Vec<Node>,
    listeners: Vec<Listener>,
    observations: IndexMap<CarouselId, Observation>,
    timers: BTreeMap<TimerHandle, PendingTimer>,
    next_timer: u64,
    now_ms: u64,
    signals: VecDeque<HostSignal>,
    scroll_log: Vec<(ElementId, f64, ScrollBehavior)>,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("body", "")],
            listeners: Vec::new(),
            observations: IndexMap::new(),
            timers: BTreeMap::new(),
            next_timer: 1,
            now_ms: 0,
            signals: VecDeque::new(),
            scroll_log: Vec::new(),
        }
    }

    /// Document body.
    #[must_use]
    pub fn root(&self) -> ElementId {
        ROOT
    }

    pub fn append_element(&mut self, parent: ElementId, tag: &str, class_name: &str) -> ElementId {
        let element = self.create_element(tag, class_name);
        self.insert_before(parent, element, None);
        element
    }

    /// Builds `section > strip > card*` under the document body.
    pub fn add_strip(&mut self, layout: &StripLayout) -> StripNodes {
        let section = self.append_element(ROOT, "section", &layout.section_class);
        let strip = self.append_element(section, "div", &layout.strip_class);
        {
            let node = &mut self.nodes[strip.0 as usize];
            node.width = layout.client_width;
            node.column_gap = Some(layout.gap);
            node.scroll = Some(ScrollBox {
                offset: 0.0,
                client_width: layout.client_width,
            });
        }
        let cards = (0..layout.card_count)
            .map(|_| {
                let card = self.append_element(strip, "article", &layout.card_class);
                self.nodes[card.0 as usize].width = layout.card_width;
                card
            })
            .collect();
        StripNodes {
            section,
            strip,
            cards,
        }
    }

    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    #[must_use]
    pub fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.node(element)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn tag(&self, element: ElementId) -> Option<&str> {
        self.node(element).map(|node| node.tag.as_str())
    }

    #[must_use]
    pub fn attribute(&self, element: ElementId, name: &str) -> Option<&str> {
        self.node(element)
            .and_then(|node| node.attributes.get(name))
            .map(String::as_str)
    }

    #[must_use]
    pub fn text(&self, element: ElementId) -> Option<&str> {
        self.node(element).map(|node| node.text.as_str())
    }

    #[must_use]
    pub fn is_disabled(&self, element: ElementId) -> bool {
        self.node(element).is_some_and(|node| node.disabled)
    }

    #[must_use]
    pub fn scroll_offset(&self, element: ElementId) -> f64 {
        self.scroll_metrics(element).offset
    }

    /// Resolved programmatic scroll targets, oldest first.
    #[must_use]
    pub fn scroll_log(&self) -> &[(ElementId, f64, ScrollBehavior)] {
        &self.scroll_log
    }

    #[must_use]
    pub fn active_timer_count(&self) -> usize {
        self.timers.len()
    }

    #[must_use]
    pub fn interval_count(&self) -> usize {
        self.timers
            .values()
            .filter(|timer| timer.period_ms.is_some())
            .count()
    }

    #[must_use]
    pub fn is_timer_active(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle)
    }

    #[must_use]
    pub fn listener_count(&self, carousel: CarouselId) -> usize {
        self.listeners
            .iter()
            .filter(|listener| listener.carousel == carousel)
            .count()
    }

    #[must_use]
    pub fn is_observed(&self, carousel: CarouselId) -> bool {
        self.observations.contains_key(&carousel)
    }

    #[must_use]
    pub fn pending_signal_count(&self) -> usize {
        self.signals.len()
    }

    pub fn pop_signal(&mut self) -> Option<HostSignal> {
        self.signals.pop_front()
    }

    pub fn set_element_width(&mut self, element: ElementId, width: f64) {
        if let Some(node) = self.node_mut(element) {
            node.width = width;
        }
    }

    /// Changes the visible width of a scroll surface, re-clamping its offset.
    pub fn set_client_width(&mut self, element: ElementId, client_width: f64) {
        if let Some(node) = self.node_mut(element) {
            node.width = client_width;
            if let Some(scroll) = node.scroll.as_mut() {
                scroll.client_width = client_width;
            }
        }
        let metrics = self.scroll_metrics(element);
        self.apply_offset(element, metrics.clamp_offset(metrics.offset));
    }

    /// Scrolls as a user would; queues scroll listeners when the offset moves.
    pub fn user_scroll_to(&mut self, element: ElementId, offset_px: f64) {
        let metrics = self.scroll_metrics(element);
        self.apply_offset(element, metrics.clamp_offset(offset_px));
    }

    /// Updates the visible fraction of `element` and notifies observers whose
    /// threshold crossing changed.
    pub fn set_intersection_ratio(&mut self, element: ElementId, ratio: f64) {
        if let Some(node) = self.node_mut(element) {
            node.intersection_ratio = ratio;
        }
        let mut changed = Vec::new();
        for (carousel, observation) in &mut self.observations {
            if observation.element != element {
                continue;
            }
            let visible = ratio > 0.0 && ratio >= observation.threshold;
            if visible != observation.visible {
                observation.visible = visible;
                changed.push((*carousel, visible));
            }
        }
        for (carousel, visible) in changed {
            self.signals
                .push_back(HostSignal::Visibility { carousel, visible });
        }
    }

    /// Queues `kind` for every listener registered on `target`.
    pub fn trigger(&mut self, target: ListenTarget, kind: EventKind) {
        let matched: Vec<Listener> = self
            .listeners
            .iter()
            .filter(|listener| listener.target == target && listener.kind == kind)
            .copied()
            .collect();
        for listener in matched {
            self.signals.push_back(HostSignal::Dom {
                carousel: listener.carousel,
                target: listener.target,
                kind: listener.kind,
            });
        }
    }

    /// Clicks `element` unless it is disabled.
    pub fn click(&mut self, element: ElementId) {
        if self.is_disabled(element) {
            trace!(%element, "ignoring click on disabled element");
            return;
        }
        self.trigger(ListenTarget::Element(element), EventKind::Click);
    }

    pub fn resize_window(&mut self) {
        self.trigger(ListenTarget::Window, EventKind::Resize);
    }

    /// Pops the earliest timer due at or before `until_ms` and moves the
    /// clock to its deadline. Intervals are re-armed before returning.
    pub fn fire_next_due(&mut self, until_ms: u64) -> Option<TimerHandle> {
        let (handle, timer) = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.deadline_ms <= until_ms)
            .min_by_key(|(handle, timer)| (timer.deadline_ms, **handle))
            .map(|(handle, timer)| (*handle, *timer))?;

        self.now_ms = self.now_ms.max(timer.deadline_ms);
        match timer.period_ms {
            Some(period) => {
                if let Some(entry) = self.timers.get_mut(&handle) {
                    entry.deadline_ms = timer.deadline_ms + period;
                }
            }
            None => {
                self.timers.remove(&handle);
            }
        }
        Some(handle)
    }

    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    fn node(&self, element: ElementId) -> Option<&Node> {
        self.nodes.get(element.0 as usize)
    }

    fn node_mut(&mut self, element: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(element.0 as usize)
    }

    fn content_width(&self, element: ElementId) -> f64 {
        let Some(node) = self.node(element) else {
            return 0.0;
        };
        let widths: Vec<f64> = node
            .children
            .iter()
            .filter_map(|child| self.node(*child))
            .map(|child| child.width)
            .collect();
        let gap = node.column_gap.unwrap_or(0.0);
        let gaps = widths.len().saturating_sub(1) as f64 * gap;
        widths.iter().sum::<f64>() + gaps
    }

    fn apply_offset(&mut self, element: ElementId, offset: f64) {
        let Some(scroll) = self.node_mut(element).and_then(|node| node.scroll.as_mut()) else {
            return;
        };
        if (scroll.offset - offset).abs() <= f64::EPSILON {
            return;
        }
        scroll.offset = offset;
        self.trigger(ListenTarget::Element(element), EventKind::Scroll);
    }

    fn is_connected(&self, element: ElementId) -> bool {
        let mut current = Some(element);
        while let Some(id) = current {
            if id == ROOT {
                return true;
            }
            current = self.node(id).and_then(|node| node.parent);
        }
        false
    }

    fn matches(&self, element: ElementId, selector: &str) -> bool {
        let Some(node) = self.node(element) else {
            return false;
        };
        let mut parts = selector.split('.');
        let tag = parts.next().unwrap_or_default();
        if !tag.is_empty() && tag != node.tag {
            return false;
        }
        parts.all(|class| !class.is_empty() && node.classes.iter().any(|c| c == class))
    }

    fn collect_descendants(&self, element: ElementId, selector: &str, out: &mut Vec<ElementId>) {
        let Some(node) = self.node(element) else {
            return;
        };
        for child in &node.children {
            if self.matches(*child, selector) {
                out.push(*child);
            }
            self.collect_descendants(*child, selector, out);
        }
    }

    fn detach(&mut self, child: ElementId) {
        let Some(parent) = self.node(child).and_then(|node| node.parent) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|id| *id != child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
        }
    }
}

impl CarouselHost for HeadlessHost {
    fn query_all(&self, scope: Option<ElementId>, selector: &str) -> Vec<ElementId> {
        let selector = selector.trim();
        let mut out = Vec::new();
        if selector.is_empty() {
            return out;
        }
        match scope {
            Some(scope) => self.collect_descendants(scope, selector, &mut out),
            None => self.collect_descendants(ROOT, selector, &mut out),
        }
        out
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.node(element).and_then(|node| node.parent)
    }

    fn has_class(&self, element: ElementId, class_name: &str) -> bool {
        self.node(element)
            .is_some_and(|node| node.classes.iter().any(|c| c == class_name))
    }

    fn create_element(&mut self, tag: &str, class_name: &str) -> ElementId {
        let id = ElementId(self.nodes.len() as u64);
        self.nodes.push(Node::new(tag, class_name));
        id
    }

    fn insert_before(&mut self, parent: ElementId, child: ElementId, reference: Option<ElementId>) {
        if parent == child || self.node(parent).is_none() || self.node(child).is_none() {
            return;
        }
        self.detach(child);
        let Some(node) = self.node_mut(parent) else {
            return;
        };
        let index = reference
            .and_then(|reference| node.children.iter().position(|id| *id == reference))
            .unwrap_or(node.children.len());
        node.children.insert(index, child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(node) = self.node_mut(element) {
            node.attributes.insert(name.to_owned(), value.to_owned());
        }
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        if let Some(node) = self.node_mut(element) {
            node.text = text.to_owned();
        }
    }

    fn set_disabled(&mut self, element: ElementId, disabled: bool) {
        if let Some(node) = self.node_mut(element) {
            node.disabled = disabled;
        }
    }

    fn toggle_class(&mut self, element: ElementId, class_name: &str, on: bool) {
        let Some(node) = self.node_mut(element) else {
            return;
        };
        let present = node.classes.iter().any(|c| c == class_name);
        if on && !present {
            node.classes.push(class_name.to_owned());
        } else if !on && present {
            node.classes.retain(|c| c != class_name);
        }
    }

    fn element_width(&self, element: ElementId) -> f64 {
        if !self.is_connected(element) {
            return 0.0;
        }
        self.node(element).map_or(0.0, |node| node.width)
    }

    fn column_gap(&self, element: ElementId) -> Option<f64> {
        self.node(element).and_then(|node| node.column_gap)
    }

    fn scroll_metrics(&self, element: ElementId) -> ScrollMetrics {
        let Some(scroll) = self.node(element).and_then(|node| node.scroll) else {
            return ScrollMetrics::default();
        };
        let scroll_width = self.content_width(element).max(scroll.client_width);
        ScrollMetrics::new(scroll.offset, scroll_width, scroll.client_width)
    }

    fn scroll_by(&mut self, element: ElementId, delta_px: f64, behavior: ScrollBehavior) {
        let current = self.scroll_metrics(element).offset;
        self.scroll_to(element, current + delta_px, behavior);
    }

    fn scroll_to(&mut self, element: ElementId, offset_px: f64, behavior: ScrollBehavior) {
        let metrics = self.scroll_metrics(element);
        let target = metrics.clamp_offset(offset_px);
        self.scroll_log.push((element, target, behavior));
        self.apply_offset(element, target);
    }

    fn listen(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    fn unlisten_all(&mut self, carousel: CarouselId) {
        self.listeners
            .retain(|listener| listener.carousel != carousel);
    }

    fn observe_visibility(&mut self, element: ElementId, threshold: f64, carousel: CarouselId) {
        let ratio = self.node(element).map_or(0.0, |node| node.intersection_ratio);
        let visible = ratio > 0.0 && ratio >= threshold;
        self.observations.insert(
            carousel,
            Observation {
                element,
                threshold,
                visible,
            },
        );
        // Observers report the initial state once, like IntersectionObserver.
        self.signals
            .push_back(HostSignal::Visibility { carousel, visible });
    }

    fn unobserve_visibility(&mut self, carousel: CarouselId) {
        self.observations.shift_remove(&carousel);
        self.signals.retain(|signal| {
            !matches!(signal, HostSignal::Visibility { carousel: c, .. } if *c == carousel)
        });
    }

    fn set_interval(&mut self, period_ms: u32) -> TimerHandle {
        let period = u64::from(period_ms.max(1));
        let handle = TimerHandle(self.next_timer);
        self.next_timer += 1;
        self.timers.insert(
            handle,
            PendingTimer {
                deadline_ms: self.now_ms + period,
                period_ms: Some(period),
            },
        );
        handle
    }

    fn set_timeout(&mut self, delay_ms: u32) -> TimerHandle {
        let handle = TimerHandle(self.next_timer);
        self.next_timer += 1;
        self.timers.insert(
            handle,
            PendingTimer {
                deadline_ms: self.now_ms + u64::from(delay_ms),
                period_ms: None,
            },
        );
        handle
    }

    fn clear_timer(&mut self, handle: TimerHandle) {
        self.timers.remove(&handle);
    }
}

impl CarouselController<HeadlessHost> {
    /// Delivers every queued host signal, including signals queued while
    /// handling earlier ones.
    pub fn dispatch_pending(&mut self) {
        while let Some(signal) = self.host_mut().pop_signal() {
            self.dispatch(signal);
        }
    }

    /// Moves the virtual clock forward by `ms`, firing due timers in
    /// deadline order and delivering the signals each one produces.
    pub fn advance_clock(&mut self, ms: u64) {
        let target = self.host().now_ms().saturating_add(ms);
        self.dispatch_pending();
        while let Some(handle) = self.host_mut().fire_next_due(target) {
            self.dispatch(HostSignal::Timer(handle));
            self.dispatch_pending();
        }
        self.host_mut().set_now(target);
        self.dispatch_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_content_width_sums_cards_and_gaps() {
        let mut host = HeadlessHost::new();
        let nodes = host.add_strip(&StripLayout::new(5, 320.0, 24.0, 800.0));
        let metrics = host.scroll_metrics(nodes.strip);
        assert_eq!(metrics.scroll_width, 1696.0);
        assert_eq!(metrics.client_width, 800.0);
        assert_eq!(metrics.max_offset(), 896.0);
    }

    #[test]
    fn scrolling_clamps_and_queues_listeners_only_on_change() {
        let mut host = HeadlessHost::new();
        let nodes = host.add_strip(&StripLayout::new(3, 300.0, 0.0, 600.0));
        host.listen(Listener {
            carousel: CarouselId(7),
            target: ListenTarget::Element(nodes.strip),
            kind: EventKind::Scroll,
        });

        host.scroll_by(nodes.strip, 1_000.0, ScrollBehavior::Smooth);
        assert_eq!(host.scroll_offset(nodes.strip), 300.0);
        assert_eq!(host.pending_signal_count(), 1);

        host.scroll_by(nodes.strip, 50.0, ScrollBehavior::Smooth);
        assert_eq!(host.pending_signal_count(), 1);
    }

    #[test]
    fn insert_before_moves_attached_nodes() {
        let mut host = HeadlessHost::new();
        let nodes = host.add_strip(&StripLayout::new(1, 300.0, 0.0, 600.0));
        let wrapper = host.create_element("div", "wrapper");
        host.insert_before(nodes.section, wrapper, Some(nodes.strip));
        host.insert_before(wrapper, nodes.strip, None);

        assert_eq!(host.children(nodes.section), vec![wrapper]);
        assert_eq!(host.children(wrapper), vec![nodes.strip]);
        assert_eq!(host.parent(nodes.strip), Some(wrapper));
    }

    #[test]
    fn compound_selectors_match_tag_and_classes() {
        let mut host = HeadlessHost::new();
        let button = host.append_element(host.root(), "button", "scroll-arrow scroll-left");
        assert_eq!(host.query_all(None, "button.scroll-arrow"), vec![button]);
        assert_eq!(host.query_all(None, ".scroll-arrow.scroll-left"), vec![button]);
        assert!(host.query_all(None, "div.scroll-arrow").is_empty());
        assert!(host.query_all(None, ".scroll-right").is_empty());
    }

    #[test]
    fn timers_fire_in_deadline_order_and_intervals_rearm() {
        let mut host = HeadlessHost::new();
        let interval = host.set_interval(100);
        let timeout = host.set_timeout(150);

        assert_eq!(host.fire_next_due(1_000), Some(interval));
        assert_eq!(host.now_ms(), 100);
        assert_eq!(host.fire_next_due(1_000), Some(timeout));
        assert_eq!(host.fire_next_due(1_000), Some(interval));
        assert_eq!(host.now_ms(), 200);
        assert!(!host.is_timer_active(timeout));

        host.clear_timer(interval);
        assert_eq!(host.fire_next_due(1_000), None);
    }
}
