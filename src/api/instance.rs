use serde::{Deserialize, Serialize};

use crate::core::{CarouselId, ElementId, ScrollMetrics, TimerHandle};
use crate::interaction::{ControlState, DeferredAction, InteractionState};

use super::AttachOptions;

/// Elements a carousel instance operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselElements {
    pub container: ElementId,
    pub wrapper: ElementId,
    pub strip: ElementId,
    pub previous: ElementId,
    pub next: ElementId,
    pub cards: Vec<ElementId>,
}

/// Which deferred slot a fired one-shot timer belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeferredKind {
    Resume,
    ResizeDebounce,
    ScrollSettle,
}

/// Live state of one attached carousel.
#[derive(Debug, Clone)]
pub struct CarouselInstance {
    pub(crate) id: CarouselId,
    pub(crate) elements: CarouselElements,
    pub(crate) options: AttachOptions,
    pub(crate) auto_advance_active: bool,
    pub(crate) visible: bool,
    pub(crate) ticker: Option<TimerHandle>,
    pub(crate) interaction: InteractionState,
    pub(crate) previous_control: ControlState,
    pub(crate) next_control: ControlState,
    pub(crate) resume: DeferredAction,
    pub(crate) resize_debounce: DeferredAction,
    pub(crate) scroll_settle: DeferredAction,
}

impl CarouselInstance {
    pub(crate) fn new(
        id: CarouselId,
        elements: CarouselElements,
        options: AttachOptions,
        auto_advance: bool,
    ) -> Self {
        Self {
            id,
            elements,
            options,
            auto_advance_active: auto_advance,
            visible: options.visibility_threshold.is_none(),
            ticker: None,
            interaction: InteractionState::default(),
            previous_control: ControlState::hidden(),
            next_control: ControlState::hidden(),
            resume: DeferredAction::default(),
            resize_debounce: DeferredAction::default(),
            scroll_settle: DeferredAction::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> CarouselId {
        self.id
    }

    #[must_use]
    pub fn elements(&self) -> &CarouselElements {
        &self.elements
    }

    #[must_use]
    pub fn options(&self) -> AttachOptions {
        self.options
    }

    #[must_use]
    pub fn card_count(&self) -> usize {
        self.elements.cards.len()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn auto_advance_active(&self) -> bool {
        self.auto_advance_active
    }

    #[must_use]
    pub fn ticker(&self) -> Option<TimerHandle> {
        self.ticker
    }

    #[must_use]
    pub fn interaction(&self) -> InteractionState {
        self.interaction
    }

    #[must_use]
    pub fn previous_control(&self) -> ControlState {
        self.previous_control
    }

    #[must_use]
    pub fn next_control(&self) -> ControlState {
        self.next_control
    }

    #[must_use]
    pub fn resume_pending(&self) -> bool {
        self.resume.is_pending()
    }

    /// A timer may run only while wanted, visible, and with something to
    /// advance to.
    #[must_use]
    pub fn is_auto_advance_eligible(&self) -> bool {
        self.auto_advance_active && self.visible && self.card_count() > 1
    }

    pub(crate) fn deferred_mut(&mut self, kind: DeferredKind) -> &mut DeferredAction {
        match kind {
            DeferredKind::Resume => &mut self.resume,
            DeferredKind::ResizeDebounce => &mut self.resize_debounce,
            DeferredKind::ScrollSettle => &mut self.scroll_settle,
        }
    }

    pub(crate) fn deferred_kind_of(&self, handle: TimerHandle) -> Option<DeferredKind> {
        [
            (DeferredKind::Resume, self.resume),
            (DeferredKind::ResizeDebounce, self.resize_debounce),
            (DeferredKind::ScrollSettle, self.scroll_settle),
        ]
        .into_iter()
        .find(|(_, slot)| slot.handle() == Some(handle))
        .map(|(kind, _)| kind)
    }
}

/// Serializable point-in-time view of a carousel for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselSnapshot {
    pub id: CarouselId,
    pub card_count: usize,
    pub visible: bool,
    pub auto_advance_active: bool,
    pub auto_advance_running: bool,
    pub resume_pending: bool,
    pub pointer_inside: bool,
    pub touch_active: bool,
    pub previous: ControlState,
    pub next: ControlState,
    pub metrics: ScrollMetrics,
}

impl CarouselSnapshot {
    pub(crate) fn capture(instance: &CarouselInstance, metrics: ScrollMetrics) -> Self {
        Self {
            id: instance.id,
            card_count: instance.card_count(),
            visible: instance.visible,
            auto_advance_active: instance.auto_advance_active,
            auto_advance_running: instance.ticker.is_some(),
            resume_pending: instance.resume.is_pending(),
            pointer_inside: instance.interaction.pointer_inside(),
            touch_active: instance.interaction.touch_active(),
            previous: instance.previous_control,
            next: instance.next_control,
            metrics,
        }
    }
}
