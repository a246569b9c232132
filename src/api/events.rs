use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{CarouselId, Direction, TimerHandle};
use crate::host::{CarouselHost, EventKind, HostSignal, ListenTarget};
use crate::interaction::InteractionState;

use super::{CarouselController, instance::DeferredKind};

/// Input understood by a carousel instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarouselEvent {
    Navigate(Direction),
    PointerEnter,
    PointerLeave,
    TouchStart,
    TouchEnd,
    Scroll,
    WindowResized,
    VisibilityChanged(bool),
}

impl<H: CarouselHost> CarouselController<H> {
    /// Routes a host callback to the owning instance.
    pub fn dispatch(&mut self, signal: HostSignal) {
        match signal {
            HostSignal::Dom {
                carousel,
                target,
                kind,
            } => {
                if let Some(event) = self.translate_dom_event(carousel, target, kind) {
                    self.handle_event(carousel, event);
                }
            }
            HostSignal::Visibility { carousel, visible } => {
                self.handle_event(carousel, CarouselEvent::VisibilityChanged(visible));
            }
            HostSignal::Timer(handle) => self.fire_timer(handle),
        }
    }

    pub fn handle_event(&mut self, id: CarouselId, event: CarouselEvent) {
        if !self.instances.contains_key(&id) {
            trace!(carousel = %id, ?event, "dropping event for unknown carousel");
            return;
        }
        trace!(carousel = %id, ?event, "carousel event");

        match event {
            CarouselEvent::Navigate(direction) => self.advance(id, direction),
            CarouselEvent::PointerEnter => {
                self.with_interaction(id, |state| state.on_pointer_enter());
                self.suspend_for_interaction(id);
            }
            CarouselEvent::TouchStart => {
                self.with_interaction(id, |state| state.on_touch_start());
                self.suspend_for_interaction(id);
            }
            CarouselEvent::PointerLeave => {
                self.with_interaction(id, |state| state.on_pointer_leave());
                self.release_interaction(id);
            }
            CarouselEvent::TouchEnd => {
                self.with_interaction(id, |state| state.on_touch_end());
                self.release_interaction(id);
            }
            CarouselEvent::Scroll => self.on_scroll(id),
            CarouselEvent::WindowResized => {
                let delay_ms = self.config.resize_debounce_ms;
                if let Some(instance) = self.instances.get_mut(&id) {
                    instance.resize_debounce.schedule(&mut self.host, delay_ms);
                }
            }
            CarouselEvent::VisibilityChanged(visible) => self.on_visibility_changed(id, visible),
        }
    }

    /// Runs the action bound to a host timer. Handles that no instance owns
    /// any more were cleared and are ignored.
    pub fn fire_timer(&mut self, handle: TimerHandle) {
        let owner = self.instances.values().find_map(|instance| {
            if instance.ticker == Some(handle) {
                Some((instance.id, None))
            } else {
                instance
                    .deferred_kind_of(handle)
                    .map(|kind| (instance.id, Some(kind)))
            }
        });
        let Some((id, kind)) = owner else {
            trace!(?handle, "ignoring stale timer");
            return;
        };

        let Some(kind) = kind else {
            self.auto_advance_tick(id);
            return;
        };
        if let Some(instance) = self.instances.get_mut(&id) {
            instance.deferred_mut(kind).take_fired(&mut self.host, handle);
        }
        match kind {
            DeferredKind::Resume => self.on_resume_due(id),
            DeferredKind::ResizeDebounce => self.on_resize_settled(id),
            DeferredKind::ScrollSettle => {}
        }
    }

    fn translate_dom_event(
        &self,
        id: CarouselId,
        target: ListenTarget,
        kind: EventKind,
    ) -> Option<CarouselEvent> {
        let elements = &self.instances.get(&id)?.elements;
        let event = match (target, kind) {
            (ListenTarget::Element(el), EventKind::Click) if el == elements.previous => {
                CarouselEvent::Navigate(Direction::Previous)
            }
            (ListenTarget::Element(el), EventKind::Click) if el == elements.next => {
                CarouselEvent::Navigate(Direction::Next)
            }
            (_, EventKind::PointerEnter) => CarouselEvent::PointerEnter,
            (_, EventKind::PointerLeave) => CarouselEvent::PointerLeave,
            (_, EventKind::TouchStart) => CarouselEvent::TouchStart,
            (_, EventKind::TouchEnd) => CarouselEvent::TouchEnd,
            (_, EventKind::Scroll) => CarouselEvent::Scroll,
            (_, EventKind::Resize) => CarouselEvent::WindowResized,
            (_, EventKind::Click) => return None,
        };
        Some(event)
    }

    fn with_interaction(
        &mut self,
        id: CarouselId,
        f: impl FnOnce(&mut InteractionState),
    ) {
        if let Some(instance) = self.instances.get_mut(&id) {
            f(&mut instance.interaction);
        }
    }

    fn suspend_for_interaction(&mut self, id: CarouselId) {
        self.cancel_resume(id);
        self.stop_auto_advance(id);
    }

    /// Schedules a resume once the last interaction ends. Runs even while
    /// hidden: the resume then only re-arms the wanted flag and the ticker
    /// waits for visibility.
    fn release_interaction(&mut self, id: CarouselId) {
        let Some(instance) = self.instances.get(&id) else {
            return;
        };
        if !instance.interaction.is_engaged() {
            self.schedule_resume(id);
        }
    }

    fn on_scroll(&mut self, id: CarouselId) {
        self.update_controls(id);
        let Some(instance) = self.instances.get(&id) else {
            return;
        };
        if instance.scroll_settle.is_pending() {
            return;
        }

        debug!(carousel = %id, "user scroll suspends auto advance");
        let engaged = instance.interaction.is_engaged();
        self.stop_auto_advance(id);
        if !engaged {
            self.schedule_resume(id);
        }
    }

    fn on_resize_settled(&mut self, id: CarouselId) {
        let Some(instance) = self.instances.get(&id) else {
            return;
        };
        let cards = self
            .host
            .query_all(Some(instance.elements.strip), &self.config.selectors.card);
        let card_count = cards.len();
        if let Some(instance) = self.instances.get_mut(&id) {
            instance.elements.cards = cards;
        }
        trace!(carousel = %id, card_count, "resize settled");
        self.update_controls(id);
        self.sync_auto_advance(id);
    }

    fn on_visibility_changed(&mut self, id: CarouselId, visible: bool) {
        let Some(instance) = self.instances.get_mut(&id) else {
            return;
        };
        instance.visible = visible;
        debug!(carousel = %id, visible, "visibility changed");
        if visible {
            self.update_controls(id);
            self.sync_auto_advance(id);
        } else {
            self.halt_ticker(id);
            self.update_controls(id);
        }
    }
}
