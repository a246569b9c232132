use tracing::{trace, warn};

use crate::core::{CarouselId, Direction, ScrollBehavior, card_advance_distance};
use crate::host::CarouselHost;

use super::CarouselController;

impl<H: CarouselHost> CarouselController<H> {
    /// Current one-card step of `id`, measured fresh from layout.
    #[must_use]
    pub fn card_advance_distance(&self, id: CarouselId) -> Option<f64> {
        let instance = self.instances.get(&id)?;
        let strip = instance.elements.strip;
        let card_width = instance
            .elements
            .cards
            .first()
            .map(|card| self.host.element_width(*card));
        let gap = self.host.column_gap(strip);
        let client_width = self.host.scroll_metrics(strip).client_width;
        Some(card_advance_distance(
            card_width,
            gap,
            client_width,
            self.config.fallback_advance_ratio,
        ))
    }

    /// Manual navigation: scrolls one card and suspends auto-advance for the
    /// quiet period.
    pub fn advance(&mut self, id: CarouselId, direction: Direction) {
        let Some(distance) = self.card_advance_distance(id) else {
            warn!(carousel = %id, "advance on unknown carousel");
            return;
        };
        let strip = match self.instances.get(&id) {
            Some(instance) => instance.elements.strip,
            None => return,
        };

        trace!(carousel = %id, ?direction, distance, "manual advance");
        self.host
            .scroll_by(strip, direction.sign() * distance, ScrollBehavior::Smooth);
        self.mark_programmatic_scroll(id);
        self.stop_auto_advance(id);
        self.schedule_resume(id);
        self.update_controls(id);
    }

    /// Timer-driven step: one card forward, or back to the start once the
    /// strip is at its end. Leaves the suspend/resume cycle untouched.
    pub fn auto_advance_tick(&mut self, id: CarouselId) {
        let Some(instance) = self.instances.get(&id) else {
            return;
        };
        if !instance.visible {
            trace!(carousel = %id, "skipping tick while not visible");
            return;
        }
        let strip = instance.elements.strip;
        let metrics = self.host.scroll_metrics(strip);

        if metrics.is_at_end() {
            trace!(carousel = %id, "auto advance looping to start");
            self.host.scroll_to(strip, 0.0, ScrollBehavior::Smooth);
        } else {
            let Some(distance) = self.card_advance_distance(id) else {
                return;
            };
            trace!(carousel = %id, offset = metrics.offset, distance, "auto advance tick");
            self.host.scroll_by(strip, distance, ScrollBehavior::Smooth);
        }
        self.mark_programmatic_scroll(id);
    }

    fn mark_programmatic_scroll(&mut self, id: CarouselId) {
        let settle_ms = self.config.scroll_settle_ms;
        if let Some(instance) = self.instances.get_mut(&id) {
            instance.scroll_settle.schedule(&mut self.host, settle_ms);
        }
    }
}
