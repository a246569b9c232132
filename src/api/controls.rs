use crate::core::{CarouselId, ElementId};
use crate::host::CarouselHost;
use crate::interaction::ControlState;

use super::CarouselController;

impl<H: CarouselHost> CarouselController<H> {
    /// Re-derives both controls from the strip's current scroll position.
    ///
    /// Invisible carousels keep both controls hidden and disabled.
    pub fn update_controls(&mut self, id: CarouselId) {
        let Some(instance) = self.instances.get(&id) else {
            return;
        };
        let (previous_el, next_el) = (instance.elements.previous, instance.elements.next);

        let (previous, next) = if instance.visible {
            let metrics = self.host.scroll_metrics(instance.elements.strip);
            let policy = self.config.arrow_policy;
            (
                ControlState::resolve(policy, metrics.can_scroll_backward()),
                ControlState::resolve(policy, metrics.can_scroll_forward()),
            )
        } else {
            (ControlState::hidden(), ControlState::hidden())
        };

        self.apply_control_state(previous_el, previous);
        self.apply_control_state(next_el, next);
        if let Some(instance) = self.instances.get_mut(&id) {
            instance.previous_control = previous;
            instance.next_control = next;
        }
    }

    fn apply_control_state(&mut self, element: ElementId, state: ControlState) {
        self.host.set_disabled(element, !state.enabled);
        self.host
            .toggle_class(element, &self.config.classes.control_visible, state.visible);
    }
}
