use tracing::{debug, trace};

use crate::core::CarouselId;
use crate::host::CarouselHost;

use super::CarouselController;

impl<H: CarouselHost> CarouselController<H> {
    /// Brings the ticker in line with eligibility: arms it when eligible and
    /// missing, clears it when not eligible. A running ticker is kept, so at
    /// most one exists per instance.
    pub(crate) fn sync_auto_advance(&mut self, id: CarouselId) {
        let Some(instance) = self.instances.get_mut(&id) else {
            return;
        };
        let eligible = instance.is_auto_advance_eligible();
        match (eligible, instance.ticker) {
            (true, Some(_)) => {}
            (true, None) => {
                let handle = self.host.set_interval(instance.options.auto_advance_ms);
                instance.ticker = Some(handle);
                debug!(
                    carousel = %id,
                    period_ms = instance.options.auto_advance_ms,
                    "auto advance started"
                );
            }
            (false, Some(handle)) => {
                instance.ticker = None;
                self.host.clear_timer(handle);
                debug!(carousel = %id, "auto advance halted");
            }
            (false, None) => {
                trace!(
                    carousel = %id,
                    active = instance.auto_advance_active,
                    visible = instance.visible,
                    cards = instance.card_count(),
                    "auto advance not eligible"
                );
            }
        }
    }

    /// Clears the ticker without changing whether auto-advance is wanted.
    pub(crate) fn halt_ticker(&mut self, id: CarouselId) {
        let Some(instance) = self.instances.get_mut(&id) else {
            return;
        };
        if let Some(handle) = instance.ticker.take() {
            self.host.clear_timer(handle);
            debug!(carousel = %id, "auto advance halted");
        }
    }

    /// Suspends auto-advance until something resumes it.
    pub fn stop_auto_advance(&mut self, id: CarouselId) {
        if let Some(instance) = self.instances.get_mut(&id) {
            instance.auto_advance_active = false;
        }
        self.halt_ticker(id);
    }

    /// Re-enables auto-advance immediately, subject to eligibility.
    pub fn resume_auto_advance(&mut self, id: CarouselId) {
        let Some(instance) = self.instances.get_mut(&id) else {
            return;
        };
        if !self.config.auto_advance {
            return;
        }
        instance.auto_advance_active = true;
        self.sync_auto_advance(id);
    }

    /// Schedules a resume after the quiet period, replacing a pending one.
    pub(crate) fn schedule_resume(&mut self, id: CarouselId) {
        let Some(instance) = self.instances.get_mut(&id) else {
            return;
        };
        if !self.config.auto_advance {
            return;
        }
        let delay_ms = instance.options.resume_delay_ms;
        instance.resume.schedule(&mut self.host, delay_ms);
        trace!(carousel = %id, delay_ms, "resume scheduled");
    }

    pub(crate) fn cancel_resume(&mut self, id: CarouselId) {
        if let Some(instance) = self.instances.get_mut(&id) {
            instance.resume.cancel(&mut self.host);
        }
    }

    /// Quiet period elapsed. Hover or touch still in progress keeps the
    /// carousel suspended; their release schedules another resume.
    pub(crate) fn on_resume_due(&mut self, id: CarouselId) {
        let Some(instance) = self.instances.get(&id) else {
            return;
        };
        if instance.interaction.is_engaged() {
            trace!(carousel = %id, "resume skipped while engaged");
            return;
        }
        self.resume_auto_advance(id);
    }
}
