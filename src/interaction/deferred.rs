use crate::core::TimerHandle;
use crate::host::CarouselHost;

/// Cancelable one-shot action slot.
///
/// Scheduling replaces any pending action held by the slot, so each slot has
/// at most one live host timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeferredAction {
    pending: Option<TimerHandle>,
}

impl DeferredAction {
    #[must_use]
    pub fn is_pending(self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn handle(self) -> Option<TimerHandle> {
        self.pending
    }

    pub fn schedule<H: CarouselHost + ?Sized>(&mut self, host: &mut H, delay_ms: u32) {
        self.cancel(host);
        self.pending = Some(host.set_timeout(delay_ms));
    }

    pub fn cancel<H: CarouselHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(handle) = self.pending.take() {
            host.clear_timer(handle);
        }
    }

    /// Consumes the slot when `handle` is the pending timeout.
    ///
    /// Returns `false` for stale or foreign handles, which leaves the slot
    /// untouched.
    pub fn take_fired<H: CarouselHost + ?Sized>(&mut self, host: &mut H, handle: TimerHandle) -> bool {
        if self.pending != Some(handle) {
            return false;
        }
        self.pending = None;
        // Releases host-side resources of the fired timeout.
        host.clear_timer(handle);
        true
    }
}
