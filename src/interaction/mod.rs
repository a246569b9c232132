mod deferred;

use serde::{Deserialize, Serialize};

pub use deferred::DeferredAction;

/// How navigation controls react to scroll bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArrowPolicy {
    /// Controls stay shown and are disabled at the matching edge.
    #[default]
    DisableAtBounds,
    /// Controls are shown only while the strip can scroll in their direction.
    HideAtBounds,
}

/// Rendered state of one navigation control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlState {
    pub enabled: bool,
    pub visible: bool,
}

impl ControlState {
    /// Derives the control state for `scrollable` under `policy`.
    #[must_use]
    pub fn resolve(policy: ArrowPolicy, scrollable: bool) -> Self {
        match policy {
            ArrowPolicy::DisableAtBounds => Self {
                enabled: scrollable,
                visible: true,
            },
            ArrowPolicy::HideAtBounds => Self {
                enabled: scrollable,
                visible: scrollable,
            },
        }
    }

    #[must_use]
    pub fn hidden() -> Self {
        Self::default()
    }
}

/// User interaction flags tracked per carousel instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionState {
    pointer_inside: bool,
    touch_active: bool,
}

impl InteractionState {
    #[must_use]
    pub fn pointer_inside(self) -> bool {
        self.pointer_inside
    }

    #[must_use]
    pub fn touch_active(self) -> bool {
        self.touch_active
    }

    /// True while hover or touch holds the carousel still.
    #[must_use]
    pub fn is_engaged(self) -> bool {
        self.pointer_inside || self.touch_active
    }

    pub fn on_pointer_enter(&mut self) {
        self.pointer_inside = true;
    }

    pub fn on_pointer_leave(&mut self) {
        self.pointer_inside = false;
    }

    pub fn on_touch_start(&mut self) {
        self.touch_active = true;
    }

    pub fn on_touch_end(&mut self) {
        self.touch_active = false;
    }
}
