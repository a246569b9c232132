pub mod metrics;
pub mod types;

pub use metrics::{EDGE_TOLERANCE_PX, FALLBACK_ADVANCE_PX, ScrollMetrics, card_advance_distance};
pub use types::{CarouselId, Direction, ElementId, ScrollBehavior, TimerHandle};
