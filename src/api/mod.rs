mod auto_advance;
mod config;
mod controller;
mod controls;
mod events;
mod instance;
mod navigation;

pub use config::{AttachOptions, CarouselClasses, CarouselConfig, CarouselSelectors, ControlLabels};
pub use controller::CarouselController;
pub use events::CarouselEvent;
pub use instance::{CarouselElements, CarouselInstance, CarouselSnapshot};
