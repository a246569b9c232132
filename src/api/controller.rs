use indexmap::IndexMap;
use tracing::debug;

use crate::core::{CarouselId, ElementId};
use crate::error::CarouselResult;
use crate::host::{CarouselHost, EventKind, ListenTarget, Listener};

use super::{AttachOptions, CarouselConfig, CarouselElements, CarouselInstance, CarouselSnapshot};

/// Owns a host and every carousel attached through it.
///
/// All transitions run synchronously inside the controller's methods; hosts
/// feed callbacks back through [`CarouselController::dispatch`].
#[derive(Debug)]
pub struct CarouselController<H: CarouselHost> {
    pub(crate) host: H,
    pub(crate) config: CarouselConfig,
    pub(crate) instances: IndexMap<CarouselId, CarouselInstance>,
    next_id: u64,
}

impl<H: CarouselHost> CarouselController<H> {
    pub fn new(host: H, config: CarouselConfig) -> CarouselResult<Self> {
        config.validate()?;
        Ok(Self {
            host,
            config,
            instances: IndexMap::new(),
            next_id: 1,
        })
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    #[must_use]
    pub fn into_host(self) -> H {
        self.host
    }

    #[must_use]
    pub fn carousel_ids(&self) -> Vec<CarouselId> {
        self.instances.keys().copied().collect()
    }

    #[must_use]
    pub fn instance(&self, id: CarouselId) -> Option<&CarouselInstance> {
        self.instances.get(&id)
    }

    #[must_use]
    pub fn snapshot(&self, id: CarouselId) -> Option<CarouselSnapshot> {
        let instance = self.instances.get(&id)?;
        let metrics = self.host.scroll_metrics(instance.elements.strip);
        Some(CarouselSnapshot::capture(instance, metrics))
    }

    /// Attaches every container matching the configured section selector.
    ///
    /// Containers without a strip or cards are skipped.
    pub fn attach_all(&mut self) -> Vec<CarouselId> {
        let sections = self.host.query_all(None, &self.config.selectors.section);
        let attached: Vec<CarouselId> = sections
            .into_iter()
            .filter_map(|section| self.attach_carousel(section))
            .collect();
        debug!(count = attached.len(), "attached carousels");
        attached
    }

    /// Attaches one container using the controller-wide timing.
    pub fn attach_carousel(&mut self, container: ElementId) -> Option<CarouselId> {
        let options = self.config.attach_options();
        self.attach_inner(container, options)
    }

    /// Attaches one container with per-instance timing.
    ///
    /// Returns `Ok(None)` when the container has no strip or no cards.
    pub fn attach_carousel_with(
        &mut self,
        container: ElementId,
        options: AttachOptions,
    ) -> CarouselResult<Option<CarouselId>> {
        let options = options.validate()?;
        Ok(self.attach_inner(container, options))
    }

    fn attach_inner(&mut self, container: ElementId, options: AttachOptions) -> Option<CarouselId> {
        if let Some(existing) = self
            .instances
            .values()
            .find(|instance| instance.elements.container == container)
        {
            debug!(carousel = %existing.id, %container, "container already attached");
            return Some(existing.id);
        }

        let strip = self.resolve_strip(container)?;
        let cards = self.host.query_all(Some(strip), &self.config.selectors.card);
        if cards.is_empty() {
            debug!(%container, "skipping carousel without cards");
            return None;
        }

        let wrapper = self.ensure_wrapper(strip)?;
        let (previous, next) = self.ensure_controls(wrapper, strip);

        let id = CarouselId(self.next_id);
        self.next_id += 1;
        let elements = CarouselElements {
            container,
            wrapper,
            strip,
            previous,
            next,
            cards,
        };
        self.register_listeners(id, &elements);
        if let Some(threshold) = options.visibility_threshold {
            self.host.observe_visibility(strip, threshold, id);
        }

        let instance = CarouselInstance::new(id, elements, options, self.config.auto_advance);
        debug!(
            carousel = %id,
            cards = instance.card_count(),
            visible = instance.visible,
            "attached carousel"
        );
        self.instances.insert(id, instance);

        self.update_controls(id);
        self.sync_auto_advance(id);
        Some(id)
    }

    /// Stops all timers and listeners of `id`. Injected elements stay in
    /// the document so a later attach reuses them.
    pub fn detach(&mut self, id: CarouselId) -> bool {
        let Some(mut instance) = self.instances.shift_remove(&id) else {
            return false;
        };
        if let Some(handle) = instance.ticker.take() {
            self.host.clear_timer(handle);
        }
        instance.resume.cancel(&mut self.host);
        instance.resize_debounce.cancel(&mut self.host);
        instance.scroll_settle.cancel(&mut self.host);
        self.host.unlisten_all(id);
        if instance.options.visibility_threshold.is_some() {
            self.host.unobserve_visibility(id);
        }
        debug!(carousel = %id, "detached carousel");
        true
    }

    pub fn detach_all(&mut self) {
        for id in self.carousel_ids() {
            self.detach(id);
        }
    }

    fn resolve_strip(&self, container: ElementId) -> Option<ElementId> {
        let strip = self
            .host
            .query_first(Some(container), &self.config.selectors.strip);
        if strip.is_none() {
            debug!(%container, "skipping container without a card strip");
        }
        strip
    }

    fn ensure_wrapper(&mut self, strip: ElementId) -> Option<ElementId> {
        let parent = self.host.parent(strip)?;
        if self.host.has_class(parent, &self.config.classes.wrapper) {
            return Some(parent);
        }

        let wrapper = self.host.create_element("div", &self.config.classes.wrapper);
        self.host.insert_before(parent, wrapper, Some(strip));
        self.host.insert_before(wrapper, strip, None);
        Some(wrapper)
    }

    fn ensure_controls(&mut self, wrapper: ElementId, strip: ElementId) -> (ElementId, ElementId) {
        let classes = &self.config.classes;
        let labels = &self.config.labels;
        let previous_selector = format!(".{}", classes.previous);
        let next_selector = format!(".{}", classes.next);

        let previous = match self.wrapper_child(wrapper, &previous_selector) {
            Some(existing) => existing,
            None => {
                let button = self
                    .host
                    .create_element("button", &format!("{} {}", classes.control, classes.previous));
                self.host.set_text(button, &labels.previous_glyph);
                self.host
                    .set_attribute(button, "aria-label", &labels.previous_aria_label);
                self.host.set_attribute(button, "type", "button");
                self.host.insert_before(wrapper, button, Some(strip));
                button
            }
        };

        let next = match self.wrapper_child(wrapper, &next_selector) {
            Some(existing) => existing,
            None => {
                let button = self
                    .host
                    .create_element("button", &format!("{} {}", classes.control, classes.next));
                self.host.set_text(button, &labels.next_glyph);
                self.host
                    .set_attribute(button, "aria-label", &labels.next_aria_label);
                self.host.set_attribute(button, "type", "button");
                self.host.insert_before(wrapper, button, None);
                button
            }
        };

        (previous, next)
    }

    /// Existing control among the wrapper's direct children. Markup nested
    /// inside cards never counts as a control.
    fn wrapper_child(&self, wrapper: ElementId, selector: &str) -> Option<ElementId> {
        self.host
            .query_all(Some(wrapper), selector)
            .into_iter()
            .find(|element| self.host.parent(*element) == Some(wrapper))
    }

    fn register_listeners(&mut self, carousel: CarouselId, elements: &CarouselElements) {
        let wrapper = ListenTarget::Element(elements.wrapper);
        let registrations = [
            (ListenTarget::Element(elements.previous), EventKind::Click),
            (ListenTarget::Element(elements.next), EventKind::Click),
            (wrapper, EventKind::PointerEnter),
            (wrapper, EventKind::PointerLeave),
            (wrapper, EventKind::TouchStart),
            (wrapper, EventKind::TouchEnd),
            (ListenTarget::Element(elements.strip), EventKind::Scroll),
            (ListenTarget::Window, EventKind::Resize),
        ];
        for (target, kind) in registrations {
            self.host.listen(Listener {
                carousel,
                target,
                kind,
            });
        }
    }
}
