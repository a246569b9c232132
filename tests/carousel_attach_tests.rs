use card_carousel::api::{CarouselConfig, CarouselController};
use card_carousel::core::CarouselId;
use card_carousel::host::{CarouselHost, EventKind, HeadlessHost, ListenTarget, StripLayout};

fn attach_single(
    layout: &StripLayout,
    config: CarouselConfig,
) -> (CarouselController<HeadlessHost>, Option<CarouselId>) {
    let mut host = HeadlessHost::new();
    host.add_strip(layout);
    let mut controller = CarouselController::new(host, config).expect("controller init");
    let id = controller.attach_all().into_iter().next();
    controller.dispatch_pending();
    (controller, id)
}

#[test]
fn container_without_cards_is_left_untouched() {
    let mut host = HeadlessHost::new();
    let nodes = host.add_strip(&StripLayout::new(0, 320.0, 24.0, 800.0));
    let mut controller =
        CarouselController::new(host, CarouselConfig::default()).expect("controller init");

    assert!(controller.attach_all().is_empty());
    controller.dispatch_pending();

    let host = controller.host();
    assert!(host.query_all(None, "button").is_empty());
    assert!(host.query_all(None, ".blog-cards-wrapper").is_empty());
    assert_eq!(host.children(nodes.section), vec![nodes.strip]);
    assert_eq!(host.active_timer_count(), 0);
}

#[test]
fn container_without_strip_is_skipped() {
    let mut host = HeadlessHost::new();
    let section = host.append_element(host.root(), "section", "related-posts");
    host.append_element(section, "p", "intro");
    let mut controller =
        CarouselController::new(host, CarouselConfig::default()).expect("controller init");

    assert_eq!(controller.attach_carousel(section), None);
    assert!(controller.carousel_ids().is_empty());
}

#[test]
fn single_card_renders_controls_without_auto_advance() {
    let (controller, id) = attach_single(
        &StripLayout::new(1, 320.0, 24.0, 800.0),
        CarouselConfig::default(),
    );
    let id = id.expect("one card still attaches");

    let host = controller.host();
    assert_eq!(host.query_all(None, "button.scroll-arrow").len(), 2);
    assert_eq!(host.interval_count(), 0);

    let snapshot = controller.snapshot(id).expect("snapshot");
    assert_eq!(snapshot.card_count, 1);
    assert!(snapshot.visible);
    assert!(snapshot.auto_advance_active);
    assert!(!snapshot.auto_advance_running);
    assert!(!snapshot.previous.enabled);
    assert!(!snapshot.next.enabled);
}

#[test]
fn attach_wraps_strip_between_labelled_controls() {
    let mut host = HeadlessHost::new();
    let nodes = host.add_strip(&StripLayout::new(5, 320.0, 24.0, 800.0));
    let mut controller =
        CarouselController::new(host, CarouselConfig::default()).expect("controller init");
    let id = controller.attach_carousel(nodes.section).expect("attached");

    let elements = controller.instance(id).expect("instance").elements().clone();
    let host = controller.host();
    assert_eq!(host.children(nodes.section), vec![elements.wrapper]);
    assert_eq!(
        host.children(elements.wrapper),
        vec![elements.previous, nodes.strip, elements.next]
    );
    assert!(host.has_class(elements.wrapper, "blog-cards-wrapper"));
    assert!(host.has_class(elements.previous, "scroll-left"));
    assert!(host.has_class(elements.next, "scroll-right"));
    assert_eq!(host.tag(elements.previous), Some("button"));
    assert_eq!(host.text(elements.previous), Some("\u{2039}"));
    assert_eq!(host.text(elements.next), Some("\u{203a}"));
    assert_eq!(host.attribute(elements.previous, "aria-label"), Some("Scroll left"));
    assert_eq!(host.attribute(elements.next, "aria-label"), Some("Scroll right"));
    assert_eq!(elements.cards, nodes.cards);
}

#[test]
fn attaching_twice_reuses_instance_and_markup() {
    let mut host = HeadlessHost::new();
    host.add_strip(&StripLayout::new(5, 320.0, 24.0, 800.0));
    let mut controller =
        CarouselController::new(host, CarouselConfig::default()).expect("controller init");

    let first = controller.attach_all();
    let second = controller.attach_all();
    assert_eq!(first, second);
    assert_eq!(controller.carousel_ids().len(), 1);

    // A fresh controller over the same document finds the existing wrapper
    // and controls instead of injecting new ones.
    let host = controller.into_host();
    let mut again = CarouselController::new(host, CarouselConfig::default()).expect("controller");
    assert_eq!(again.attach_all().len(), 1);

    let host = again.host();
    assert_eq!(host.query_all(None, ".blog-cards-wrapper").len(), 1);
    assert_eq!(host.query_all(None, "button.scroll-arrow").len(), 2);
}

#[test]
fn every_matching_section_gets_an_independent_instance() {
    let mut host = HeadlessHost::new();
    let first = host.add_strip(&StripLayout::new(5, 320.0, 24.0, 800.0));
    let second = host.add_strip(&StripLayout::new(4, 300.0, 16.0, 700.0));
    let mut controller =
        CarouselController::new(host, CarouselConfig::default()).expect("controller init");

    let ids = controller.attach_all();
    assert_eq!(ids.len(), 2);
    controller.dispatch_pending();
    assert_eq!(controller.host().interval_count(), 2);

    let wrapper = controller.instance(ids[0]).expect("first").elements().wrapper;
    controller
        .host_mut()
        .trigger(ListenTarget::Element(wrapper), EventKind::PointerEnter);
    controller.advance_clock(4_000);

    assert_eq!(controller.host().scroll_offset(first.strip), 0.0);
    assert_eq!(controller.host().scroll_offset(second.strip), 316.0);
    assert!(!controller.snapshot(ids[0]).expect("first").auto_advance_running);
    assert!(controller.snapshot(ids[1]).expect("second").auto_advance_running);
}

#[test]
fn detach_releases_timers_listeners_and_observation() {
    let (mut controller, id) = attach_single(
        &StripLayout::new(5, 320.0, 24.0, 800.0),
        CarouselConfig::default(),
    );
    let id = id.expect("attached");
    let ticker = controller
        .instance(id)
        .and_then(|instance| instance.ticker())
        .expect("ticker running");

    controller.host_mut().resize_window();
    controller.dispatch_pending();
    assert!(controller.host().active_timer_count() >= 2);

    assert!(controller.detach(id));
    assert!(!controller.detach(id));

    let host = controller.host();
    assert_eq!(host.active_timer_count(), 0);
    assert_eq!(host.listener_count(id), 0);
    assert!(!host.is_observed(id));
    assert!(!host.is_timer_active(ticker));

    // A late tick for a cleared handle is ignored.
    controller.fire_timer(ticker);
    assert_eq!(controller.host().scroll_log().len(), 0);
}

#[test]
fn detach_all_then_reattach_reuses_injected_controls() {
    let (mut controller, id) = attach_single(
        &StripLayout::new(3, 320.0, 24.0, 800.0),
        CarouselConfig::default(),
    );
    let previous = controller
        .instance(id.expect("attached"))
        .expect("instance")
        .elements()
        .previous;

    controller.detach_all();
    assert!(controller.carousel_ids().is_empty());

    let ids = controller.attach_all();
    assert_eq!(ids.len(), 1);
    let reattached = controller.instance(ids[0]).expect("instance").elements().previous;
    assert_eq!(reattached, previous);
    assert_eq!(controller.host().query_all(None, "button").len(), 2);
}

#[test]
fn control_classes_inside_cards_are_not_reused_as_controls() {
    let mut host = HeadlessHost::new();
    let nodes = host.add_strip(&StripLayout::new(3, 320.0, 24.0, 800.0));
    let badge = host.append_element(nodes.cards[0], "span", "scroll-left");
    let link = host.append_element(nodes.cards[1], "a", "scroll-right");
    let mut controller =
        CarouselController::new(host, CarouselConfig::default()).expect("controller init");
    let id = controller.attach_carousel(nodes.section).expect("attached");

    let elements = controller.instance(id).expect("instance").elements().clone();
    assert_ne!(elements.previous, badge);
    assert_ne!(elements.next, link);

    let host = controller.host();
    assert_eq!(
        host.children(elements.wrapper),
        vec![elements.previous, nodes.strip, elements.next]
    );
    assert_eq!(host.children(nodes.cards[0]), vec![badge]);
    assert_eq!(host.tag(elements.previous), Some("button"));
}
