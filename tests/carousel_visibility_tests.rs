use card_carousel::api::{CarouselConfig, CarouselController};
use card_carousel::core::CarouselId;
use card_carousel::host::{
    CarouselHost, EventKind, HeadlessHost, ListenTarget, StripLayout, StripNodes,
};

fn setup(config: CarouselConfig) -> (CarouselController<HeadlessHost>, StripNodes, CarouselId) {
    let mut host = HeadlessHost::new();
    let nodes = host.add_strip(&StripLayout::new(5, 320.0, 24.0, 800.0));
    let mut controller = CarouselController::new(host, config).expect("controller init");
    let id = controller
        .attach_carousel(nodes.section)
        .expect("carousel attached");
    controller.dispatch_pending();
    (controller, nodes, id)
}

#[test]
fn leaving_viewport_halts_ticker_and_hides_controls() {
    let (mut controller, nodes, id) = setup(CarouselConfig::default());
    assert!(controller.host().is_observed(id));
    assert!(controller.snapshot(id).expect("snapshot").auto_advance_running);

    controller.host_mut().set_intersection_ratio(nodes.strip, 0.0);
    controller.dispatch_pending();

    let snapshot = controller.snapshot(id).expect("snapshot");
    assert!(!snapshot.visible);
    assert!(!snapshot.auto_advance_running);
    assert!(snapshot.auto_advance_active);
    assert_eq!(controller.host().interval_count(), 0);

    let elements = controller.instance(id).expect("instance").elements().clone();
    let host = controller.host();
    for control in [elements.previous, elements.next] {
        assert!(host.is_disabled(control));
        assert!(!host.has_class(control, "is-visible"));
    }

    controller.advance_clock(12_000);
    assert_eq!(controller.host().scroll_offset(nodes.strip), 0.0);
}

#[test]
fn ratio_below_threshold_counts_as_hidden() {
    let (mut controller, nodes, id) = setup(CarouselConfig::default());

    controller.host_mut().set_intersection_ratio(nodes.strip, 0.05);
    controller.dispatch_pending();
    assert!(!controller.snapshot(id).expect("snapshot").visible);

    controller.host_mut().set_intersection_ratio(nodes.strip, 0.5);
    controller.dispatch_pending();
    let snapshot = controller.snapshot(id).expect("snapshot");
    assert!(snapshot.visible);
    assert!(snapshot.auto_advance_running);
    assert!(snapshot.next.enabled);
    assert!(snapshot.next.visible);
}

#[test]
fn hidden_controls_ignore_clicks() {
    let (mut controller, nodes, id) = setup(CarouselConfig::default());
    let next = controller.instance(id).expect("instance").elements().next;

    controller.host_mut().set_intersection_ratio(nodes.strip, 0.0);
    controller.dispatch_pending();
    controller.host_mut().click(next);
    controller.dispatch_pending();

    assert_eq!(controller.host().scroll_offset(nodes.strip), 0.0);
}

#[test]
fn carousel_out_of_view_at_attach_waits_for_visibility() {
    let mut host = HeadlessHost::new();
    let nodes = host.add_strip(&StripLayout::new(5, 320.0, 24.0, 800.0));
    host.set_intersection_ratio(nodes.strip, 0.0);
    let mut controller =
        CarouselController::new(host, CarouselConfig::default()).expect("controller init");
    let id = controller.attach_carousel(nodes.section).expect("attached");
    controller.advance_clock(10_000);

    let snapshot = controller.snapshot(id).expect("snapshot");
    assert!(!snapshot.visible);
    assert!(!snapshot.auto_advance_running);
    assert_eq!(controller.host().scroll_offset(nodes.strip), 0.0);

    controller.host_mut().set_intersection_ratio(nodes.strip, 1.0);
    controller.advance_clock(4_000);
    assert_eq!(controller.host().scroll_offset(nodes.strip), 344.0);
}

#[test]
fn resume_while_hidden_starts_only_once_visible_again() {
    let (mut controller, nodes, id) = setup(CarouselConfig::default());
    let next = controller.instance(id).expect("instance").elements().next;

    controller.host_mut().click(next);
    controller.advance_clock(1_000);
    controller.host_mut().set_intersection_ratio(nodes.strip, 0.0);
    controller.advance_clock(3_000);

    let snapshot = controller.snapshot(id).expect("snapshot");
    assert!(snapshot.auto_advance_active);
    assert!(!snapshot.auto_advance_running);
    assert!(!snapshot.resume_pending);

    controller.host_mut().set_intersection_ratio(nodes.strip, 1.0);
    controller.dispatch_pending();
    assert!(controller.snapshot(id).expect("snapshot").auto_advance_running);
}

#[test]
fn no_threshold_means_always_visible() {
    let config = CarouselConfig::default().with_visibility_threshold(None);
    let mut host = HeadlessHost::new();
    let nodes = host.add_strip(&StripLayout::new(5, 320.0, 24.0, 800.0));
    host.set_intersection_ratio(nodes.strip, 0.0);
    let mut controller = CarouselController::new(host, config).expect("controller init");
    let id = controller.attach_carousel(nodes.section).expect("attached");

    assert!(!controller.host().is_observed(id));
    controller.advance_clock(4_000);
    assert_eq!(controller.host().scroll_offset(nodes.strip), 344.0);
}

#[test]
fn detach_drops_queued_visibility_reports() {
    let mut host = HeadlessHost::new();
    let nodes = host.add_strip(&StripLayout::new(5, 320.0, 24.0, 800.0));
    let mut controller =
        CarouselController::new(host, CarouselConfig::default()).expect("controller init");
    let id = controller.attach_carousel(nodes.section).expect("attached");
    assert!(controller.host().pending_signal_count() > 0);

    controller.detach(id);
    controller.host_mut().set_intersection_ratio(nodes.strip, 0.0);
    assert_eq!(controller.host().pending_signal_count(), 0);
}

fn interaction_ending_off_screen(start: EventKind, end: EventKind) {
    let (mut controller, nodes, id) = setup(CarouselConfig::default());
    let wrapper = controller.instance(id).expect("instance").elements().wrapper;
    let wrapper = ListenTarget::Element(wrapper);

    controller.host_mut().trigger(wrapper, start);
    controller.host_mut().set_intersection_ratio(nodes.strip, 0.0);
    controller.host_mut().trigger(wrapper, end);
    controller.host_mut().set_intersection_ratio(nodes.strip, 1.0);
    controller.dispatch_pending();
    assert!(controller.snapshot(id).expect("snapshot").resume_pending);

    controller.advance_clock(60_000);
    let snapshot = controller.snapshot(id).expect("snapshot");
    assert!(snapshot.auto_advance_active);
    assert!(snapshot.auto_advance_running);
    assert!(controller.host().scroll_offset(nodes.strip) > 0.0);
}

#[test]
fn touch_released_off_screen_still_resumes() {
    interaction_ending_off_screen(EventKind::TouchStart, EventKind::TouchEnd);
}

#[test]
fn hover_ending_off_screen_still_resumes() {
    interaction_ending_off_screen(EventKind::PointerEnter, EventKind::PointerLeave);
}

#[test]
fn resume_due_while_off_screen_waits_for_return() {
    let (mut controller, nodes, id) = setup(CarouselConfig::default());
    let wrapper = controller.instance(id).expect("instance").elements().wrapper;
    let wrapper = ListenTarget::Element(wrapper);

    controller.host_mut().trigger(wrapper, EventKind::TouchStart);
    controller.host_mut().set_intersection_ratio(nodes.strip, 0.0);
    controller.host_mut().trigger(wrapper, EventKind::TouchEnd);
    controller.advance_clock(5_000);

    let snapshot = controller.snapshot(id).expect("snapshot");
    assert!(snapshot.auto_advance_active);
    assert!(!snapshot.auto_advance_running);

    controller.host_mut().set_intersection_ratio(nodes.strip, 1.0);
    controller.dispatch_pending();
    assert!(controller.snapshot(id).expect("snapshot").auto_advance_running);
}
