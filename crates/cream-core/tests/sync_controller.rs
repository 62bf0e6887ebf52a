mod common;

use common::MockView;
use cream_core::{
    ActorId, ExternalOutcome, Normalization, SyncController, SyncOutcome, ViewAdapter, ViewError,
};
use pretty_assertions::assert_eq;

fn controller_with_views() -> (
    SyncController,
    std::rc::Rc<std::cell::RefCell<MockView>>,
    std::rc::Rc<std::cell::RefCell<MockView>>,
) {
    let rich = MockView::mounted();
    let plain = MockView::mounted();
    let mut controller = SyncController::new("");
    assert!(controller.attach(ActorId::RichView, &rich));
    assert!(controller.attach(ActorId::PlainView, &plain));
    (controller, rich, plain)
}

#[test]
fn test_user_edit_is_pushed_to_sibling_and_relayed_once() {
    let (mut controller, rich, plain) = controller_with_views();

    plain.borrow_mut().type_text("Hello");
    assert_eq!(controller.pending(), 1);

    let outcomes = controller.process_pending();
    assert_eq!(outcomes, vec![SyncOutcome::Relayed("Hello".to_string())]);
    assert_eq!(rich.borrow().text().as_deref(), Some("Hello"));
    assert_eq!(rich.borrow().set_text_calls, vec!["Hello".to_string()]);
    assert!(plain.borrow().set_text_calls.is_empty());
    assert_eq!(controller.canonical(), "Hello");
    assert_eq!(controller.last_writer(), ActorId::PlainView);

    // The push into the rich view produced an echo that never reached the queue.
    assert_eq!(controller.pending(), 0);
    assert_eq!(controller.stats().echoes_suppressed, 1);
}

#[test]
fn test_echo_reported_as_user_edit_is_suppressed_by_in_flight_guard() {
    let (mut controller, rich, plain) = controller_with_views();
    rich.borrow_mut().echo_as_user = true;
    plain.borrow_mut().echo_as_user = true;

    plain.borrow_mut().type_text("abc");
    let outcomes = controller.process_pending();
    assert_eq!(outcomes, vec![SyncOutcome::Relayed("abc".to_string())]);
    assert_eq!(controller.pending(), 0);
    assert!(plain.borrow().set_text_calls.is_empty());

    assert_eq!(controller.apply_external("xyz"), ExternalOutcome::Applied);
    assert_eq!(controller.pending(), 0);
    assert!(controller.process_pending().is_empty());
    assert_eq!(controller.stats().echoes_suppressed, 3);
}

#[test]
fn test_equal_content_is_not_relayed() {
    let (mut controller, rich, plain) = controller_with_views();
    plain.borrow_mut().type_text("same");
    controller.process_pending();

    // Formatting-only transaction: the rich view reports identical markdown.
    rich.borrow_mut().type_text("same");
    let outcomes = controller.process_pending();
    assert_eq!(outcomes, vec![SyncOutcome::Unchanged]);
    assert_eq!(plain.borrow().set_text_calls, Vec::<String>::new());
    assert_eq!(rich.borrow().set_text_calls.len(), 1);
}

#[test]
fn test_source_view_normalization_decides_equality() {
    let (mut controller, rich, plain) = controller_with_views();
    plain.borrow_mut().type_text("Hello");
    controller.process_pending();

    rich.borrow_mut().normalization = Normalization::TrimTrailing;
    rich.borrow_mut().type_text("Hello  \n\n");
    assert_eq!(controller.process_pending(), vec![SyncOutcome::Unchanged]);

    // Under exact comparison the plain view treats the same surface change as an edit.
    plain.borrow_mut().type_text("Hello  \n\n");
    assert_eq!(
        controller.process_pending(),
        vec![SyncOutcome::Relayed("Hello  \n\n".to_string())]
    );
}

#[test]
fn test_changes_are_processed_in_arrival_order_last_writer_wins() {
    let (mut controller, rich, plain) = controller_with_views();

    plain.borrow_mut().type_text("from plain");
    rich.borrow_mut().type_text("from rich");
    assert_eq!(controller.pending(), 2);

    let outcomes = controller.process_pending();
    assert_eq!(
        outcomes,
        vec![
            SyncOutcome::Relayed("from plain".to_string()),
            SyncOutcome::Relayed("from rich".to_string()),
        ]
    );
    assert_eq!(controller.canonical(), "from rich");
    assert_eq!(controller.last_writer(), ActorId::RichView);
    assert_eq!(plain.borrow().text().as_deref(), Some("from rich"));
    // The first relay overwrote the rich view; it is restored to its own, later edit.
    assert_eq!(rich.borrow().text().as_deref(), Some("from rich"));
}

#[test]
fn test_external_write_updates_both_views_without_relay() {
    let (mut controller, rich, plain) = controller_with_views();

    assert_eq!(controller.apply_external("# Hi"), ExternalOutcome::Applied);
    assert_eq!(rich.borrow().text().as_deref(), Some("# Hi"));
    assert_eq!(plain.borrow().text().as_deref(), Some("# Hi"));
    assert_eq!(controller.last_writer(), ActorId::Host);
    assert!(controller.process_pending().is_empty());
    assert_eq!(controller.stats().relayed, 0);
}

#[test]
fn test_external_write_equal_to_canonical_makes_no_calls() {
    let (mut controller, rich, plain) = controller_with_views();
    rich.borrow_mut().normalization = Normalization::LineEndings;
    plain.borrow_mut().normalization = Normalization::LineEndings;
    assert_eq!(controller.apply_external("a\nb"), ExternalOutcome::Applied);
    rich.borrow_mut().set_text_calls.clear();
    plain.borrow_mut().set_text_calls.clear();

    assert_eq!(controller.apply_external("a\nb"), ExternalOutcome::Unchanged);
    assert_eq!(controller.apply_external("a\r\nb"), ExternalOutcome::Unchanged);
    assert!(rich.borrow().set_text_calls.is_empty());
    assert!(plain.borrow().set_text_calls.is_empty());
    assert_eq!(controller.canonical(), "a\nb");
}

#[test]
fn test_external_write_skips_views_that_already_agree() {
    let (mut controller, rich, plain) = controller_with_views();
    controller.apply_external("Hello");
    rich.borrow_mut().set_text_calls.clear();
    plain.borrow_mut().set_text_calls.clear();
    rich.borrow_mut().normalization = Normalization::TrimTrailing;

    assert_eq!(controller.apply_external("Hello\n"), ExternalOutcome::Applied);
    assert!(rich.borrow().set_text_calls.is_empty());
    assert_eq!(plain.borrow().set_text_calls, vec!["Hello\n".to_string()]);
    assert_eq!(controller.canonical(), "Hello\n");
}

#[test]
fn test_sibling_rejection_keeps_canonical_text() {
    let (mut controller, rich, plain) = controller_with_views();
    plain.borrow_mut().type_text("accepted");
    controller.process_pending();

    rich.borrow_mut().reject_marker = Some("<div>");
    plain.borrow_mut().type_text("<div>raw</div>");
    let outcomes = controller.process_pending();
    assert!(matches!(
        outcomes.as_slice(),
        [SyncOutcome::Rejected(ViewError::Unrepresentable { .. })]
    ));
    assert_eq!(controller.canonical(), "accepted");
    assert_eq!(rich.borrow().text().as_deref(), Some("accepted"));
    assert_eq!(controller.stats().rejected, 1);

    // The source view gives up the rejected text, and the restore is not echoed back.
    assert_eq!(plain.borrow().text().as_deref(), Some("accepted"));
    assert_eq!(plain.borrow().set_text_calls, vec!["accepted".to_string()]);
    assert_eq!(controller.pending(), 0);
}

#[test]
fn test_external_write_repairs_view_that_drifted_from_canonical() {
    let (mut controller, rich, plain) = controller_with_views();
    controller.apply_external("kept");
    controller.with_view_mut(ActorId::PlainView, |view| view.set_text("drifted"));
    assert_eq!(controller.pending(), 0);
    rich.borrow_mut().set_text_calls.clear();
    plain.borrow_mut().set_text_calls.clear();

    assert_eq!(controller.apply_external("kept"), ExternalOutcome::Applied);
    assert!(rich.borrow().set_text_calls.is_empty());
    assert_eq!(plain.borrow().set_text_calls, vec!["kept".to_string()]);
    assert_eq!(controller.canonical(), "kept");
}

#[test]
fn test_external_rejection_rolls_back_written_views() {
    let (mut controller, rich, plain) = controller_with_views();
    controller.apply_external("before");
    plain.borrow_mut().reject_marker = Some("<div>");

    let outcome = controller.apply_external("<div>after</div>");
    assert!(matches!(outcome, ExternalOutcome::Rejected(_)));
    assert_eq!(controller.canonical(), "before");
    assert_eq!(rich.borrow().text().as_deref(), Some("before"));
    assert_eq!(plain.borrow().text().as_deref(), Some("before"));
    assert_eq!(controller.pending(), 0);
}

#[test]
fn test_absent_and_dropped_views_are_tolerated() {
    let rich = MockView::unmounted();
    let plain = MockView::mounted();
    let mut controller = SyncController::new("");
    controller.attach(ActorId::RichView, &rich);
    controller.attach(ActorId::PlainView, &plain);

    plain.borrow_mut().type_text("typed before rich mounted");
    assert_eq!(
        controller.process_pending(),
        vec![SyncOutcome::Relayed("typed before rich mounted".to_string())]
    );
    assert_eq!(rich.borrow().text(), None);

    rich.borrow_mut().mount();
    assert_eq!(controller.resync(ActorId::RichView), Ok(true));
    assert_eq!(rich.borrow().text().as_deref(), Some("typed before rich mounted"));

    drop(rich);
    assert!(!controller.has_view(ActorId::RichView));
    plain.borrow_mut().type_text("after drop");
    assert_eq!(
        controller.process_pending(),
        vec![SyncOutcome::Relayed("after drop".to_string())]
    );
}

#[test]
fn test_busy_view_is_treated_as_absent() {
    let (mut controller, rich, _plain) = controller_with_views();
    let _borrow = rich.borrow();
    assert_eq!(controller.apply_external("while borrowed"), ExternalOutcome::Applied);
    assert_eq!(controller.canonical(), "while borrowed");
}

#[test]
fn test_detached_view_changes_are_dropped() {
    let (mut controller, rich, _plain) = controller_with_views();
    controller.detach(ActorId::RichView);
    rich.borrow_mut().type_text("ignored");
    assert_eq!(controller.pending(), 0);
    assert_eq!(controller.canonical(), "");
}

#[test]
fn test_non_view_actors_cannot_attach() {
    let view = MockView::mounted();
    let mut controller = SyncController::new("");
    assert!(!controller.attach(ActorId::Host, &view));
    assert!(!controller.attach(ActorId::Init, &view));
}
