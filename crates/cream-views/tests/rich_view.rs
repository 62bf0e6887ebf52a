use cream_core::{EditOrigin, RichViewConfig, TextChange, ViewAdapter, ViewError};
use cream_views::{BlockKind, EditError, RichTextView};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn recording(view: &mut RichTextView) -> Rc<RefCell<Vec<TextChange>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    view.on_change(Box::new(move |change: &TextChange| {
        sink.borrow_mut().push(change.clone())
    }));
    log
}

fn strict_view() -> RichTextView {
    let mut view = RichTextView::with_config(&RichViewConfig {
        allow_html: false,
        ..RichViewConfig::default()
    });
    view.mount();
    view
}

#[test]
fn test_set_text_serializes_through_blocks() {
    let mut view = RichTextView::mounted();
    view.set_text("# Title\n\n\n\nbody text   \n").unwrap();
    assert_eq!(view.text().as_deref(), Some("# Title\n\nbody text"));
    assert_eq!(view.blocks().len(), 2);
    assert_eq!(view.blocks()[0].kind, BlockKind::Heading(1));
}

#[test]
fn test_set_text_with_same_blocks_is_silent() {
    let mut view = RichTextView::mounted();
    let log = recording(&mut view);

    view.set_text("a\n\nb").unwrap();
    view.set_text("a\n\n\nb\n").unwrap();
    assert_eq!(*log.borrow(), vec![TextChange::sync("a\n\nb")]);
}

#[test]
fn test_equivalence_uses_block_serialization() {
    let view = RichTextView::mounted();
    assert!(view.equivalent("a\n\n\nb", "a\n\nb\n"));
    assert!(view.equivalent("a\r\n\r\nb", "a\n\nb"));
    assert!(!view.equivalent("a\nb", "a\n\nb"));
}

#[test]
fn test_html_is_unrepresentable_without_schema_support() {
    let mut view = strict_view();
    view.set_text("kept").unwrap();

    let err = view.set_text("<div>\nraw\n</div>").unwrap_err();
    assert!(matches!(err, ViewError::Unrepresentable { .. }));
    assert_eq!(view.text().as_deref(), Some("kept"));

    assert!(matches!(
        view.insert_block(1, "<div>x</div>"),
        Err(EditError::View(ViewError::Unrepresentable { .. }))
    ));
    assert_eq!(view.blocks().len(), 1);
}

#[test]
fn test_block_transactions_report_user_changes() {
    let mut view = RichTextView::mounted();
    view.set_text("# Title\n\nfirst").unwrap();
    let log = recording(&mut view);

    view.insert_block(2, "second").unwrap();
    view.replace_block(0, "## Subtitle").unwrap();
    view.remove_block(1).unwrap();

    let texts: Vec<_> = log.borrow().iter().map(|c| c.text.clone()).collect();
    assert_eq!(
        texts,
        vec![
            "# Title\n\nfirst\n\nsecond",
            "## Subtitle\n\nfirst\n\nsecond",
            "## Subtitle\n\nsecond",
        ]
    );
    assert!(log.borrow().iter().all(|c| c.origin == EditOrigin::User));
}

#[test]
fn test_formatting_only_transaction_still_reports() {
    let mut view = RichTextView::mounted();
    view.set_text("**bold**").unwrap();
    let log = recording(&mut view);

    view.replace_block(0, "**bold**").unwrap();
    assert_eq!(*log.borrow(), vec![TextChange::user("**bold**")]);
    assert!(!view.can_undo());
}

#[test]
fn test_type_markdown_reparses_last_block() {
    let mut view = RichTextView::mounted();
    view.type_markdown("Hello").unwrap();
    view.type_markdown(" there").unwrap();
    view.type_markdown("\n\n- item").unwrap();

    assert_eq!(view.text().as_deref(), Some("Hello there\n\n- item"));
    let kinds: Vec<_> = view.blocks().iter().map(|b| b.kind).collect();
    assert_eq!(kinds, vec![BlockKind::Paragraph, BlockKind::List]);
}

#[test]
fn test_undo_redo_transactions() {
    let mut view = RichTextView::mounted();
    view.set_text("one").unwrap();
    view.insert_block(1, "two").unwrap();
    view.remove_block(0).unwrap();
    assert_eq!(view.text().as_deref(), Some("two"));

    assert_eq!(view.undo(), Ok(true));
    assert_eq!(view.text().as_deref(), Some("one\n\ntwo"));
    assert_eq!(view.undo(), Ok(true));
    assert_eq!(view.text().as_deref(), Some("one"));
    assert_eq!(view.undo(), Ok(false));

    assert_eq!(view.redo(), Ok(true));
    assert_eq!(view.redo(), Ok(true));
    assert_eq!(view.text().as_deref(), Some("two"));
}

#[test]
fn test_push_clears_history() {
    let mut view = RichTextView::mounted();
    view.type_markdown("typed").unwrap();
    view.set_text("pushed").unwrap();
    assert!(!view.can_undo());
    assert_eq!(view.undo(), Ok(false));
    assert_eq!(view.text().as_deref(), Some("pushed"));
}

#[test]
fn test_block_index_and_lock_checks() {
    let mut view = RichTextView::mounted();
    assert_eq!(
        view.replace_block(0, "x"),
        Err(EditError::InvalidBlock { index: 0, count: 0 })
    );
    view.set_editable(false);
    assert_eq!(view.type_markdown("x"), Err(EditError::ReadOnly));

    let mut unmounted = RichTextView::new();
    assert_eq!(unmounted.text(), None);
    assert_eq!(unmounted.set_text("x"), Ok(()));
    assert_eq!(unmounted.remove_block(0), Err(EditError::NotMounted));
}
