mod common;

use common::MockView;
use cream_core::{
    EditorConfig, EditorShell, HostCommand, HostNotification, HostReply, Preview, ViewAdapter,
    ViewState,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

struct Fixture {
    shell: EditorShell,
    rich: Rc<RefCell<MockView>>,
    plain: Rc<RefCell<MockView>>,
    notifications: Rc<RefCell<Vec<HostNotification>>>,
}

fn mounted_shell() -> Fixture {
    let rich = MockView::mounted();
    let plain = MockView::mounted();
    let mut shell = EditorShell::new(&EditorConfig::default(), rich.clone(), plain.clone());

    let notifications = Rc::new(RefCell::new(Vec::new()));
    let sink = notifications.clone();
    shell.mount_host(move |n: HostNotification| sink.borrow_mut().push(n));

    Fixture {
        shell,
        rich,
        plain,
        notifications,
    }
}

#[test]
fn test_host_text_reaches_both_views_without_notification() {
    let mut f = mounted_shell();

    let reply = f.shell.handle_host(HostCommand::SetEditorRawText {
        text: "# Hi".to_string(),
    });
    assert_eq!(reply, HostReply::Ack);
    assert_eq!(f.rich.borrow().text().as_deref(), Some("# Hi"));
    assert_eq!(f.plain.borrow().text().as_deref(), Some("# Hi"));
    assert!(f.notifications.borrow().is_empty());
}

#[test]
fn test_plain_typing_notifies_host_exactly_once() {
    let mut f = mounted_shell();

    f.plain.borrow_mut().type_text("Hello");
    assert_eq!(f.shell.pump(), 1);
    assert_eq!(f.shell.pump(), 0);

    assert_eq!(f.rich.borrow().text().as_deref(), Some("Hello"));
    assert_eq!(
        *f.notifications.borrow(),
        vec![HostNotification::EditorValueChanged {
            text: "Hello".to_string()
        }]
    );
}

#[test]
fn test_no_op_rich_edit_is_silent() {
    let mut f = mounted_shell();
    f.shell.handle_host(HostCommand::SetEditorRawText {
        text: "**bold**".to_string(),
    });
    let pushes_before = f.plain.borrow().set_text_calls.len();

    f.rich.borrow_mut().type_text("**bold**");
    assert_eq!(f.shell.pump(), 0);
    assert!(f.notifications.borrow().is_empty());
    assert_eq!(f.plain.borrow().set_text_calls.len(), pushes_before);
}

#[test]
fn test_lock_toggle_propagates_to_both_views() {
    let mut f = mounted_shell();

    f.shell
        .handle_host(HostCommand::NoteLockToggle { locked: true });
    assert!(!f.rich.borrow().view_state().unwrap().editable);
    assert!(!f.plain.borrow().view_state().unwrap().editable);

    f.shell
        .handle_host(HostCommand::NoteLockToggle { locked: false });
    assert!(f.rich.borrow().view_state().unwrap().editable);
    assert!(f.plain.borrow().view_state().unwrap().editable);
}

#[test]
fn test_clear_undo_history_reaches_every_view() {
    let mut f = mounted_shell();
    assert_eq!(f.shell.handle_host(HostCommand::ClearUndoHistory), HostReply::Ack);
    assert_eq!(f.rich.borrow().history_cleared, 1);
    assert_eq!(f.plain.borrow().history_cleared, 1);
}

#[test]
fn test_preview_is_independent_of_canonical_text() {
    let mut f = mounted_shell();
    f.shell.handle_host(HostCommand::SetEditorRawText {
        text: "current".to_string(),
    });
    let reply = f.shell.handle_host(HostCommand::GenerateCustomPreview {
        text: "## Other note".to_string(),
    });
    assert_eq!(
        reply,
        HostReply::Preview(Preview {
            plain: Some("Other note".to_string()),
            html: None,
        })
    );
}

#[test]
fn test_commands_before_mount_are_dropped_not_queued() {
    let rich = MockView::mounted();
    let plain = MockView::mounted();
    let mut shell = EditorShell::new(&EditorConfig::default(), rich.clone(), plain.clone());

    let reply = shell.handle_host(HostCommand::NoteLockToggle { locked: true });
    assert_eq!(reply, HostReply::Dropped);

    shell.mount_host(|_: HostNotification| {});
    assert!(rich.borrow().view_state().unwrap().editable);
}

#[test]
fn test_edits_while_unmounted_update_views_but_notify_nobody() {
    let mut f = mounted_shell();
    f.shell.unmount_host();

    f.plain.borrow_mut().type_text("offline");
    assert_eq!(f.shell.pump(), 1);
    assert_eq!(f.rich.borrow().text().as_deref(), Some("offline"));
    assert!(f.notifications.borrow().is_empty());
}

#[test]
fn test_split_starts_closed_and_double_toggle_restores_layout() {
    let mut f = mounted_shell();
    let closed_rich = f.rich.borrow().view_state().unwrap();
    let closed_plain = f.plain.borrow().view_state().unwrap();
    assert_eq!(
        closed_plain,
        ViewState {
            editable: true,
            visible: false,
            width_percent: 0,
        }
    );
    assert_eq!(closed_rich.width_percent, 100);

    assert!(f.shell.toggle_split());
    let plain = f.plain.borrow().view_state().unwrap();
    assert!(plain.visible);
    assert_eq!(plain.width_percent, 50);
    assert_eq!(f.rich.borrow().view_state().unwrap().width_percent, 50);
    assert!(f.plain.borrow().wrapping);

    assert!(!f.shell.toggle_split());
    assert_eq!(f.rich.borrow().view_state().unwrap(), closed_rich);
    assert_eq!(f.plain.borrow().view_state().unwrap(), closed_plain);
}
