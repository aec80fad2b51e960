// End-to-end scenarios driven through the public API on the headless backend.
use winroute::{
    DialogTemplate, Event, EventKind, HeadlessBackend, HeadlessProbe, Menu, MenuBar, MenuItem,
    MenuItemId, Platform, PlatformConfig, PlatformError, Rect, ResourceId, WindowConfig, WindowId,
    WindowType,
};

use std::cell::{Cell, RefCell};
use std::rc::Rc;

const ASK_DIALOG: ResourceId = ResourceId(100);

type Log = Rc<RefCell<Vec<(&'static str, EventKind)>>>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn setup() -> (Platform, HeadlessProbe) {
    init_logging();
    let (backend, probe) = HeadlessBackend::with_probe();
    let mut platform = Platform::with_backend(PlatformConfig::new("scenarios"), backend);
    platform
        .resources_mut()
        .insert_dialog(ASK_DIALOG, DialogTemplate::new("Ask", Rect::new(0, 0, 200, 100)));
    (platform, probe)
}

fn logging_handler(
    name: &'static str,
    log: &Log,
) -> impl Fn(&mut Platform, &Event) -> bool + 'static {
    let log = Rc::clone(log);
    move |_: &mut Platform, event: &Event| {
        log.borrow_mut().push((name, event.kind));
        true
    }
}

fn frame_with_client(platform: &mut Platform) -> WindowId {
    let frame = platform
        .create_window(WindowConfig::new("Main"))
        .expect("frame");
    platform
        .set_menu_bar(
            frame,
            MenuBar::new().menu_with(
                Menu::new("Window").item(MenuItem::command(MenuItemId(1), "Tile")),
            ),
        )
        .expect("menu bar");
    platform.create_client(Some(0)).expect("client");
    frame
}

#[test]
fn first_window_becomes_frame_and_last_document_close_clears_activation() {
    // Arrange
    let (mut platform, probe) = setup();
    let log: Log = Rc::new(RefCell::new(Vec::new()));

    // Act
    let frame = platform
        .create_window(WindowConfig::new("Main"))
        .expect("frame");
    let client = platform.create_client(None).expect("client");
    let doc = platform
        .create_window(WindowConfig::new("Doc").with_handler(logging_handler("doc", &log)))
        .expect("document");

    // Assert
    assert_eq!(platform.frame(), Some(frame));
    assert_eq!(platform.window_type(frame), Some(WindowType::Frame));
    assert_eq!(platform.documents(), &[doc]);
    assert_eq!(platform.active_window(), Some(doc));
    let doc_handle = platform.native_handle(doc).expect("doc handle");
    let client_handle = platform.native_handle(client).expect("client handle");
    assert_eq!(probe.parent(doc_handle), Some(client_handle));

    assert!(platform.close_window(doc));
    assert!(!platform.registry().is_live(doc));
    assert_eq!(platform.active_window(), None);
    assert!(platform.window_menu_entries().is_empty());
    assert!(!probe.exists(doc_handle));
    assert!(log.borrow().contains(&("doc", EventKind::Destroy)));
}

#[test]
fn document_without_client_is_refused_and_leaves_no_trace() {
    let (mut platform, probe) = setup();
    platform
        .create_window(WindowConfig::new("Main"))
        .expect("frame");
    let windows_before = probe.window_count();

    let result = platform.create_window(WindowConfig::new("Orphan"));

    assert!(matches!(result, Err(PlatformError::NoClientWindow)));
    assert_eq!(platform.registry().len(), 1);
    assert_eq!(probe.window_count(), windows_before);
}

#[test]
fn nested_push_and_pop_track_the_innermost_dialog() {
    let (mut platform, _probe) = setup();
    let main = platform
        .create_window(WindowConfig::new("Main"))
        .expect("frame");
    let d1 = platform
        .create_window(WindowConfig::new("D1").with_type(WindowType::Dialog).hidden())
        .expect("d1");
    let d2 = platform
        .create_window(WindowConfig::new("D2").with_type(WindowType::Dialog).hidden())
        .expect("d2");

    platform.push_modal(Some(d1)).expect("push d1");
    assert_eq!(platform.modal_dialog_window(), Some(d1));
    assert!(!platform.is_window_enabled(main));

    platform.push_modal(Some(d2)).expect("push d2");
    assert_eq!(platform.modal_dialog_window(), Some(d2));
    assert!(platform.is_window_enabled(d2));
    assert!(!platform.is_window_enabled(d1));

    platform.pop_modal().expect("pop d2");
    assert_eq!(platform.modal_dialog_window(), Some(d1));
    assert!(platform.is_window_enabled(d1));

    platform.pop_modal().expect("pop d1");
    assert_eq!(platform.modal_dialog_window(), None);
    assert!(platform.is_window_enabled(main));
    assert!(matches!(
        platform.pop_modal(),
        Err(PlatformError::ModalStackEmpty)
    ));
}

#[test]
fn mouse_capture_follows_the_drag_and_release_restores_natural_routing() {
    // Arrange
    let (mut platform, _probe) = setup();
    frame_with_client(&mut platform);
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let capturing = {
        let log = Rc::clone(&log);
        move |platform: &mut Platform, event: &Event| {
            log.borrow_mut().push(("canvas", event.kind));
            match event.kind {
                EventKind::MouseDown => platform.set_mouse_target(event.window).is_ok(),
                EventKind::MouseUp => platform.set_mouse_target(None).is_ok(),
                _ => true,
            }
        }
    };
    let canvas = platform
        .create_window(WindowConfig::new("Canvas").with_handler(capturing))
        .expect("canvas");
    let other = platform
        .create_window(WindowConfig::new("Other").with_handler(logging_handler("other", &log)))
        .expect("other");
    let canvas_handle = platform.native_handle(canvas);
    let other_handle = platform.native_handle(other);
    log.borrow_mut().clear();

    // Act
    platform.dispatch(EventKind::MouseDown, canvas_handle, 5, 5);
    platform.dispatch(EventKind::MouseMove, other_handle, 300, 40);
    platform.dispatch(EventKind::MouseUp, other_handle, 310, 40);
    platform.dispatch(EventKind::MouseDown, other_handle, 310, 40);

    // Assert
    assert_eq!(
        *log.borrow(),
        vec![
            ("canvas", EventKind::MouseDown),
            ("canvas", EventKind::MouseMove),
            ("canvas", EventKind::MouseUp),
            ("other", EventKind::MouseDown),
        ]
    );
    assert_eq!(platform.redirect_targets().mouse(), None);
}

#[test]
fn destroyed_redirect_target_is_never_delivered_to() {
    let (mut platform, _probe) = setup();
    frame_with_client(&mut platform);
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let target = platform
        .create_window(WindowConfig::new("Target").with_handler(logging_handler("target", &log)))
        .expect("target");
    let other = platform
        .create_window(WindowConfig::new("Other").with_handler(logging_handler("other", &log)))
        .expect("other");
    platform.set_mouse_target(Some(target)).expect("mouse");
    platform.set_menu_target(Some(target)).expect("menu");
    platform.set_key_target(Some(target)).expect("key");

    platform.destroy_window(target).expect("destroy");
    log.borrow_mut().clear();
    let other_handle = platform.native_handle(other);
    platform.dispatch(EventKind::MouseDown, other_handle, 1, 1);
    platform.dispatch(EventKind::KeyDown, other_handle, 65, 0);

    let overrides = platform.redirect_targets();
    assert_eq!(overrides.mouse(), None);
    assert_eq!(overrides.menu(), None);
    assert_eq!(overrides.key(), None);
    assert_eq!(platform.menu_target(), Some(other));
    assert_eq!(
        *log.borrow(),
        vec![("other", EventKind::MouseDown), ("other", EventKind::KeyDown)]
    );
    assert!(matches!(
        platform.set_mouse_target(Some(target)),
        Err(PlatformError::InvalidHandle(_))
    ));
}

#[test]
fn failed_native_creation_rolls_the_registry_back() {
    let (mut platform, probe) = setup();
    frame_with_client(&mut platform);
    let live_before = platform.registry().len();
    let documents_before = platform.documents().len();
    probe.fail_next_creates(1);

    let result = platform.create_window(WindowConfig::new("Doomed"));

    assert!(matches!(result, Err(PlatformError::WindowCreationFailed(_))));
    assert_eq!(platform.registry().len(), live_before);
    assert_eq!(platform.documents().len(), documents_before);
    assert!(
        platform
            .window_menu_entries()
            .iter()
            .all(|entry| entry.label != "Doomed")
    );

    // The next creation goes through again.
    let doc = platform
        .create_window(WindowConfig::new("Recovered"))
        .expect("recovered");
    assert_eq!(platform.documents(), &[doc]);
}

#[test]
fn window_menu_command_activates_its_document_and_moves_the_check_mark() {
    // Arrange
    let (mut platform, probe) = setup();
    let frame = frame_with_client(&mut platform);
    let a = platform
        .create_window(WindowConfig::new("A"))
        .expect("a");
    let b = platform
        .create_window(WindowConfig::new("B"))
        .expect("b");
    assert_eq!(platform.active_window(), Some(b));
    let command_for_a = platform.window_menu_entries()[0].command;

    // Act
    let accepted = platform.dispatch(
        EventKind::Menu,
        platform.native_handle(frame),
        i64::from(command_for_a.0),
        0,
    );

    // Assert
    assert!(accepted);
    assert_eq!(platform.active_window(), Some(a));
    let checked: Vec<(&str, bool)> = platform
        .window_menu_entries()
        .iter()
        .map(|entry| (entry.label.as_str(), entry.checked))
        .collect();
    assert_eq!(checked, vec![("A", true), ("B", false)]);

    let native_bar = probe
        .menu_bar(platform.native_handle(frame).expect("frame handle"))
        .expect("native menu bar");
    let window_menu = &native_bar.menus[0];
    let a_item = window_menu
        .items
        .iter()
        .find(|item| item.label == "A")
        .expect("entry for A");
    assert!(a_item.checked);
    assert!(window_menu.items.iter().any(|item| item.label == "Tile"));
}

#[test]
fn modal_loop_disables_the_frame_and_returns_the_exit_value() {
    let (mut platform, _probe) = setup();
    let frame = platform
        .create_window(WindowConfig::new("Main"))
        .expect("frame");
    let frame_enabled_inside = Rc::new(Cell::new(true));

    let seen = Rc::clone(&frame_enabled_inside);
    let result = platform.enter_modal_loop(
        ASK_DIALOG,
        Some(Box::new(41_i64)),
        move |platform: &mut Platform, event: &Event| {
            if event.kind != EventKind::Null {
                return false;
            }
            seen.set(platform.is_window_enabled(frame));
            let answer = event
                .window
                .and_then(|dialog| platform.user_data::<i64>(dialog).copied())
                .unwrap_or(0);
            platform.exit_modal_loop(answer + 1).is_ok()
        },
    );

    assert_eq!(result.expect("modal result"), 42);
    assert!(!frame_enabled_inside.get());
    assert!(platform.is_window_enabled(frame));
    assert_eq!(platform.modal_depth(), 0);
}

#[test]
fn nested_modal_loops_unwind_innermost_first() {
    let (mut platform, _probe) = setup();
    platform
        .create_window(WindowConfig::new("Main"))
        .expect("frame");
    let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let started_inner = Rc::new(Cell::new(false));

    let outer_order = Rc::clone(&order);
    let outer = move |platform: &mut Platform, event: &Event| {
        if event.kind != EventKind::Null || started_inner.replace(true) {
            return false;
        }
        let inner_order = Rc::clone(&outer_order);
        let inner = platform.enter_modal_loop(
            ASK_DIALOG,
            None,
            move |platform: &mut Platform, event: &Event| {
                if event.kind != EventKind::Null {
                    return false;
                }
                inner_order.borrow_mut().push("inner");
                platform.exit_modal_loop(2).is_ok()
            },
        );
        outer_order.borrow_mut().push("outer");
        let inner = inner.unwrap_or(-1);
        platform.exit_modal_loop(inner * 10).is_ok()
    };

    let result = platform.enter_modal_loop(ASK_DIALOG, None, outer);

    assert_eq!(result.expect("outer result"), 20);
    assert_eq!(*order.borrow(), vec!["inner", "outer"]);
    assert_eq!(platform.modal_depth(), 0);
}

#[test]
fn yielding_from_an_update_handler_is_refused() {
    let (mut platform, _probe) = setup();
    let outcome: Rc<RefCell<Option<Result<(), PlatformError>>>> = Rc::new(RefCell::new(None));
    let seen = Rc::clone(&outcome);
    let window = platform
        .create_window(WindowConfig::new("Main").with_handler(
            move |platform: &mut Platform, event: &Event| {
                if event.kind == EventKind::Update {
                    *seen.borrow_mut() = Some(platform.yield_to_background());
                }
                true
            },
        ))
        .expect("window");

    platform.send_event(EventKind::Update, Some(window), 0, 0);

    assert!(matches!(
        outcome.borrow().as_ref(),
        Some(Err(PlatformError::ReentrantPump(_)))
    ));
    // Outside of an update the same call pumps normally.
    assert!(platform.yield_to_background().is_ok());
}

#[test]
fn vetoed_quit_keeps_the_main_loop_running() {
    let (mut platform, probe) = setup();
    let vetoes = Rc::new(Cell::new(1u32));
    let remaining = Rc::clone(&vetoes);
    platform.set_main_handler(move |_: &mut Platform, event: &Event| {
        if event.kind != EventKind::Quit {
            return false;
        }
        let left = remaining.get();
        remaining.set(left.saturating_sub(1));
        left == 0
    });
    probe.push_event(winroute::NativeEvent::new(EventKind::Quit, None, 9, 0));
    probe.push_event(winroute::NativeEvent::new(EventKind::Quit, None, 3, 0));

    let code = platform.run_main_loop();

    assert_eq!(code, 3);
    assert_eq!(vetoes.get(), 0);
}

#[test]
fn native_activation_moves_the_active_document_and_check_mark() {
    // Arrange
    let (mut platform, probe) = setup();
    let frame = frame_with_client(&mut platform);
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let a = platform
        .create_window(WindowConfig::new("A").with_handler(logging_handler("a", &log)))
        .expect("a");
    let b = platform
        .create_window(WindowConfig::new("B"))
        .expect("b");
    assert_eq!(platform.active_window(), Some(b));
    log.borrow_mut().clear();

    // Act
    platform.dispatch(EventKind::Activate, platform.native_handle(a), 0, 0);

    // Assert
    assert_eq!(platform.active_window(), Some(a));
    let checked: Vec<WindowId> = platform
        .window_menu_entries()
        .iter()
        .filter(|entry| entry.checked)
        .map(|entry| entry.window)
        .collect();
    assert_eq!(checked, vec![a]);
    assert_eq!(*log.borrow(), vec![("a", EventKind::Activate)]);
    let native_bar = probe
        .menu_bar(platform.native_handle(frame).expect("frame handle"))
        .expect("native menu bar");
    let a_item = native_bar.menus[0]
        .items
        .iter()
        .find(|item| item.label == "A")
        .expect("entry for A");
    assert!(a_item.checked);
}

#[test]
fn menu_input_never_reaches_a_document_behind_a_modal_dialog() {
    // Arrange
    let (mut platform, _probe) = setup();
    frame_with_client(&mut platform);
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let doc = platform
        .create_window(WindowConfig::new("Doc").with_handler(logging_handler("doc", &log)))
        .expect("doc");
    let dialog = platform
        .create_window(WindowConfig::new("Dialog").with_type(WindowType::Dialog).hidden())
        .expect("dialog");
    platform.push_modal(Some(dialog)).expect("push");
    log.borrow_mut().clear();

    // Act
    let dialog_handle = platform.native_handle(dialog);
    platform.dispatch(EventKind::Menu, dialog_handle, 42, 0);
    platform.dispatch(EventKind::Menu, None, 43, 0);
    platform.set_menu_target(Some(doc)).expect("menu override");
    platform.dispatch(EventKind::Menu, dialog_handle, 44, 0);

    // Assert
    assert!(log.borrow().is_empty());

    platform.pop_modal().expect("pop");
    platform.dispatch(EventKind::Menu, None, 45, 0);
    assert_eq!(*log.borrow(), vec![("doc", EventKind::Menu)]);
}
