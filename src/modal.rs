/*
 * Modal dialogs and event loops.
 *
 * `push_modal` disables every visible, enabled top-level or floating window
 * (except the dialog) and remembers exactly which ones it touched; `pop_modal`
 * re-enables those, innermost context first. Windows that were already
 * disabled are never recorded, so a balanced push/pop sequence restores the
 * prior enablement of every window.
 *
 * Loops are tracked on an explicit stack of loop contexts: the main loop at
 * the bottom, one modal context per running `enter_modal_loop`. A nested modal
 * loop still runs on the caller's stack frame (the outer handler stays
 * suspended until the dialog is dismissed), but termination is decided by the
 * context's recorded result, so `exit_modal_loop` only ever ends the innermost
 * loop.
 */
use crate::app::Platform;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::handler::EventProcedure;
use crate::native::NativeEvent;
use crate::types::{EventKind, ResourceId, WindowConfig, WindowId, WindowType};

use std::any::Any;
use std::time::Duration;

// Upper bound for one `yield_to_background` drain, so handlers that keep
// posting events cannot starve the caller.
const MAX_EVENTS_PER_YIELD: usize = 256;

#[derive(Debug)]
pub(crate) struct ModalContext {
    dialog: Option<WindowId>,
    disabled: Vec<WindowId>,
}

#[derive(Debug, Default)]
pub struct ModalStack {
    contexts: Vec<ModalContext>,
}

impl ModalStack {
    pub fn depth(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Dialog of the innermost context.
    pub fn top_dialog(&self) -> Option<WindowId> {
        self.contexts.last().and_then(|context| context.dialog)
    }

    fn push(&mut self, context: ModalContext) {
        self.contexts.push(context);
    }

    fn pop(&mut self) -> Option<ModalContext> {
        self.contexts.pop()
    }

    pub(crate) fn forget_dialog(&mut self, window: WindowId) {
        for context in &mut self.contexts {
            if context.dialog == Some(window) {
                log::warn!("Modal: dialog {window:?} destroyed while its context is still pushed");
                context.dialog = None;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopKind {
    Main,
    Modal { dialog: WindowId },
}

#[derive(Debug)]
struct LoopContext {
    kind: LoopKind,
    result: Option<i64>,
}

#[derive(Debug, Default)]
pub(crate) struct LoopStack {
    contexts: Vec<LoopContext>,
}

impl LoopStack {
    fn push(&mut self, kind: LoopKind) -> usize {
        self.contexts.push(LoopContext { kind, result: None });
        self.contexts.len() - 1
    }

    fn result(&self, index: usize) -> Option<i64> {
        self.contexts.get(index).and_then(|context| context.result)
    }

    fn pop(&mut self, index: usize) {
        debug_assert_eq!(self.contexts.len(), index + 1, "loop contexts unwind in LIFO order");
        self.contexts.truncate(index);
    }

    pub(crate) fn depth(&self) -> usize {
        self.contexts.len()
    }

    pub(crate) fn innermost_modal_dialog(&self) -> Option<WindowId> {
        self.contexts.iter().rev().find_map(|context| match context.kind {
            LoopKind::Modal { dialog } => Some(dialog),
            LoopKind::Main => None,
        })
    }

    fn end_innermost_modal(&mut self, result: i64) -> bool {
        match self
            .contexts
            .iter_mut()
            .rev()
            .find(|context| matches!(context.kind, LoopKind::Modal { .. }))
        {
            Some(context) => {
                context.result = Some(result);
                true
            }
            None => false,
        }
    }

    /// Marks the outermost main loop finished. Returns `false` if none runs.
    pub(crate) fn end_main(&mut self, result: i64) -> bool {
        match self
            .contexts
            .iter_mut()
            .find(|context| context.kind == LoopKind::Main)
        {
            Some(context) => {
                context.result = Some(result);
                true
            }
            None => false,
        }
    }
}

impl Platform {
    /*
     * Opens a modal context. With a dialog, the dialog is shown and activated
     * after everything else has been disabled.
     */
    pub fn push_modal(&mut self, dialog: Option<WindowId>) -> PlatformResult<()> {
        if let Some(id) = dialog {
            self.live_handle(id)?;
        }

        let mut disabled = Vec::new();
        for handle in self.backend.z_order() {
            let Some(id) = self.registry.lookup_by_handle(handle) else {
                continue;
            };
            if Some(id) == dialog {
                continue;
            }
            let Some(record) = self.registry.get(id) else {
                continue;
            };
            let top_level =
                record.parent().is_none() || record.window_type() == WindowType::Floating;
            if !top_level || !record.is_visible() || !self.backend.is_enabled(handle) {
                continue;
            }
            match self.backend.set_enabled(handle, false) {
                Ok(()) => disabled.push(id),
                Err(err) => log::error!("Modal: failed to disable {id:?}: {err}"),
            }
        }
        log::debug!(
            "Modal: push #{} for {dialog:?}, disabled {} window(s)",
            self.modal.depth() + 1,
            disabled.len()
        );
        self.modal.push(ModalContext { dialog, disabled });

        if let Some(id) = dialog {
            self.show_window(id, true)?;
            self.activate_window(id)?;
        }
        Ok(())
    }

    /// Closes the innermost modal context, re-enabling what its push disabled.
    pub fn pop_modal(&mut self) -> PlatformResult<()> {
        let context = self.modal.pop().ok_or_else(|| {
            log::warn!("Modal: pop_modal without a matching push_modal");
            PlatformError::ModalStackEmpty
        })?;
        for id in context.disabled.iter().rev() {
            match self.registry.native_handle(*id) {
                Some(handle) => {
                    if let Err(err) = self.backend.set_enabled(handle, true) {
                        log::error!("Modal: failed to re-enable {id:?}: {err}");
                    }
                }
                None => log::trace!("Modal: {id:?} destroyed while disabled, skipping"),
            }
        }
        log::debug!(
            "Modal: pop for {:?}, re-enabled {} window(s)",
            context.dialog,
            context.disabled.len()
        );

        if let Some(outer) = self.modal.top_dialog()
            && self.registry.is_live(outer)
            && let Err(err) = self.activate_window(outer)
        {
            log::warn!("Modal: could not reactivate outer dialog {outer:?}: {err}");
        }
        Ok(())
    }

    /// Dialog of the innermost pushed context, none when the stack is empty.
    pub fn modal_dialog_window(&self) -> Option<WindowId> {
        self.modal.top_dialog()
    }

    pub fn modal_depth(&self) -> usize {
        self.modal.depth()
    }

    /*
     * Creates a dialog from a template, runs a nested event loop with
     * `procedure` as the dialog's handler until the handler calls
     * `exit_modal_loop`, then pops the modal context, destroys the dialog and
     * returns the result.
     */
    pub fn enter_modal_loop(
        &mut self,
        resource_id: ResourceId,
        user_data: Option<Box<dyn Any>>,
        procedure: impl EventProcedure + 'static,
    ) -> PlatformResult<i64> {
        let template = self.resources.dialog(resource_id)?.clone();
        let mut config = WindowConfig::new(template.title.clone())
            .with_type(WindowType::Dialog)
            .with_class(template.class_id)
            .with_rect(template.rect)
            .with_flags(template.flags)
            .with_handler(procedure)
            .hidden();
        config.user_data = user_data;
        let dialog = self.create_window(config)?;

        for control in &template.controls {
            if let Err(err) = self.add_control(dialog, control) {
                log::error!("Modal: control {} of {resource_id:?} failed: {err}", control.id.raw());
                self.destroy_window(dialog)?;
                return Err(err);
            }
        }
        if let Err(err) = self.push_modal(Some(dialog)) {
            self.destroy_window(dialog)?;
            return Err(err);
        }

        let index = self.loops.push(LoopKind::Modal { dialog });
        log::debug!("Modal: entering loop for {dialog:?} at depth {}", self.loops.depth());
        let outcome = loop {
            if let Some(result) = self.loops.result(index) {
                break Ok(result);
            }
            if !self.registry.is_live(dialog) {
                log::warn!("Modal: {dialog:?} destroyed without exit_modal_loop");
                break Err(PlatformError::ModalDialogDestroyed(dialog));
            }
            self.pump_once();
        };
        self.loops.pop(index);

        if let Err(err) = self.pop_modal() {
            log::error!("Modal: unbalanced pop after loop for {dialog:?}: {err}");
        }
        if self.registry.contains(dialog) {
            self.destroy_window(dialog)?;
        }
        log::debug!("Modal: left loop for {dialog:?} with {outcome:?}");
        outcome
    }

    /// Ends the innermost modal loop with `result`.
    pub fn exit_modal_loop(&mut self, result: i64) -> PlatformResult<()> {
        if self.loops.end_innermost_modal(result) {
            Ok(())
        } else {
            log::warn!("Modal: exit_modal_loop({result}) with no modal loop running");
            Err(PlatformError::NoModalLoop)
        }
    }

    /// Pumps events until an accepted `Quit`; returns its exit code.
    pub fn run_main_loop(&mut self) -> i64 {
        let index = self.loops.push(LoopKind::Main);
        log::debug!("Platform: main loop started");
        let result = loop {
            if let Some(result) = self.loops.result(index) {
                break result;
            }
            self.pump_once();
        };
        self.loops.pop(index);
        log::debug!("Platform: main loop ended with {result}");
        result
    }

    /*
     * Asks the main procedure to quit. The request is an ordinary `Quit` event
     * and the handler may veto it, in which case the loop keeps running.
     */
    pub fn exit_main_loop(&mut self, result: i64) -> bool {
        let accepted = self.send_event(EventKind::Quit, None, result, 0);
        if !accepted {
            log::debug!("Platform: quit({result}) vetoed");
        }
        accepted
    }

    /*
     * Lets idle, activation and update processing run during long work. The
     * helper pumps events itself, so it refuses to run from inside an update
     * or suspend/resume handler, where that would recurse without end.
     */
    pub fn yield_to_background(&mut self) -> PlatformResult<()> {
        for kind in [EventKind::Update, EventKind::Suspend, EventKind::Resume] {
            if self.is_dispatching(kind) {
                log::error!("Platform: yield_to_background called from a {kind:?} handler");
                return Err(PlatformError::ReentrantPump(format!("{kind:?}")));
            }
        }
        let mut processed = 0;
        while processed < MAX_EVENTS_PER_YIELD {
            let Some(event) = self.next_event(Duration::ZERO) else {
                break;
            };
            self.dispatch_native(event);
            processed += 1;
        }
        self.dispatch_idle();
        Ok(())
    }

    /// One pump iteration: the next pending event, or a synthesized idle event.
    pub(crate) fn pump_once(&mut self) {
        match self.next_event(self.config.idle_interval) {
            Some(event) => self.dispatch_native(event),
            None => self.dispatch_idle(),
        }
    }

    fn next_event(&mut self, wait: Duration) -> Option<NativeEvent> {
        self.posted
            .pop_front()
            .or_else(|| self.backend.poll_event(wait))
    }

    fn dispatch_native(&mut self, event: NativeEvent) {
        self.dispatch(event.kind, event.target, event.param1, event.param2);
    }

    /// Idle events go to the innermost modal dialog, else app-level.
    fn dispatch_idle(&mut self) {
        let target = self
            .loops
            .innermost_modal_dialog()
            .filter(|dialog| self.registry.is_live(*dialog));
        self.send_event(EventKind::Null, target, 0, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessBackend, HeadlessProbe};
    use crate::resources::DialogTemplate;
    use crate::types::{Event, PlatformConfig, Rect};

    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn setup() -> (Platform, HeadlessProbe) {
        let (backend, probe) = HeadlessBackend::with_probe();
        let mut platform = Platform::with_backend(PlatformConfig::new("modal-tests"), backend);
        platform.resources_mut().insert_dialog(
            ResourceId(1),
            DialogTemplate::new("Confirm", Rect::new(0, 0, 200, 100)),
        );
        (platform, probe)
    }

    fn dialog(platform: &mut Platform, title: &str) -> WindowId {
        platform
            .create_window(
                WindowConfig::new(title)
                    .with_type(WindowType::Dialog)
                    .hidden(),
            )
            .unwrap()
    }

    #[test]
    fn modal_dialog_window_tracks_innermost_context() {
        let (mut platform, _probe) = setup();
        platform.create_window(WindowConfig::new("Frame")).unwrap();
        let d1 = dialog(&mut platform, "D1");
        let d2 = dialog(&mut platform, "D2");

        platform.push_modal(Some(d1)).unwrap();
        assert_eq!(platform.modal_dialog_window(), Some(d1));
        platform.push_modal(Some(d2)).unwrap();
        assert_eq!(platform.modal_dialog_window(), Some(d2));
        platform.pop_modal().unwrap();
        assert_eq!(platform.modal_dialog_window(), Some(d1));
        platform.pop_modal().unwrap();
        assert_eq!(platform.modal_dialog_window(), None);
    }

    #[test]
    fn push_pop_restores_prior_enablement_including_disabled_windows() {
        // Arrange
        let (mut platform, probe) = setup();
        let frame = platform.create_window(WindowConfig::new("Frame")).unwrap();
        let palette = platform
            .create_window(WindowConfig::new("Palette").with_type(WindowType::Floating))
            .unwrap();
        let other = dialog(&mut platform, "Modeless");
        let other_handle = platform.native_handle(other).unwrap();
        platform.show_window(other, true).unwrap();
        platform.set_window_enabled(other, false).unwrap();
        let d1 = dialog(&mut platform, "D1");
        let d2 = dialog(&mut platform, "D2");
        let handles: Vec<_> = [frame, palette, other, d1, d2]
            .iter()
            .map(|id| platform.native_handle(*id).unwrap())
            .collect();
        let before: Vec<_> = handles.iter().map(|h| probe.is_enabled(*h)).collect();
        // Act
        platform.push_modal(Some(d1)).unwrap();
        assert!(!probe.is_enabled(handles[0]));
        assert!(!probe.is_enabled(handles[1]));
        assert!(probe.is_enabled(handles[3]));
        platform.push_modal(Some(d2)).unwrap();
        assert!(!probe.is_enabled(handles[3]));
        platform.push_modal(None).unwrap();
        platform.pop_modal().unwrap();
        platform.pop_modal().unwrap();
        assert!(probe.is_enabled(handles[3]));
        platform.pop_modal().unwrap();
        // Assert
        let after: Vec<_> = handles.iter().map(|h| probe.is_enabled(*h)).collect();
        assert_eq!(before, after);
        assert!(!probe.is_enabled(other_handle));
    }

    #[test]
    fn unmatched_pop_is_an_error() {
        let (mut platform, _probe) = setup();
        assert!(matches!(
            platform.pop_modal(),
            Err(PlatformError::ModalStackEmpty)
        ));
    }

    #[test]
    fn input_to_disabled_frame_is_dropped_until_pop() {
        let (mut platform, _probe) = setup();
        let clicks = Rc::new(Cell::new(0));
        let frame = platform
            .create_window(WindowConfig::new("Frame").with_handler({
                let clicks = Rc::clone(&clicks);
                move |_: &mut Platform, event: &Event| {
                    if event.kind == EventKind::MouseDown {
                        clicks.set(clicks.get() + 1);
                    }
                    true
                }
            }))
            .unwrap();
        let handle = platform.native_handle(frame).unwrap();
        let d1 = dialog(&mut platform, "D1");

        platform.push_modal(Some(d1)).unwrap();
        assert!(!platform.dispatch(EventKind::MouseDown, Some(handle), 1, 1));
        platform.pop_modal().unwrap();
        assert!(platform.dispatch(EventKind::MouseDown, Some(handle), 1, 1));
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn modal_loop_returns_result_and_destroys_dialog() {
        let (mut platform, probe) = setup();
        let frame = platform.create_window(WindowConfig::new("Frame")).unwrap();
        let frame_handle = platform.native_handle(frame).unwrap();
        let seen_dialog = Rc::new(Cell::new(None));

        let result = platform
            .enter_modal_loop(ResourceId(1), Some(Box::new(7i64)), {
                let seen_dialog = Rc::clone(&seen_dialog);
                move |platform: &mut Platform, event: &Event| {
                    if event.kind == EventKind::Null {
                        let dialog = event.window.unwrap();
                        seen_dialog.set(Some(dialog));
                        assert!(!platform.is_window_enabled(platform.frame().unwrap()));
                        let payload = *platform.user_data::<i64>(dialog).unwrap();
                        platform.exit_modal_loop(payload * 6).unwrap();
                    }
                    false
                }
            })
            .unwrap();

        assert_eq!(result, 42);
        let dialog = seen_dialog.get().unwrap();
        assert!(platform.window(dialog).is_none());
        assert_eq!(platform.modal_depth(), 0);
        assert!(probe.is_enabled(frame_handle));
    }

    #[test]
    fn nested_modal_loops_unwind_innermost_first() {
        let (mut platform, _probe) = setup();
        platform.create_window(WindowConfig::new("Frame")).unwrap();
        let order = Rc::new(RefCell::new(Vec::new()));

        let outer = platform
            .enter_modal_loop(ResourceId(1), None, {
                let order = Rc::clone(&order);
                move |platform: &mut Platform, event: &Event| {
                    if event.kind != EventKind::Null {
                        return false;
                    }
                    let inner = platform
                        .enter_modal_loop(ResourceId(1), None, {
                            let order = Rc::clone(&order);
                            move |platform: &mut Platform, event: &Event| {
                                if event.kind == EventKind::Null {
                                    assert_eq!(platform.modal_depth(), 2);
                                    order.borrow_mut().push("inner");
                                    platform.exit_modal_loop(2).unwrap();
                                }
                                false
                            }
                        })
                        .unwrap();
                    order.borrow_mut().push("outer");
                    assert_eq!(platform.modal_depth(), 1);
                    platform.exit_modal_loop(inner * 10).unwrap();
                    false
                }
            })
            .unwrap();

        assert_eq!(outer, 20);
        assert_eq!(*order.borrow(), vec!["inner", "outer"]);
        assert_eq!(platform.modal_depth(), 0);
    }

    #[test]
    fn modal_loop_reports_dialog_destroyed_without_exit() {
        let (mut platform, _probe) = setup();
        platform.create_window(WindowConfig::new("Frame")).unwrap();

        let result = platform.enter_modal_loop(ResourceId(1), None, |platform: &mut Platform, event: &Event| {
            if event.kind == EventKind::Null {
                let dialog = event.window.unwrap();
                platform.destroy_window(dialog).unwrap();
            }
            false
        });

        assert!(matches!(result, Err(PlatformError::ModalDialogDestroyed(_))));
        assert_eq!(platform.modal_depth(), 0);
    }

    #[test]
    fn missing_dialog_resource_fails_before_anything_is_created() {
        let (mut platform, probe) = setup();
        let before = probe.window_count();

        let result = platform.enter_modal_loop(ResourceId(99), None, |_: &mut Platform, _: &Event| true);

        assert!(matches!(result, Err(PlatformError::ResourceNotFound(_))));
        assert_eq!(probe.window_count(), before);
    }

    #[test]
    fn exit_modal_loop_without_loop_is_an_error() {
        let (mut platform, _probe) = setup();
        assert!(matches!(
            platform.exit_modal_loop(1),
            Err(PlatformError::NoModalLoop)
        ));
    }

    #[test]
    fn main_loop_honours_quit_veto() {
        let (mut platform, _probe) = setup();
        let idles = Rc::new(Cell::new(0));
        platform.set_main_handler({
            let idles = Rc::clone(&idles);
            move |platform: &mut Platform, event: &Event| match event.kind {
                EventKind::Null => {
                    idles.set(idles.get() + 1);
                    platform.exit_main_loop(idles.get());
                    true
                }
                // Veto the first two quit requests.
                EventKind::Quit => event.param1 >= 3,
                _ => true,
            }
        });

        let code = platform.run_main_loop();

        assert_eq!(code, 3);
        assert_eq!(idles.get(), 3);
    }

    #[test]
    fn posted_events_are_processed_before_idle() {
        let (mut platform, probe) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        platform.set_main_handler({
            let seen = Rc::clone(&seen);
            move |platform: &mut Platform, event: &Event| {
                seen.borrow_mut().push(event.kind);
                if event.kind == EventKind::Null {
                    platform.exit_main_loop(0);
                }
                true
            }
        });
        probe.push_event(NativeEvent::new(EventKind::KeyDown, None, 1, 0));
        platform.post_event(NativeEvent::new(EventKind::Char, None, 1, 0));

        platform.run_main_loop();

        assert_eq!(
            *seen.borrow(),
            vec![
                EventKind::Char,
                EventKind::KeyDown,
                EventKind::Null,
                EventKind::Quit
            ]
        );
    }

    #[test]
    fn yield_from_update_handler_is_refused() {
        let (mut platform, _probe) = setup();
        let outcome = Rc::new(RefCell::new(None));
        let frame = platform
            .create_window(WindowConfig::new("Frame").with_handler({
                let outcome = Rc::clone(&outcome);
                move |platform: &mut Platform, event: &Event| {
                    if event.kind == EventKind::Update {
                        *outcome.borrow_mut() = Some(platform.yield_to_background());
                    }
                    true
                }
            }))
            .unwrap();

        platform.send_event(EventKind::Update, Some(frame), 0, 0);

        assert!(matches!(
            outcome.borrow_mut().take(),
            Some(Err(PlatformError::ReentrantPump(_)))
        ));
    }

    #[test]
    fn yield_drains_pending_events_and_idles_once() {
        let (mut platform, probe) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        platform.set_main_handler({
            let seen = Rc::clone(&seen);
            move |_: &mut Platform, event: &Event| {
                seen.borrow_mut().push(event.kind);
                true
            }
        });
        probe.push_event(NativeEvent::new(EventKind::KeyDown, None, 1, 0));
        probe.push_event(NativeEvent::new(EventKind::KeyUp, None, 1, 0));

        platform.yield_to_background().unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![EventKind::KeyDown, EventKind::KeyUp, EventKind::Null]
        );
    }
}
