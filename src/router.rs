/*
 * Event routing. Every event, native or synthesized, goes through the same
 * pipeline:
 *
 *   1. resolve the addressed window through the registry (none => app level);
 *   2. drop input addressed to a disabled window;
 *   3. apply the menu/mouse/key redirection overrides;
 *   4. call the window's own procedure, or the main procedure;
 *   5. perform the default action when the handler accepted a close,
 *      maximize, minimize, restore or quit event.
 *
 * Menu events accepted by a window procedure are delivered a second time to
 * the main procedure. No other kind is re-delivered.
 */
use crate::app::Platform;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::frame::is_window_menu_command;
use crate::redirect::{KeyTarget, RedirectTargets};
use crate::types::{
    ControlId, DefaultAction, Event, EventKind, MenuItemId, NativeHandle, WindowId,
};

impl Platform {
    /*
     * Native entry point. `target` is the native handle the event was
     * addressed to; an unknown handle is treated like no handle at all.
     * Returns the accepting handler's verdict, `false` when the event was
     * dropped.
     */
    pub fn dispatch(
        &mut self,
        kind: EventKind,
        target: Option<NativeHandle>,
        param1: i64,
        param2: i64,
    ) -> bool {
        let addressed = target.and_then(|handle| {
            let window = self.registry.lookup_by_handle(handle);
            if window.is_none() {
                log::trace!("Router: {kind:?} for unknown native handle {handle}, routing app-level");
            }
            window
        });
        self.route(kind, addressed, param1, param2)
    }

    /// Same pipeline for events synthesized by the core or by collaborators.
    pub fn send_event(
        &mut self,
        kind: EventKind,
        window: Option<WindowId>,
        param1: i64,
        param2: i64,
    ) -> bool {
        if let Some(id) = window
            && !self.registry.is_live(id)
        {
            log::warn!("Router: {kind:?} sent to {id:?}, which is not a live window. Dropping.");
            return false;
        }
        self.route(kind, window, param1, param2)
    }

    fn route(
        &mut self,
        kind: EventKind,
        addressed: Option<WindowId>,
        param1: i64,
        param2: i64,
    ) -> bool {
        if kind.is_input()
            && let Some(id) = addressed
            && self.is_input_blocked(id)
        {
            log::trace!("Router: {kind:?} for disabled {id:?} dropped");
            return false;
        }

        if kind == EventKind::Menu {
            let command = MenuItemId(param1 as i32);
            if is_window_menu_command(command)
                && let Some(document) = self.frame_client.window_for_command(command)
            {
                if self.is_input_blocked(document) {
                    log::trace!("Router: window-menu command for disabled {document:?} dropped");
                    return false;
                }
                log::debug!("Router: window-menu command {command:?} activates {document:?}");
                if let Err(err) = self.activate_window(document) {
                    log::error!("Router: activating {document:?} from window menu failed: {err}");
                    return false;
                }
                return true;
            }
        }

        let event = self.resolve_target(kind, addressed, param1, param2);
        if kind.is_input()
            && let Some(id) = event.window
            && event.window != addressed
            && self.is_input_blocked(id)
        {
            log::trace!("Router: {kind:?} redirected to disabled {id:?} dropped");
            return false;
        }
        if kind == EventKind::Activate
            && let Some(id) = event.window
        {
            self.note_document_activation(id);
        }
        self.deliver(event)
    }

    /*
     * Activation reported by the native side (a click on a document) moves
     * the client's active document and the window-menu check mark. The event
     * itself is delivered once, by the caller.
     */
    fn note_document_activation(&mut self, id: WindowId) {
        if !self.frame_client.is_document(id)
            || self.frame_client.active() == Some(id)
            || !self.is_window_visible(id)
        {
            return;
        }
        log::debug!("Router: native activation makes {id:?} the active document");
        self.frame_client.set_active(Some(id));
        self.sync_window_menu();
    }

    fn resolve_target(
        &self,
        kind: EventKind,
        addressed: Option<WindowId>,
        param1: i64,
        param2: i64,
    ) -> Event {
        if kind == EventKind::Menu {
            return Event::new(kind, self.menu_target().or(addressed), param1, param2);
        }
        if kind.is_mouse() {
            return Event::new(kind, self.redirect.mouse().or(addressed), param1, param2);
        }
        if kind.is_key() {
            return match self.redirect.key() {
                Some(KeyTarget::Window(window)) => Event::new(kind, Some(window), param1, param2),
                // The key code moves to param2; param1 names the control.
                Some(KeyTarget::Control(window, control)) => Event::new(
                    EventKind::Control,
                    Some(window),
                    i64::from(control.raw()),
                    param1,
                ),
                None => Event::new(kind, addressed, param1, param2),
            };
        }
        Event::new(kind, addressed, param1, param2)
    }

    fn deliver(&mut self, event: Event) -> bool {
        let in_flight = (event.window, event.kind);
        if event.kind.default_action().is_some() && self.in_flight.contains(&in_flight) {
            log::error!(
                "Router: {:?} for {:?} re-entered from its own handler. Refusing to cycle.",
                event.kind,
                event.window
            );
            return false;
        }

        self.in_flight.push(in_flight);
        let accepted = self.invoke_handlers(&event);
        if accepted && let Some(action) = event.kind.default_action() {
            self.perform_default_action(action, &event);
        }
        self.in_flight.pop();
        accepted
    }

    fn invoke_handlers(&mut self, event: &Event) -> bool {
        let window_procedure = event
            .window
            .and_then(|id| self.registry.get(id))
            .and_then(|record| record.handler().procedure());

        let Some(window_procedure) = window_procedure else {
            return match self.main_handler.clone() {
                Some(main) => main.handle_event(self, event),
                None => {
                    if event.kind == EventKind::Null {
                        log::trace!("Router: idle event with no handler installed");
                    } else {
                        log::warn!(
                            "Router: no handler reachable for {:?} ({:?}). Dropping.",
                            event.kind,
                            event.window
                        );
                    }
                    false
                }
            };
        };

        let accepted = window_procedure.handle_event(self, event);
        if accepted && event.kind == EventKind::Menu {
            if let Some(main) = self.main_handler.clone() {
                log::trace!("Router: menu item {} re-delivered to main handler", event.param1);
                main.handle_event(self, event);
            }
        }
        accepted
    }

    fn perform_default_action(&mut self, action: DefaultAction, event: &Event) {
        match action {
            DefaultAction::Destroy => {
                let Some(id) = event.window else {
                    return;
                };
                if self.registry.contains(id)
                    && let Err(err) = self.destroy_window(id)
                {
                    log::error!("Router: default close of {id:?} failed: {err}");
                }
            }
            DefaultAction::SetState(state) => {
                let Some(handle) = event.window.and_then(|id| self.registry.native_handle(id))
                else {
                    return;
                };
                if let Err(err) = self.backend.set_window_state(handle, state) {
                    log::error!("Router: applying {state:?} to {handle} failed: {err}");
                }
            }
            DefaultAction::EndMainLoop => {
                if !self.loops.end_main(event.param1) {
                    log::debug!("Router: quit accepted but no main loop is running");
                }
            }
        }
    }

    /// Input is blocked when the window or any logical ancestor is disabled.
    fn is_input_blocked(&self, id: WindowId) -> bool {
        let mut current = Some(id);
        while let Some(window) = current {
            let Some(record) = self.registry.get(window) else {
                return false;
            };
            if let Some(handle) = record.native_handle()
                && !self.backend.is_enabled(handle)
            {
                return true;
            }
            current = record.parent();
        }
        false
    }

    fn focus_window(&self) -> Option<WindowId> {
        self.backend
            .focused_window()
            .and_then(|handle| self.registry.lookup_by_handle(handle))
    }

    /*
     * Natural menu target: the active document, else the frontmost visible
     * document-class window.
     */
    fn natural_menu_target(&self) -> Option<WindowId> {
        if let Some(active) = self.frame_client.active()
            && self.registry.is_live(active)
        {
            return Some(active);
        }
        self.backend
            .z_order()
            .into_iter()
            .filter_map(|handle| self.registry.lookup_by_handle(handle))
            .find(|id| {
                self.registry.get(*id).is_some_and(|record| {
                    record.is_visible() && record.window_type().is_document_class()
                })
            })
    }

    /// Effective menu target: the override when set, else the natural one.
    pub fn menu_target(&self) -> Option<WindowId> {
        self.redirect.menu().or_else(|| self.natural_menu_target())
    }

    /// Effective mouse target: the override when set, else the focus window.
    pub fn mouse_target(&self) -> Option<WindowId> {
        self.redirect.mouse().or_else(|| self.focus_window())
    }

    /// Effective key target: the override when set, else the focus window.
    pub fn key_target(&self) -> Option<KeyTarget> {
        self.redirect
            .key()
            .or_else(|| self.focus_window().map(KeyTarget::Window))
    }

    /// The raw overrides, without natural fallbacks.
    pub fn redirect_targets(&self) -> &RedirectTargets {
        &self.redirect
    }

    pub fn set_menu_target(&mut self, target: Option<WindowId>) -> PlatformResult<()> {
        self.ensure_live_target(target)?;
        log::debug!("Redirect: menu target set to {target:?}");
        self.redirect.set_menu(target);
        Ok(())
    }

    pub fn set_mouse_target(&mut self, target: Option<WindowId>) -> PlatformResult<()> {
        self.ensure_live_target(target)?;
        log::trace!("Redirect: mouse target set to {target:?}");
        self.redirect.set_mouse(target);
        Ok(())
    }

    pub fn set_key_target(&mut self, target: Option<WindowId>) -> PlatformResult<()> {
        self.ensure_live_target(target)?;
        log::debug!("Redirect: key target set to {target:?}");
        self.redirect.set_key(target.map(KeyTarget::Window));
        Ok(())
    }

    /// Redirects keys to one control; they arrive as `Control` events at its window.
    pub fn set_key_target_control(
        &mut self,
        window: WindowId,
        control: ControlId,
    ) -> PlatformResult<()> {
        self.ensure_live_target(Some(window))?;
        let has_control = self
            .registry
            .get(window)
            .is_some_and(|record| record.has_control(control));
        if !has_control {
            return Err(PlatformError::InvalidHandle(format!(
                "Control ID {} not found in {window:?}",
                control.raw()
            )));
        }
        log::debug!(
            "Redirect: key target set to control {} of {window:?}",
            control.raw()
        );
        self.redirect.set_key(Some(KeyTarget::Control(window, control)));
        Ok(())
    }

    fn ensure_live_target(&self, target: Option<WindowId>) -> PlatformResult<()> {
        match target {
            Some(id) if !self.registry.is_live(id) => Err(PlatformError::InvalidHandle(format!(
                "{id:?} is not a live window"
            ))),
            _ => Ok(()),
        }
    }

    /// Currently dispatching an event of `kind`, at any nesting depth.
    pub(crate) fn is_dispatching(&self, kind: EventKind) -> bool {
        self.in_flight.iter().any(|(_, k)| *k == kind)
    }
}
