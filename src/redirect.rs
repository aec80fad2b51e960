/*
 * The three redirection overrides consulted by the router. Each is a weak
 * reference: it names a window (or a control inside one) but owns nothing, and
 * window destruction calls `forget_window` so no target outlives its window.
 *
 * Overrides persist until cleared. A caller that redirects the mouse on a
 * press owns clearing it again on the release.
 */
use crate::types::{ControlId, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTarget {
    Window(WindowId),
    Control(WindowId, ControlId),
}

impl KeyTarget {
    pub fn window(self) -> WindowId {
        match self {
            KeyTarget::Window(window) | KeyTarget::Control(window, _) => window,
        }
    }
}

#[derive(Debug, Default)]
pub struct RedirectTargets {
    menu: Option<WindowId>,
    mouse: Option<WindowId>,
    key: Option<KeyTarget>,
}

impl RedirectTargets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn menu(&self) -> Option<WindowId> {
        self.menu
    }

    pub fn mouse(&self) -> Option<WindowId> {
        self.mouse
    }

    pub fn key(&self) -> Option<KeyTarget> {
        self.key
    }

    pub(crate) fn set_menu(&mut self, target: Option<WindowId>) {
        self.menu = target;
    }

    pub(crate) fn set_mouse(&mut self, target: Option<WindowId>) {
        self.mouse = target;
    }

    pub(crate) fn set_key(&mut self, target: Option<KeyTarget>) {
        self.key = target;
    }

    /// Clears every override that references `window`. Returns whether any did.
    pub(crate) fn forget_window(&mut self, window: WindowId) -> bool {
        let mut cleared = false;
        if self.menu == Some(window) {
            self.menu = None;
            cleared = true;
        }
        if self.mouse == Some(window) {
            self.mouse = None;
            cleared = true;
        }
        if self.key.is_some_and(|key| key.window() == window) {
            self.key = None;
            cleared = true;
        }
        if cleared {
            log::debug!("Redirect: cleared targets referencing destroyed {window:?}");
        }
        cleared
    }
}
