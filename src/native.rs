/*
 * Seam between the core and a native windowing system. The core never calls
 * a platform API directly; it asks a `NativeBackend` for handles and state
 * changes and pulls raw events from it. Handles are opaque to the core and
 * only ever translated back to windows through the registry.
 */
use crate::error::Result as PlatformResult;
use crate::menu::MenuBar;
use crate::resources::ControlTemplate;
use crate::types::{EventKind, NativeHandle, Rect, WindowFlags, WindowState, WindowType};

use std::time::Duration;

/// A raw event as produced by the native layer, before routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeEvent {
    pub kind: EventKind,
    pub target: Option<NativeHandle>,
    pub param1: i64,
    pub param2: i64,
}

impl NativeEvent {
    pub fn new(kind: EventKind, target: Option<NativeHandle>, param1: i64, param2: i64) -> Self {
        Self {
            kind,
            target,
            param1,
            param2,
        }
    }
}

/// Everything the backend needs to create one native window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeWindowSpec {
    pub title: String,
    pub rect: Rect,
    pub window_type: WindowType,
    pub flags: WindowFlags,
    /// Native parent (child windows) or owner (dialogs).
    pub parent: Option<NativeHandle>,
}

pub trait NativeBackend {
    /// Creates a hidden native window.
    fn create_window(&mut self, spec: &NativeWindowSpec) -> PlatformResult<NativeHandle>;

    fn destroy_window(&mut self, handle: NativeHandle) -> PlatformResult<()>;

    fn create_control(
        &mut self,
        parent: NativeHandle,
        template: &ControlTemplate,
    ) -> PlatformResult<NativeHandle>;

    fn show_window(&mut self, handle: NativeHandle, visible: bool) -> PlatformResult<()>;

    fn set_enabled(&mut self, handle: NativeHandle, enabled: bool) -> PlatformResult<()>;

    fn is_enabled(&self, handle: NativeHandle) -> bool;

    /// Brings the window to the front and gives it input focus.
    fn activate(&mut self, handle: NativeHandle) -> PlatformResult<()>;

    /// The window currently holding native input focus.
    fn focused_window(&self) -> Option<NativeHandle>;

    /// Live windows, frontmost first.
    fn z_order(&self) -> Vec<NativeHandle>;

    fn set_title(&mut self, handle: NativeHandle, title: &str) -> PlatformResult<()>;

    fn content_rect(&self, handle: NativeHandle) -> PlatformResult<Rect>;

    fn set_content_rect(&mut self, handle: NativeHandle, rect: Rect) -> PlatformResult<()>;

    fn set_window_state(&mut self, handle: NativeHandle, state: WindowState)
    -> PlatformResult<()>;

    fn apply_menu_bar(&mut self, handle: NativeHandle, menu_bar: &MenuBar) -> PlatformResult<()>;

    /// Next pending native event, waiting at most `wait` for one to arrive.
    /// `Duration::ZERO` never blocks.
    fn poll_event(&mut self, wait: Duration) -> Option<NativeEvent>;
}
