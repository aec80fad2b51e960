/*
 * Platform-agnostic types shared by every part of the core: logical ids,
 * the event vocabulary that flows through the router, window creation
 * descriptions and the process-level configuration. Nothing in here touches a
 * native API, so these types are available and testable on every target.
 */
use crate::handler::{EventProcedure, WindowHandler};

use std::any::Any;
use std::fmt;
use std::time::Duration;

slotmap::new_key_type! {
    /// Logical id of a registered window. Generational: ids of destroyed
    /// windows never resolve again, even after their slot is reused.
    pub struct WindowId;
}

/// Opaque native window handle as handed out by a `NativeBackend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(pub u64);

impl NativeHandle {
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Caller-chosen window class. Not unique; used to look up windows of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClassId(pub u32);

/// Logical id of a control inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(i32);

impl ControlId {
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }
}

/// Command id carried by a menu item and delivered as `param1` of menu events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuItemId(pub i32);

/// Key into the `ResourceTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        let right = i64::from(self.x) + i64::from(self.width);
        let bottom = i64::from(self.y) + i64::from(self.height);
        px >= self.x && py >= self.y && i64::from(px) < right && i64::from(py) < bottom
    }
}

/// Every event kind the router understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Synthesized by the pump when nothing else is pending.
    Null,
    Create,
    Destroy,
    Close,
    Maximize,
    Minimize,
    Restore,
    Activate,
    Deactivate,
    Show,
    Hide,
    Update,
    Resize,
    Move,
    Menu,
    MouseDown,
    MouseUp,
    MouseMove,
    MouseDoubleClick,
    KeyDown,
    KeyUp,
    Char,
    /// A key event retargeted at a specific control (`param1` = control id).
    Control,
    Suspend,
    Resume,
    /// Application-level request to leave the main loop (`param1` = exit code).
    Quit,
}

/// Native side effect the router performs when a handler accepts an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultAction {
    Destroy,
    SetState(WindowState),
    EndMainLoop,
}

impl EventKind {
    pub fn is_mouse(self) -> bool {
        matches!(
            self,
            EventKind::MouseDown
                | EventKind::MouseUp
                | EventKind::MouseMove
                | EventKind::MouseDoubleClick
        )
    }

    pub fn is_key(self) -> bool {
        matches!(self, EventKind::KeyDown | EventKind::KeyUp | EventKind::Char)
    }

    /// Input kinds are the ones a disabled window never receives.
    pub fn is_input(self) -> bool {
        self.is_mouse() || self.is_key() || self == EventKind::Menu
    }

    /// The fixed default-action subset. Everything else leaves the handler
    /// fully responsible regardless of its return value.
    pub fn default_action(self) -> Option<DefaultAction> {
        match self {
            EventKind::Close => Some(DefaultAction::Destroy),
            EventKind::Maximize => Some(DefaultAction::SetState(WindowState::Maximized)),
            EventKind::Minimize => Some(DefaultAction::SetState(WindowState::Minimized)),
            EventKind::Restore => Some(DefaultAction::SetState(WindowState::Normal)),
            EventKind::Quit => Some(DefaultAction::EndMainLoop),
            _ => None,
        }
    }
}

/// What an event procedure receives: `(kind, window, param1, param2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub window: Option<WindowId>,
    pub param1: i64,
    pub param2: i64,
}

impl Event {
    pub fn new(kind: EventKind, window: Option<WindowId>, param1: i64, param2: i64) -> Self {
        Self {
            kind,
            window,
            param1,
            param2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowState {
    #[default]
    Normal,
    Maximized,
    Minimized,
}

/// The type requested at creation time. `Frame` and `Client` are assigned by
/// the core and cannot be requested through `WindowConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    /// Top-level or document window; the "document class".
    #[default]
    Normal,
    /// Tool palette owned by the frame, exempt from document bookkeeping.
    Floating,
    Dialog,
    Frame,
    Client,
}

impl WindowType {
    pub fn is_document_class(self) -> bool {
        matches!(self, WindowType::Normal | WindowType::Frame)
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowFlags: u32 {
        /// Erase the invalid region before delivering update events.
        const ERASE_BEFORE_UPDATE = 1 << 0;
        /// Window has no close box; close requests are still routed.
        const NO_CLOSE_BOX = 1 << 1;
        /// Window may not be resized by the user.
        const FIXED_SIZE = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Button,
    CheckBox,
    RadioButton,
    Edit,
    Static,
    ListBox,
    ComboBox,
}

/// Process-level configuration for a `Platform`.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub app_name: String,
    /// How long the pump waits for native input before synthesizing `Null`.
    pub idle_interval: Duration,
    /// Used when a `WindowConfig` leaves its rectangle unset.
    pub default_rect: Rect,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            app_name: "winroute".to_string(),
            idle_interval: Duration::from_millis(50),
            default_rect: Rect::new(64, 64, 640, 480),
        }
    }
}

impl PlatformConfig {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Self::default()
        }
    }

    pub fn with_idle_interval(mut self, idle_interval: Duration) -> Self {
        self.idle_interval = idle_interval;
        self
    }

    pub fn with_default_rect(mut self, rect: Rect) -> Self {
        self.default_rect = rect;
        self
    }
}

/// Description of one window to create.
pub struct WindowConfig {
    pub class_id: ClassId,
    pub title: String,
    pub rect: Option<Rect>,
    pub window_type: WindowType,
    pub flags: WindowFlags,
    pub visible: bool,
    pub handler: WindowHandler,
    pub user_data: Option<Box<dyn Any>>,
}

impl WindowConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            class_id: ClassId::default(),
            title: title.into(),
            rect: None,
            window_type: WindowType::Normal,
            flags: WindowFlags::empty(),
            visible: true,
            handler: WindowHandler::NoHandler,
            user_data: None,
        }
    }

    pub fn with_class(mut self, class_id: ClassId) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    pub fn with_type(mut self, window_type: WindowType) -> Self {
        self.window_type = window_type;
        self
    }

    pub fn with_flags(mut self, flags: WindowFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn with_handler(mut self, procedure: impl EventProcedure + 'static) -> Self {
        self.handler = WindowHandler::custom(procedure);
        self
    }

    pub fn with_user_data(mut self, user_data: Box<dyn Any>) -> Self {
        self.user_data = Some(user_data);
        self
    }
}

impl fmt::Debug for WindowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowConfig")
            .field("class_id", &self.class_id)
            .field("title", &self.title)
            .field("rect", &self.rect)
            .field("window_type", &self.window_type)
            .field("flags", &self.flags)
            .field("visible", &self.visible)
            .field("handler", &self.handler)
            .field("has_user_data", &self.user_data.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_action_subset_is_fixed() {
        assert_eq!(
            EventKind::Close.default_action(),
            Some(DefaultAction::Destroy)
        );
        assert_eq!(
            EventKind::Minimize.default_action(),
            Some(DefaultAction::SetState(WindowState::Minimized))
        );
        assert_eq!(
            EventKind::Restore.default_action(),
            Some(DefaultAction::SetState(WindowState::Normal))
        );
        for kind in [
            EventKind::Menu,
            EventKind::MouseDown,
            EventKind::KeyDown,
            EventKind::Update,
            EventKind::Activate,
            EventKind::Null,
        ] {
            assert_eq!(kind.default_action(), None, "{kind:?}");
        }
    }

    #[test]
    fn input_kinds_cover_mouse_key_and_menu() {
        assert!(EventKind::MouseMove.is_input());
        assert!(EventKind::Char.is_input());
        assert!(EventKind::Menu.is_input());
        assert!(!EventKind::Update.is_input());
        assert!(!EventKind::Control.is_key());
    }

    #[test]
    fn document_class_excludes_dialogs_and_floating() {
        assert!(WindowType::Normal.is_document_class());
        assert!(WindowType::Frame.is_document_class());
        assert!(!WindowType::Dialog.is_document_class());
        assert!(!WindowType::Floating.is_document_class());
        assert!(!WindowType::Client.is_document_class());
    }

    #[test]
    fn window_config_builder_sets_fields() {
        let config = WindowConfig::new("Palette")
            .with_type(WindowType::Floating)
            .with_class(ClassId(7))
            .with_flags(WindowFlags::ERASE_BEFORE_UPDATE)
            .hidden();
        assert_eq!(config.window_type, WindowType::Floating);
        assert_eq!(config.class_id, ClassId(7));
        assert!(config.flags.contains(WindowFlags::ERASE_BEFORE_UPDATE));
        assert!(!config.visible);
        assert!(!config.handler.is_custom());
    }

    #[test]
    fn rect_contains_is_half_open() {
        let rect = Rect::new(10, 10, 5, 5);
        assert!(rect.contains(10, 10));
        assert!(rect.contains(14, 14));
        assert!(!rect.contains(15, 10));
    }

    #[test]
    fn rect_contains_does_not_overflow_at_the_edges_of_i32() {
        let rect = Rect::new(i32::MAX - 10, 0, i32::MAX, i32::MAX);
        assert!(rect.contains(i32::MAX, 5));
        assert!(!rect.contains(i32::MAX - 11, 5));
    }
}
