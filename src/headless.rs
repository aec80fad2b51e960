/*
 * In-memory native backend. It keeps exactly the native state the core cares
 * about (visibility, enablement, z-order, focus, titles, rectangles, window
 * states, installed menu bars) and a queue of injected events. It is the
 * backend on non-Windows targets and the one every test drives.
 *
 * `HeadlessProbe` shares the backend's state, so a test can hand the backend
 * to a `Platform` and still inspect native state or inject failures.
 */
use crate::error::{PlatformError, Result as PlatformResult};
use crate::menu::MenuBar;
use crate::native::{NativeBackend, NativeEvent, NativeWindowSpec};
use crate::resources::ControlTemplate;
use crate::types::{NativeHandle, Rect, WindowState, WindowType};

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

const FIRST_HANDLE: u64 = 0x1000;
const HANDLE_STRIDE: u64 = 0x10;

#[derive(Debug, Clone)]
struct HeadlessWindow {
    title: String,
    rect: Rect,
    parent: Option<NativeHandle>,
    window_type: Option<WindowType>,
    visible: bool,
    enabled: bool,
    state: WindowState,
    menu_bar: Option<MenuBar>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_handle: u64,
    windows: BTreeMap<NativeHandle, HeadlessWindow>,
    // Frontmost first.
    z_order: Vec<NativeHandle>,
    focus: Option<NativeHandle>,
    pending_create_failures: u32,
    events: VecDeque<NativeEvent>,
}

impl HeadlessState {
    fn allocate_handle(&mut self) -> NativeHandle {
        if self.next_handle == 0 {
            self.next_handle = FIRST_HANDLE;
        }
        let handle = NativeHandle(self.next_handle);
        self.next_handle += HANDLE_STRIDE;
        handle
    }

    fn window(&self, handle: NativeHandle) -> PlatformResult<&HeadlessWindow> {
        self.windows.get(&handle).ok_or_else(|| {
            PlatformError::InvalidHandle(format!("no headless window with handle {handle}"))
        })
    }

    fn window_mut(&mut self, handle: NativeHandle) -> PlatformResult<&mut HeadlessWindow> {
        self.windows.get_mut(&handle).ok_or_else(|| {
            PlatformError::InvalidHandle(format!("no headless window with handle {handle}"))
        })
    }

    fn insert(&mut self, handle: NativeHandle, window: HeadlessWindow) {
        self.windows.insert(handle, window);
        self.z_order.push(handle);
    }

    fn remove(&mut self, handle: NativeHandle) {
        // Native controls go with their parent.
        let controls: Vec<NativeHandle> = self
            .windows
            .iter()
            .filter(|(_, w)| w.parent == Some(handle) && w.window_type.is_none())
            .map(|(h, _)| *h)
            .collect();
        for control in controls {
            self.windows.remove(&control);
        }
        self.windows.remove(&handle);
        self.z_order.retain(|h| *h != handle);
        if self.focus == Some(handle) {
            self.focus = None;
        }
    }
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend plus a probe onto the same native state.
    pub fn with_probe() -> (Self, HeadlessProbe) {
        let backend = Self::new();
        let probe = backend.probe();
        (backend, probe)
    }

    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            state: Rc::clone(&self.state),
        }
    }
}

impl NativeBackend for HeadlessBackend {
    fn create_window(&mut self, spec: &NativeWindowSpec) -> PlatformResult<NativeHandle> {
        let mut state = self.state.borrow_mut();
        if state.pending_create_failures > 0 {
            state.pending_create_failures -= 1;
            log::debug!("Headless: injected failure creating '{}'", spec.title);
            return Err(PlatformError::WindowCreationFailed(format!(
                "injected failure for '{}'",
                spec.title
            )));
        }
        if let Some(parent) = spec.parent {
            state.window(parent)?;
        }
        let handle = state.allocate_handle();
        state.insert(
            handle,
            HeadlessWindow {
                title: spec.title.clone(),
                rect: spec.rect,
                parent: spec.parent,
                window_type: Some(spec.window_type),
                visible: false,
                enabled: true,
                state: WindowState::Normal,
                menu_bar: None,
            },
        );
        log::trace!("Headless: created {handle} '{}'", spec.title);
        Ok(handle)
    }

    fn destroy_window(&mut self, handle: NativeHandle) -> PlatformResult<()> {
        let mut state = self.state.borrow_mut();
        state.window(handle)?;
        state.remove(handle);
        log::trace!("Headless: destroyed {handle}");
        Ok(())
    }

    fn create_control(
        &mut self,
        parent: NativeHandle,
        template: &ControlTemplate,
    ) -> PlatformResult<NativeHandle> {
        let mut state = self.state.borrow_mut();
        state.window(parent)?;
        let handle = state.allocate_handle();
        state.windows.insert(
            handle,
            HeadlessWindow {
                title: template.text.clone(),
                rect: template.rect,
                parent: Some(parent),
                window_type: None,
                visible: true,
                enabled: true,
                state: WindowState::Normal,
                menu_bar: None,
            },
        );
        Ok(handle)
    }

    fn show_window(&mut self, handle: NativeHandle, visible: bool) -> PlatformResult<()> {
        self.state.borrow_mut().window_mut(handle)?.visible = visible;
        Ok(())
    }

    fn set_enabled(&mut self, handle: NativeHandle, enabled: bool) -> PlatformResult<()> {
        self.state.borrow_mut().window_mut(handle)?.enabled = enabled;
        Ok(())
    }

    fn is_enabled(&self, handle: NativeHandle) -> bool {
        self.state
            .borrow()
            .windows
            .get(&handle)
            .is_some_and(|w| w.enabled)
    }

    fn activate(&mut self, handle: NativeHandle) -> PlatformResult<()> {
        let mut state = self.state.borrow_mut();
        state.window(handle)?;
        state.z_order.retain(|h| *h != handle);
        state.z_order.insert(0, handle);
        state.focus = Some(handle);
        Ok(())
    }

    fn focused_window(&self) -> Option<NativeHandle> {
        self.state.borrow().focus
    }

    fn z_order(&self) -> Vec<NativeHandle> {
        self.state.borrow().z_order.clone()
    }

    fn set_title(&mut self, handle: NativeHandle, title: &str) -> PlatformResult<()> {
        self.state.borrow_mut().window_mut(handle)?.title = title.to_string();
        Ok(())
    }

    fn content_rect(&self, handle: NativeHandle) -> PlatformResult<Rect> {
        Ok(self.state.borrow().window(handle)?.rect)
    }

    fn set_content_rect(&mut self, handle: NativeHandle, rect: Rect) -> PlatformResult<()> {
        self.state.borrow_mut().window_mut(handle)?.rect = rect;
        Ok(())
    }

    fn set_window_state(
        &mut self,
        handle: NativeHandle,
        window_state: WindowState,
    ) -> PlatformResult<()> {
        self.state.borrow_mut().window_mut(handle)?.state = window_state;
        Ok(())
    }

    fn apply_menu_bar(&mut self, handle: NativeHandle, menu_bar: &MenuBar) -> PlatformResult<()> {
        self.state.borrow_mut().window_mut(handle)?.menu_bar = Some(menu_bar.clone());
        Ok(())
    }

    fn poll_event(&mut self, _wait: Duration) -> Option<NativeEvent> {
        self.state.borrow_mut().events.pop_front()
    }
}

/// Test-side view of a `HeadlessBackend`'s native state.
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessProbe {
    /// The next `count` native creations fail.
    pub fn fail_next_creates(&self, count: u32) {
        self.state.borrow_mut().pending_create_failures = count;
    }

    pub fn push_event(&self, event: NativeEvent) {
        self.state.borrow_mut().events.push_back(event);
    }

    /// Simulates the user clicking a window: it gains focus and moves to front.
    pub fn focus(&self, handle: NativeHandle) {
        let mut state = self.state.borrow_mut();
        state.z_order.retain(|h| *h != handle);
        state.z_order.insert(0, handle);
        state.focus = Some(handle);
    }

    pub fn exists(&self, handle: NativeHandle) -> bool {
        self.state.borrow().windows.contains_key(&handle)
    }

    pub fn window_count(&self) -> usize {
        self.state.borrow().windows.len()
    }

    pub fn is_visible(&self, handle: NativeHandle) -> bool {
        self.state
            .borrow()
            .windows
            .get(&handle)
            .is_some_and(|w| w.visible)
    }

    pub fn is_enabled(&self, handle: NativeHandle) -> bool {
        self.state
            .borrow()
            .windows
            .get(&handle)
            .is_some_and(|w| w.enabled)
    }

    pub fn parent(&self, handle: NativeHandle) -> Option<NativeHandle> {
        self.state.borrow().windows.get(&handle)?.parent
    }

    pub fn title(&self, handle: NativeHandle) -> Option<String> {
        Some(self.state.borrow().windows.get(&handle)?.title.clone())
    }

    pub fn window_state(&self, handle: NativeHandle) -> Option<WindowState> {
        Some(self.state.borrow().windows.get(&handle)?.state)
    }

    pub fn menu_bar(&self, handle: NativeHandle) -> Option<MenuBar> {
        self.state.borrow().windows.get(&handle)?.menu_bar.clone()
    }

    pub fn focused(&self) -> Option<NativeHandle> {
        self.state.borrow().focus
    }
}
