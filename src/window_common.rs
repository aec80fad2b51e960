/*
 * Win32 implementation of `NativeBackend`. It registers one window class,
 * creates every window and control with `CreateWindowExW` and mirrors menu
 * bars with `CreateMenu`/`AppendMenuW`.
 *
 * The window procedure never calls back into the core. It translates the
 * messages the core cares about into `NativeEvent`s on a thread-local queue,
 * which `poll_event` hands to the pump one at a time. This keeps the core
 * single-entry even though Win32 sends many messages synchronously from inside
 * calls such as `ShowWindow` or `DestroyWindow`. Handles are mapped back to
 * windows by the registry, so no per-window pointer is stored in
 * `GWLP_USERDATA`.
 */
use crate::error::{PlatformError, Result as PlatformResult};
use crate::menu::{Menu, MenuBar};
use crate::native::{NativeBackend, NativeEvent, NativeWindowSpec};
use crate::resources::ControlTemplate;
use crate::types::{
    ControlKind, EventKind, NativeHandle, PlatformConfig, Rect, WindowFlags, WindowState,
    WindowType,
};

use windows::Win32::{
    Foundation::{
        ERROR_INVALID_WINDOW_HANDLE, GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT,
        WPARAM,
    },
    Graphics::Gdi::{BeginPaint, COLOR_WINDOW, EndPaint, HBRUSH, PAINTSTRUCT, ScreenToClient},
    System::LibraryLoader::GetModuleHandleW,
    UI::Input::KeyboardAndMouse::{EnableWindow, GetFocus, IsWindowEnabled, SetFocus},
    UI::WindowsAndMessaging::*, // This list is massive, just import all of them.
};
use windows::core::{HSTRING, PCWSTR, w};

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::ffi::c_void;
use std::time::Duration;

const SUCCESS_CODE: LRESULT = LRESULT(0);

// Not exported by every `windows` feature set.
const PBT_APMSUSPEND: u32 = 0x0004;
const PBT_APMRESUMEAUTOMATIC: u32 = 0x0012;
const LBS_NOTIFY: u32 = 0x0001;
const CBS_DROPDOWNLIST: u32 = 0x0003;
const CBS_HASSTRINGS: u32 = 0x0200;

const WC_BUTTON: PCWSTR = w!("BUTTON");
const WC_EDIT: PCWSTR = w!("EDIT");
const WC_STATIC: PCWSTR = w!("STATIC");
const WC_LISTBOX: PCWSTR = w!("LISTBOX");
const WC_COMBOBOX: PCWSTR = w!("COMBOBOX");

thread_local! {
    static PENDING_EVENTS: RefCell<VecDeque<NativeEvent>> = const { RefCell::new(VecDeque::new()) };
}

fn queue_event(event: NativeEvent) {
    PENDING_EVENTS.with(|queue| queue.borrow_mut().push_back(event));
}

fn next_queued_event() -> Option<NativeEvent> {
    PENDING_EVENTS.with(|queue| queue.borrow_mut().pop_front())
}

fn handle_from_hwnd(hwnd: HWND) -> NativeHandle {
    NativeHandle(hwnd.0 as usize as u64)
}

fn hwnd_from_handle(handle: NativeHandle) -> HWND {
    HWND(handle.raw() as usize as *mut c_void)
}

#[derive(Debug)]
struct NativeWindowData {
    hwnd: HWND,
    parent: Option<NativeHandle>,
    // WS_CHILD windows are positioned in parent coordinates and never foreground.
    is_child: bool,
    is_control: bool,
    menu: Option<HMENU>,
}

#[derive(Debug)]
pub(crate) struct Win32Backend {
    h_instance: HINSTANCE,
    class_name: HSTRING,
    windows: HashMap<NativeHandle, NativeWindowData>,
    // Frontmost first. Approximated by activation order.
    activation_order: Vec<NativeHandle>,
}

impl Win32Backend {
    pub(crate) fn new(config: &PlatformConfig) -> PlatformResult<Self> {
        let module = unsafe { GetModuleHandleW(None) }?;
        let backend = Self {
            h_instance: HINSTANCE(module.0),
            class_name: HSTRING::from(format!("{}_PlatformWindowClass", config.app_name)),
            windows: HashMap::new(),
            activation_order: Vec::new(),
        };
        backend.register_window_class()?;
        Ok(backend)
    }

    /*
     * Registers the window class shared by every window this backend creates,
     * unless an earlier backend in this process already did.
     */
    fn register_window_class(&self) -> PlatformResult<()> {
        let class_name_pcwstr = PCWSTR(self.class_name.as_ptr());

        unsafe {
            let mut wc_test = WNDCLASSEXW::default();
            if GetClassInfoExW(Some(self.h_instance), class_name_pcwstr, &mut wc_test).is_ok() {
                log::debug!("Win32: Window class '{}' already registered.", self.class_name);
                return Ok(());
            }

            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW | CS_DBLCLKS,
                lpfnWndProc: Some(facade_wnd_proc_router),
                cbClsExtra: 0,
                cbWndExtra: 0,
                hInstance: self.h_instance,
                hIcon: LoadIconW(None, IDI_APPLICATION)?,
                hCursor: LoadCursorW(None, IDC_ARROW)?,
                hbrBackground: HBRUSH((COLOR_WINDOW.0 + 1) as *mut c_void),
                lpszMenuName: PCWSTR::null(),
                lpszClassName: class_name_pcwstr,
                hIconSm: LoadIconW(None, IDI_APPLICATION)?,
            };

            if RegisterClassExW(&wc) == 0 {
                let error = GetLastError();
                log::error!("Win32: RegisterClassExW failed: {error:?}");
                Err(PlatformError::InitializationFailed(format!(
                    "RegisterClassExW failed: {error:?}"
                )))
            } else {
                log::debug!("Win32: Window class '{}' registered.", self.class_name);
                Ok(())
            }
        }
    }

    fn data(&self, handle: NativeHandle) -> PlatformResult<&NativeWindowData> {
        self.windows.get(&handle).ok_or_else(|| {
            PlatformError::InvalidHandle(format!("no native window with handle {handle}"))
        })
    }

    fn hwnd(&self, handle: NativeHandle) -> PlatformResult<HWND> {
        self.data(handle).map(|data| data.hwnd)
    }

    fn bring_to_front(&mut self, handle: NativeHandle) {
        self.activation_order.retain(|h| *h != handle);
        self.activation_order.insert(0, handle);
    }

    // Messages already in the thread's queue; never blocks.
    fn pump_native_messages(&self) {
        let mut msg = MSG::default();
        unsafe {
            while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                if msg.message == WM_QUIT {
                    log::debug!("Win32: WM_QUIT received, exit code {}", msg.wParam.0);
                    queue_event(NativeEvent::new(
                        EventKind::Quit,
                        None,
                        msg.wParam.0 as i64,
                        0,
                    ));
                    continue;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }
}

fn window_styles(spec: &NativeWindowSpec) -> (WINDOW_STYLE, WINDOW_EX_STYLE) {
    let (mut style, ex_style) = match (spec.window_type, spec.parent) {
        (WindowType::Client, _) => (
            WS_CHILD | WS_CLIPCHILDREN | WS_CLIPSIBLINGS,
            WINDOW_EX_STYLE(0),
        ),
        (WindowType::Dialog, _) => (
            WS_POPUP | WS_CAPTION | WS_SYSMENU | WS_CLIPCHILDREN,
            WS_EX_DLGMODALFRAME,
        ),
        (WindowType::Floating, _) => (
            WS_POPUP | WS_CAPTION | WS_SYSMENU | WS_THICKFRAME,
            WS_EX_TOOLWINDOW,
        ),
        // Document windows live inside the client.
        (_, Some(_)) => (
            WS_CHILD | WS_OVERLAPPEDWINDOW | WS_CLIPSIBLINGS,
            WINDOW_EX_STYLE(0),
        ),
        (_, None) => (WS_OVERLAPPEDWINDOW | WS_CLIPCHILDREN, WINDOW_EX_STYLE(0)),
    };
    if spec.flags.contains(WindowFlags::FIXED_SIZE) {
        style &= !(WS_THICKFRAME | WS_MAXIMIZEBOX);
    }
    if spec.flags.contains(WindowFlags::NO_CLOSE_BOX) {
        style &= !WS_SYSMENU;
    }
    (style, ex_style)
}

fn control_class_and_style(kind: ControlKind) -> (PCWSTR, WINDOW_STYLE) {
    let base = WS_CHILD | WS_VISIBLE | WS_TABSTOP;
    match kind {
        ControlKind::Button => (WC_BUTTON, base | WINDOW_STYLE(BS_PUSHBUTTON as u32)),
        ControlKind::CheckBox => (WC_BUTTON, base | WINDOW_STYLE(BS_AUTOCHECKBOX as u32)),
        ControlKind::RadioButton => (WC_BUTTON, base | WINDOW_STYLE(BS_AUTORADIOBUTTON as u32)),
        ControlKind::Edit => (
            WC_EDIT,
            base | WS_BORDER | WINDOW_STYLE(ES_AUTOHSCROLL as u32),
        ),
        ControlKind::Static => (WC_STATIC, WS_CHILD | WS_VISIBLE),
        ControlKind::ListBox => (
            WC_LISTBOX,
            base | WS_BORDER | WS_VSCROLL | WINDOW_STYLE(LBS_NOTIFY),
        ),
        ControlKind::ComboBox => (
            WC_COMBOBOX,
            base | WS_VSCROLL | WINDOW_STYLE(CBS_DROPDOWNLIST | CBS_HASSTRINGS),
        ),
    }
}

fn build_menu_bar(menu_bar: &MenuBar) -> PlatformResult<HMENU> {
    let hmenu = unsafe { CreateMenu() }?;
    for menu in &menu_bar.menus {
        let popup = build_popup_menu(menu)?;
        unsafe {
            AppendMenuW(
                hmenu,
                MF_POPUP,
                popup.0 as usize,
                &HSTRING::from(menu.title.as_str()),
            )
        }?;
    }
    Ok(hmenu)
}

fn build_popup_menu(menu: &Menu) -> PlatformResult<HMENU> {
    let hmenu = unsafe { CreatePopupMenu() }?;
    for item in &menu.items {
        if item.separator {
            unsafe { AppendMenuW(hmenu, MF_SEPARATOR, 0, PCWSTR::null()) }?;
            continue;
        }
        let label = HSTRING::from(item.label.as_str());
        let mut flags = MF_STRING;
        if !item.enabled {
            flags |= MF_GRAYED;
        }
        if item.checked {
            flags |= MF_CHECKED;
        }
        match (&item.submenu, item.id) {
            (Some(submenu), _) => {
                let popup = build_popup_menu(submenu)?;
                unsafe { AppendMenuW(hmenu, flags | MF_POPUP, popup.0 as usize, &label) }?;
            }
            (None, Some(id)) => {
                unsafe { AppendMenuW(hmenu, flags, id.0 as usize, &label) }?;
            }
            (None, None) => {
                unsafe { AppendMenuW(hmenu, flags | MF_GRAYED, 0, &label) }?;
            }
        }
    }
    Ok(hmenu)
}

impl NativeBackend for Win32Backend {
    fn create_window(&mut self, spec: &NativeWindowSpec) -> PlatformResult<NativeHandle> {
        let (style, ex_style) = window_styles(spec);
        let parent = spec.parent.map(|handle| self.hwnd(handle)).transpose()?;
        let hwnd = unsafe {
            CreateWindowExW(
                ex_style,
                &self.class_name,
                &HSTRING::from(spec.title.as_str()),
                style,
                spec.rect.x,
                spec.rect.y,
                spec.rect.width,
                spec.rect.height,
                parent,
                None,
                Some(self.h_instance),
                None,
            )
        }?;
        let handle = handle_from_hwnd(hwnd);
        self.windows.insert(
            handle,
            NativeWindowData {
                hwnd,
                parent: spec.parent,
                is_child: style.contains(WS_CHILD),
                is_control: false,
                menu: None,
            },
        );
        self.activation_order.push(handle);
        log::debug!(
            "Win32: created HWND {hwnd:?} '{}' as {:?}",
            spec.title,
            spec.window_type
        );
        Ok(handle)
    }

    /*
     * Destroys the native window. Native children and controls go with it, so
     * their bookkeeping is dropped too. A handle Windows already destroyed is
     * not an error.
     */
    fn destroy_window(&mut self, handle: NativeHandle) -> PlatformResult<()> {
        let hwnd = self.hwnd(handle)?;
        unsafe {
            if DestroyWindow(hwnd).is_err() {
                let last_error = GetLastError();
                if last_error.0 != ERROR_INVALID_WINDOW_HANDLE.0 {
                    log::error!("Win32: DestroyWindow for HWND {hwnd:?} failed: {last_error:?}");
                } else {
                    log::debug!("Win32: HWND {hwnd:?} was already destroyed.");
                }
            }
        }
        let mut gone = vec![handle];
        while let Some(current) = gone.pop() {
            self.windows.remove(&current);
            self.activation_order.retain(|h| *h != current);
            gone.extend(
                self.windows
                    .iter()
                    .filter(|(_, data)| data.parent == Some(current) && data.is_child)
                    .map(|(h, _)| *h),
            );
        }
        Ok(())
    }

    fn create_control(
        &mut self,
        parent: NativeHandle,
        template: &ControlTemplate,
    ) -> PlatformResult<NativeHandle> {
        let hwnd_parent = self.hwnd(parent)?;
        let (class, style) = control_class_and_style(template.kind);
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                class,
                &HSTRING::from(template.text.as_str()),
                style,
                template.rect.x,
                template.rect.y,
                template.rect.width,
                template.rect.height,
                Some(hwnd_parent),
                Some(HMENU(template.id.raw() as isize as *mut c_void)),
                Some(self.h_instance),
                None,
            )
        }?;
        let handle = handle_from_hwnd(hwnd);
        self.windows.insert(
            handle,
            NativeWindowData {
                hwnd,
                parent: Some(parent),
                is_child: true,
                is_control: true,
                menu: None,
            },
        );
        Ok(handle)
    }

    fn show_window(&mut self, handle: NativeHandle, visible: bool) -> PlatformResult<()> {
        let hwnd = self.hwnd(handle)?;
        let cmd = if visible { SW_SHOW } else { SW_HIDE };
        unsafe { _ = ShowWindow(hwnd, cmd) };
        Ok(())
    }

    fn set_enabled(&mut self, handle: NativeHandle, enabled: bool) -> PlatformResult<()> {
        let hwnd = self.hwnd(handle)?;
        // The return value reports the previous state, not success.
        unsafe { _ = EnableWindow(hwnd, enabled) };
        Ok(())
    }

    fn is_enabled(&self, handle: NativeHandle) -> bool {
        self.hwnd(handle)
            .is_ok_and(|hwnd| unsafe { IsWindowEnabled(hwnd) }.as_bool())
    }

    fn activate(&mut self, handle: NativeHandle) -> PlatformResult<()> {
        let data = self.data(handle)?;
        let hwnd = data.hwnd;
        unsafe {
            if data.is_child {
                BringWindowToTop(hwnd)?;
            } else {
                _ = SetForegroundWindow(hwnd);
            }
            if let Err(err) = SetFocus(Some(hwnd)) {
                log::warn!("Win32: SetFocus on HWND {hwnd:?} failed: {err:?}");
            }
        }
        self.bring_to_front(handle);
        Ok(())
    }

    fn focused_window(&self) -> Option<NativeHandle> {
        let hwnd = unsafe { GetFocus() };
        if hwnd.is_invalid() {
            return None;
        }
        let handle = handle_from_hwnd(hwnd);
        let data = self.windows.get(&handle)?;
        if data.is_control {
            data.parent
        } else {
            Some(handle)
        }
    }

    fn z_order(&self) -> Vec<NativeHandle> {
        self.activation_order.clone()
    }

    fn set_title(&mut self, handle: NativeHandle, title: &str) -> PlatformResult<()> {
        let hwnd = self.hwnd(handle)?;
        unsafe { SetWindowTextW(hwnd, &HSTRING::from(title))? };
        Ok(())
    }

    fn content_rect(&self, handle: NativeHandle) -> PlatformResult<Rect> {
        let data = self.data(handle)?;
        let mut client = RECT::default();
        let mut outer = RECT::default();
        unsafe {
            GetClientRect(data.hwnd, &mut client)?;
            GetWindowRect(data.hwnd, &mut outer)?;
        }
        let mut origin = POINT {
            x: outer.left,
            y: outer.top,
        };
        if data.is_child
            && let Some(parent) = data.parent
        {
            unsafe { _ = ScreenToClient(hwnd_from_handle(parent), &mut origin) };
        }
        Ok(Rect::new(
            origin.x,
            origin.y,
            client.right - client.left,
            client.bottom - client.top,
        ))
    }

    fn set_content_rect(&mut self, handle: NativeHandle, rect: Rect) -> PlatformResult<()> {
        let data = self.data(handle)?;
        let hwnd = data.hwnd;
        let mut outer = RECT {
            left: rect.x,
            top: rect.y,
            right: rect.x + rect.width,
            bottom: rect.y + rect.height,
        };
        unsafe {
            let style = WINDOW_STYLE(GetWindowLongPtrW(hwnd, GWL_STYLE) as u32);
            let ex_style = WINDOW_EX_STYLE(GetWindowLongPtrW(hwnd, GWL_EXSTYLE) as u32);
            AdjustWindowRectEx(&mut outer, style, data.menu.is_some(), ex_style)?;
            SetWindowPos(
                hwnd,
                None,
                rect.x,
                rect.y,
                outer.right - outer.left,
                outer.bottom - outer.top,
                SWP_NOZORDER | SWP_NOACTIVATE,
            )?;
        }
        Ok(())
    }

    fn set_window_state(
        &mut self,
        handle: NativeHandle,
        window_state: WindowState,
    ) -> PlatformResult<()> {
        let hwnd = self.hwnd(handle)?;
        let cmd = match window_state {
            WindowState::Normal => SW_RESTORE,
            WindowState::Maximized => SW_MAXIMIZE,
            WindowState::Minimized => SW_MINIMIZE,
        };
        unsafe { _ = ShowWindow(hwnd, cmd) };
        Ok(())
    }

    fn apply_menu_bar(&mut self, handle: NativeHandle, menu_bar: &MenuBar) -> PlatformResult<()> {
        let hwnd = self.hwnd(handle)?;
        let hmenu = build_menu_bar(menu_bar)?;
        unsafe {
            if let Err(err) = SetMenu(hwnd, Some(hmenu)) {
                _ = DestroyMenu(hmenu);
                return Err(err.into());
            }
            _ = DrawMenuBar(hwnd);
        }
        let previous = self
            .windows
            .get_mut(&handle)
            .and_then(|data| data.menu.replace(hmenu));
        if let Some(previous) = previous {
            unsafe { _ = DestroyMenu(previous) };
        }
        Ok(())
    }

    /*
     * Returns the next translated event. Messages already queued are
     * dispatched first; if that produced nothing, waits up to `wait` for new
     * input with `MsgWaitForMultipleObjects` and dispatches once more.
     */
    fn poll_event(&mut self, wait: Duration) -> Option<NativeEvent> {
        let mut waited = false;
        loop {
            let event = match next_queued_event() {
                Some(event) => event,
                None => {
                    self.pump_native_messages();
                    match next_queued_event() {
                        Some(event) => event,
                        None if waited || wait.is_zero() => return None,
                        None => {
                            let millis = u32::try_from(wait.as_millis()).unwrap_or(u32::MAX);
                            unsafe {
                                _ = MsgWaitForMultipleObjects(None, false, millis, QS_ALLINPUT)
                            };
                            waited = true;
                            continue;
                        }
                    }
                }
            };
            if let NativeEvent {
                kind: EventKind::Activate,
                target: Some(target),
                ..
            } = event
                && let Some(data) = self.windows.get(&target)
            {
                // Every click on a document reports activation; only a change counts.
                if data.is_child && self.activation_order.first() == Some(&target) {
                    log::trace!("Win32: repeated activation of {target} dropped");
                    continue;
                }
                self.bring_to_front(target);
            }
            return Some(event);
        }
    }
}

/*
 * Translates one window message into `(kind, param1, param2)`. Mouse
 * coordinates are signed client coordinates; `Control` carries the control
 * id and the notification code.
 */
fn translate_message(msg: u32, wparam: WPARAM, lparam: LPARAM) -> Option<(EventKind, i64, i64)> {
    let point = || {
        (
            i64::from(loword_from_lparam(lparam) as i16),
            i64::from(hiword_from_lparam(lparam) as i16),
        )
    };
    let with_point = |kind| {
        let (x, y) = point();
        Some((kind, x, y))
    };

    match msg {
        WM_CLOSE => Some((EventKind::Close, 0, 0)),
        WM_COMMAND => {
            let id = i64::from(loword_from_wparam(wparam));
            if lparam.0 == 0 {
                Some((EventKind::Menu, id, 0))
            } else {
                Some((
                    EventKind::Control,
                    id,
                    i64::from(highord_from_wparam(wparam)),
                ))
            }
        }
        WM_SYSCOMMAND => match (wparam.0 as u32) & 0xFFF0 {
            SC_MAXIMIZE => Some((EventKind::Maximize, 0, 0)),
            SC_MINIMIZE => Some((EventKind::Minimize, 0, 0)),
            SC_RESTORE => Some((EventKind::Restore, 0, 0)),
            _ => None,
        },
        WM_LBUTTONDOWN | WM_RBUTTONDOWN | WM_MBUTTONDOWN => with_point(EventKind::MouseDown),
        WM_LBUTTONUP | WM_RBUTTONUP | WM_MBUTTONUP => with_point(EventKind::MouseUp),
        WM_MOUSEMOVE => with_point(EventKind::MouseMove),
        WM_LBUTTONDBLCLK => with_point(EventKind::MouseDoubleClick),
        WM_MOVE => with_point(EventKind::Move),
        WM_KEYDOWN => Some((EventKind::KeyDown, wparam.0 as i64, 0)),
        WM_KEYUP => Some((EventKind::KeyUp, wparam.0 as i64, 0)),
        WM_CHAR => Some((EventKind::Char, wparam.0 as i64, 0)),
        WM_PAINT => Some((EventKind::Update, 0, 0)),
        WM_ACTIVATE => {
            if loword_from_wparam(wparam) as u32 == WA_INACTIVE {
                Some((EventKind::Deactivate, 0, 0))
            } else {
                Some((EventKind::Activate, 0, 0))
            }
        }
        WM_SIZE => Some((
            EventKind::Resize,
            i64::from(loword_from_lparam(lparam)),
            i64::from(hiword_from_lparam(lparam)),
        )),
        WM_POWERBROADCAST => match wparam.0 as u32 {
            PBT_APMSUSPEND => Some((EventKind::Suspend, 0, 0)),
            PBT_APMRESUMEAUTOMATIC => Some((EventKind::Resume, 0, 0)),
            _ => None,
        },
        _ => None,
    }
}

/*
 * Window procedure for every window of the class. Translated messages are
 * queued for the pump. Close, commands and the state-changing system commands
 * are consumed: the core performs their default action itself once a handler
 * accepts the event.
 */
unsafe extern "system" fn facade_wnd_proc_router(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let translated = translate_message(msg, wparam, lparam);
    // Child windows never see WM_ACTIVATE, so a click is their activation.
    if msg == WM_MOUSEACTIVATE
        && is_document_style(WINDOW_STYLE(unsafe { GetWindowLongPtrW(hwnd, GWL_STYLE) } as u32))
    {
        queue_event(NativeEvent::new(
            EventKind::Activate,
            Some(handle_from_hwnd(hwnd)),
            0,
            0,
        ));
    }
    if let Some((kind, param1, param2)) = translated {
        queue_event(NativeEvent::new(
            kind,
            Some(handle_from_hwnd(hwnd)),
            param1,
            param2,
        ));
    }

    match msg {
        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            unsafe {
                _ = BeginPaint(hwnd, &mut ps);
                _ = EndPaint(hwnd, &ps);
            }
            SUCCESS_CODE
        }
        WM_CLOSE | WM_COMMAND => SUCCESS_CODE,
        WM_SYSCOMMAND if translated.is_some() => SUCCESS_CODE,
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

// Captioned child windows are the documents inside the client.
fn is_document_style(style: WINDOW_STYLE) -> bool {
    style.contains(WS_CHILD) && style.contains(WS_CAPTION)
}

#[inline]
pub(crate) fn loword_from_wparam(wparam: WPARAM) -> i32 {
    (wparam.0 & 0xFFFF) as i32
}
#[inline]
pub(crate) fn highord_from_wparam(wparam: WPARAM) -> i32 {
    ((wparam.0 >> 16) & 0xFFFF) as i32
}
#[inline]
pub(crate) fn loword_from_lparam(lparam: LPARAM) -> i32 {
    (lparam.0 & 0xFFFF) as i32
}
#[inline]
pub(crate) fn hiword_from_lparam(lparam: LPARAM) -> i32 {
    ((lparam.0 >> 16) & 0xFFFF) as i32
}
