/*
 * Public entry point for the winroute crate: a window and event management
 * core that lets an application create windows, dialogs and menus once and
 * have lifecycle, input and menu events routed to the right procedure
 * regardless of how the native windowing system arranges its windows.
 *
 * Everything is owned by one explicitly constructed `Platform`. Native work
 * goes through the `NativeBackend` seam: the Win32 implementation lives in
 * `window_common` and is only compiled on Windows, while the in-memory
 * `HeadlessBackend` is available everywhere so routing, modal and
 * multi-document logic can be built and tested on any platform.
 */
pub mod app;
pub mod error;
pub mod frame;
pub mod handler;
pub mod headless;
pub mod menu;
pub mod modal;
pub mod native;
pub mod redirect;
pub mod registry;
pub mod resources;
mod router;
pub mod types;
#[cfg(target_os = "windows")]
pub(crate) mod window_common;

pub use app::Platform;
pub use error::{PlatformError, Result as PlatformResult};
pub use frame::{WINDOW_MENU_FIRST_ID, WindowMenuEntry};
pub use handler::{EventProcedure, WindowHandler};
pub use headless::{HeadlessBackend, HeadlessProbe};
pub use menu::{Menu, MenuBar, MenuHandle, MenuItem};
pub use native::{NativeBackend, NativeEvent, NativeWindowSpec};
pub use redirect::{KeyTarget, RedirectTargets};
pub use registry::{WindowRecord, WindowRegistry};
pub use resources::{ControlTemplate, DialogTemplate, ResourceTable};
pub use types::{
    ClassId, ControlId, ControlKind, Event, EventKind, MenuItemId, NativeHandle, PlatformConfig,
    Rect, ResourceId, WindowConfig, WindowFlags, WindowId, WindowState, WindowType,
};
