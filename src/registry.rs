/*
 * Process-wide table of window records. Records live in a generational arena
 * keyed by `WindowId`; a separate map translates native handles back to ids,
 * which is how the router turns a native callback into a record.
 *
 * A record is registered before its native window exists and only becomes
 * live once `attach` binds a native handle to it. Every creation path that
 * fails between the two must `unregister`, so a failed creation leaves the
 * table exactly as it was.
 */
use crate::error::{PlatformError, Result as PlatformResult};
use crate::handler::WindowHandler;
use crate::menu::MenuBar;
use crate::types::{
    ClassId, ControlId, ControlKind, NativeHandle, WindowFlags, WindowId, WindowType,
};

use slotmap::SlotMap;
use std::any::Any;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ControlRecord {
    pub kind: ControlKind,
    pub native: NativeHandle,
}

pub struct WindowRecord {
    class_id: ClassId,
    handler: WindowHandler,
    user_data: Option<Box<dyn Any>>,
    pub(crate) flags: WindowFlags,
    native: Option<NativeHandle>,
    pub(crate) window_type: WindowType,
    pub(crate) parent: Option<WindowId>,
    pub(crate) title: String,
    pub(crate) visible: bool,
    pub(crate) controls: HashMap<ControlId, ControlRecord>,
    pub(crate) menu_bar: Option<MenuBar>,
}

impl WindowRecord {
    fn new(class_id: ClassId, handler: WindowHandler, user_data: Option<Box<dyn Any>>) -> Self {
        Self {
            class_id,
            handler,
            user_data,
            flags: WindowFlags::empty(),
            native: None,
            window_type: WindowType::Normal,
            parent: None,
            title: String::new(),
            visible: false,
            controls: HashMap::new(),
            menu_bar: None,
        }
    }

    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    pub fn handler(&self) -> &WindowHandler {
        &self.handler
    }

    pub(crate) fn set_handler(&mut self, handler: WindowHandler) {
        self.handler = handler;
    }

    pub fn flags(&self) -> WindowFlags {
        self.flags
    }

    pub fn native_handle(&self) -> Option<NativeHandle> {
        self.native
    }

    /// A record without a native handle is not yet, or no longer, live.
    pub fn is_live(&self) -> bool {
        self.native.is_some()
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    pub fn parent(&self) -> Option<WindowId> {
        self.parent
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn user_data<T: Any>(&self) -> Option<&T> {
        self.user_data.as_ref()?.downcast_ref::<T>()
    }

    pub fn user_data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.user_data.as_mut()?.downcast_mut::<T>()
    }

    pub fn take_user_data(&mut self) -> Option<Box<dyn Any>> {
        self.user_data.take()
    }

    pub(crate) fn has_control(&self, control_id: ControlId) -> bool {
        self.controls.contains_key(&control_id)
    }
}

impl std::fmt::Debug for WindowRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowRecord")
            .field("class_id", &self.class_id)
            .field("handler", &self.handler)
            .field("native", &self.native)
            .field("window_type", &self.window_type)
            .field("parent", &self.parent)
            .field("title", &self.title)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct WindowRegistry {
    records: SlotMap<WindowId, WindowRecord>,
    by_handle: HashMap<NativeHandle, WindowId>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a record. No native handle is required, or set, yet.
    pub fn register(
        &mut self,
        class_id: ClassId,
        handler: WindowHandler,
        user_data: Option<Box<dyn Any>>,
    ) -> WindowId {
        let id = self
            .records
            .insert(WindowRecord::new(class_id, handler, user_data));
        log::trace!("Registry: registered {id:?} (class {class_id:?})");
        id
    }

    /*
     * Binds a native handle to a registered record. This is the only way a
     * record gets a handle, and it enforces that a handle maps to at most one
     * record at any time.
     */
    pub fn attach(&mut self, id: WindowId, handle: NativeHandle) -> PlatformResult<()> {
        if let Some(owner) = self.by_handle.get(&handle) {
            log::warn!("Registry: handle {handle} already attached to {owner:?}, refusing {id:?}");
            return Err(PlatformError::DuplicateNativeHandle(handle.raw()));
        }
        let record = self.records.get_mut(id).ok_or_else(|| {
            PlatformError::InvalidHandle(format!("{id:?} is not registered"))
        })?;
        if let Some(existing) = record.native {
            return Err(PlatformError::OperationFailed(format!(
                "{id:?} is already attached to native handle {existing}"
            )));
        }
        record.native = Some(handle);
        self.by_handle.insert(handle, id);
        log::trace!("Registry: attached {id:?} to native handle {handle}");
        Ok(())
    }

    pub fn lookup_by_handle(&self, handle: NativeHandle) -> Option<WindowId> {
        self.by_handle.get(&handle).copied()
    }

    /// Unlinks a record and hands it back; its handle no longer resolves.
    pub fn unregister(&mut self, id: WindowId) -> Option<WindowRecord> {
        let record = self.records.remove(id)?;
        if let Some(handle) = record.native {
            self.by_handle.remove(&handle);
        }
        log::trace!("Registry: unregistered {id:?}");
        Some(record)
    }

    pub fn get(&self, id: WindowId) -> Option<&WindowRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut WindowRecord> {
        self.records.get_mut(id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.records.contains_key(id)
    }

    /// Registered and attached.
    pub fn is_live(&self, id: WindowId) -> bool {
        self.records.get(id).is_some_and(WindowRecord::is_live)
    }

    pub fn native_handle(&self, id: WindowId) -> Option<NativeHandle> {
        self.records.get(id).and_then(|record| record.native)
    }

    /// Unspecified order; invalidated by register/unregister.
    pub fn iter(&self) -> impl Iterator<Item = (WindowId, &WindowRecord)> {
        self.records.iter()
    }

    /// Snapshot of every id, for walks that create or destroy windows.
    pub fn ids(&self) -> Vec<WindowId> {
        self.records.keys().collect()
    }

    pub fn children_of(&self, parent: WindowId) -> Vec<WindowId> {
        self.records
            .iter()
            .filter(|(_, record)| record.parent == Some(parent))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
