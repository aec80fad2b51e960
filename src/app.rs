/*
 * `Platform` is the explicitly constructed service object that owns every
 * piece of core state: the window registry, the redirection targets, the
 * modal and loop stacks, the Frame/Client bookkeeping, the resource table and
 * the native backend. Applications create one, install handlers, create
 * windows and run the main loop; tests create as many independent instances
 * as they like over a `HeadlessBackend`.
 *
 * This module holds construction, window creation and destruction, window
 * properties and menus. Routing lives in `router`, modal operations and the
 * event pump in `modal`.
 */
use crate::error::{PlatformError, Result as PlatformResult};
use crate::frame::{FrameClient, Placement, WindowMenuEntry, apply_window_menu};
use crate::handler::{EventProcedure, WindowHandler};
use crate::menu::MenuBar;
use crate::modal::{LoopStack, ModalStack};
use crate::native::{NativeBackend, NativeEvent, NativeWindowSpec};
use crate::redirect::RedirectTargets;
use crate::registry::{ControlRecord, WindowRecord, WindowRegistry};
use crate::resources::{ControlTemplate, ResourceTable};
use crate::types::{
    ClassId, EventKind, MenuItemId, NativeHandle, PlatformConfig, Rect, ResourceId, WindowConfig,
    WindowId, WindowType,
};

use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

pub struct Platform {
    pub(crate) config: PlatformConfig,
    pub(crate) registry: WindowRegistry,
    pub(crate) redirect: RedirectTargets,
    pub(crate) modal: ModalStack,
    pub(crate) loops: LoopStack,
    pub(crate) frame_client: FrameClient,
    pub(crate) resources: ResourceTable,
    pub(crate) backend: Box<dyn NativeBackend>,
    pub(crate) main_handler: Option<Rc<dyn EventProcedure>>,
    pub(crate) posted: VecDeque<NativeEvent>,
    // (window, kind) of default-action events currently being dispatched.
    pub(crate) in_flight: Vec<(Option<WindowId>, EventKind)>,
    destroying: HashSet<WindowId>,
}

// Everything the core decides about a window before the backend sees it.
struct CreationPlan {
    window_type: WindowType,
    parent: Option<WindowId>,
    native_parent: Option<NativeHandle>,
}

impl Platform {
    /*
     * Creates a platform over the native backend of the current target: the
     * Win32 backend on Windows, the in-memory backend elsewhere.
     */
    pub fn new(config: PlatformConfig) -> PlatformResult<Self> {
        #[cfg(target_os = "windows")]
        let backend = crate::window_common::Win32Backend::new(&config)?;
        #[cfg(not(target_os = "windows"))]
        let backend = crate::headless::HeadlessBackend::new();
        Ok(Self::with_backend(config, backend))
    }

    pub fn with_backend(config: PlatformConfig, backend: impl NativeBackend + 'static) -> Self {
        log::debug!("Platform: initializing '{}'", config.app_name);
        Self {
            config,
            registry: WindowRegistry::new(),
            redirect: RedirectTargets::new(),
            modal: ModalStack::default(),
            loops: LoopStack::default(),
            frame_client: FrameClient::new(),
            resources: ResourceTable::new(),
            backend: Box::new(backend),
            main_handler: None,
            posted: VecDeque::new(),
            in_flight: Vec::new(),
            destroying: HashSet::new(),
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    /// Installs the process-wide procedure for windows without their own.
    pub fn set_main_handler(&mut self, procedure: impl EventProcedure + 'static) {
        self.main_handler = Some(Rc::new(procedure));
    }

    pub fn clear_main_handler(&mut self) {
        self.main_handler = None;
    }

    pub fn set_window_handler(
        &mut self,
        window: WindowId,
        procedure: impl EventProcedure + 'static,
    ) -> PlatformResult<()> {
        let record = self.record_mut(window)?;
        record.set_handler(WindowHandler::custom(procedure));
        Ok(())
    }

    /// Queues an event for the pump, ahead of native input.
    pub fn post_event(&mut self, event: NativeEvent) {
        self.posted.push_back(event);
    }

    /*
     * Creates a window according to the placement table: the first
     * non-dialog window becomes the frame, floating windows go under the
     * frame, everything else becomes a document of the client. Fails with
     * `NoClientWindow` when a frame exists without a client. On any failure
     * the registry is left exactly as it was.
     */
    pub fn create_window(&mut self, config: WindowConfig) -> PlatformResult<WindowId> {
        if matches!(config.window_type, WindowType::Frame | WindowType::Client) {
            return Err(PlatformError::WindowCreationFailed(format!(
                "{:?} windows are created with create_frame/create_client",
                config.window_type
            )));
        }
        let placement = self.frame_client.placement_for(config.window_type)?;
        let plan = match placement {
            Placement::BecomeFrame => CreationPlan {
                window_type: WindowType::Frame,
                parent: None,
                native_parent: None,
            },
            Placement::Floating { frame } => CreationPlan {
                window_type: WindowType::Floating,
                parent: Some(frame),
                native_parent: Some(self.live_handle(frame)?),
            },
            Placement::Document { client } => CreationPlan {
                window_type: config.window_type,
                parent: Some(client),
                native_parent: Some(self.live_handle(client)?),
            },
            Placement::Dialog { owner } => CreationPlan {
                window_type: WindowType::Dialog,
                parent: None,
                native_parent: owner.and_then(|frame| self.registry.native_handle(frame)),
            },
        };
        log::debug!(
            "Platform: creating '{}' as {:?} ({placement:?})",
            config.title,
            plan.window_type
        );
        let visible = config.visible;
        let id = self.create_native(config, plan)?;

        match placement {
            Placement::BecomeFrame => self.frame_client.set_frame(id),
            Placement::Document { .. } => self.frame_client.add_document(id),
            _ => {}
        }
        self.finish_creation(id, visible)
    }

    /// Creates the frame explicitly. There is only ever one.
    pub fn create_frame(&mut self, config: WindowConfig) -> PlatformResult<WindowId> {
        if let Some(frame) = self.frame_client.frame() {
            return Err(PlatformError::FrameAlreadyExists(frame));
        }
        let visible = config.visible;
        let id = self.create_native(
            config,
            CreationPlan {
                window_type: WindowType::Frame,
                parent: None,
                native_parent: None,
            },
        )?;
        self.frame_client.set_frame(id);
        self.finish_creation(id, visible)
    }

    /*
     * Creates the hidden client under the frame. `window_menu` is the position
     * of the frame menu that lists the document windows.
     */
    pub fn create_client(&mut self, window_menu: Option<usize>) -> PlatformResult<WindowId> {
        let frame = self
            .frame_client
            .frame()
            .ok_or(PlatformError::NoFrameWindow)?;
        if let Some(client) = self.frame_client.client() {
            return Err(PlatformError::ClientAlreadyExists(client));
        }
        let frame_handle = self.live_handle(frame)?;
        let rect = self
            .backend
            .content_rect(frame_handle)
            .unwrap_or(self.config.default_rect);
        let config = WindowConfig::new("").with_rect(rect).hidden();
        let id = self.create_native(
            config,
            CreationPlan {
                window_type: WindowType::Client,
                parent: Some(frame),
                native_parent: Some(frame_handle),
            },
        )?;
        self.frame_client.set_client(id, window_menu);
        log::debug!("Platform: client {id:?} created under frame {frame:?}");
        self.sync_window_menu();
        Ok(id)
    }

    // Register, create natively, attach. Rolls the registry back on failure.
    fn create_native(
        &mut self,
        config: WindowConfig,
        plan: CreationPlan,
    ) -> PlatformResult<WindowId> {
        let WindowConfig {
            class_id,
            title,
            rect,
            flags,
            handler,
            user_data,
            ..
        } = config;

        let id = self.registry.register(class_id, handler, user_data);
        if let Some(record) = self.registry.get_mut(id) {
            record.window_type = plan.window_type;
            record.parent = plan.parent;
            record.flags = flags;
            record.title = title.clone();
        }

        let spec = NativeWindowSpec {
            title,
            rect: rect.unwrap_or(self.config.default_rect),
            window_type: plan.window_type,
            flags,
            parent: plan.native_parent,
        };
        let handle = match self.backend.create_window(&spec) {
            Ok(handle) => handle,
            Err(err) => {
                self.registry.unregister(id);
                log::error!("Platform: native creation of '{}' failed: {err}", spec.title);
                return Err(PlatformError::WindowCreationFailed(format!(
                    "'{}': {err}",
                    spec.title
                )));
            }
        };
        if let Err(err) = self.registry.attach(id, handle) {
            self.registry.unregister(id);
            if let Err(destroy_err) = self.backend.destroy_window(handle) {
                log::error!("Platform: releasing orphaned native window {handle} failed: {destroy_err}");
            }
            return Err(err);
        }
        log::debug!("Platform: {id:?} attached to {handle} as {:?}", plan.window_type);
        Ok(id)
    }

    fn finish_creation(&mut self, id: WindowId, visible: bool) -> PlatformResult<WindowId> {
        self.send_event(EventKind::Create, Some(id), 0, 0);
        if !self.registry.is_live(id) {
            return Err(PlatformError::WindowCreationFailed(format!(
                "{id:?} was destroyed by its create handler"
            )));
        }
        if visible
            && let Err(err) = self
                .show_window(id, true)
                .and_then(|()| self.activate_window(id))
        {
            log::error!("Platform: showing new window {id:?} failed: {err}");
            self.destroy_window(id)?;
            return Err(err);
        }
        Ok(id)
    }

    /*
     * Destroys a window and, first, everything that depends on it: logical
     * children, and the dialogs it owns when it is the frame. The handler gets
     * a `Destroy` event while the window is still live, so user data can be
     * reclaimed there. The window is then unlinked from every piece of core
     * state before the native window is released.
     */
    pub fn destroy_window(&mut self, id: WindowId) -> PlatformResult<()> {
        if !self.registry.contains(id) {
            return Err(PlatformError::InvalidHandle(format!(
                "{id:?} is not a registered window"
            )));
        }
        if !self.destroying.insert(id) {
            log::trace!("Platform: {id:?} is already being destroyed");
            return Ok(());
        }

        let mut dependents = self.registry.children_of(id);
        if self.frame_client.frame() == Some(id) {
            dependents.extend(
                self.registry
                    .iter()
                    .filter(|(_, record)| record.window_type() == WindowType::Dialog)
                    .map(|(dialog, _)| dialog),
            );
        }
        for dependent in dependents {
            if self.registry.contains(dependent)
                && let Err(err) = self.destroy_window(dependent)
            {
                log::error!("Platform: destroying {dependent:?} under {id:?} failed: {err}");
            }
        }

        self.send_event(EventKind::Destroy, Some(id), 0, 0);

        let Some(record) = self.registry.unregister(id) else {
            self.destroying.remove(&id);
            return Ok(());
        };
        if self.redirect.forget_window(id) {
            log::debug!("Platform: cleared redirect targets pointing at {id:?}");
        }
        self.modal.forget_dialog(id);
        let was_document = self.frame_client.is_document(id);
        let was_active = self.frame_client.remove_document(id);
        self.frame_client.forget(id);

        if let Some(handle) = record.native_handle()
            && let Err(err) = self.backend.destroy_window(handle)
        {
            log::error!("Platform: releasing native window {handle} of {id:?} failed: {err}");
        }
        self.destroying.remove(&id);
        log::debug!("Platform: destroyed {id:?} '{}'", record.title());
        drop(record);

        let client_going = self
            .frame_client
            .client()
            .is_some_and(|client| self.destroying.contains(&client));
        if was_active && !client_going {
            self.activate_next_document();
        } else if was_document {
            self.sync_window_menu();
        }
        Ok(())
    }

    /// Synthesizes `Close`; the window is destroyed only if its handler accepts.
    pub fn close_window(&mut self, id: WindowId) -> bool {
        self.send_event(EventKind::Close, Some(id), 0, 0)
    }

    pub fn maximize_window(&mut self, id: WindowId) -> bool {
        self.send_event(EventKind::Maximize, Some(id), 0, 0)
    }

    pub fn minimize_window(&mut self, id: WindowId) -> bool {
        self.send_event(EventKind::Minimize, Some(id), 0, 0)
    }

    pub fn restore_window(&mut self, id: WindowId) -> bool {
        self.send_event(EventKind::Restore, Some(id), 0, 0)
    }

    pub fn show_window(&mut self, id: WindowId, visible: bool) -> PlatformResult<()> {
        let handle = self.live_handle(id)?;
        self.backend.show_window(handle, visible)?;
        let record = self.record_mut(id)?;
        let changed = record.visible != visible;
        record.visible = visible;
        if !changed {
            return Ok(());
        }

        let kind = if visible { EventKind::Show } else { EventKind::Hide };
        self.send_event(kind, Some(id), 0, 0);
        if self.frame_client.is_document(id) {
            if !visible && self.frame_client.active() == Some(id) {
                self.frame_client.set_active(None);
                self.activate_next_document();
            } else {
                self.sync_window_menu();
            }
        }
        Ok(())
    }

    /*
     * Brings a window to the front and gives it focus. Activating a document
     * makes it the client's active document, which moves the window-menu
     * check mark. A hidden document is shown first so the active document
     * always has an entry to check.
     */
    pub fn activate_window(&mut self, id: WindowId) -> PlatformResult<()> {
        let handle = self.live_handle(id)?;
        if self.frame_client.is_document(id) && !self.is_window_visible(id) {
            self.show_window(id, true)?;
        }
        self.backend.activate(handle)?;
        if !self.frame_client.is_document(id) {
            return Ok(());
        }
        let previous = self.frame_client.active();
        if previous == Some(id) {
            return Ok(());
        }
        self.frame_client.set_active(Some(id));
        if let Some(previous) = previous
            && self.registry.is_live(previous)
        {
            self.send_event(EventKind::Deactivate, Some(previous), 0, 0);
        }
        self.send_event(EventKind::Activate, Some(id), 0, 0);
        self.sync_window_menu();
        Ok(())
    }

    /// The active document when a client exists, else the focused window.
    pub fn active_window(&self) -> Option<WindowId> {
        if self.frame_client.client().is_some() {
            return self.frame_client.active();
        }
        self.backend
            .focused_window()
            .and_then(|handle| self.registry.lookup_by_handle(handle))
    }

    pub fn frame(&self) -> Option<WindowId> {
        self.frame_client.frame()
    }

    pub fn client(&self) -> Option<WindowId> {
        self.frame_client.client()
    }

    /// Document windows in creation order.
    pub fn documents(&self) -> &[WindowId] {
        self.frame_client.documents()
    }

    pub fn window_menu_entries(&self) -> &[WindowMenuEntry] {
        self.frame_client.entries()
    }

    pub fn set_title(&mut self, id: WindowId, title: impl Into<String>) -> PlatformResult<()> {
        let title = title.into();
        let handle = self.live_handle(id)?;
        self.backend.set_title(handle, &title)?;
        self.record_mut(id)?.title = title;
        if self.frame_client.is_document(id) {
            self.sync_window_menu();
        }
        Ok(())
    }

    pub fn title(&self, id: WindowId) -> Option<&str> {
        self.registry.get(id).map(WindowRecord::title)
    }

    pub fn content_rect(&self, id: WindowId) -> PlatformResult<Rect> {
        self.backend.content_rect(self.live_handle(id)?)
    }

    pub fn set_content_rect(&mut self, id: WindowId, rect: Rect) -> PlatformResult<()> {
        let handle = self.live_handle(id)?;
        self.backend.set_content_rect(handle, rect)
    }

    pub fn is_window_enabled(&self, id: WindowId) -> bool {
        self.registry
            .native_handle(id)
            .is_some_and(|handle| self.backend.is_enabled(handle))
    }

    pub fn set_window_enabled(&mut self, id: WindowId, enabled: bool) -> PlatformResult<()> {
        let handle = self.live_handle(id)?;
        self.backend.set_enabled(handle, enabled)
    }

    pub fn is_window_visible(&self, id: WindowId) -> bool {
        self.registry.get(id).is_some_and(WindowRecord::is_visible)
    }

    pub fn window_type(&self, id: WindowId) -> Option<WindowType> {
        self.registry.get(id).map(WindowRecord::window_type)
    }

    pub fn class_id(&self, id: WindowId) -> Option<ClassId> {
        self.registry.get(id).map(WindowRecord::class_id)
    }

    pub fn native_handle(&self, id: WindowId) -> Option<NativeHandle> {
        self.registry.native_handle(id)
    }

    pub fn window(&self, id: WindowId) -> Option<&WindowRecord> {
        self.registry.get(id)
    }

    pub fn user_data<T: Any>(&self, id: WindowId) -> Option<&T> {
        self.registry.get(id)?.user_data::<T>()
    }

    pub fn user_data_mut<T: Any>(&mut self, id: WindowId) -> Option<&mut T> {
        self.registry.get_mut(id)?.user_data_mut::<T>()
    }

    pub fn take_user_data(&mut self, id: WindowId) -> Option<Box<dyn Any>> {
        self.registry.get_mut(id)?.take_user_data()
    }

    pub fn windows_of_class(&self, class_id: ClassId) -> Vec<WindowId> {
        self.registry
            .iter()
            .filter(|(_, record)| record.class_id() == class_id)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn add_control(&mut self, window: WindowId, template: &ControlTemplate) -> PlatformResult<()> {
        let handle = self.live_handle(window)?;
        if self.record(window)?.has_control(template.id) {
            return Err(PlatformError::OperationFailed(format!(
                "Control ID {} already exists in {window:?}",
                template.id.raw()
            )));
        }
        let native = self.backend.create_control(handle, template)?;
        log::debug!(
            "Platform: {:?} control {} created in {window:?}",
            template.kind,
            template.id.raw()
        );
        self.record_mut(window)?.controls.insert(
            template.id,
            ControlRecord {
                kind: template.kind,
                native,
            },
        );
        Ok(())
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceTable {
        &mut self.resources
    }

    /// Installs a copy of a menu-bar resource on `window`.
    pub fn load_menu_bar(&mut self, window: WindowId, resource_id: ResourceId) -> PlatformResult<()> {
        let menu_bar = self.resources.load_menu_bar(resource_id)?;
        self.set_menu_bar(window, menu_bar)
    }

    pub fn set_menu_bar(&mut self, window: WindowId, menu_bar: MenuBar) -> PlatformResult<()> {
        self.record_mut(window)?.menu_bar = Some(menu_bar);
        if self.frame_client.frame() == Some(window) {
            self.sync_window_menu();
            Ok(())
        } else {
            self.push_menu_bar(window)
        }
    }

    pub fn menu_bar(&self, window: WindowId) -> Option<&MenuBar> {
        self.registry.get(window)?.menu_bar.as_ref()
    }

    pub fn set_menu_item_enabled(
        &mut self,
        window: WindowId,
        item: MenuItemId,
        enabled: bool,
    ) -> PlatformResult<()> {
        self.update_menu_item(window, item, |bar| bar.enable_item(item, enabled))
    }

    pub fn set_menu_item_checked(
        &mut self,
        window: WindowId,
        item: MenuItemId,
        checked: bool,
    ) -> PlatformResult<()> {
        self.update_menu_item(window, item, |bar| bar.check_item(item, checked))
    }

    fn update_menu_item<F>(&mut self, window: WindowId, item: MenuItemId, update: F) -> PlatformResult<()>
    where
        F: FnOnce(&mut MenuBar) -> bool,
    {
        let menu_bar = self.record_mut(window)?.menu_bar.as_mut().ok_or_else(|| {
            PlatformError::OperationFailed(format!("{window:?} has no menu bar"))
        })?;
        if !update(menu_bar) {
            return Err(PlatformError::InvalidHandle(format!(
                "Menu item {} not found in menu bar of {window:?}",
                item.0
            )));
        }
        self.push_menu_bar(window)
    }

    fn push_menu_bar(&mut self, window: WindowId) -> PlatformResult<()> {
        let handle = self.live_handle(window)?;
        let Some(menu_bar) = self.registry.get(window).and_then(|r| r.menu_bar.clone()) else {
            return Ok(());
        };
        self.backend.apply_menu_bar(handle, &menu_bar)
    }

    /*
     * Rebuilds the window-menu entries from the document list, splices them
     * into the frame's window menu when one is configured and pushes the
     * frame's menu bar natively.
     */
    pub(crate) fn sync_window_menu(&mut self) {
        let registry = &self.registry;
        let entries = self
            .frame_client
            .rebuild_entries(|doc| {
                registry
                    .get(doc)
                    .map(|record| (record.title().to_string(), record.is_visible()))
            })
            .to_vec();
        let Some(frame) = self.frame_client.frame() else {
            return;
        };
        if let Some(position) = self.frame_client.window_menu_position()
            && let Some(menu_bar) = self
                .registry
                .get_mut(frame)
                .and_then(|record| record.menu_bar.as_mut())
            && !apply_window_menu(menu_bar, position, &entries)
        {
            log::warn!("Platform: frame menu bar has no menu at window-menu position {position}");
        }
        if let Err(err) = self.push_menu_bar(frame) {
            log::error!("Platform: updating the frame menu bar failed: {err}");
        }
    }

    // After the active document went away: the frontmost visible one takes over.
    fn activate_next_document(&mut self) {
        let next = self
            .backend
            .z_order()
            .into_iter()
            .filter_map(|handle| self.registry.lookup_by_handle(handle))
            .find(|id| self.frame_client.is_document(*id) && self.is_window_visible(*id));
        match next {
            Some(document) => {
                log::debug!("Platform: activating next document {document:?}");
                if let Err(err) = self.activate_window(document) {
                    log::error!("Platform: activating {document:?} failed: {err}");
                    self.sync_window_menu();
                }
            }
            None => {
                self.frame_client.set_active(None);
                self.sync_window_menu();
            }
        }
    }

    pub(crate) fn live_handle(&self, id: WindowId) -> PlatformResult<NativeHandle> {
        self.registry
            .native_handle(id)
            .ok_or_else(|| PlatformError::InvalidHandle(format!("{id:?} is not a live window")))
    }

    fn record(&self, id: WindowId) -> PlatformResult<&WindowRecord> {
        self.registry
            .get(id)
            .ok_or_else(|| PlatformError::InvalidHandle(format!("{id:?} is not a registered window")))
    }

    fn record_mut(&mut self, id: WindowId) -> PlatformResult<&mut WindowRecord> {
        self.registry
            .get_mut(id)
            .ok_or_else(|| PlatformError::InvalidHandle(format!("{id:?} is not a registered window")))
    }

    /*
     * Destroys every remaining window, frame first so its dependents go with
     * it. Called on drop; calling it earlier is allowed.
     */
    pub fn shutdown(&mut self) {
        if self.registry.is_empty() {
            return;
        }
        log::debug!("Platform: shutting down {} window(s)", self.registry.len());
        if let Some(frame) = self.frame_client.frame()
            && let Err(err) = self.destroy_window(frame)
        {
            log::error!("Platform: destroying frame on shutdown failed: {err}");
        }
        for id in self.registry.ids() {
            if self.registry.contains(id)
                && let Err(err) = self.destroy_window(id)
            {
                log::error!("Platform: destroying {id:?} on shutdown failed: {err}");
            }
        }
    }
}

impl Drop for Platform {
    fn drop(&mut self) {
        self.shutdown();
    }
}
