/*
 * Named resources the core can instantiate: menu-bar descriptions and dialog
 * templates. Collaborators populate the table once at start-up; the core only
 * reads from it (a loaded menu bar is a copy the window then owns).
 */
use crate::error::{PlatformError, Result as PlatformResult};
use crate::menu::MenuBar;
use crate::types::{ClassId, ControlId, ControlKind, Rect, ResourceId, WindowFlags};

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlTemplate {
    pub id: ControlId,
    pub kind: ControlKind,
    pub text: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogTemplate {
    pub class_id: ClassId,
    pub title: String,
    pub rect: Rect,
    pub flags: WindowFlags,
    pub controls: Vec<ControlTemplate>,
}

impl DialogTemplate {
    pub fn new(title: impl Into<String>, rect: Rect) -> Self {
        Self {
            class_id: ClassId::default(),
            title: title.into(),
            rect,
            flags: WindowFlags::empty(),
            controls: Vec::new(),
        }
    }

    pub fn with_control(
        mut self,
        id: ControlId,
        kind: ControlKind,
        text: impl Into<String>,
        rect: Rect,
    ) -> Self {
        self.controls.push(ControlTemplate {
            id,
            kind,
            text: text.into(),
            rect,
        });
        self
    }
}

#[derive(Debug, Default)]
pub struct ResourceTable {
    menu_bars: HashMap<ResourceId, MenuBar>,
    dialogs: HashMap<ResourceId, DialogTemplate>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_menu_bar(&mut self, id: ResourceId, menu_bar: MenuBar) {
        if self.menu_bars.insert(id, menu_bar).is_some() {
            log::debug!("Resources: replaced menu bar {id:?}");
        }
    }

    pub fn insert_dialog(&mut self, id: ResourceId, template: DialogTemplate) {
        if self.dialogs.insert(id, template).is_some() {
            log::debug!("Resources: replaced dialog template {id:?}");
        }
    }

    pub fn load_menu_bar(&self, id: ResourceId) -> PlatformResult<MenuBar> {
        self.menu_bars
            .get(&id)
            .cloned()
            .ok_or(PlatformError::ResourceNotFound(id))
    }

    pub fn dialog(&self, id: ResourceId) -> PlatformResult<&DialogTemplate> {
        self.dialogs
            .get(&id)
            .ok_or(PlatformError::ResourceNotFound(id))
    }
}
