/*
 * Frame/Client (multi-document) bookkeeping. There is at most one Frame per
 * platform; it may own one hidden Client, which natively parents every
 * document window. The Client keeps the documents in creation order, tracks
 * the active one and derives the window-menu entries from that list.
 *
 * This module is pure state. `Platform` performs the native side (creating,
 * showing, destroying) and calls in here at every create, show, hide, rename,
 * activate and destroy so the list and the menu never drift apart.
 */
use crate::error::{PlatformError, Result as PlatformResult};
use crate::menu::{MenuBar, MenuItem};
use crate::types::{MenuItemId, WindowId, WindowType};

/// First command id used for window-menu entries.
pub const WINDOW_MENU_FIRST_ID: i32 = 0x7F00;
const WINDOW_MENU_ID_SPAN: i32 = 0x100;

/// Native parent decision for a window about to be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// No frame yet: the new window becomes the one top-level frame.
    BecomeFrame,
    /// Floating palette, natively a child of the frame.
    Floating { frame: WindowId },
    /// Document window, natively a child of the client.
    Document { client: WindowId },
    /// Dialogs are top-level, owned by the frame when there is one.
    Dialog { owner: Option<WindowId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowMenuEntry {
    pub window: WindowId,
    pub label: String,
    pub checked: bool,
    pub command: MenuItemId,
}

#[derive(Debug)]
struct ClientState {
    window: WindowId,
    documents: Vec<WindowId>,
    active: Option<WindowId>,
    window_menu: Option<usize>,
    entries: Vec<WindowMenuEntry>,
}

#[derive(Debug, Default)]
pub struct FrameClient {
    frame: Option<WindowId>,
    client: Option<ClientState>,
}

impl FrameClient {
    pub fn new() -> Self {
        Self::default()
    }

    /*
     * The creation-target decision table, evaluated in order:
     * no frame => become the frame; floating => child of the frame; client
     * present => document under the client; otherwise creation fails.
     */
    pub(crate) fn placement_for(&self, window_type: WindowType) -> PlatformResult<Placement> {
        if window_type == WindowType::Dialog {
            return Ok(Placement::Dialog { owner: self.frame });
        }
        let Some(frame) = self.frame else {
            return Ok(Placement::BecomeFrame);
        };
        if window_type == WindowType::Floating {
            return Ok(Placement::Floating { frame });
        }
        match &self.client {
            Some(client) => Ok(Placement::Document {
                client: client.window,
            }),
            None => Err(PlatformError::NoClientWindow),
        }
    }

    pub fn frame(&self) -> Option<WindowId> {
        self.frame
    }

    pub fn client(&self) -> Option<WindowId> {
        self.client.as_ref().map(|client| client.window)
    }

    pub(crate) fn set_frame(&mut self, frame: WindowId) {
        debug_assert!(self.frame.is_none(), "frame is a singleton");
        self.frame = Some(frame);
    }

    pub(crate) fn set_client(&mut self, window: WindowId, window_menu: Option<usize>) {
        self.client = Some(ClientState {
            window,
            documents: Vec::new(),
            active: None,
            window_menu,
            entries: Vec::new(),
        });
    }

    pub fn window_menu_position(&self) -> Option<usize> {
        self.client.as_ref().and_then(|client| client.window_menu)
    }

    pub fn is_document(&self, window: WindowId) -> bool {
        self.client
            .as_ref()
            .is_some_and(|client| client.documents.contains(&window))
    }

    /// Document windows in creation order.
    pub fn documents(&self) -> &[WindowId] {
        self.client
            .as_ref()
            .map(|client| client.documents.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn add_document(&mut self, window: WindowId) {
        if let Some(client) = self.client.as_mut() {
            client.documents.push(window);
        }
    }

    /// Drops a document; returns whether it was the active one.
    pub(crate) fn remove_document(&mut self, window: WindowId) -> bool {
        let Some(client) = self.client.as_mut() else {
            return false;
        };
        client.documents.retain(|doc| *doc != window);
        if client.active == Some(window) {
            client.active = None;
            true
        } else {
            false
        }
    }

    pub fn active(&self) -> Option<WindowId> {
        self.client.as_ref().and_then(|client| client.active)
    }

    pub(crate) fn set_active(&mut self, window: Option<WindowId>) {
        if let Some(client) = self.client.as_mut() {
            client.active = window;
        }
    }

    /*
     * Forgets a destroyed frame or client. Losing the frame resets everything;
     * losing the client drops the document list with it.
     */
    pub(crate) fn forget(&mut self, window: WindowId) {
        if self.frame == Some(window) {
            log::debug!("FrameClient: frame {window:?} destroyed, resetting state");
            self.frame = None;
            self.client = None;
        } else if self.client() == Some(window) {
            log::debug!("FrameClient: client {window:?} destroyed");
            self.client = None;
        }
    }

    /*
     * Recomputes the window-menu entries: the visible documents, in creation
     * order, with only the active document checked. `describe` returns the
     * label and visibility of a document.
     */
    pub(crate) fn rebuild_entries<F>(&mut self, describe: F) -> &[WindowMenuEntry]
    where
        F: Fn(WindowId) -> Option<(String, bool)>,
    {
        let Some(client) = self.client.as_mut() else {
            return &[];
        };
        let active = client.active;
        client.entries = client
            .documents
            .iter()
            .filter_map(|doc| {
                let (label, visible) = describe(*doc)?;
                visible.then_some((*doc, label))
            })
            .take(WINDOW_MENU_ID_SPAN as usize)
            .enumerate()
            .map(|(position, (window, label))| WindowMenuEntry {
                window,
                label,
                checked: active == Some(window),
                command: MenuItemId(WINDOW_MENU_FIRST_ID + position as i32),
            })
            .collect();
        &client.entries
    }

    pub fn entries(&self) -> &[WindowMenuEntry] {
        self.client
            .as_ref()
            .map(|client| client.entries.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn window_for_command(&self, command: MenuItemId) -> Option<WindowId> {
        self.entries()
            .iter()
            .find(|entry| entry.command == command)
            .map(|entry| entry.window)
    }
}

pub(crate) fn is_window_menu_command(id: MenuItemId) -> bool {
    (WINDOW_MENU_FIRST_ID..WINDOW_MENU_FIRST_ID + WINDOW_MENU_ID_SPAN).contains(&id.0)
}

/// Replaces the window-menu section of the menu at `position` with `entries`.
/// Returns `false` when the bar has no such menu.
pub(crate) fn apply_window_menu(
    menu_bar: &mut MenuBar,
    position: usize,
    entries: &[WindowMenuEntry],
) -> bool {
    let Some(menu) = menu_bar.menus.get_mut(position) else {
        return false;
    };
    menu.items
        .retain(|item| !item.id.is_some_and(is_window_menu_command));
    menu.items.extend(entries.iter().map(|entry| {
        let item = MenuItem::command(entry.command, entry.label.clone());
        if entry.checked { item.checked() } else { item }
    }));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::Menu;
    use slotmap::SlotMap;

    fn ids(count: usize) -> Vec<WindowId> {
        let mut map: SlotMap<WindowId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    #[test]
    fn decision_table_without_frame_makes_a_frame() {
        let state = FrameClient::new();
        assert_eq!(
            state.placement_for(WindowType::Normal).unwrap(),
            Placement::BecomeFrame
        );
        assert_eq!(
            state.placement_for(WindowType::Floating).unwrap(),
            Placement::BecomeFrame
        );
        assert_eq!(
            state.placement_for(WindowType::Dialog).unwrap(),
            Placement::Dialog { owner: None }
        );
    }

    #[test]
    fn decision_table_with_frame_and_client() {
        let w = ids(2);
        let mut state = FrameClient::new();
        state.set_frame(w[0]);

        assert_eq!(
            state.placement_for(WindowType::Floating).unwrap(),
            Placement::Floating { frame: w[0] }
        );
        assert!(matches!(
            state.placement_for(WindowType::Normal),
            Err(PlatformError::NoClientWindow)
        ));

        state.set_client(w[1], None);
        assert_eq!(
            state.placement_for(WindowType::Normal).unwrap(),
            Placement::Document { client: w[1] }
        );
        assert_eq!(
            state.placement_for(WindowType::Dialog).unwrap(),
            Placement::Dialog { owner: Some(w[0]) }
        );
    }

    #[test]
    fn entries_list_visible_documents_with_one_check_mark() {
        // Arrange
        let w = ids(5);
        let mut state = FrameClient::new();
        state.set_frame(w[0]);
        state.set_client(w[1], Some(0));
        for doc in &w[2..] {
            state.add_document(*doc);
        }
        state.set_active(Some(w[4]));
        let hidden = w[3];
        // Act
        let entries = state
            .rebuild_entries(|doc| Some((format!("{doc:?}"), doc != hidden)))
            .to_vec();
        // Assert
        assert_eq!(
            entries.iter().map(|e| e.window).collect::<Vec<_>>(),
            vec![w[2], w[4]]
        );
        assert_eq!(entries.iter().filter(|e| e.checked).count(), 1);
        assert!(entries[1].checked);
        assert_eq!(entries[0].command, MenuItemId(WINDOW_MENU_FIRST_ID));
        assert_eq!(state.window_for_command(MenuItemId(WINDOW_MENU_FIRST_ID + 1)), Some(w[4]));
    }

    #[test]
    fn removing_the_active_document_clears_active() {
        let w = ids(4);
        let mut state = FrameClient::new();
        state.set_frame(w[0]);
        state.set_client(w[1], None);
        state.add_document(w[2]);
        state.add_document(w[3]);
        state.set_active(Some(w[3]));

        assert!(!state.remove_document(w[2]));
        assert!(state.remove_document(w[3]));
        assert_eq!(state.active(), None);
        assert!(state.documents().is_empty());
    }

    #[test]
    fn forgetting_the_frame_resets_client_too() {
        let w = ids(3);
        let mut state = FrameClient::new();
        state.set_frame(w[0]);
        state.set_client(w[1], None);
        state.add_document(w[2]);

        state.forget(w[0]);

        assert_eq!(state.frame(), None);
        assert_eq!(state.client(), None);
        assert!(!state.is_document(w[2]));
    }

    #[test]
    fn apply_window_menu_replaces_only_window_entries() {
        let w = ids(1);
        let mut bar = MenuBar::new().menu_with(
            Menu::new("Window")
                .item(MenuItem::command(MenuItemId(10), "Tile"))
                .item(MenuItem::command(MenuItemId(WINDOW_MENU_FIRST_ID), "stale")),
        );
        let entries = vec![WindowMenuEntry {
            window: w[0],
            label: "Doc".into(),
            checked: true,
            command: MenuItemId(WINDOW_MENU_FIRST_ID),
        }];

        assert!(apply_window_menu(&mut bar, 0, &entries));
        let labels: Vec<_> = bar.menus[0].items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Tile", "Doc"]);
        assert!(bar.menus[0].items[1].checked);
        assert!(!apply_window_menu(&mut bar, 3, &entries));
    }
}
