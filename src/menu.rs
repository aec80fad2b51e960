/*
 * Menu-bar model. A `MenuBar` is plain data owned by the window it is
 * installed on; the native backend mirrors it whenever it changes. Menus and
 * submenus are addressed by position (`MenuHandle` is the path of indices from
 * the bar down), items by their command id.
 */
use crate::types::MenuItemId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: Option<MenuItemId>,
    pub label: String,
    pub enabled: bool,
    pub checked: bool,
    pub separator: bool,
    pub submenu: Option<Menu>,
}

impl MenuItem {
    pub fn command(id: MenuItemId, label: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            label: label.into(),
            enabled: true,
            checked: false,
            separator: false,
            submenu: None,
        }
    }

    pub fn separator() -> Self {
        Self {
            id: None,
            label: String::new(),
            enabled: true,
            checked: false,
            separator: true,
            submenu: None,
        }
    }

    pub fn submenu(menu: Menu) -> Self {
        Self {
            id: None,
            label: menu.title.clone(),
            enabled: true,
            checked: false,
            separator: false,
            submenu: Some(menu),
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Menu {
    pub title: String,
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn item(mut self, item: MenuItem) -> Self {
        self.items.push(item);
        self
    }

    fn find_item_mut(&mut self, id: MenuItemId) -> Option<&mut MenuItem> {
        for item in &mut self.items {
            if item.id == Some(id) {
                return Some(item);
            }
            if let Some(found) = item
                .submenu
                .as_mut()
                .and_then(|submenu| submenu.find_item_mut(id))
            {
                return Some(found);
            }
        }
        None
    }

    fn find_item(&self, id: MenuItemId) -> Option<&MenuItem> {
        self.items.iter().find_map(|item| {
            if item.id == Some(id) {
                Some(item)
            } else {
                item.submenu.as_ref().and_then(|submenu| submenu.find_item(id))
            }
        })
    }
}

/// Positional path to a menu: `[2]` is the third top-level menu, `[2, 0]` the
/// first submenu inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MenuHandle {
    path: Vec<usize>,
}

impl MenuHandle {
    pub fn path(&self) -> &[usize] {
        &self.path
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuBar {
    pub menus: Vec<Menu>,
}

impl MenuBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn menu_with(mut self, menu: Menu) -> Self {
        self.menus.push(menu);
        self
    }

    pub fn menu(&self, position: usize) -> Option<MenuHandle> {
        (position < self.menus.len()).then(|| MenuHandle {
            path: vec![position],
        })
    }

    /*
     * Handle to the `position`th submenu of `parent`. Positions count only
     * items that carry a submenu, so separators and commands in between do not
     * shift the numbering.
     */
    pub fn submenu(&self, parent: &MenuHandle, position: usize) -> Option<MenuHandle> {
        let menu = self.resolve(parent)?;
        let index = menu
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.submenu.is_some())
            .nth(position)
            .map(|(index, _)| index)?;
        let mut path = parent.path.clone();
        path.push(index);
        Some(MenuHandle { path })
    }

    pub fn resolve(&self, handle: &MenuHandle) -> Option<&Menu> {
        let (first, rest) = handle.path.split_first()?;
        let mut menu = self.menus.get(*first)?;
        for index in rest {
            menu = menu.items.get(*index)?.submenu.as_ref()?;
        }
        Some(menu)
    }

    pub fn resolve_mut(&mut self, handle: &MenuHandle) -> Option<&mut Menu> {
        let (first, rest) = handle.path.split_first()?;
        let mut menu = self.menus.get_mut(*first)?;
        for index in rest {
            menu = menu.items.get_mut(*index)?.submenu.as_mut()?;
        }
        Some(menu)
    }

    pub fn find_item(&self, id: MenuItemId) -> Option<&MenuItem> {
        self.menus.iter().find_map(|menu| menu.find_item(id))
    }

    fn find_item_mut(&mut self, id: MenuItemId) -> Option<&mut MenuItem> {
        self.menus.iter_mut().find_map(|menu| menu.find_item_mut(id))
    }

    /// Returns `false` when no item carries `id`.
    pub fn enable_item(&mut self, id: MenuItemId, enabled: bool) -> bool {
        match self.find_item_mut(id) {
            Some(item) => {
                item.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Returns `false` when no item carries `id`.
    pub fn check_item(&mut self, id: MenuItemId, checked: bool) -> bool {
        match self.find_item_mut(id) {
            Some(item) => {
                item.checked = checked;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> MenuBar {
        MenuBar::new()
            .menu_with(
                Menu::new("File")
                    .item(MenuItem::command(MenuItemId(100), "New"))
                    .item(MenuItem::separator())
                    .item(MenuItem::submenu(
                        Menu::new("Recent").item(MenuItem::command(MenuItemId(120), "a.txt")),
                    ))
                    .item(MenuItem::command(MenuItemId(101), "Quit")),
            )
            .menu_with(Menu::new("Window"))
    }

    #[test]
    fn menus_and_submenus_resolve_by_position() {
        let bar = sample_bar();

        let file = bar.menu(0).unwrap();
        assert_eq!(bar.resolve(&file).unwrap().title, "File");

        let recent = bar.submenu(&file, 0).unwrap();
        assert_eq!(recent.path(), &[0, 2]);
        assert_eq!(bar.resolve(&recent).unwrap().title, "Recent");

        assert!(bar.menu(2).is_none());
        assert!(bar.submenu(&file, 1).is_none());
    }

    #[test]
    fn enable_and_check_reach_nested_items() {
        let mut bar = sample_bar();

        assert!(bar.enable_item(MenuItemId(120), false));
        assert!(bar.check_item(MenuItemId(101), true));

        assert!(!bar.find_item(MenuItemId(120)).unwrap().enabled);
        assert!(bar.find_item(MenuItemId(101)).unwrap().checked);
    }

    #[test]
    fn unknown_item_ids_are_reported() {
        let mut bar = sample_bar();
        assert!(!bar.enable_item(MenuItemId(999), true));
        assert!(!bar.check_item(MenuItemId(999), true));
    }
}
