use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::catalog::{Catalog, SectionId, SectionIndex};
use crate::player::{PlayerController, ViewMode};
use crate::tui::browse::BrowseState;
use crate::tui::nav::{NavAction, NavTree};

/// 空目录占位文案
pub const EMPTY_NOTICE: &str = "未找到视频目录数据。";
/// 加载失败文案前缀，后接具体错误
pub const LOAD_ERROR_PREFIX: &str = "目录加载失败";

/// 列表模式下键盘焦点落在哪个面板
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Nav,
    Browse,
}

// -----------------------------------------------------------------------------------------------

/// 整个界面的状态。所有修改都发生在按键处理里，单线程事件循环，
/// 处理一个按键期间不可能再进来第二个。
pub struct App {
    pub catalog: Catalog,
    pub index: SectionIndex,
    pub controller: PlayerController,
    pub nav: NavTree,
    pub browse: BrowseState,
    pub focus: Focus,
    pub load_error: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(catalog: Catalog, mut index: SectionIndex, controller: PlayerController) -> Self {
        let nav = NavTree::build(&catalog, &mut index);
        let browse = BrowseState::build(&catalog, &mut index);
        Self {
            catalog,
            index,
            controller,
            nav,
            browse,
            focus: Focus::Nav,
            load_error: None,
            should_quit: false,
        }
    }

    /// 目录加载失败时的壳子：两个目录面板的位置都画错误信息，不再渲染目录
    pub fn failed(message: String, controller: PlayerController) -> Self {
        let catalog = Catalog::default();
        let mut index = SectionIndex::build(&catalog);
        let nav = NavTree::build(&catalog, &mut index);
        let browse = BrowseState::build(&catalog, &mut index);
        Self {
            catalog,
            index,
            controller,
            nav,
            browse,
            focus: Focus::Nav,
            load_error: Some(message),
            should_quit: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    // -------------------------------------------------------------------------------------------

    pub async fn handle_key(&mut self, key: KeyEvent) {
        // 退出键全局有效
        if key.code == KeyCode::Char('q')
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.should_quit = true;
            return;
        }
        if self.load_error.is_some() || self.is_empty() {
            return;
        }

        match self.controller.view_mode() {
            ViewMode::List => self.handle_list_key(key).await,
            ViewMode::Player => self.handle_player_key(key).await,
        }
    }

    async fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Nav => Focus::Browse,
                    Focus::Browse => Focus::Nav,
                };
            }
            _ => match self.focus {
                Focus::Nav => self.handle_nav_key(key).await,
                Focus::Browse => self.handle_browse_key(key).await,
            },
        }
    }

    async fn handle_nav_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.nav.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.nav.move_cursor(1),
            KeyCode::PageUp => self.nav.move_cursor(-10),
            KeyCode::PageDown => self.nav.move_cursor(10),
            KeyCode::Right | KeyCode::Char('l') => self.nav.expand_current(),
            KeyCode::Left | KeyCode::Char('h') => self.nav.collapse_current(),
            KeyCode::Enter | KeyCode::Char(' ') => match self.nav.activate() {
                NavAction::Select(id) => self.apply_selection(id).await,
                NavAction::Toggled | NavAction::None => {}
            },
            _ => {}
        }
    }

    async fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.browse.move_item(&self.catalog, -1),
            KeyCode::Down | KeyCode::Char('j') => self.browse.move_item(&self.catalog, 1),
            KeyCode::Left | KeyCode::Char('h') => self.browse.move_week(&self.catalog, -1),
            KeyCode::Right | KeyCode::Char('l') => self.browse.move_week(&self.catalog, 1),
            KeyCode::Char('[') => self.browse.switch_tab(&self.catalog, -1),
            KeyCode::Char(']') => self.browse.switch_tab(&self.catalog, 1),
            KeyCode::Char(',') | KeyCode::PageUp => self.browse.switch_semester(&self.catalog, -1),
            KeyCode::Char('.') | KeyCode::PageDown => self.browse.switch_semester(&self.catalog, 1),
            KeyCode::Enter => {
                let id = self
                    .browse
                    .selected_path(&self.catalog)
                    .and_then(|path| self.index.id_by_path(path));
                match id {
                    Some(id) => self.apply_selection(id).await,
                    None => debug!("浏览光标下没有小节"),
                }
            }
            _ => {}
        }
    }

    async fn handle_player_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => self.controller.return_to_list().await,
            _ => {}
        }
    }

    // -------------------------------------------------------------------------------------------

    /// 唯一的选中入口：控制器换源并更新选中标记，
    /// 然后把两个目录视图同步到新选中的小节（展开祖先、切 Tab、光标对位）。
    pub async fn apply_selection(&mut self, id: SectionId) {
        if let Some(selection) = self.controller.select_section(id, &self.index).await {
            if let Some(entry) = self.index.resolve(selection.id) {
                let path = entry.path;
                self.nav.reveal(&path);
                self.browse.reveal(&path);
            }
        }
    }
}
