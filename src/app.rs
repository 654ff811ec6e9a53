use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::dashboard::{Interaction, Page};
use crate::ui::{ActionButton, ButtonRegion, GridView, TableListState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailTab {
    #[default]
    Schema,
    Data,
}

/// Terminal-side state: what is focused and scrolled. Everything the
/// dashboard needs lives in `page`.
pub struct App {
    pub page: Page,
    pub focus: Focus,
    pub tab: DetailTab,
    pub sidebar: TableListState,
    pub grid: GridView,
    pub hovered_button: ActionButton,
    pub busy: Option<&'static str>,
    pub should_quit: bool,
    pub sidebar_area: Option<Rect>,
    pub button_region: Option<ButtonRegion>,
}

impl App {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            focus: Focus::Sidebar,
            tab: DetailTab::Schema,
            sidebar: TableListState::default(),
            grid: GridView::default(),
            hovered_button: ActionButton::None,
            busy: None,
            should_quit: false,
            sidebar_area: None,
            button_region: None,
        }
    }

    pub fn set_page(&mut self, page: Page) {
        let previous_table = self.page.detail.as_ref().map(|d| d.table.clone());
        let current_table = page.detail.as_ref().map(|d| d.table.clone());
        if previous_table != current_table {
            self.grid.reset();
        }
        self.sidebar.point_at(&page.tables, page.selected.as_deref());
        self.page = page;
    }

    pub fn busy_label(interaction: &Interaction) -> &'static str {
        match interaction {
            Interaction::Load | Interaction::RefreshTables => "Fetching tables...",
            Interaction::Select(Some(_)) => "Loading schema and data...",
            Interaction::Select(None) => "Loading...",
            Interaction::RefreshData => "Loading data...",
            Interaction::ExportCsv => "Writing CSV...",
        }
    }

    fn refresh_data(&self) -> Option<Interaction> {
        self.page.detail.as_ref().map(|_| Interaction::RefreshData)
    }

    fn export_csv(&self) -> Option<Interaction> {
        self.page
            .detail
            .as_ref()
            .filter(|d| !d.rows.is_empty())
            .map(|_| Interaction::ExportCsv)
    }

    fn grid_size(&self) -> (usize, usize) {
        match (&self.page.detail, self.tab) {
            (Some(detail), DetailTab::Schema) => (detail.schema.len(), 5),
            (Some(detail), DetailTab::Data) => (detail.rows.len(), detail.columns().len()),
            (None, _) => (0, 0),
        }
    }

    fn set_tab(&mut self, tab: DetailTab) {
        if self.tab != tab {
            self.tab = tab;
            self.grid.reset();
        }
    }

    /// Applies a key press and returns the interaction that needs a page evaluation, if any.
    pub fn on_key(&mut self, key: KeyEvent) -> Option<Interaction> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Sidebar => Focus::Detail,
                    Focus::Detail => Focus::Sidebar,
                };
                None
            }
            KeyCode::Char('1') => {
                self.set_tab(DetailTab::Schema);
                None
            }
            KeyCode::Char('2') => {
                self.set_tab(DetailTab::Data);
                None
            }
            KeyCode::Char('r') => self.refresh_data(),
            KeyCode::Char('R') => Some(Interaction::RefreshTables),
            KeyCode::Char('d') => self.export_csv(),
            _ => match self.focus {
                Focus::Sidebar => self.on_sidebar_key(key.code),
                Focus::Detail => {
                    self.on_detail_key(key.code);
                    None
                }
            },
        }
    }

    fn on_sidebar_key(&mut self, code: KeyCode) -> Option<Interaction> {
        let count = self.page.tables.len();
        match code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.sidebar.select_next(count);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.sidebar.select_prev(count);
                None
            }
            KeyCode::Enter | KeyCode::Right => {
                let choice = self.sidebar.current(&self.page.tables).map(str::to_string);
                if choice == self.page.selected {
                    self.focus = Focus::Detail;
                    return None;
                }
                Some(Interaction::Select(choice))
            }
            _ => None,
        }
    }

    fn on_detail_key(&mut self, code: KeyCode) {
        let (rows, cols) = self.grid_size();
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.grid.scroll_down(rows),
            KeyCode::Up | KeyCode::Char('k') => self.grid.scroll_up(),
            KeyCode::Right | KeyCode::Char('l') => self.grid.scroll_right(cols),
            KeyCode::Left | KeyCode::Char('h') => self.grid.scroll_left(),
            KeyCode::PageDown => {
                for _ in 0..10 {
                    self.grid.scroll_down(rows);
                }
            }
            KeyCode::PageUp => {
                for _ in 0..10 {
                    self.grid.scroll_up();
                }
            }
            _ => {}
        }
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) -> Option<Interaction> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(region) = self.button_region {
                    match region.hit_test(mouse.column, mouse.row) {
                        ActionButton::Refresh => return self.refresh_data(),
                        ActionButton::Download => return self.export_csv(),
                        ActionButton::None => {}
                    }
                }
                self.handle_sidebar_click(mouse.column, mouse.row)
            }
            MouseEventKind::Moved => {
                self.hovered_button = self
                    .button_region
                    .map_or(ActionButton::None, |r| r.hit_test(mouse.column, mouse.row));
                None
            }
            MouseEventKind::ScrollDown => {
                match self.focus {
                    Focus::Sidebar => self.sidebar.select_next(self.page.tables.len()),
                    Focus::Detail => self.grid.scroll_down(self.grid_size().0),
                }
                None
            }
            MouseEventKind::ScrollUp => {
                match self.focus {
                    Focus::Sidebar => self.sidebar.select_prev(self.page.tables.len()),
                    Focus::Detail => self.grid.scroll_up(),
                }
                None
            }
            _ => None,
        }
    }

    fn handle_sidebar_click(&mut self, x: u16, y: u16) -> Option<Interaction> {
        let area = self.sidebar_area?;
        if x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height {
            let relative_y = y.saturating_sub(area.y) as usize;
            self.sidebar.select_by_click(relative_y, self.page.tables.len());
            self.focus = Focus::Sidebar;
            let choice = self.sidebar.current(&self.page.tables).map(str::to_string);
            if choice != self.page.selected {
                return Some(Interaction::Select(choice));
            }
        }
        None
    }
}
