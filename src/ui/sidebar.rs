use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use super::theme::{icons, Theme};

pub const NO_SELECTION: &str = "(none)";

/// Cursor over the sidebar entries: index 0 is the empty selection, index
/// `n` is the `n`-th table.
#[derive(Debug, Default)]
pub struct TableListState {
    pub cursor: usize,
    pub scroll_offset: usize,
}

impl TableListState {
    pub fn select_next(&mut self, table_count: usize) {
        self.cursor = (self.cursor + 1) % (table_count + 1);
    }

    pub fn select_prev(&mut self, table_count: usize) {
        self.cursor = if self.cursor == 0 { table_count } else { self.cursor - 1 };
    }

    /// The table under the cursor, `None` for the empty entry.
    pub fn current<'a>(&self, tables: &'a [String]) -> Option<&'a str> {
        self.cursor.checked_sub(1).and_then(|i| tables.get(i)).map(String::as_str)
    }

    pub fn point_at(&mut self, tables: &[String], selected: Option<&str>) {
        self.cursor = selected
            .and_then(|s| tables.iter().position(|t| t == s))
            .map_or(0, |i| i + 1);
    }

    pub fn select_by_click(&mut self, visible_index: usize, table_count: usize) {
        let idx = self.scroll_offset + visible_index;
        if idx <= table_count {
            self.cursor = idx;
        }
    }

    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + visible_height {
            self.scroll_offset = self.cursor + 1 - visible_height;
        }
    }
}

/// Renders the tables overview and returns the area of the clickable list.
pub fn render_sidebar(
    frame: &mut Frame,
    area: Rect,
    tables: &[String],
    selected: Option<&str>,
    state: &mut TableListState,
    focused: bool,
    theme: &Theme,
) -> Rect {
    let block = Block::default()
        .title(format!(" {} Tables Overview ", icons::DATABASE))
        .borders(Borders::ALL)
        .border_style(theme.block_style(focused))
        .style(Style::default().bg(theme.bg_secondary));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([Constraint::Length(2), Constraint::Min(1)]).split(inner);

    let total = Paragraph::new(Line::from(vec![
        Span::styled("Total tables: ", theme.dim_style()),
        Span::styled(tables.len().to_string(), theme.text_style().add_modifier(Modifier::BOLD)),
    ]));
    frame.render_widget(total, chunks[0]);

    let list_area = chunks[1];
    let visible_height = list_area.height as usize;
    state.update_scroll(visible_height);

    let entries = std::iter::once(None).chain(tables.iter().map(|t| Some(t.as_str())));
    let items: Vec<ListItem> = entries
        .enumerate()
        .skip(state.scroll_offset)
        .take(visible_height)
        .map(|(idx, table)| {
            let under_cursor = idx == state.cursor;
            match table {
                None => {
                    let style = if under_cursor && focused { theme.selected_style() } else { theme.muted_style() };
                    ListItem::new(Line::from(Span::styled(format!(" {NO_SELECTION}"), style)))
                }
                Some(name) => {
                    let is_selected = selected == Some(name);
                    let name_style = if under_cursor && focused {
                        theme.selected_style()
                    } else if is_selected {
                        theme.table_style().add_modifier(Modifier::BOLD)
                    } else {
                        theme.text_style()
                    };
                    let mut spans = vec![
                        Span::styled(format!(" {idx:>3}. "), theme.dim_style()),
                        Span::styled(icons::TABLE, theme.dim_style()),
                        Span::raw(" "),
                        Span::styled(name, name_style),
                    ];
                    if is_selected {
                        spans.push(Span::styled(format!(" {}", icons::STAR), theme.accent_style()));
                    }
                    ListItem::new(Line::from(spans))
                }
            }
        })
        .collect();

    frame.render_widget(List::new(items), list_area);

    let total_entries = tables.len() + 1;
    if total_entries > visible_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");

        let mut scrollbar_state = ScrollbarState::new(total_entries).position(state.scroll_offset);

        frame.render_stateful_widget(scrollbar, scrollbar_column(area, list_area), &mut scrollbar_state);
    }

    list_area
}

/// The rightmost column of `area`, spanning the rows of `list_area`.
fn scrollbar_column(area: Rect, list_area: Rect) -> Rect {
    Rect::new(
        (area.x + area.width).saturating_sub(1),
        list_area.y,
        area.width.min(1),
        list_area.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> Vec<String> {
        vec!["orders".to_string(), "users".to_string()]
    }

    #[test]
    fn cursor_wraps_through_empty_entry() {
        let mut state = TableListState::default();
        state.select_next(2);
        assert_eq!(state.current(&tables()), Some("orders"));
        state.select_next(2);
        assert_eq!(state.current(&tables()), Some("users"));
        state.select_next(2);
        assert_eq!(state.current(&tables()), None);
        state.select_prev(2);
        assert_eq!(state.current(&tables()), Some("users"));
    }

    #[test]
    fn point_at_follows_selection() {
        let mut state = TableListState::default();
        state.point_at(&tables(), Some("users"));
        assert_eq!(state.cursor, 2);
        state.point_at(&tables(), Some("missing"));
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn scroll_keeps_cursor_visible() {
        let mut state = TableListState { cursor: 7, scroll_offset: 0 };
        state.update_scroll(5);
        assert_eq!(state.scroll_offset, 3);
        state.cursor = 1;
        state.update_scroll(5);
        assert_eq!(state.scroll_offset, 1);
    }

    #[test]
    fn scrollbar_sits_on_right_edge() {
        let area = Rect::new(2, 1, 20, 12);
        let list = Rect::new(3, 4, 18, 8);
        assert_eq!(scrollbar_column(area, list), Rect::new(21, 4, 1, 8));
    }

    #[test]
    fn scrollbar_of_zero_width_sidebar_is_empty() {
        let area = Rect::new(0, 0, 0, 10);
        let column = scrollbar_column(area, Rect::new(0, 0, 0, 10));
        assert_eq!(column.x, 0);
        assert_eq!(column.width, 0);
    }

    #[test]
    fn click_outside_entries_is_ignored() {
        let mut state = TableListState::default();
        state.select_by_click(5, 2);
        assert_eq!(state.cursor, 0);
        state.select_by_click(2, 2);
        assert_eq!(state.cursor, 2);
    }
}
