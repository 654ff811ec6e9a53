use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};
use std::borrow::Cow;

use unicode_width::UnicodeWidthStr;

use super::theme::Theme;

const MIN_COL_WIDTH: u16 = 4;
const MAX_COL_WIDTH: u16 = 40;

/// Scroll position of a grid, in rows and columns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GridView {
    pub row_offset: usize,
    pub col_offset: usize,
}

impl GridView {
    pub fn scroll_down(&mut self, total_rows: usize) {
        if self.row_offset + 1 < total_rows {
            self.row_offset += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.row_offset = self.row_offset.saturating_sub(1);
    }

    pub fn scroll_right(&mut self, total_cols: usize) {
        if self.col_offset + 1 < total_cols {
            self.col_offset += 1;
        }
    }

    pub fn scroll_left(&mut self) {
        self.col_offset = self.col_offset.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<u16> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let widest_cell = rows
                .iter()
                .filter_map(|row| row.get(idx))
                .map(|cell| cell.lines().next().unwrap_or("").width())
                .max()
                .unwrap_or(0);
            let width = header.width().max(widest_cell);
            (width.min(usize::from(MAX_COL_WIDTH)) as u16).max(MIN_COL_WIDTH)
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
pub fn render_grid(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    headers: &[String],
    rows: &[Vec<String>],
    view: GridView,
    focused: bool,
    theme: &Theme,
) {
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(theme.block_style(focused));

    if headers.is_empty() {
        frame.render_widget(block, area);
        return;
    }

    let col_offset = view.col_offset.min(headers.len().saturating_sub(1));
    let widths: Vec<Constraint> = column_widths(headers, rows)
        .into_iter()
        .skip(col_offset)
        .map(Constraint::Length)
        .collect();

    let header_cells = headers
        .iter()
        .skip(col_offset)
        .map(|h| Cell::from(h.clone()).style(theme.header_style()));
    let header = Row::new(header_cells).height(1);

    let visible: Vec<Row> = rows
        .iter()
        .skip(view.row_offset)
        .map(|row| {
            let cells = row
                .iter()
                .skip(col_offset)
                .map(|c| Cell::from(single_line(c)).style(theme.text_style()));
            Row::new(cells).height(1)
        })
        .collect();

    let table = Table::new(visible, widths)
        .header(header)
        .column_spacing(2)
        .block(block);

    frame.render_widget(table, area);
}

/// Folds line breaks into spaces so a cell fits its one-line row. Display
/// only: the cell value itself, and any CSV export of it, keeps the breaks.
pub fn single_line(text: &str) -> Cow<'_, str> {
    if text.contains(['\n', '\r']) {
        Cow::Owned(text.replace("\r\n", " ").replace(['\n', '\r'], " "))
    } else {
        Cow::Borrowed(text)
    }
}
