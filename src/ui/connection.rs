use ratatui::{
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::notice_line;
use super::theme::{icons, Theme};
use crate::dashboard::Notice;

/// Detail pane shown when no backend handle could be built.
pub fn render_connection_failure(frame: &mut Frame, area: Rect, error: &str, hint: &str, theme: &Theme) {
    let block = Block::default()
        .title(format!(" {} Connection ", icons::DATABASE))
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .style(Style::default().bg(theme.bg_secondary));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(1),
    ])
    .split(inner.inner(Margin::new(1, 0)));

    frame.render_widget(
        Paragraph::new("Cannot load any tables").style(theme.text_style().add_modifier(Modifier::BOLD)),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(notice_line(&Notice::Error(error.to_string()), theme)).wrap(Wrap { trim: true }),
        chunks[1],
    );
    frame.render_widget(
        Paragraph::new(notice_line(&Notice::Info(hint.to_string()), theme)).wrap(Wrap { trim: true }),
        chunks[2],
    );
}

/// Centered box shown while a page evaluation is running.
pub fn render_busy(frame: &mut Frame, label: &str, theme: &Theme) {
    let area = frame.area();

    let dialog_width = (label.chars().count() as u16 + 8).min(area.width.saturating_sub(4));
    let dialog_height = 3;

    let x = (area.width.saturating_sub(dialog_width)) / 2;
    let y = (area.height.saturating_sub(dialog_height)) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height.min(area.height));

    frame.render_widget(Clear, dialog_area);

    let text = Paragraph::new(Line::from(vec![
        Span::styled(format!("{} ", icons::HOURGLASS), theme.accent_style()),
        Span::styled(label, theme.text_style()),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_focused_style())
            .style(Style::default().bg(theme.bg_secondary)),
    );
    frame.render_widget(text, dialog_area);
}
