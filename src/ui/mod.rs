mod actions;
mod connection;
mod detail;
mod results;
mod sidebar;
mod theme;

pub use actions::{ActionButton, ButtonRegion};
pub use connection::render_busy;
pub use detail::{render_detail, DetailProps};
pub use results::GridView;
pub use sidebar::{render_sidebar, TableListState};
pub use theme::Theme;

use ratatui::text::{Line, Span};

use crate::dashboard::Notice;
use theme::icons;

pub fn notice_line<'a>(notice: &'a Notice, theme: &Theme) -> Line<'a> {
    let (icon, text) = match notice {
        Notice::Success(text) => (icons::SUCCESS, text),
        Notice::Info(text) => (icons::INFO, text),
        Notice::Warning(text) => (icons::WARNING, text),
        Notice::Error(text) => (icons::ERROR, text),
    };
    let style = theme.notice_style(notice);
    Line::from(vec![
        Span::styled(format!("{icon} "), style),
        Span::styled(text.as_str(), style),
    ])
}
