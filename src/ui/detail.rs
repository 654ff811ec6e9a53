use ratatui::{
    layout::{Constraint, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use super::actions::{render_actions, ActionButton, ButtonRegion};
use super::connection::render_connection_failure;
use super::notice_line;
use super::results::{render_grid, GridView};
use super::theme::{icons, Theme};
use crate::app::DetailTab;
use crate::dashboard::{ConnectionState, Notice, Page, TableDetail};
use crate::db::{cell_text, ColumnDescriptor, DEFAULT_ROW_CAP};

pub const SCHEMA_HEADERS: [&str; 5] = [
    "column_name",
    "data_type",
    "is_nullable",
    "column_default",
    "ordinal_position",
];

pub fn schema_grid(schema: &[ColumnDescriptor]) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = SCHEMA_HEADERS.iter().map(|h| h.to_string()).collect();
    let rows = schema
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                c.data_type.clone(),
                if c.nullable { "YES" } else { "NO" }.to_string(),
                c.default.clone().unwrap_or_default(),
                c.position.to_string(),
            ]
        })
        .collect();
    (headers, rows)
}

pub fn data_grid(detail: &TableDetail) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = detail.columns();
    let rows = detail
        .rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();
    (headers, rows)
}

pub struct DetailProps {
    pub tab: DetailTab,
    pub grid: GridView,
    pub hovered: ActionButton,
    pub focused: bool,
}

/// Renders the right-hand pane. Returns the action buttons when the data tab is shown.
pub fn render_detail(
    frame: &mut Frame,
    area: Rect,
    page: &Page,
    props: &DetailProps,
    theme: &Theme,
) -> Option<ButtonRegion> {
    match &page.connection {
        ConnectionState::Failed { error, hint } => {
            render_connection_failure(frame, area, error, hint, theme);
            None
        }
        ConnectionState::Pending => {
            render_message(frame, area, " Details ", &[], props.focused, theme);
            None
        }
        ConnectionState::Connected { .. } => match &page.detail {
            Some(detail) => render_table_detail(frame, area, detail, page.export_notice.as_ref(), props, theme),
            None => {
                let mut notices: Vec<Notice> = page.tables_notice.iter().cloned().collect();
                if let Some(prompt) = page.prompt() {
                    notices.push(Notice::Info(format!("{} {prompt}", icons::POINTER)));
                }
                render_message(frame, area, " Details ", &notices, props.focused, theme);
                None
            }
        },
    }
}

fn render_message(frame: &mut Frame, area: Rect, title: &str, notices: &[Notice], focused: bool, theme: &Theme) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(theme.block_style(focused))
        .style(Style::default().bg(theme.bg));
    let lines: Vec<Line> = notices.iter().map(|n| notice_line(n, theme)).collect();
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

fn render_table_detail(
    frame: &mut Frame,
    area: Rect,
    detail: &TableDetail,
    export_notice: Option<&Notice>,
    props: &DetailProps,
    theme: &Theme,
) -> Option<ButtonRegion> {
    let block = Block::default()
        .title(Line::from(vec![
            Span::raw(" "),
            Span::styled(icons::TABLE, theme.dim_style()),
            Span::styled(format!(" Table: {} ", detail.table), theme.header_style()),
        ]))
        .borders(Borders::ALL)
        .border_style(theme.block_style(props.focused))
        .style(Style::default().bg(theme.bg));
    let inner = block.inner(area).inner(Margin::new(1, 0));
    frame.render_widget(block, area);

    let chunks = Layout::vertical([Constraint::Length(2), Constraint::Min(1)]).split(inner);

    let selected = match props.tab {
        DetailTab::Schema => 0,
        DetailTab::Data => 1,
    };
    let tabs = Tabs::new(vec!["Schema", "Data"])
        .select(selected)
        .style(theme.dim_style())
        .highlight_style(theme.selected_style())
        .divider("|");
    frame.render_widget(tabs, chunks[0]);

    match props.tab {
        DetailTab::Schema => {
            render_schema_tab(frame, chunks[1], detail, props, theme);
            None
        }
        DetailTab::Data => Some(render_data_tab(frame, chunks[1], detail, export_notice, props, theme)),
    }
}

fn render_schema_tab(frame: &mut Frame, area: Rect, detail: &TableDetail, props: &DetailProps, theme: &Theme) {
    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(2), Constraint::Min(1)]).split(area);

    frame.render_widget(
        Paragraph::new("Table Schema:").style(theme.text_style().add_modifier(Modifier::BOLD)),
        chunks[0],
    );

    if let Some(notice) = &detail.schema_notice {
        frame.render_widget(
            Paragraph::new(notice_line(notice, theme)).wrap(Wrap { trim: true }),
            chunks[1],
        );
    }

    if !detail.schema.is_empty() {
        let (headers, rows) = schema_grid(&detail.schema);
        render_grid(frame, chunks[2], "Columns", &headers, &rows, props.grid, props.focused, theme);
    }
}

fn render_data_tab(
    frame: &mut Frame,
    area: Rect,
    detail: &TableDetail,
    export_notice: Option<&Notice>,
    props: &DetailProps,
    theme: &Theme,
) -> ButtonRegion {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .split(area);

    frame.render_widget(
        Paragraph::new(format!("Table Data (First {DEFAULT_ROW_CAP} rows):"))
            .style(theme.text_style().add_modifier(Modifier::BOLD)),
        chunks[0],
    );

    let region = render_actions(frame, chunks[1], props.hovered, !detail.rows.is_empty(), theme);

    if detail.rows.is_empty() {
        if let Some(notice) = &detail.data_notice {
            frame.render_widget(
                Paragraph::new(notice_line(notice, theme)).wrap(Wrap { trim: true }),
                chunks[2],
            );
        }
    } else {
        frame.render_widget(
            Paragraph::new(detail.row_count_label()).style(theme.dim_style()),
            chunks[2],
        );
        let (headers, rows) = data_grid(detail);
        render_grid(frame, chunks[3], "Rows", &headers, &rows, props.grid, props.focused, theme);
    }

    if let Some(notice) = export_notice {
        frame.render_widget(Paragraph::new(notice_line(notice, theme)), chunks[4]);
    }

    region
}
