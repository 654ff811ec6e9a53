mod app;
mod config;
mod dashboard;
mod db;
mod error;
mod export;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use app::{App, Focus};
use config::{resolve_config, Cli, Secrets};
use dashboard::{ConnectionState, Dashboard, Interaction, Page};
use ui::{render_busy, render_detail, render_sidebar, DetailProps, Theme};

const LOG_ENV: &str = "SUPAVIEW_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    let config = resolve_config(Cli::parse())?;
    init_logging(&config.log_file)?;
    info!(secrets = %config.secrets_path.display(), "starting");
    if let Some(err) = &config.secrets_error {
        warn!(error = %err, "secrets file not loaded");
    }

    let dashboard = Dashboard::new(config.secrets, config.export_dir).with_secrets_hint(format!(
        "Make sure {} has a [supabase] section with url and anon_key",
        config.secrets_path.display()
    ));
    let initial = Page {
        selected: config.initial_table,
        ..Page::default()
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(initial);
    let theme = Theme::default();

    let result = run_app(&mut terminal, &mut app, &dashboard, &theme).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = %format!("{err:#}"), "terminal loop failed");
        eprintln!("Error: {err:#}");
    }

    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(LOG_ENV).ok().as_deref()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("installing log subscriber")
}

/// The `SUPAVIEW_LOG` directives, or `info` when unset or unparsable.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    dashboard: &Dashboard<Secrets>,
    theme: &Theme,
) -> Result<()> {
    let mut pending = Some(Interaction::Load);

    loop {
        if let Some(interaction) = pending.take() {
            app.busy = Some(App::busy_label(&interaction));
            terminal.draw(|frame| draw(frame, app, theme))?;

            let previous = std::mem::take(&mut app.page);
            let page = dashboard.handle(previous, interaction).await;
            app.set_page(page);
            app.busy = None;
        }

        terminal.draw(|frame| draw(frame, app, theme))?;

        if event::poll(Duration::from_millis(50))? {
            pending = match event::read()? {
                Event::Key(key) => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => None,
            };
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn draw(frame: &mut Frame, app: &mut App, theme: &Theme) {
    let rows = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .split(frame.area());

    render_header(frame, rows[0], &app.page, theme);

    let columns = Layout::horizontal([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)]).split(rows[1]);

    let list_area = render_sidebar(
        frame,
        columns[0],
        &app.page.tables,
        app.page.selected.as_deref(),
        &mut app.sidebar,
        app.focus == Focus::Sidebar,
        theme,
    );
    app.sidebar_area = Some(list_area);

    let props = DetailProps {
        tab: app.tab,
        grid: app.grid,
        hovered: app.hovered_button,
        focused: app.focus == Focus::Detail,
    };
    app.button_region = render_detail(frame, columns[1], &app.page, &props, theme);

    let help = "↑/↓ move  Enter select  Tab focus  1/2 schema/data  r refresh data  R reload tables  d download CSV  q quit";
    frame.render_widget(Paragraph::new(help).style(theme.muted_style()), rows[2]);

    if let Some(label) = app.busy {
        render_busy(frame, label, theme);
    }
}

fn render_header(frame: &mut Frame, area: ratatui::layout::Rect, page: &Page, theme: &Theme) {
    let status = match &page.connection {
        ConnectionState::Pending => Span::styled("connecting...", theme.dim_style()),
        ConnectionState::Connected { kind } => Span::styled(
            format!("✔ Connected ({kind})"),
            Style::default().fg(theme.success),
        ),
        ConnectionState::Failed { .. } => {
            Span::styled("✖ Cannot connect", Style::default().fg(theme.error))
        }
    };
    let title = Line::from(vec![
        Span::styled(" Supabase Table Viewer ", theme.header_style().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        status,
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_falls_back_to_info() {
        assert_eq!(log_filter(None).to_string(), "info");
        assert_eq!(log_filter(Some("supaview=debug")).to_string(), "supaview=debug");
        assert_eq!(log_filter(Some("supaview=loudest")).to_string(), "info");
    }

    #[test]
    fn second_subscriber_install_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let _ = init_logging(&dir.path().join("first.log"));
        let second = init_logging(&dir.path().join("second.log"));
        assert!(second.is_err());
    }
}
