use ratatui::{
    layout::Rect,
    widgets::Paragraph,
    Frame,
};

use super::theme::{icons, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionButton {
    None,
    Refresh,
    Download,
}

#[derive(Debug, Clone, Copy)]
pub struct ButtonRegion {
    pub refresh: Rect,
    pub download: Rect,
}

fn contains(rect: Rect, x: u16, y: u16) -> bool {
    rect.x <= x && x < rect.x + rect.width && rect.y <= y && y < rect.y + rect.height
}

impl ButtonRegion {
    pub fn hit_test(&self, x: u16, y: u16) -> ActionButton {
        if contains(self.refresh, x, y) {
            return ActionButton::Refresh;
        }
        if contains(self.download, x, y) {
            return ActionButton::Download;
        }
        ActionButton::None
    }
}

/// Draws the refresh and download buttons on one line at the left of `area`.
pub fn render_actions(
    frame: &mut Frame,
    area: Rect,
    hovered: ActionButton,
    can_download: bool,
    theme: &Theme,
) -> ButtonRegion {
    let refresh_text = format!(" {} Refresh Data ", icons::REFRESH);
    let download_text = format!(" {} Download as CSV ", icons::DOWNLOAD);

    let refresh_width = (refresh_text.chars().count() as u16).min(area.width);
    let download_width = (download_text.chars().count() as u16).min(area.width.saturating_sub(refresh_width + 1));

    let refresh_rect = Rect::new(area.x, area.y, refresh_width, 1);
    let download_rect = Rect::new(area.x + refresh_width + 1, area.y, download_width, 1);

    let refresh_style = button_style(ActionButton::Refresh, hovered, theme);
    let download_style = if can_download {
        button_style(ActionButton::Download, hovered, theme)
    } else {
        theme.muted_style()
    };

    frame.render_widget(Paragraph::new(refresh_text).style(refresh_style), refresh_rect);
    frame.render_widget(Paragraph::new(download_text).style(download_style), download_rect);

    ButtonRegion {
        refresh: refresh_rect,
        download: download_rect,
    }
}

fn button_style(button: ActionButton, hovered: ActionButton, theme: &Theme) -> ratatui::style::Style {
    if button == hovered {
        theme.button_hover_style()
    } else {
        theme.button_style()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_test_maps_positions_to_buttons() {
        let region = ButtonRegion {
            refresh: Rect::new(10, 5, 16, 1),
            download: Rect::new(27, 5, 19, 1),
        };
        assert_eq!(region.hit_test(10, 5), ActionButton::Refresh);
        assert_eq!(region.hit_test(25, 5), ActionButton::Refresh);
        assert_eq!(region.hit_test(26, 5), ActionButton::None);
        assert_eq!(region.hit_test(30, 5), ActionButton::Download);
        assert_eq!(region.hit_test(30, 6), ActionButton::None);
    }
}
