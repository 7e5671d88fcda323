//! src/view/components/notification_overlay.rs
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Style, Stylize},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tracing::{instrument, trace};

use crate::model::ui_state::Notification;
use crate::view::theme::Palette;

pub struct NotificationOverlay;

impl NotificationOverlay {
    #[instrument(
        level = "trace",
        skip_all,
        fields(level = ?notification.level, message_len = notification.message.len())
    )]
    pub fn render(
        frame: &mut Frame<'_>,
        notification: &Notification,
        palette: &Palette,
        area: Rect,
    ) {
        frame.render_widget(Clear, area);

        let (color, title) = palette.notification(notification.level);
        let border: Style = Style::default().fg(color);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} "))
            .title_style(border.bold())
            .border_style(border)
            .style(palette.base());

        let message = Paragraph::new(notification.message.as_str())
            .block(block)
            .style(Style::default().fg(palette.foreground))
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Left);
        frame.render_widget(message, area);

        trace!(
            auto_dismiss = ?notification.auto_dismiss,
            "Notification drawn"
        );
    }
}
