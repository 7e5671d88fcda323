//! src/view/components/input_prompt_overlay.rs
//! ============================================================================
//! # `InputPromptOverlay`: single-line input for names and tags

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::model::input_prompt::InputPrompt;
use crate::view::theme::Palette;

pub struct InputPromptOverlay;

impl InputPromptOverlay {
    #[allow(clippy::cast_possible_truncation)]
    pub fn render(frame: &mut Frame<'_>, prompt: &InputPrompt, palette: &Palette, area: Rect) {
        frame.render_widget(Clear, area);

        let title: &str = prompt.pending_action().map_or("Input", |a| a.prompt_label());
        let context: String = prompt
            .context_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} "))
            .title_alignment(Alignment::Center)
            .border_style(palette.border())
            .style(palette.base());
        let inner: Rect = block.inner(area);
        frame.render_widget(block, area);

        let [context_area, input_area, message_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(inner);

        frame.render_widget(
            Paragraph::new(Span::styled(context, palette.muted().italic())),
            context_area,
        );

        // Keep the cursor visible when the buffer is wider than the box
        let column: u16 = prompt.cursor_column() as u16;
        let scroll: u16 = column.saturating_sub(input_area.width.saturating_sub(1));
        frame.render_widget(
            Paragraph::new(prompt.buffer())
                .style(Style::default().fg(palette.foreground))
                .scroll((0, scroll)),
            input_area,
        );
        frame.set_cursor_position((input_area.x + column - scroll, input_area.y));

        let message: Line<'_> = match &prompt.error {
            Some(error) => Line::from(Span::styled(error.as_str(), Style::default().fg(palette.red))),
            None => Line::from(Span::styled(
                "Enter to confirm • Esc to cancel",
                palette.muted(),
            )),
        };
        frame.render_widget(
            Paragraph::new(message).alignment(Alignment::Center),
            message_area,
        );
    }
}
