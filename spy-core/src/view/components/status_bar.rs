//! src/view/components/status_bar.rs
//!
//! One line at the bottom: the interaction mode and highlighted entry on the
//! left, key hints for the mode on the right.

use ratatui::{
    prelude::*,
    widgets::{Paragraph, Widget},
};

use crate::fs::entry::Entry;
use crate::model::ui_state::Mode;
use crate::view::theme::Palette;

pub struct StatusBar;

impl StatusBar {
    pub fn render(
        frame: &mut Frame<'_>,
        mode: Mode,
        highlighted: Option<&Entry>,
        history_depth: usize,
        palette: &Palette,
        area: Rect,
    ) {
        let mode_str: &str = match mode {
            Mode::Browsing => "BROWSE",
            Mode::ActionMenuOpen => "MENU",
            Mode::ConfirmDelete => "CONFIRM",
            Mode::InputPromptOpen => "INPUT",
        };

        let target: String = highlighted.map_or_else(String::new, |e| {
            format!("{} ({})", e.label(), e.kind)
        });

        let left = Line::from(vec![
            Span::styled(
                format!(" {mode_str} "),
                Style::default()
                    .fg(palette.background)
                    .bg(palette.purple)
                    .bold(),
            ),
            Span::raw(" "),
            Span::styled(target, Style::default().fg(palette.foreground)),
            Span::styled(
                if history_depth > 0 {
                    format!("  ↑{history_depth}")
                } else {
                    String::new()
                },
                palette.muted(),
            ),
        ]);

        let hints: &str = match mode {
            Mode::Browsing => "↑↓ move  → expand  ← collapse  ⏎ open  ⌫ back  a actions  q quit ",
            Mode::ActionMenuOpen => "↑↓ choose  ⏎ run  esc close ",
            Mode::ConfirmDelete => "y delete  esc cancel ",
            Mode::InputPromptOpen => "⏎ submit  esc cancel ",
        };

        let [left_area, right_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(area);

        Paragraph::new(left)
            .style(palette.base())
            .alignment(Alignment::Left)
            .render(left_area, frame.buffer_mut());

        Paragraph::new(hints)
            .style(palette.muted().bg(palette.background))
            .alignment(Alignment::Right)
            .render(right_area, frame.buffer_mut());
    }
}
