//! src/view/components/action_menu_overlay.rs
//! ============================================================================
//! # ActionMenuOverlay: contextual actions for the highlighted entry
//!
//! Shows the action list, an inline error from the last failed action, and
//! the delete confirmation question when the menu is waiting for `y`.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::model::action_menu::{ActionKind, ActionMenu};
use crate::view::theme::Palette;

pub struct ActionMenuOverlay;

impl ActionMenuOverlay {
    pub fn render(frame: &mut Frame<'_>, menu: &ActionMenu, palette: &Palette, area: Rect) {
        frame.render_widget(Clear, area);

        let title: String = menu
            .target()
            .map_or_else(|| " Actions ".to_string(), |t| format!(" {} ", t.name));

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_alignment(Alignment::Center)
            .border_style(palette.border())
            .style(palette.base());
        let inner: Rect = block.inner(area);
        frame.render_widget(block, area);

        let footer_height: u16 = if menu.error.is_some() || menu.is_confirming() {
            3
        } else {
            1
        };
        let [list_area, footer_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(footer_height)]).areas(inner);

        let items: Vec<ListItem<'_>> = menu
            .actions()
            .iter()
            .map(|action| {
                let style: Style = match action {
                    ActionKind::Delete => Style::default().fg(palette.red),
                    a if a.is_batch() => Style::default().fg(palette.pink),
                    _ => Style::default().fg(palette.foreground),
                };
                ListItem::new(Span::styled(action.to_string(), style))
            })
            .collect();

        let mut state: ListState = ListState::default().with_selected(Some(menu.cursor()));
        let list = List::new(items)
            .highlight_style(palette.highlight())
            .highlight_symbol("› ")
            .highlight_spacing(HighlightSpacing::Always);
        frame.render_stateful_widget(list, list_area, &mut state);

        let footer: Paragraph<'_> = if menu.is_confirming() {
            let name: &str = menu.target().map_or("", |t| t.name.as_str());
            Paragraph::new(vec![
                Line::from(Span::styled(
                    format!("Delete {name}?"),
                    Style::default().fg(palette.yellow).bold(),
                )),
                Line::from(Span::styled("y to confirm • any other key to keep", palette.muted())),
            ])
        } else if let Some(error) = &menu.error {
            Paragraph::new(Span::styled(error.as_str(), Style::default().fg(palette.red)))
                .wrap(Wrap { trim: true })
        } else {
            Paragraph::new(Span::styled("Enter to run • Esc to close", palette.muted()))
        };
        frame.render_widget(footer.alignment(Alignment::Center), footer_area);
    }
}
