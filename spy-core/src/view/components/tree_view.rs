//! src/view/components/tree_view.rs
//! ============================================================================
//! # TreeView: the indented, flattened tree under the current root

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, HighlightSpacing, List, ListItem, ListState, Paragraph},
};

use crate::audio::has_audio_extension;
use crate::fs::entry::EntryKind;
use crate::fs::tree::VisibleRow;
use crate::model::ui_state::UIState;
use crate::view::{icons, theme::Palette};

const INDENT: &str = "  ";

pub struct TreeView;

impl TreeView {
    pub fn render(
        frame: &mut Frame<'_>,
        rows: &[VisibleRow],
        ui: &UIState,
        title: &str,
        palette: &Palette,
        area: Rect,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} "))
            .title_style(Style::default().fg(palette.purple).bold())
            .border_style(palette.muted())
            .style(palette.base());

        if rows.is_empty() {
            let empty = Paragraph::new("(empty)")
                .style(palette.muted().italic())
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem<'_>> = rows.iter().map(|row| Self::item(row, palette)).collect();

        let mut state: ListState = ListState::default()
            .with_offset(ui.scroll_offset)
            .with_selected(Some(ui.selected));

        let list = List::new(items)
            .block(block)
            .highlight_style(palette.highlight())
            .highlight_symbol("▶ ")
            .highlight_spacing(HighlightSpacing::Always);

        frame.render_stateful_widget(list, area, &mut state);
    }

    fn item<'a>(row: &'a VisibleRow, palette: &Palette) -> ListItem<'a> {
        let is_audio: bool = row.entry.is_file() && has_audio_extension(&row.entry.path);
        let icon: &str = icons::for_row(row.entry.kind, row.expanded, is_audio);

        let style: Style = match row.entry.kind {
            EntryKind::Directory => Style::default().fg(palette.cyan),
            EntryKind::File if is_audio => Style::default().fg(palette.pink),
            EntryKind::File => Style::default().fg(palette.foreground),
            EntryKind::Placeholder(_) => Style::default().fg(palette.red).italic(),
        };

        let line = Line::from(vec![
            Span::raw(INDENT.repeat(row.depth)),
            Span::styled(format!("{icon} "), style),
            Span::styled(row.entry.label(), style),
        ]);
        ListItem::new(line)
    }
}
