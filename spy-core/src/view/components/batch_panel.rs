//! src/view/components/batch_panel.rs
//! ============================================================
//! Progress gauge plus per-item outcomes of the current or last
//! batch. Reads only the [`BatchSnapshot`] kept in UI state.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
};

use crate::model::ui_state::BatchSnapshot;
use crate::tasks::batch_runner::{BatchDigest, OutcomeStatus};
use crate::view::theme::Palette;

pub struct BatchPanel;

impl BatchPanel {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render(frame: &mut Frame<'_>, batch: &BatchSnapshot, palette: &Palette, area: Rect) {
        let title: String = batch
            .operation
            .as_ref()
            .map_or_else(|| " Batch ".to_string(), |op| format!(" {op} "));

        let border: Color = if batch.aborted.is_some() {
            palette.red
        } else if batch.is_running() {
            palette.yellow
        } else {
            palette.green
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().fg(border).bold())
            .border_style(Style::default().fg(border))
            .style(palette.base());
        let inner: Rect = block.inner(area);
        frame.render_widget(block, area);

        let [gauge_area, status_area, list_area, hint_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(palette.pink).bg(palette.current_line))
            .ratio(batch.ratio())
            .label(format!("{}/{}", batch.completed, batch.total));
        frame.render_widget(gauge, gauge_area);

        let status: Line<'_> = if let Some(reason) = &batch.aborted {
            Line::from(Span::styled(
                format!("Aborted: {reason}"),
                Style::default().fg(palette.red),
            ))
        } else if let Some(summary) = &batch.summary {
            Line::from(vec![
                Span::styled(
                    format!("✓ {}", summary.succeeded),
                    Style::default().fg(palette.green),
                ),
                Span::raw("  "),
                Span::styled(format!("✕ {}", summary.failed), Style::default().fg(palette.red)),
            ])
        } else {
            let current: String = batch
                .current
                .as_deref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "starting…".to_string());
            Line::from(Span::styled(current, palette.muted().italic()))
        };
        frame.render_widget(Paragraph::new(status), status_area);

        let mut items: Vec<ListItem<'_>> = batch
            .outcomes
            .iter()
            .flat_map(|outcome| {
                let name: String = outcome
                    .item
                    .file_name()
                    .map_or_else(|| outcome.item.display().to_string(), |n| {
                        n.to_string_lossy().into_owned()
                    });
                let (mark, color) = match outcome.status {
                    OutcomeStatus::Succeeded => ("✓", palette.green),
                    OutcomeStatus::Failed => ("✕", palette.red),
                    OutcomeStatus::Cancelled => ("⊘", palette.yellow),
                };

                let mut lines: Vec<ListItem<'_>> = vec![ListItem::new(Line::from(vec![
                    Span::styled(format!("{mark} "), Style::default().fg(color)),
                    Span::styled(name, Style::default().fg(palette.foreground)),
                    Span::styled(format!("  {}", outcome.detail), palette.muted()),
                ]))];

                if let Some(report) = &outcome.report {
                    lines.extend(report.iter().map(|(k, v)| {
                        ListItem::new(Line::from(vec![
                            Span::raw("    "),
                            Span::styled(format!("{k}: "), Style::default().fg(palette.cyan)),
                            Span::raw(v.clone()),
                        ]))
                    }));
                }
                lines
            })
            .collect();

        if let Some(digest) = &batch.digest {
            items.extend(digest_lines(digest, palette));
        }

        // Newest lines stay visible
        let visible: usize = usize::from(list_area.height);
        let skip: usize = items.len().saturating_sub(visible);
        frame.render_widget(List::new(items.into_iter().skip(skip)), list_area);

        let hint: &str = if batch.is_running() {
            "c to cancel"
        } else {
            "x to dismiss"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hint, palette.muted())).alignment(Alignment::Right),
            hint_area,
        );
    }
}

fn digest_lines<'a>(digest: &'a BatchDigest, palette: &Palette) -> Vec<ListItem<'a>> {
    let heading = ListItem::new(Span::styled(
        digest.to_string(),
        Style::default().fg(palette.purple).bold(),
    ));

    let rows: Vec<ListItem<'a>> = match digest {
        BatchDigest::Library { .. } => Vec::new(),
        BatchDigest::Folders(groups) => groups
            .iter()
            .map(|(folder, count)| {
                ListItem::new(Line::from(vec![
                    Span::raw("    "),
                    Span::styled(format!("{folder}/"), Style::default().fg(palette.cyan)),
                    Span::styled(format!("  {count} files"), palette.muted()),
                ]))
            })
            .collect(),
    };

    std::iter::once(heading).chain(rows).collect()
}
