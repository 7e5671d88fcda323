//! src/view/ui.rs
//! ============================================================
//! Frame renderer. Draws the whole screen from the workflow's
//! read-only accessors; it never changes navigator state.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use tracing::instrument;

use crate::controller::workflow::Workflow;
use crate::fs::tree::VisibleRow;
use crate::model::ui_state::{Mode, NotificationLevel};
use crate::view::components::{
    action_menu_overlay::ActionMenuOverlay, batch_panel::BatchPanel,
    input_prompt_overlay::InputPromptOverlay, notification_overlay::NotificationOverlay,
    status_bar::StatusBar, tree_view::TreeView,
};
use crate::view::theme::Palette;

/// ---------------------------------------------------------------------------
/// Renderer struct (palette + layout cache)
/// ---------------------------------------------------------------------------
pub struct UIRenderer {
    palette: Palette,
    cache: LayoutCache,
}

#[derive(Default)]
struct LayoutCache {
    screen: Rect,
    header: Rect,
    body: Rect,
    status: Rect,
    hit: u64,
    miss: u64,
}

impl UIRenderer {
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            cache: LayoutCache::default(),
        }
    }

    #[instrument(level = "trace", skip_all)]
    pub fn render(&mut self, f: &mut Frame<'_>, wf: &Workflow) {
        self.update_layout_cache(f.area());
        let palette: Palette = self.palette;

        // header -------------------------------------------------------------
        let root: String = wf.nav().current_root().display().to_string();
        let header = Line::from(vec![
            Span::styled(" spy ", Style::default().fg(palette.background).bg(palette.pink).bold()),
            Span::raw(" "),
            Span::styled(root, Style::default().fg(palette.purple)),
            Span::styled(
                if wf.tree().show_hidden() { "  [hidden shown]" } else { "" },
                palette.muted(),
            ),
        ]);
        f.render_widget(Paragraph::new(header).style(palette.base()), self.cache.header);

        // tree + optional batch panel -----------------------------------------
        let rows: Vec<VisibleRow> = wf.rows();
        let title: String = wf
            .tree()
            .root()
            .map_or_else(String::new, |r| r.entry.name.to_string());

        match &wf.ui().batch {
            Some(batch) => {
                let [tree_area, batch_area] =
                    Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                        .areas(self.cache.body);
                TreeView::render(f, &rows, wf.ui(), &title, &palette, tree_area);
                BatchPanel::render(f, batch, &palette, batch_area);
            }
            None => TreeView::render(f, &rows, wf.ui(), &title, &palette, self.cache.body),
        }

        StatusBar::render(
            f,
            wf.mode(),
            wf.nav().highlighted(),
            wf.nav().history().len(),
            &palette,
            self.cache.status,
        );

        // overlays -----------------------------------------------------------
        let screen: Rect = self.cache.screen;
        match wf.mode() {
            Mode::ActionMenuOpen | Mode::ConfirmDelete => {
                #[allow(clippy::cast_possible_truncation)]
                let height: u16 = (wf.menu().actions().len() as u16).saturating_add(6);
                let area: Rect = centered(screen, 40, height);
                ActionMenuOverlay::render(f, wf.menu(), &palette, area);
            }
            Mode::InputPromptOpen => {
                let area: Rect = centered(screen, 60, 5);
                InputPromptOverlay::render(f, wf.prompt(), &palette, area);
            }
            Mode::Browsing => {}
        }

        if let Some(n) = &wf.ui().notification {
            let area: Rect = notification_rect(screen, n.level);
            NotificationOverlay::render(f, n, &palette, area);
        }
    }

    fn update_layout_cache(&mut self, scr: Rect) {
        if self.cache.screen == scr {
            self.cache.hit += 1;
            return;
        }

        self.cache.miss += 1;
        self.cache.screen = scr;
        let [header, body, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(scr);
        self.cache.header = header;
        self.cache.body = body;
        self.cache.status = status;
    }
}

/// `w_pct` percent wide and `height` rows tall, centered in `r`.
fn centered(r: Rect, w_pct: u16, height: u16) -> Rect {
    let w: u16 = (r.width * w_pct / 100).max(20).min(r.width);
    let h: u16 = height.min(r.height);
    Rect {
        x: r.x + (r.width - w) / 2,
        y: r.y + (r.height - h) / 2,
        width: w,
        height: h,
    }
}

fn notification_rect(scr: Rect, lvl: NotificationLevel) -> Rect {
    let h: u16 = if lvl == NotificationLevel::Error { 4 } else { 3 };
    let w: u16 = (scr.width / 2).max(24).min(scr.width);
    Rect {
        x: scr.x + scr.width - w,
        y: scr.y + 1,
        width: w,
        height: h.min(scr.height.saturating_sub(1)),
    }
}
