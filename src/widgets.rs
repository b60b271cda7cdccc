//! Reusable clickable UI components.
//!
//! Each component renders itself and registers its own click targets, so
//! visual output and tap behaviour stay in one place.
//!
//! - [`TabBar`]: horizontal tab navigation.
//! - [`ClickableList`]: vertical list with per-row click targets.
//! - [`ShareBar`]: two-colour bar showing how the click total is split.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::{Color, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Paragraph};
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

// ── TabBar ─────────────────────────────────────────────────────

/// Tabs rendered as one row of styled labels, with click targets matching
/// the rendered label positions (CJK widths included).
///
/// ```ignore
/// TabBar::new(" │ ")
///     .tab("ゲーム", tab_style(Tab::Game), TAB_GAME)
///     .tab("ショップ", tab_style(Tab::Shop), TAB_SHOP)
///     .render(f, area, &mut cs);
/// ```
pub struct TabBar<'a> {
    tabs: Vec<(String, Style, u16)>,
    separator: &'a str,
    block: Option<Block<'a>>,
}

impl<'a> TabBar<'a> {
    pub fn new(separator: &'a str) -> Self {
        Self {
            tabs: Vec::new(),
            separator,
            block: None,
        }
    }

    pub fn tab(mut self, label: impl Into<String>, style: Style, action_id: u16) -> Self {
        self.tabs.push((label.into(), style, action_id));
        self
    }

    /// Wrap the bar in a [`Block`]; targets follow `Block::inner()`.
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        let sep_width = Line::from(self.separator).width() as u16;
        let mut spans: Vec<Span> = Vec::new();
        let mut tab_widths: Vec<(u16, u16)> = Vec::new();

        for (i, (label, style, action_id)) in self.tabs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(
                    self.separator,
                    Style::default().fg(Color::DarkGray),
                ));
            }
            let padded = format!(" {} ", label);
            tab_widths.push((Line::from(padded.as_str()).width() as u16, *action_id));
            spans.push(Span::styled(padded, *style));
        }

        let inner = match &self.block {
            Some(block) => block.inner(area),
            None => area,
        };
        let paragraph = match self.block {
            Some(block) => Paragraph::new(Line::from(spans)).block(block),
            None => Paragraph::new(Line::from(spans)),
        };
        f.render_widget(paragraph, area);

        // Inner x/width for accuracy, outer y/height for tap tolerance.
        cs.register_tab_targets(
            &tab_widths,
            sep_width,
            inner.x,
            area.y,
            inner.width,
            area.height.max(1),
        );
    }
}

// ── ClickableList ──────────────────────────────────────────────

/// Lines paired with click actions. Targets are bound to line indices, so
/// inserting a line above a button moves its target with it.
///
/// ```ignore
/// let mut cl = ClickableList::new();
/// cl.push(Line::from("ショップ"));
/// cl.push_clickable(Line::from(" [a] クリックドローン"), BUY_BONUS_BASE);
/// cl.register_targets_with_block(area, &block, &mut cs, 0);
/// f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
/// ```
#[derive(Default)]
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)`
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        self.actions.push((self.lines.len() as u16, action_id));
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Register targets for a list drawn inside `block` at `area`.
    pub fn register_targets_with_block(
        &self,
        area: Rect,
        block: &Block,
        cs: &mut ClickState,
        scroll: u16,
    ) {
        let inner = block.inner(area);
        let top = inner.y - area.y;
        let bottom = (area.y + area.height) - (inner.y + inner.height);
        self.register_targets(area, cs, top, bottom, scroll, inner.width);
    }

    /// Register click targets for all clickable lines.
    ///
    /// * `top_offset` / `bottom_offset`: rows taken by borders.
    /// * `scroll`: vertical scroll offset in visual rows.
    /// * `inner_width`: content width for wrap estimation, or `0` when the
    ///   paragraph does not wrap (one row per line).
    pub fn register_targets(
        &self,
        area: Rect,
        cs: &mut ClickState,
        top_offset: u16,
        bottom_offset: u16,
        scroll: u16,
        inner_width: u16,
    ) {
        let content_y = area.y + top_offset;
        let content_end = area.y + area.height.saturating_sub(bottom_offset);

        let mut row_starts: Vec<(u16, u16)> = Vec::with_capacity(self.lines.len());
        let mut cumulative: u16 = 0;
        for line in &self.lines {
            let height = if inner_width == 0 {
                1
            } else {
                (line.width().max(1)).div_ceil(inner_width as usize) as u16
            };
            row_starts.push((cumulative, height));
            cumulative += height;
        }

        for &(line_idx, action_id) in &self.actions {
            let Some(&(start, height)) = row_starts.get(line_idx as usize) else {
                continue;
            };
            for visual in start..start + height {
                if visual < scroll {
                    continue;
                }
                let row = content_y + (visual - scroll);
                if row >= content_end {
                    break;
                }
                cs.add_row_target(area, row, action_id);
            }
        }
    }
}

// ── ShareBar ───────────────────────────────────────────────────

/// One-row bar split between two colours in proportion to `left_share`
/// (a percentage). Not clickable.
pub struct ShareBar {
    pub left_share: f64,
    pub left_color: Color,
    pub right_color: Color,
}

impl ShareBar {
    /// Cells given to the left side for a bar `width` cells wide.
    pub fn split(left_share: f64, width: u16) -> (u16, u16) {
        let ratio = (left_share / 100.0).clamp(0.0, 1.0);
        let left = (ratio * width as f64).round() as u16;
        (left.min(width), width - left.min(width))
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let (left, right) = Self::split(self.left_share, area.width);
        let line = Line::from(vec![
            Span::styled("█".repeat(left as usize), Style::default().fg(self.left_color)),
            Span::styled("█".repeat(right as usize), Style::default().fg(self.right_color)),
        ]);
        f.render_widget(Paragraph::new(line), Rect::new(area.x, area.y, area.width, 1));
    }
}
