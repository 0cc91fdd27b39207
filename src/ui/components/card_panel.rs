use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::layout::wrapped_line_count;
use crate::ui::theme::Theme;

/// One study card: the front is always shown, the back occupies exactly
/// `back_extent` rows. The extent comes from a `Disclosure`, so the back
/// region grows and shrinks smoothly as the reveal animates; while the
/// disclosure is unmounted the back (and its heading) render nothing.
pub struct CardPanel<'a> {
    pub title: String,
    pub front: &'a str,
    pub back: &'a str,
    pub back_mounted: bool,
    pub back_extent: u16,
    pub theme: &'a Theme,
}

impl CardPanel<'_> {
    /// Rows the back needs at the panel's inner width; feed this to the
    /// disclosure as the natural extent (heading row included).
    pub fn back_rows(back: &str, panel_width: u16) -> u16 {
        let inner = panel_width.saturating_sub(2) as usize;
        (wrapped_line_count(back, inner) + 1).min(u16::MAX as usize) as u16
    }
}

impl Widget for CardPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(self.title.clone())
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let width = inner.width as usize;
        let mut y = inner.y;
        let bottom = inner.y + inner.height;

        let heading = |text: &str| {
            Line::from(Span::styled(
                text.to_string(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ))
        };

        // Front heading + wrapped front text.
        if y < bottom {
            Paragraph::new(heading("Front")).render(Rect::new(inner.x, y, inner.width, 1), buf);
            y += 1;
        }
        let front_rows = (wrapped_line_count(self.front, width) as u16)
            .min(bottom.saturating_sub(y));
        if front_rows > 0 {
            Paragraph::new(self.front)
                .style(Style::default().fg(colors.card_front()))
                .wrap(Wrap { trim: false })
                .render(Rect::new(inner.x, y, inner.width, front_rows), buf);
            y += front_rows;
        }

        if !self.back_mounted || self.back_extent == 0 {
            return;
        }

        // Spacer row, then the back clipped to the disclosure extent.
        y = (y + 1).min(bottom);
        let mut extent = self.back_extent.min(bottom.saturating_sub(y));
        if extent == 0 {
            return;
        }
        Paragraph::new(heading("Back")).render(Rect::new(inner.x, y, inner.width, 1), buf);
        y += 1;
        extent -= 1;
        if extent > 0 {
            Paragraph::new(self.back)
                .style(Style::default().fg(colors.card_back()))
                .wrap(Wrap { trim: false })
                .render(Rect::new(inner.x, y, inner.width, extent), buf);
        }
    }
}
