use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

pub struct ListRow {
    pub text: String,
    pub detail: Option<String>,
    pub marked: bool,
}

impl ListRow {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            detail: None,
            marked: false,
        }
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn marked(mut self, marked: bool) -> Self {
        self.marked = marked;
        self
    }
}

/// Bordered single-selection list with a scroll window. Used by the
/// practice setup deck picker, the cards browser, and the generate
/// screen's panes.
pub struct SelectList<'a> {
    pub title: String,
    pub rows: Vec<ListRow>,
    pub selected: usize,
    pub focused: bool,
    pub theme: &'a Theme,
}

impl Widget for SelectList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let border = if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(self.title.clone())
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.rows.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                " (empty)",
                Style::default().fg(colors.text_dim()),
            )))
            .render(inner, buf);
            return;
        }

        // Keep the selected row inside the visible window.
        let visible = inner.height as usize;
        let offset = if self.selected >= visible {
            self.selected + 1 - visible
        } else {
            0
        };

        for (row_idx, row) in self.rows.iter().skip(offset).take(visible).enumerate() {
            let idx = row_idx + offset;
            let is_selected = idx == self.selected;
            let y = inner.y + row_idx as u16;

            let indicator = if is_selected { ">" } else { " " };
            let mark = if row.marked { "*" } else { " " };
            let mut spans = vec![Span::styled(
                format!("{indicator}{mark} {}", row.text),
                Style::default()
                    .fg(if row.marked {
                        colors.accent()
                    } else if is_selected {
                        colors.selection_fg()
                    } else {
                        colors.fg()
                    })
                    .add_modifier(if is_selected {
                        Modifier::BOLD
                    } else {
                        Modifier::empty()
                    }),
            )];
            if let Some(detail) = &row.detail {
                spans.push(Span::styled(
                    format!("  {detail}"),
                    Style::default().fg(colors.text_dim()),
                ));
            }

            let line_area = Rect::new(inner.x, y, inner.width, 1);
            if is_selected {
                buf.set_style(line_area, Style::default().bg(colors.selection_bg()));
            }
            Paragraph::new(Line::from(spans)).render(line_area, buf);
        }
    }
}
