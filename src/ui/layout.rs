use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥100 cols: card + schedule sidebar
    Medium, // 60-99 cols: full-width card, compact header
    Narrow, // <60 cols: full-width card only
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 100 {
            LayoutTier::Wide
        } else if area.width >= 60 {
            LayoutTier::Medium
        } else {
            LayoutTier::Narrow
        }
    }

    pub fn show_sidebar(&self) -> bool {
        *self == LayoutTier::Wide
    }

    pub fn show_progress_bar(&self, height: u16) -> bool {
        height >= 18 && *self != LayoutTier::Narrow
    }
}

pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub sidebar: Option<Rect>,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let tier = LayoutTier::from_area(area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(2),
            ])
            .split(area);

        if tier.show_sidebar() {
            let horizontal = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
                .split(vertical[1]);

            Self {
                header: vertical[0],
                main: horizontal[0],
                sidebar: Some(horizontal[1]),
                footer: vertical[2],
                tier,
            }
        } else {
            Self {
                header: vertical[0],
                main: vertical[1],
                sidebar: None,
                footer: vertical[2],
                tier,
            }
        }
    }
}

/// Rows the text occupies at the given width. This is the "natural extent"
/// measurement feeding the disclosure controller: embedded newlines start a
/// new row, and each line wraps at the character level the way ratatui's
/// `Wrap { trim: false }` does for plain text.
pub fn wrapped_line_count(text: &str, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    text.lines()
        .map(|line| line.chars().count().max(1).div_ceil(width))
        .sum::<usize>()
        .max(1)
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 60;
    const MIN_POPUP_HEIGHT: u16 = 14;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}
