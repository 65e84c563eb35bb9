use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Rows the keyboard diagram needs including its border.
pub const KEYBOARD_HEIGHT: u16 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Full,    // ≥24 rows: header, stage progress, panel, keyboard, footer
    Compact, // 16-23 rows: keyboard dropped
    Minimal, // <16 rows: panel and footer only
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.height >= 24 && area.width >= 56 {
            LayoutTier::Full
        } else if area.height >= 16 {
            LayoutTier::Compact
        } else {
            LayoutTier::Minimal
        }
    }

    pub fn show_keyboard(&self) -> bool {
        *self == LayoutTier::Full
    }

    pub fn show_progress_bar(&self) -> bool {
        *self != LayoutTier::Minimal
    }
}

pub struct AppLayout {
    pub header: Rect,
    pub progress: Option<Rect>,
    pub main: Rect,
    pub keyboard: Option<Rect>,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let tier = LayoutTier::from_area(area);

        let header_h = if tier == LayoutTier::Minimal { 1 } else { 3 };
        let progress_h = if tier.show_progress_bar() { 3 } else { 0 };
        let keyboard_h = if tier.show_keyboard() { KEYBOARD_HEIGHT } else { 0 };

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_h),
                Constraint::Length(progress_h),
                Constraint::Min(6),
                Constraint::Length(keyboard_h),
                Constraint::Length(1),
            ])
            .split(area);

        Self {
            header: vertical[0],
            progress: tier.show_progress_bar().then_some(vertical[1]),
            main: vertical[2],
            keyboard: tier.show_keyboard().then_some(vertical[3]),
            footer: vertical[4],
            tier,
        }
    }
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = " ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 48;
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
