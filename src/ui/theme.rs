use ratatui::style::{Color, Modifier, Style};

use crate::app::{FlashKind, StatusKind};
use crate::filter::HoursStatus;

/// Colors that change with the dark mode setting.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub focus_bg: Color,
}

pub fn palette(dark_mode: bool) -> Palette {
    if dark_mode {
        Palette {
            accent: Color::Rgb(0x4F, 0xC3, 0xF7),
            text: Color::Rgb(0xE0, 0xE0, 0xE0),
            muted: Color::DarkGray,
            border: Color::Rgb(0x3A, 0x3F, 0x4B),
            focus_bg: Color::Rgb(0x26, 0x32, 0x38),
        }
    } else {
        Palette {
            accent: Color::Rgb(0x00, 0x78, 0xD4),
            text: Color::Reset,
            muted: Color::Gray,
            border: Color::Cyan,
            focus_bg: Color::Rgb(0xDE, 0xEC, 0xF9),
        }
    }
}

pub fn hours_status_color(status: HoursStatus) -> Color {
    match status {
        HoursStatus::Overrun => Color::Red,
        HoursStatus::Done => Color::Green,
        HoursStatus::Low => Color::Yellow,
        HoursStatus::OnTrack => Color::Blue,
    }
}

pub fn state_color(state: &str) -> Color {
    match state {
        "New" | "To Do" => Color::Gray,
        "Active" | "In Progress" | "Committed" => Color::Cyan,
        "Resolved" => Color::Green,
        "Blocked" => Color::Red,
        _ => Color::White,
    }
}

pub fn status_color(kind: StatusKind) -> Color {
    match kind {
        StatusKind::Info => Color::Yellow,
        StatusKind::Success => Color::Green,
        StatusKind::Error => Color::Red,
    }
}

pub fn flash_style(kind: FlashKind) -> Style {
    let bg = match kind {
        FlashKind::Success => Color::Green,
        FlashKind::Error => Color::Red,
    };
    Style::default()
        .fg(Color::Black)
        .bg(bg)
        .add_modifier(Modifier::BOLD)
}
