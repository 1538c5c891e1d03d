use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

impl Theme {
    // Base colors
    pub const FG: Color = Color::White;
    pub const DIM: Color = Color::DarkGray;
    pub const ACCENT: Color = Color::LightBlue;
    pub const HIGHLIGHT: Color = Color::Cyan;

    // Status colors
    pub const SUCCESS: Color = Color::Green;
    pub const ERROR: Color = Color::Red;

    // Water balance chart
    pub const BAR_FILLED: Color = Color::Green;
    pub const BAR_TRACK: Color = Color::DarkGray;

    // Styles
    pub fn title() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn header() -> Style {
        Style::default().fg(Self::FG).add_modifier(Modifier::BOLD)
    }

    pub fn normal() -> Style {
        Style::default().fg(Self::FG)
    }

    pub fn dim() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn label() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    /// Banner for the irrigation decision.
    pub fn decision(irrigation_required: bool) -> Style {
        let bg = if irrigation_required {
            Self::ERROR
        } else {
            Self::SUCCESS
        };
        Style::default()
            .fg(Color::White)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Body text of the status and recommendation blocks.
    pub fn verdict(irrigation_required: bool) -> Style {
        if irrigation_required {
            Style::default().fg(Self::ERROR)
        } else {
            Style::default().fg(Self::SUCCESS)
        }
    }

    pub fn bar_filled() -> Style {
        Style::default().fg(Self::BAR_FILLED)
    }

    pub fn bar_track() -> Style {
        Style::default().fg(Self::BAR_TRACK)
    }
}
