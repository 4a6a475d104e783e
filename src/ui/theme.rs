use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Terminal styles for calendar output
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub warn: Style,
    pub info: Style,
    /// Field labels in event blocks and status lines
    pub label: Style,
    pub muted: Style,
    /// Event titles
    pub title: Style,
    /// Dollar amounts
    pub fee: Style,
    /// Stored dates that did not parse
    pub unparsed: Style,
}

impl Theme {
    /// Colored when stdout is a terminal and `NO_COLOR` / `CLICOLOR` allow it
    pub fn detect() -> Self {
        Self::with_colors(console::colors_enabled())
    }

    pub fn with_colors(enabled: bool) -> Self {
        if !enabled {
            return Self {
                header: Style::new(),
                success: Style::new(),
                warn: Style::new(),
                info: Style::new(),
                label: Style::new(),
                muted: Style::new(),
                title: Style::new(),
                fee: Style::new(),
                unparsed: Style::new(),
            };
        }

        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            label: Style::new().white().dimmed(),
            muted: Style::new().bright_black(),
            title: Style::new().bright_white().bold(),
            fee: Style::new().green(),
            unparsed: Style::new().yellow().italic(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
