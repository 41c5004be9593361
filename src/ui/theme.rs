use owo_colors::Style;
use std::sync::OnceLock;

use crate::advisory::AdvisoryType;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Console styles for startup and shutdown output
#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Style,
    pub ok: Style,
    pub fail: Style,
    pub caution: Style,
    pub label: Style,
    pub alert: Style,
    pub warning: Style,
    pub notice: Style,
}

impl Theme {
    /// Colors only when the console allows them (tty, `NO_COLOR`, `CLICOLOR`)
    pub fn detect() -> Self {
        if console::colors_enabled() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            title: Style::new().bright_cyan().bold(),
            ok: Style::new().green(),
            fail: Style::new().red().bold(),
            caution: Style::new().yellow(),
            label: Style::new().bright_black(),
            alert: Style::new().white().on_red().bold(),
            warning: Style::new().black().on_yellow(),
            notice: Style::new().blue(),
        }
    }

    pub fn plain() -> Self {
        let none = Style::new();
        Self {
            title: none,
            ok: none,
            fail: none,
            caution: none,
            label: none,
            alert: none,
            warning: none,
            notice: none,
        }
    }

    pub fn severity(&self, kind: AdvisoryType) -> Style {
        match kind {
            AdvisoryType::Alert => self.alert,
            AdvisoryType::Warning => self.warning,
            AdvisoryType::Info => self.notice,
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
