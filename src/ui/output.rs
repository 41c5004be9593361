//! Console lines printed around the server's lifetime. Logs go through
//! `tracing`; these are for the person who started the process.

use owo_colors::{OwoColorize, Style};

use crate::advisory::{Advisory, AdvisoryType};
use crate::ui::{theme, Icons};

fn line(icon: &str, text: &str, style: Style) -> String {
    format!("{} {}", icon, text.style(style))
}

/// Startup banner
pub fn banner(text: &str) {
    println!("{}", line(Icons::ROCKET, text, theme().title));
}

/// `label: value` with a leading icon
pub fn field(icon: &str, label: &str, value: impl std::fmt::Display) {
    println!("{} {}: {}", icon, label.style(theme().label), value);
}

pub fn heading(title: &str) {
    println!("\n{}", title.style(theme().title.underline()));
}

pub fn done(text: &str) {
    println!("{}", line(Icons::CHECK, text, theme().ok));
}

pub fn caution(text: &str) {
    eprintln!("{}", line(Icons::WARN, text, theme().caution));
}

pub fn failure(text: &str) {
    eprintln!("{}", line(Icons::CROSS, text, theme().fail));
}

fn severity_icon(kind: AdvisoryType) -> &'static str {
    match kind {
        AdvisoryType::Alert => Icons::ALERT,
        AdvisoryType::Warning => Icons::WARNING,
        AdvisoryType::Info => Icons::NOTICE,
    }
}

/// Number of advisories per severity, most severe first
pub fn severity_counts(advisories: &[Advisory]) -> Vec<(AdvisoryType, usize)> {
    AdvisoryType::all()
        .iter()
        .map(|&kind| (kind, advisories.iter().filter(|a| a.kind == kind).count()))
        .collect()
}

pub fn advisory_summary(advisories: &[Advisory]) {
    for (kind, count) in severity_counts(advisories) {
        println!(
            "  {} {:<8} {}",
            severity_icon(kind),
            kind.as_str().style(theme().severity(kind)),
            count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::Theme;

    #[test]
    fn test_severity_counts_cover_every_type() {
        let advisories = vec![
            Advisory::new(1, AdvisoryType::Info, "a"),
            Advisory::new(2, AdvisoryType::Alert, "b"),
            Advisory::new(3, AdvisoryType::Info, "c"),
        ];

        assert_eq!(
            severity_counts(&advisories),
            vec![
                (AdvisoryType::Alert, 1),
                (AdvisoryType::Warning, 0),
                (AdvisoryType::Info, 2),
            ]
        );
    }

    #[test]
    fn test_plain_theme_leaves_text_untouched() {
        let plain = Theme::plain();
        assert_eq!(line(Icons::CHECK, "ready", plain.ok), format!("{} ready", Icons::CHECK));
        assert_eq!(
            format!("{}", "alert".style(plain.severity(AdvisoryType::Alert))),
            "alert"
        );
    }
}
