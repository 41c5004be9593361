pub mod icons;
pub mod output;
pub mod theme;

pub use icons::Icons;
pub use output::{advisory_summary, banner, caution, done, failure, field, heading, severity_counts};
pub use theme::{theme, Theme};
