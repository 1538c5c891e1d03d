pub mod report;
pub mod theme;

pub use report::{print_report, ReportWidget};
pub use theme::Theme;
