pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{banner, empty, header, info, muted, section, success, summary_row, warn};
pub use table::{list_table, report_table, stats_table, TableBuilder};
pub use theme::{theme, Theme};
