pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, event_block, event_lines, header, info, muted, section, status, success, summary_row, warn};
pub use progress::Spinner;
pub use table::{stats_table, tracks_table, TableBuilder};
pub use theme::{theme, Theme};
