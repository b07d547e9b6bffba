pub mod calendar;
pub mod columns;
pub mod error;
pub mod filter;
pub mod partition;
pub mod store;
pub mod table;

// Flat public surface for the data layer.
pub use calendar::{month_label, parse_date, CALENDAR_KEY};
pub use columns::ColumnKind;
pub use filter::{by_category, by_date_range, synthetic_label, with_overall};
pub use partition::{PartitionedTable, SubView};
pub use store::{DatasetStore, Source, SourceSummary};
pub use table::{ResultTable, Value};
