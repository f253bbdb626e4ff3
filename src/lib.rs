pub mod columns;
pub mod config;
pub mod discover;
pub mod error;
pub mod export;
pub mod filter;
pub mod load;
pub mod merge;
pub mod metrics;
pub mod normalize;
pub mod rename;
pub mod report;
pub mod table;

pub use columns::{ColumnMap, Metric, ModelId};
pub use config::Config;
pub use error::LoadError;
pub use filter::IdentityFilter;
pub use load::{Dataset, LoadCache};
pub use metrics::ModelMetricSummary;
pub use table::{Table, Value};
