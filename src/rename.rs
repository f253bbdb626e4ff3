use crate::columns::{Metric, ModelId};
use crate::table::Table;

/// Scopes a normalized table to its model: every metric column gains a
/// `_<model_id>` suffix, identity columns stay as they are. After this no
/// two models' tables can collide on anything but identity columns.
pub fn suffix_metric_columns(table: &mut Table, model: ModelId) {
    for metric in Metric::ALL {
        table.rename_column(metric.base_name(), &metric.column_name(model));
    }
}
