use serde::Serialize;

use crate::columns::{ColumnMap, Metric, ModelId};
use crate::normalize::IDENTITY_COLUMNS;
use crate::table::Table;

/// Per-model aggregate over one (possibly filtered) merged table.
/// Recomputed on every filter change, never mutated after construction.
#[derive(Debug, Clone, Serialize)]
pub struct ModelMetricSummary {
    pub model: ModelId,
    pub avg_precision: f64,
    pub avg_recall: f64,
    pub f1: f64,
    pub total_tp: i64,
    pub total_fp: i64,
    pub total_fn: i64,
    /// Identity columns plus this model's five metric columns.
    #[serde(skip)]
    pub data: Table,
}

impl ModelMetricSummary {
    pub fn label(&self) -> String {
        format!("Model {}", self.model)
    }
}

/// Computes one summary per model.
///
/// Averages run over rows where the model's precision is strictly positive;
/// rows with a degenerate zero-precision entry (no ground truth, or no
/// detection attempted) are left out so they neither penalize nor inflate
/// the mean. Totals sum every row, nulls contributing nothing. F1 is the
/// harmonic mean of the already-averaged precision and recall — aggregate
/// then combine, which is not the same as averaging per-row F1.
///
/// Never errors: an empty table, or a model with no qualifying rows, yields
/// an all-zero summary.
pub fn summarize(table: &Table, models: &[ModelId], cols: &ColumnMap) -> Vec<ModelMetricSummary> {
    models
        .iter()
        .map(|&model| summarize_model(table, model, cols))
        .collect()
}

fn summarize_model(table: &Table, model: ModelId, cols: &ColumnMap) -> ModelMetricSummary {
    let prec = cols.get(Metric::Precision, model);
    let rec = cols.get(Metric::Recall, model);

    let mut qualifying = 0usize;
    let mut prec_sum = 0.0;
    let mut rec_sum = 0.0;
    if let (Some(prec), Some(rec)) = (prec, rec) {
        for row in table.rows() {
            let Some(p) = row[prec].as_f64() else {
                continue;
            };
            if p > 0.0 {
                qualifying += 1;
                prec_sum += p;
                rec_sum += row[rec].as_f64().unwrap_or(0.0);
            }
        }
    }
    let (avg_precision, avg_recall) = if qualifying > 0 {
        (prec_sum / qualifying as f64, rec_sum / qualifying as f64)
    } else {
        (0.0, 0.0)
    };
    let f1 = if avg_precision + avg_recall > 0.0 {
        2.0 * avg_precision * avg_recall / (avg_precision + avg_recall)
    } else {
        0.0
    };

    let total = |metric: Metric| -> i64 {
        cols.get(metric, model)
            .map(|idx| {
                table
                    .rows()
                    .iter()
                    .filter_map(|row| row[idx].as_i64())
                    .sum()
            })
            .unwrap_or(0)
    };

    let projection: Vec<String> = IDENTITY_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(Metric::SUMMARY.iter().map(|m| m.column_name(model)))
        .collect();

    ModelMetricSummary {
        model,
        avg_precision,
        avg_recall,
        f1,
        total_tp: total(Metric::Tp),
        total_fp: total(Metric::Fp),
        total_fn: total(Metric::Fn),
        data: table.project(&projection),
    }
}
