use crate::columns::{Metric, ModelId};
use crate::metrics::ModelMetricSummary;
use crate::normalize::IDENTITY_COLUMNS;
use crate::table::{Table, Value};

/// Summary field a ranking can sort on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankKey {
    F1,
    AvgPrecision,
    AvgRecall,
    TotalTp,
    TotalFp,
    TotalFn,
}

impl RankKey {
    fn value(self, s: &ModelMetricSummary) -> f64 {
        match self {
            RankKey::F1 => s.f1,
            RankKey::AvgPrecision => s.avg_precision,
            RankKey::AvgRecall => s.avg_recall,
            RankKey::TotalTp => s.total_tp as f64,
            RankKey::TotalFp => s.total_fp as f64,
            RankKey::TotalFn => s.total_fn as f64,
        }
    }
}

/// Summaries sorted descending by `key`; ties keep model-id order.
pub fn rank_by(summaries: &[ModelMetricSummary], key: RankKey) -> Vec<&ModelMetricSummary> {
    let mut ranked: Vec<&ModelMetricSummary> = summaries.iter().collect();
    ranked.sort_by(|a, b| {
        key.value(b)
            .total_cmp(&key.value(a))
            .then(a.model.cmp(&b.model))
    });
    ranked
}

/// The winning model by F1, `None` when no models are loaded.
pub fn winner(summaries: &[ModelMetricSummary]) -> Option<&ModelMetricSummary> {
    summaries
        .iter()
        .max_by(|a, b| a.f1.total_cmp(&b.f1).then(b.model.cmp(&a.model)))
}

/// Images ranked by their mean precision across all models, best first.
///
/// Output columns: the identity columns present in `table` plus
/// `avg_precision` and `avg_recall`. Means run over the models that
/// reported the row (nulls skipped); a row no model reported scores 0 and
/// sorts last.
pub fn top_images(table: &Table, models: &[ModelId], limit: usize) -> Table {
    let prec_idx: Vec<usize> = models
        .iter()
        .filter_map(|&m| table.column_index(&Metric::Precision.column_name(m)))
        .collect();
    let rec_idx: Vec<usize> = models
        .iter()
        .filter_map(|&m| table.column_index(&Metric::Recall.column_name(m)))
        .collect();
    let identity_idx: Vec<usize> = IDENTITY_COLUMNS
        .iter()
        .filter_map(|c| table.column_index(c))
        .collect();

    let mean_at = |row: &[Value], idx: &[usize]| -> f64 {
        let values: Vec<f64> = idx.iter().filter_map(|&i| row[i].as_f64()).collect();
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    };

    let mut scored: Vec<(f64, f64, &[Value])> = table
        .rows()
        .iter()
        .map(|row| (mean_at(row, &prec_idx), mean_at(row, &rec_idx), row.as_slice()))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut columns: Vec<String> = identity_idx
        .iter()
        .map(|&i| table.columns()[i].clone())
        .collect();
    columns.push("avg_precision".to_string());
    columns.push("avg_recall".to_string());
    let mut out = Table::new(columns);
    for (p, r, row) in scored.into_iter().take(limit) {
        let mut cells: Vec<Value> = identity_idx.iter().map(|&i| row[i].clone()).collect();
        cells.push(Value::Float(p));
        cells.push(Value::Float(r));
        out.push_row(cells);
    }
    out
}
