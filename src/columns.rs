use std::collections::HashMap;

use crate::table::Table;

/// Numeric model identifier parsed out of a result file name.
pub type ModelId = u32;

/// The metric columns a per-model result file carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Precision,
    Recall,
    Tp,
    Fp,
    Fn,
    TrueCount,
    DetectCount,
}

impl Metric {
    /// Every metric column that gets a model suffix.
    pub const ALL: [Metric; 7] = [
        Metric::Precision,
        Metric::Recall,
        Metric::Tp,
        Metric::Fp,
        Metric::Fn,
        Metric::TrueCount,
        Metric::DetectCount,
    ];

    /// The metrics the aggregator reads. `true_count`/`detect_count` ride
    /// along in the merged table but feed no summary.
    pub const SUMMARY: [Metric; 5] = [
        Metric::Precision,
        Metric::Recall,
        Metric::Tp,
        Metric::Fp,
        Metric::Fn,
    ];

    pub fn base_name(self) -> &'static str {
        match self {
            Metric::Precision => "precision",
            Metric::Recall => "recall",
            Metric::Tp => "tp",
            Metric::Fp => "fp",
            Metric::Fn => "fn",
            Metric::TrueCount => "true_count",
            Metric::DetectCount => "detect_count",
        }
    }

    /// Merged-table column name for one model, e.g. `precision_7`.
    pub fn column_name(self, model: ModelId) -> String {
        format!("{}_{}", self.base_name(), model)
    }
}

/// Typed lookup from (metric, model) to a column index in the merged
/// table. Built and validated once after the merge; aggregation goes
/// through this map instead of re-deriving column names per call site.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    index: HashMap<(Metric, ModelId), usize>,
}

/// A summary metric column the merged table turned out not to have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumn {
    pub model: ModelId,
    pub column: String,
}

impl ColumnMap {
    /// Indexes every summary metric column for every model, failing on the
    /// first gap. `true_count`/`detect_count` are indexed opportunistically.
    pub fn build(table: &Table, models: &[ModelId]) -> Result<Self, MissingColumn> {
        let mut index = HashMap::new();
        for &model in models {
            for metric in Metric::SUMMARY {
                let name = metric.column_name(model);
                match table.column_index(&name) {
                    Some(idx) => {
                        index.insert((metric, model), idx);
                    }
                    None => return Err(MissingColumn {
                        model,
                        column: name,
                    }),
                }
            }
            for metric in [Metric::TrueCount, Metric::DetectCount] {
                if let Some(idx) = table.column_index(&metric.column_name(model)) {
                    index.insert((metric, model), idx);
                }
            }
        }
        Ok(Self { index })
    }

    pub fn get(&self, metric: Metric, model: ModelId) -> Option<usize> {
        self.index.get(&(metric, model)).copied()
    }
}
