use crate::table::{Table, Value};

/// Equality predicates over the contextual identity columns. Unset fields
/// pass everything; `year` and `parcelle` compare on the string rendering
/// since sources disagree on whether they are numeric.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityFilter {
    pub year: Option<String>,
    pub domaine: Option<String>,
    pub porte_greffe: Option<String>,
    pub parcelle: Option<String>,
}

impl IdentityFilter {
    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.domaine.is_none()
            && self.porte_greffe.is_none()
            && self.parcelle.is_none()
    }

    /// Row subset of `table` matching every set predicate. The column set
    /// is untouched. A predicate on a column the table lacks matches no
    /// rows.
    pub fn apply(&self, table: &Table) -> Table {
        if self.is_empty() {
            return table.clone();
        }
        let checks: Vec<(Option<usize>, &str)> = [
            ("year", &self.year),
            ("domaine", &self.domaine),
            ("porte_greffe", &self.porte_greffe),
            ("parcelle", &self.parcelle),
        ]
        .into_iter()
        .filter_map(|(col, wanted)| {
            wanted
                .as_deref()
                .map(|w| (table.column_index(col), w))
        })
        .collect();

        table.filter_rows(|row| {
            checks.iter().all(|(idx, wanted)| match idx {
                Some(i) => row[*i].render() == *wanted,
                None => false,
            })
        })
    }
}

/// Sorted distinct renderings of one column, for filter widget population.
/// Nulls (outer-join gaps) are skipped; an absent column yields an empty
/// list.
pub fn distinct_values(table: &Table, column: &str) -> Vec<String> {
    let Some(idx) = table.column_index(column) else {
        return Vec::new();
    };
    let mut values: Vec<String> = table
        .rows()
        .iter()
        .filter_map(|row| match &row[idx] {
            Value::Null => None,
            v => Some(v.render()),
        })
        .collect();
    values.sort();
    values.dedup();
    values
}
