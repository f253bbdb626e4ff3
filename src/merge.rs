use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::LoadError;
use crate::normalize::IDENTITY_COLUMNS;
use crate::table::{Table, Value};

/// Folds one more per-model table into the accumulator.
///
/// The join key is the intersection of the identity-column set with the
/// columns both sides actually carry; an empty intersection means the file
/// cannot be reconciled and aborts the load. Non-key incoming columns whose
/// name already exists in the accumulator are dropped before joining:
/// first-seen-wins is the one fixed reconciliation rule, rather than
/// letting the join invent disambiguation suffixes to clean up afterwards.
pub fn merge_into(acc: Table, incoming: Table, file: &Path) -> Result<Table, LoadError> {
    let keys: Vec<String> = IDENTITY_COLUMNS
        .iter()
        .filter(|c| acc.has_column(c) && incoming.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if keys.is_empty() {
        return Err(LoadError::NoJoinKey {
            file: file.to_path_buf(),
        });
    }

    let mut incoming = incoming;
    for col in incoming.columns().to_vec() {
        if !keys.contains(&col) && acc.has_column(&col) {
            debug!(column = %col, file = %file.display(), "dropping colliding column, first seen wins");
            incoming.drop_column(&col);
        }
    }

    Ok(outer_join(&acc, &incoming, &keys))
}

/// Full outer join on `keys`. Accumulator rows come first in their original
/// order, each paired with every matching incoming row (or `Null`-extended
/// when unmatched); incoming rows nothing matched are appended with `Null`
/// in the accumulator-only columns. Joining a table with itself on its full
/// identity key therefore reproduces the table row for row.
fn outer_join(left: &Table, right: &Table, keys: &[String]) -> Table {
    let left_key_idx: Vec<usize> = keys.iter().filter_map(|k| left.column_index(k)).collect();
    let right_key_idx: Vec<usize> = keys.iter().filter_map(|k| right.column_index(k)).collect();
    let right_extra_idx: Vec<usize> = (0..right.n_cols())
        .filter(|i| !right_key_idx.contains(i))
        .collect();

    let mut columns: Vec<String> = left.columns().to_vec();
    columns.extend(right_extra_idx.iter().map(|&i| right.columns()[i].clone()));
    let mut out = Table::new(columns);

    let key_of = |row: &[Value], idx: &[usize]| -> Vec<Value> {
        idx.iter().map(|&i| row[i].clone()).collect()
    };

    let mut right_index: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
    for (i, row) in right.rows().iter().enumerate() {
        right_index
            .entry(key_of(row, &right_key_idx))
            .or_default()
            .push(i);
    }

    let mut matched = vec![false; right.n_rows()];
    for lrow in left.rows() {
        match right_index.get(&key_of(lrow, &left_key_idx)) {
            Some(hits) => {
                for &ri in hits {
                    matched[ri] = true;
                    let rrow = &right.rows()[ri];
                    let mut row = lrow.clone();
                    row.extend(right_extra_idx.iter().map(|&i| rrow[i].clone()));
                    out.push_row(row);
                }
            }
            None => {
                let mut row = lrow.clone();
                row.extend(std::iter::repeat_n(Value::Null, right_extra_idx.len()));
                out.push_row(row);
            }
        }
    }

    for (ri, rrow) in right.rows().iter().enumerate() {
        if matched[ri] {
            continue;
        }
        let mut row: Vec<Value> = left
            .columns()
            .iter()
            .map(|col| match keys.iter().position(|k| k == col) {
                Some(k) => rrow[right_key_idx[k]].clone(),
                None => Value::Null,
            })
            .collect();
        row.extend(right_extra_idx.iter().map(|&i| rrow[i].clone()));
        out.push_row(row);
    }

    out
}
