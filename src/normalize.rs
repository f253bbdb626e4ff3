use crate::table::{Table, Value};

/// Columns that identify one image observation independent of any model.
/// These never receive a model suffix and form the merge key universe.
pub const IDENTITY_COLUMNS: [&str; 5] = ["filename", "year", "domaine", "porte_greffe", "parcelle"];

/// Integer-valued metric columns.
pub const COUNT_COLUMNS: [&str; 5] = ["true_count", "detect_count", "tp", "fp", "fn"];

/// Rate-valued metric columns, expected in [0, 1].
pub const RATE_COLUMNS: [&str; 2] = ["precision", "recall"];

/// Canonical form of one raw header: trimmed, lowercased, quote characters
/// stripped, the `porte-greffe` spelling corrected.
pub fn canonical_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace('"', "")
        .replace("porte-greffe", "porte_greffe")
}

fn clean_cell(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim()
}

/// Integer coercion with a silent zero fallback. Accepts plain integers,
/// quoted integers, and float-formatted integers ("3.0"); everything else
/// ("N/A", blanks) becomes 0.
pub fn coerce_count(value: &Value) -> Value {
    match value {
        Value::Int(i) => Value::Int(*i),
        Value::Float(f) if f.is_finite() => Value::Int(*f as i64),
        Value::Str(s) => {
            let s = clean_cell(s);
            if let Ok(i) = s.parse::<i64>() {
                Value::Int(i)
            } else if let Ok(f) = s.parse::<f64>()
                && f.is_finite()
            {
                Value::Int(f as i64)
            } else {
                Value::Int(0)
            }
        }
        _ => Value::Int(0),
    }
}

/// Float coercion with a silent zero fallback; quoted numbers accepted.
pub fn coerce_rate(value: &Value) -> Value {
    match value {
        Value::Int(i) => Value::Float(*i as f64),
        Value::Float(f) if f.is_finite() => Value::Float(*f),
        Value::Str(s) => match clean_cell(s).parse::<f64>() {
            Ok(f) if f.is_finite() => Value::Float(f),
            _ => Value::Float(0.0),
        },
        _ => Value::Float(0.0),
    }
}

/// Standardizes one raw per-model table in place: canonical headers, the
/// legacy `compagnie` year alias, and fully-numeric count/rate columns.
pub fn normalize(table: &mut Table) {
    let canonical: Vec<String> = table.columns().iter().map(|c| canonical_header(c)).collect();
    for (raw, canon) in table
        .columns()
        .to_vec()
        .into_iter()
        .zip(canonical)
        .filter(|(raw, canon)| raw != canon)
        .collect::<Vec<_>>()
    {
        table.rename_column(&raw, &canon);
    }
    table.rename_column("compagnie", "year");
    for col in COUNT_COLUMNS {
        table.map_column(col, coerce_count);
    }
    for col in RATE_COLUMNS {
        table.map_column(col, coerce_rate);
    }
}

/// First-file schema check: every identity and metric column must be
/// present post-normalization. Later files are reconciled through the
/// merge-key intersection instead. Returns the first missing column name.
pub fn check_required(table: &Table) -> Result<(), String> {
    for col in IDENTITY_COLUMNS
        .iter()
        .chain(COUNT_COLUMNS.iter())
        .chain(RATE_COLUMNS.iter())
    {
        if !table.has_column(col) {
            return Err(col.to_string());
        }
    }
    Ok(())
}
