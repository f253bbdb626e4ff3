use std::fs;
use std::path::Path;

use grovemetrics::{Config, IdentityFilter, LoadError, Value, load, metrics};

const HEADER: &str =
    "filename,year,domaine,porte_greffe,parcelle,true_count,detect_count,tp,fp,fn,precision,recall";

fn write_model(dir: &Path, model: u32, rows: &[&str]) {
    let mut content = String::from(HEADER);
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    content.push('\n');
    fs::write(dir.join(format!("eval_model_{model}_Sheet1.csv")), content).unwrap();
}

#[test]
fn three_models_one_missing_an_image() {
    let dir = tempfile::tempdir().unwrap();
    write_model(
        dir.path(),
        1,
        &[
            "a.jpg,2022,north,SO4,1,10,9,8,1,2,0.889,0.8",
            "b.jpg,2022,north,SO4,1,5,5,4,1,1,0.8,0.8",
        ],
    );
    write_model(
        dir.path(),
        2,
        &["a.jpg,2022,north,SO4,1,10,8,7,1,3,0.875,0.7"],
    );
    write_model(
        dir.path(),
        3,
        &[
            "a.jpg,2022,north,SO4,1,10,10,9,1,1,0.9,0.9",
            "b.jpg,2022,north,SO4,1,5,4,4,0,1,1.0,0.8",
        ],
    );

    let ds = load::load_dir(dir.path(), &Config::default()).unwrap();
    assert_eq!(ds.models, vec![1, 2, 3]);
    assert_eq!(ds.table.n_rows(), 2);

    // model 2 never reported b.jpg: null metrics, not a missing row
    let b_row = (0..ds.table.n_rows())
        .find(|&i| ds.table.value(i, "filename") == Some(&Value::Str("b.jpg".into())))
        .unwrap();
    assert_eq!(ds.table.value(b_row, "precision_2"), Some(&Value::Null));
    assert_eq!(ds.table.value(b_row, "tp_2"), Some(&Value::Null));

    // its totals sum only the one present row
    let summaries = metrics::summarize(&ds.table, &ds.models, &ds.columns);
    let m2 = summaries.iter().find(|s| s.model == 2).unwrap();
    assert_eq!(m2.total_tp, 7);
    assert_eq!(m2.total_fp, 1);
    assert_eq!(m2.total_fn, 3);
    assert_eq!(m2.avg_precision, 0.875);
}

#[test]
fn merged_row_count_stays_within_outer_join_bounds() {
    let dir = tempfile::tempdir().unwrap();
    write_model(
        dir.path(),
        1,
        &[
            "a.jpg,2022,north,SO4,1,1,1,1,0,0,1.0,1.0",
            "b.jpg,2022,north,SO4,1,1,1,1,0,0,1.0,1.0",
        ],
    );
    write_model(
        dir.path(),
        2,
        &[
            "b.jpg,2022,north,SO4,1,1,1,1,0,0,1.0,1.0",
            "c.jpg,2023,south,SO4,2,1,1,1,0,0,1.0,1.0",
        ],
    );
    let ds = load::load_dir(dir.path(), &Config::default()).unwrap();
    assert!(ds.table.n_rows() >= 2); // max of per-file counts
    assert!(ds.table.n_rows() <= 4); // sum of per-file counts
    assert_eq!(ds.table.n_rows(), 3);
}

#[test]
fn model_18_is_discovered_but_excluded() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), 1, &["a.jpg,2022,north,SO4,1,1,1,1,0,0,1.0,1.0"]);
    write_model(dir.path(), 18, &["a.jpg,2022,north,SO4,1,9,9,9,0,0,1.0,1.0"]);
    let ds = load::load_dir(dir.path(), &Config::default()).unwrap();
    assert_eq!(ds.models, vec![1]);
    assert!(!ds.table.has_column("precision_18"));
}

#[test]
fn malformed_filenames_are_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), 1, &["a.jpg,2022,north,SO4,1,1,1,1,0,0,1.0,1.0"]);
    fs::write(dir.path().join("eval_model_notes.csv"), "junk\n").unwrap();
    let ds = load::load_dir(dir.path(), &Config::default()).unwrap();
    assert_eq!(ds.models, vec![1]);
}

#[test]
fn noisy_cells_normalize_per_coercion_rules() {
    let dir = tempfile::tempdir().unwrap();
    // the precision cell carries literal quote characters: "0.955"
    fs::write(
        dir.path().join("eval_model_1_Sheet1.csv"),
        format!("{HEADER}\na.jpg,2022,north,SO4,1,10,9,N/A,1,2,\"\"\"0.955\"\"\",0.8\n"),
    )
    .unwrap();
    let ds = load::load_dir(dir.path(), &Config::default()).unwrap();
    assert_eq!(ds.table.value(0, "tp_1"), Some(&Value::Int(0)));
    assert_eq!(ds.table.value(0, "precision_1"), Some(&Value::Float(0.955)));
}

#[test]
fn compagnie_alias_and_porte_greffe_spelling() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("eval_model_4_Sheet1.csv"),
        "Filename,Compagnie,Domaine,Porte-Greffe,Parcelle,True_Count,Detect_Count,TP,FP,FN,Precision,Recall\n\
         a.jpg,2021,east,101-14,3,6,6,5,1,1,0.833,0.833\n",
    )
    .unwrap();
    let ds = load::load_dir(dir.path(), &Config::default()).unwrap();
    assert!(ds.table.has_column("year"));
    assert!(ds.table.has_column("porte_greffe"));
    assert_eq!(ds.table.value(0, "year"), Some(&Value::Str("2021".into())));
}

#[test]
fn filtering_to_zero_rows_gives_zero_summaries() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), 1, &["a.jpg,2022,north,SO4,1,10,9,8,1,2,0.889,0.8"]);
    let ds = load::load_dir(dir.path(), &Config::default()).unwrap();
    let filter = IdentityFilter {
        year: Some("1999".into()),
        ..Default::default()
    };
    let filtered = filter.apply(&ds.table);
    assert!(filtered.is_empty());
    let summaries = metrics::summarize(&filtered, &ds.models, &ds.columns);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].avg_precision, 0.0);
    assert_eq!(summaries[0].avg_recall, 0.0);
    assert_eq!(summaries[0].f1, 0.0);
    assert_eq!(summaries[0].total_tp, 0);
}

#[test]
fn filters_narrow_rows_and_metrics_follow() {
    let dir = tempfile::tempdir().unwrap();
    write_model(
        dir.path(),
        1,
        &[
            "a.jpg,2022,north,SO4,1,10,9,9,1,1,0.9,0.9",
            "b.jpg,2023,south,SO4,2,10,5,3,2,7,0.6,0.3",
        ],
    );
    let ds = load::load_dir(dir.path(), &Config::default()).unwrap();
    let filter = IdentityFilter {
        year: Some("2022".into()),
        ..Default::default()
    };
    let filtered = filter.apply(&ds.table);
    assert_eq!(filtered.n_rows(), 1);
    let s = &metrics::summarize(&filtered, &ds.models, &ds.columns)[0];
    assert_eq!(s.avg_precision, 0.9);
    assert_eq!(s.total_tp, 9);
}

#[test]
fn empty_directory_surfaces_no_input_files() {
    let dir = tempfile::tempdir().unwrap();
    let err = load::load_dir(dir.path(), &Config::default()).unwrap_err();
    assert!(matches!(err, LoadError::NoInputFiles { .. }));
    assert!(err.to_string().contains("eval_model_"));
}

#[test]
fn file_sharing_no_identity_columns_is_fatal_with_file_name() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), 1, &["a.jpg,2022,north,SO4,1,1,1,1,0,0,1.0,1.0"]);
    fs::write(
        dir.path().join("eval_model_2_Sheet1.csv"),
        "image,tp,fp,fn,precision,recall\na.jpg,1,0,0,1.0,1.0\n",
    )
    .unwrap();
    let err = load::load_dir(dir.path(), &Config::default()).unwrap_err();
    match err {
        LoadError::NoJoinKey { file } => {
            assert!(file.ends_with("eval_model_2_Sheet1.csv"));
        }
        other => panic!("expected NoJoinKey, got {other}"),
    }
}

#[test]
fn identity_columns_never_carry_a_model_suffix() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), 1, &["a.jpg,2022,north,SO4,1,1,1,1,0,0,1.0,1.0"]);
    write_model(dir.path(), 2, &["a.jpg,2022,north,SO4,1,1,1,1,0,0,1.0,1.0"]);
    let ds = load::load_dir(dir.path(), &Config::default()).unwrap();
    for identity in ["filename", "year", "domaine", "porte_greffe", "parcelle"] {
        assert!(ds.table.has_column(identity));
        for model in &ds.models {
            assert!(!ds.table.has_column(&format!("{identity}_{model}")));
        }
    }
}
