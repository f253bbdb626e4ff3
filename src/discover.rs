use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::columns::ModelId;
use crate::error::LoadError;

/// One accepted result file and the model it reports on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub model: ModelId,
}

fn pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^eval_model_(\d+)_Sheet1\.csv$").expect("valid pattern"))
}

/// Model id embedded in a result file name, if the name follows the
/// `eval_model_<N>_Sheet1.csv` convention.
pub fn parse_model_id(file_name: &str) -> Option<ModelId> {
    pattern()
        .captures(file_name)
        .and_then(|c| c[1].parse().ok())
}

/// Enumerates result files in `dir`, skipping names outside the convention
/// (warned, never fatal) and models in the exclusion set. Returns the
/// accepted files sorted by path plus the sorted accepted model ids.
pub fn discover(
    dir: &Path,
    excluded: &BTreeSet<ModelId>,
) -> Result<(Vec<DiscoveredFile>, Vec<ModelId>), LoadError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match parse_model_id(name) {
            Some(model) if excluded.contains(&model) => {
                debug!(model, file = name, "skipping excluded model");
            }
            Some(model) => files.push(DiscoveredFile { path, model }),
            None => {
                if name.ends_with(".csv") {
                    warn!(file = name, "skipping file with invalid name format");
                }
            }
        }
    }
    if files.is_empty() {
        return Err(LoadError::NoInputFiles {
            dir: dir.to_path_buf(),
        });
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    let mut models: Vec<ModelId> = files.iter().map(|f| f.model).collect();
    models.sort_unstable();
    Ok((files, models))
}
