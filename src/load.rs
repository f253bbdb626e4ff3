use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::columns::{ColumnMap, ModelId};
use crate::config::Config;
use crate::discover;
use crate::error::LoadError;
use crate::merge;
use crate::normalize;
use crate::rename;
use crate::table::{self, Table};

/// The load stage's product: the merged table (one row per image identity,
/// metric columns per model), the sorted discovered model ids, and the
/// validated column map. Immutable once built; filters narrow rows on
/// copies.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub table: Table,
    pub models: Vec<ModelId>,
    pub columns: ColumnMap,
}

/// Runs the full load stage: discover, normalize, rename, merge, validate.
pub fn load_dir(dir: &Path, config: &Config) -> Result<Dataset, LoadError> {
    let (files, models) = discover::discover(dir, &config.excluded_models)?;
    info!(files = files.len(), dir = %dir.display(), "loading evaluation results");

    let mut merged: Option<Table> = None;
    for (i, file) in files.iter().enumerate() {
        let mut t = table::read_csv(&file.path)?;
        normalize::normalize(&mut t);
        if i == 0 {
            normalize::check_required(&t).map_err(|column| LoadError::Schema {
                file: file.path.clone(),
                column,
            })?;
        }
        rename::suffix_metric_columns(&mut t, file.model);
        debug!(model = file.model, rows = t.n_rows(), "normalized result file");
        merged = Some(match merged {
            None => t,
            Some(acc) => merge::merge_into(acc, t, &file.path)?,
        });
    }

    // discover() guarantees at least one file
    let table = merged.expect("at least one discovered file");
    let columns = ColumnMap::build(&table, &models).map_err(|missing| LoadError::Schema {
        file: files
            .iter()
            .find(|f| f.model == missing.model)
            .map(|f| f.path.clone())
            .unwrap_or_default(),
        column: missing.column,
    })?;
    info!(rows = table.n_rows(), models = models.len(), "merge complete");

    Ok(Dataset {
        table,
        models,
        columns,
    })
}

/// Caller-owned memo for the load stage, keyed by a fingerprint of the
/// matching files (name, size, mtime) and the exclusion set. Repeated UI
/// interactions share the `Arc`; the cache re-reads only when the
/// underlying file set changes, and `invalidate` forces the next load.
#[derive(Debug, Default)]
pub struct LoadCache {
    fingerprint: Option<u64>,
    dataset: Option<Arc<Dataset>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, dir: &Path, config: &Config) -> Result<Arc<Dataset>, LoadError> {
        let fp = fingerprint(dir, config)?;
        if self.fingerprint == Some(fp)
            && let Some(dataset) = &self.dataset
        {
            debug!("reusing cached dataset");
            return Ok(Arc::clone(dataset));
        }
        let dataset = Arc::new(load_dir(dir, config)?);
        self.fingerprint = Some(fp);
        self.dataset = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn invalidate(&mut self) {
        self.fingerprint = None;
        self.dataset = None;
    }
}

// Non-cryptographic content fingerprint; collisions only cost a stale
// cache, which invalidate() already covers.
fn fingerprint(dir: &Path, config: &Config) -> Result<u64, LoadError> {
    let mut entries: Vec<(String, u64, Option<std::time::SystemTime>)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if discover::parse_model_id(&name).is_none() {
            continue;
        }
        let meta = entry.metadata()?;
        entries.push((name, meta.len(), meta.modified().ok()));
    }
    entries.sort();
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for (name, len, mtime) in &entries {
        name.hash(&mut hasher);
        len.hash(&mut hasher);
        mtime.hash(&mut hasher);
    }
    for model in &config.excluded_models {
        model.hash(&mut hasher);
    }
    Ok(hasher.finish())
}

/// Convenience for one-shot consumers that don't hold a cache.
pub fn load(dir: &Path) -> Result<Dataset, LoadError> {
    load_dir(dir, &Config::load())
}
