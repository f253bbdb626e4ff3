use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the load stage (discovery through merge).
///
/// Anything past the merge — filtering, aggregation, ranking — never
/// errors: an empty or degenerate table is a normal user state and yields
/// zero-valued results instead.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no evaluation files matching eval_model_<N>_Sheet1.csv in {dir}")]
    NoInputFiles { dir: PathBuf },

    #[error("{}: required column '{column}' not found after normalization", file.display())]
    Schema { file: PathBuf, column: String },

    #[error("{}: no identity columns in common with previously merged data", file.display())]
    NoJoinKey { file: PathBuf },

    #[error("{}: {source}", file.display())]
    Csv {
        file: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
