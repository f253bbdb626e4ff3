use std::io;
use std::path::Path;

use crate::error::LoadError;
use crate::table::{self, Table};

/// CSV serialization of a (possibly filtered) merged table: identity plus
/// all per-model metric columns, header row first, raw numerics. Percentage
/// formatting is the consumer's business, not the exporter's.
pub fn write<W: io::Write>(table: &Table, writer: W) -> Result<(), csv::Error> {
    table::write_csv(table, writer)
}

pub fn to_string(table: &Table) -> String {
    let mut buf = Vec::new();
    // writing into a Vec cannot fail
    table::write_csv(table, &mut buf).expect("in-memory write");
    String::from_utf8(buf).expect("csv output is utf-8")
}

pub fn write_file(table: &Table, path: &Path) -> Result<(), LoadError> {
    let file = std::fs::File::create(path)?;
    write(table, file).map_err(|source| LoadError::Csv {
        file: path.to_path_buf(),
        source,
    })
}
