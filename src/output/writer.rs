//! Checkpointing Parquet writer for the augmented catalog.
//!
//! The catalog is written twice per run to the same path: once right after
//! assignment (pixel columns still at the sentinel) so a crash during
//! projection loses no assignment work, and once after projection with the
//! final values. Each write replaces the file atomically enough for this
//! purpose: create-truncate, write, close.

use std::fs::File;

use camino::Utf8Path;
use parquet::arrow::ArrowWriter;

use crate::output::OutputCatalog;
use crate::visitxy_errors::VisitXyError;

/// Persist the augmented catalog to a Parquet file, overwriting.
///
/// Arguments
/// ---------
/// * `catalog`: the catalog to persist
/// * `path`: destination file path
pub fn write_catalog(catalog: &OutputCatalog, path: &Utf8Path) -> Result<(), VisitXyError> {
    let batch = catalog.to_record_batch()?;
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
