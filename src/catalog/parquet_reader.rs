//! Parquet reader for the master source catalog.
//!
//! Reads only the columns a run needs (RA, Dec, and the configured
//! pass-through columns) using a projection mask, validating the requested
//! names against the file schema before any row is materialized.

use std::fs::File;
use std::sync::Arc;

use arrow_array::array::{Array, ArrayRef, Float64Array};
use arrow_select::concat::concat;
use camino::Utf8Path;
use parquet::arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ProjectionMask};

use crate::catalog::SourceCatalog;
use crate::constants::Degree;
use crate::visitxy_errors::VisitXyError;

const BATCH_SIZE: usize = 8192;

/// Read the master catalog, keeping RA/Dec and the pass-through columns.
///
/// Arguments
/// ---------
/// * `path`: path to the master catalog Parquet file
/// * `ra_colname`, `dec_colname`: names of the coordinate columns (`Float64`,
///   degrees, no nulls)
/// * `extra_cols`: pass-through column names, in configured order
///
/// Return
/// ------
/// * A [`SourceCatalog`] preserving file row order, or a fatal error:
///   missing file (with the searched path), a requested column absent from
///   the file schema, a coordinate column of the wrong type, or a null
///   coordinate value.
pub fn read_source_catalog(
    path: &Utf8Path,
    ra_colname: &str,
    dec_colname: &str,
    extra_cols: &[String],
) -> Result<SourceCatalog, VisitXyError> {
    if !path.is_file() {
        return Err(VisitXyError::CatalogNotFound(path.to_owned()));
    }

    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let schema_descr = builder.metadata().file_metadata().schema_descr();
    let all_fields = schema_descr.columns();

    // Validate every requested column against the file schema up front; a
    // missing pass-through column must abort before any output row exists.
    let mut wanted: Vec<&str> = extra_cols.iter().map(String::as_str).collect();
    for coord in [ra_colname, dec_colname] {
        if !wanted.contains(&coord) {
            wanted.push(coord);
        }
    }
    let mut projection_indices = Vec::with_capacity(wanted.len());
    for name in &wanted {
        let position = all_fields
            .iter()
            .position(|field| field.name() == *name)
            .ok_or_else(|| VisitXyError::MissingColumn(name.to_string()))?;
        projection_indices.push(position);
    }
    let mask = ProjectionMask::leaves(schema_descr, projection_indices);

    let file_schema = Arc::clone(builder.schema());
    let reader = builder
        .with_projection(mask)
        .with_batch_size(BATCH_SIZE)
        .build()?;

    let mut ra: Vec<Degree> = Vec::new();
    let mut dec: Vec<Degree> = Vec::new();
    let mut extra_parts: Vec<Vec<ArrayRef>> = vec![Vec::new(); extra_cols.len()];

    for maybe_batch in reader {
        let batch = maybe_batch?;

        extend_coordinates(&mut ra, &batch, ra_colname)?;
        extend_coordinates(&mut dec, &batch, dec_colname)?;

        for (column, parts) in extra_cols.iter().zip(extra_parts.iter_mut()) {
            let array = batch
                .column_by_name(column)
                .ok_or_else(|| VisitXyError::MissingColumn(column.clone()))?;
            parts.push(Arc::clone(array));
        }
    }

    let passthrough = extra_cols
        .iter()
        .zip(extra_parts)
        .map(|(column, parts)| {
            let merged = if parts.is_empty() {
                // Zero row groups: keep the schema-correct empty column.
                let field = file_schema.field_with_name(column)?;
                arrow_array::new_empty_array(field.data_type())
            } else {
                let slices: Vec<&dyn Array> = parts.iter().map(|a| a.as_ref()).collect();
                concat(&slices)?
            };
            Ok((column.clone(), merged))
        })
        .collect::<Result<Vec<_>, VisitXyError>>()?;

    Ok(SourceCatalog::new(ra, dec, passthrough))
}

/// Append one batch's worth of a coordinate column, rejecting wrong types
/// and nulls.
fn extend_coordinates(
    values: &mut Vec<Degree>,
    batch: &arrow_array::RecordBatch,
    column: &str,
) -> Result<(), VisitXyError> {
    let array = batch
        .column_by_name(column)
        .ok_or_else(|| VisitXyError::MissingColumn(column.to_string()))?;
    let array = array
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| VisitXyError::ColumnTypeMismatch {
            column: column.to_string(),
            expected: "Float64".to_string(),
        })?;
    if array.null_count() > 0 {
        let row = values.len()
            + (0..array.len())
                .find(|&i| array.is_null(i))
                .unwrap_or_default();
        return Err(VisitXyError::NullCatalogValue {
            column: column.to_string(),
            row,
        });
    }
    values.extend(array.values().iter().copied());
    Ok(())
}
