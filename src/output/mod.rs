//! # Augmented output catalog
//!
//! The output of a run, in columnar form: the configured pass-through
//! columns, then `visit_num`, `ra`, `dec`, `visit_X`, `visit_Y`. Built once
//! from the source catalog and the assignment; only the pixel columns are
//! mutated afterwards, by the projector, one visit partition at a time.
//!
//! `visit_X`/`visit_Y` start at
//! [`PIXEL_SENTINEL`](crate::constants::PIXEL_SENTINEL) so a partially
//! projected checkpoint is recognizable row by row.

pub mod writer;

use std::sync::Arc;

use arrow_array::{ArrayRef, Float64Array, Int64Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};

use crate::catalog::SourceCatalog;
use crate::constants::{Degree, Pixel, VisitId, PIXEL_SENTINEL};
use crate::visitxy_errors::VisitXyError;

pub use writer::write_catalog;

/// The augmented catalog: one row per master-catalog source, in input order.
#[derive(Debug, Clone)]
pub struct OutputCatalog {
    passthrough: Vec<(String, ArrayRef)>,
    pub visit_num: Vec<VisitId>,
    pub ra: Vec<Degree>,
    pub dec: Vec<Degree>,
    pub visit_x: Vec<Pixel>,
    pub visit_y: Vec<Pixel>,
}

impl OutputCatalog {
    /// Merge the source catalog and its assignment into the output layout.
    ///
    /// Arguments
    /// ---------
    /// * `sources`: the master catalog subset (consumed; row order kept)
    /// * `assignment`: one visit id per source, parallel to the rows
    ///
    /// Return
    /// ------
    /// * The output catalog with pixel columns at the sentinel. Pass-through
    ///   names were validated against the master catalog when it was read.
    pub fn build(sources: SourceCatalog, assignment: Vec<VisitId>) -> Self {
        debug_assert_eq!(sources.len(), assignment.len());
        let n = sources.len();
        let (ra, dec, passthrough) = sources.into_parts();
        OutputCatalog {
            passthrough,
            visit_num: assignment,
            ra,
            dec,
            visit_x: vec![PIXEL_SENTINEL; n],
            visit_y: vec![PIXEL_SENTINEL; n],
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.visit_num.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visit_num.is_empty()
    }

    /// Assemble the catalog into one Arrow record batch, pass-through
    /// columns first, in their configured order.
    pub fn to_record_batch(&self) -> Result<RecordBatch, VisitXyError> {
        let mut fields = Vec::with_capacity(self.passthrough.len() + 5);
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(self.passthrough.len() + 5);

        for (name, array) in &self.passthrough {
            fields.push(Field::new(name, array.data_type().clone(), true));
            columns.push(Arc::clone(array));
        }

        fields.push(Field::new("visit_num", DataType::Int64, false));
        columns.push(Arc::new(Int64Array::from(self.visit_num.clone())));
        for (name, values) in [
            ("ra", &self.ra),
            ("dec", &self.dec),
            ("visit_X", &self.visit_x),
            ("visit_Y", &self.visit_y),
        ] {
            fields.push(Field::new(name, DataType::Float64, false));
            columns.push(Arc::new(Float64Array::from(values.clone())));
        }

        let schema = Arc::new(Schema::new(fields));
        Ok(RecordBatch::try_new(schema, columns)?)
    }
}
