//! # Visit assignment
//!
//! For every source coordinate pair, decide which visit footprint (if any)
//! contains it. This is the "which visit" half of the pipeline.
//!
//! ## Algorithm
//! -----------------
//! Master catalogs carry hundreds of thousands of sources against tens to
//! hundreds of footprints, so testing every source against every polygon is
//! avoided with a coarse pre-filter: a uniform tile grid over the union
//! bounding box of all footprints, each tile listing the footprints whose
//! bounding box overlaps it. A source outside the union box, or landing in an
//! empty tile, is unassigned without a single polygon test. The pre-filter
//! only narrows candidates; the exact point-in-polygon test always decides.
//!
//! ## Determinism
//! -----------------
//! [`FootprintCatalog`] keeps footprints sorted by ascending visit id and the
//! tile lists preserve that order, so when footprints overlap (shared
//! boundaries included) the **lowest visit id wins**. Repeated runs on the
//! same input produce identical assignments.
//!
//! Footprint geometry is validated when the catalog is loaded, before any
//! source is touched; by the time this module runs, assignment cannot fail.

use crate::constants::{Degree, VisitId, UNASSIGNED_VISIT};
use crate::footprints::polygon::BoundingBox;
use crate::footprints::{Footprint, FootprintCatalog};

/// Coarse spatial index: a uniform grid over the catalog's union bounding
/// box, each cell holding the footprints (by index, ascending) whose
/// bounding box overlaps it.
struct TileIndex {
    bbox: BoundingBox,
    dim: usize,
    cell_width: Degree,
    cell_height: Degree,
    cells: Vec<Vec<u32>>,
}

impl TileIndex {
    fn build(footprints: &[Footprint], bbox: BoundingBox) -> Self {
        // A few footprints per tile on average; capped so tiny catalogs do
        // not allocate a large empty grid.
        let dim = ((footprints.len() * 4) as f64).sqrt().ceil() as usize;
        let dim = dim.clamp(1, 128);

        let cell_width = ((bbox.max_ra - bbox.min_ra) / dim as f64).max(f64::MIN_POSITIVE);
        let cell_height = ((bbox.max_dec - bbox.min_dec) / dim as f64).max(f64::MIN_POSITIVE);

        let mut cells = vec![Vec::new(); dim * dim];
        for (idx, footprint) in footprints.iter().enumerate() {
            let fp_bbox = footprint.region.bbox();
            let (col_lo, row_lo) = cell_of(fp_bbox.min_ra, fp_bbox.min_dec, &bbox, cell_width, cell_height, dim);
            let (col_hi, row_hi) = cell_of(fp_bbox.max_ra, fp_bbox.max_dec, &bbox, cell_width, cell_height, dim);
            for row in row_lo..=row_hi {
                for col in col_lo..=col_hi {
                    cells[row * dim + col].push(idx as u32);
                }
            }
        }

        TileIndex {
            bbox,
            dim,
            cell_width,
            cell_height,
            cells,
        }
    }

    /// Footprint candidates for a point, in ascending visit-id order.
    /// `None` when the point lies outside the union bounding box.
    fn candidates(&self, ra: Degree, dec: Degree) -> Option<&[u32]> {
        if !self.bbox.contains(ra, dec) {
            return None;
        }
        let (col, row) = cell_of(ra, dec, &self.bbox, self.cell_width, self.cell_height, self.dim);
        Some(&self.cells[row * self.dim + col])
    }
}

fn cell_of(
    ra: Degree,
    dec: Degree,
    bbox: &BoundingBox,
    cell_width: Degree,
    cell_height: Degree,
    dim: usize,
) -> (usize, usize) {
    let col = (((ra - bbox.min_ra) / cell_width) as usize).min(dim - 1);
    let row = (((dec - bbox.min_dec) / cell_height) as usize).min(dim - 1);
    (col, row)
}

/// Assign every source to the visit whose footprint contains it.
///
/// Arguments
/// ---------
/// * `catalog`: the validated footprint catalog for one bandpass
/// * `ra`, `dec`: parallel source coordinate arrays, in degrees
///
/// Return
/// ------
/// * One visit id per source, same length and order as the input.
///   Sources contained by no footprint get
///   [`UNASSIGNED_VISIT`](crate::constants::UNASSIGNED_VISIT); sources
///   contained by several get the lowest visit id.
///
/// Panics
/// ------
/// * If `ra` and `dec` have different lengths.
pub fn assign_visits(catalog: &FootprintCatalog, ra: &[Degree], dec: &[Degree]) -> Vec<VisitId> {
    assert_eq!(ra.len(), dec.len(), "ra/dec arrays must be parallel");

    let footprints = catalog.footprints();
    let Some(union_bbox) = catalog.union_bbox() else {
        return vec![UNASSIGNED_VISIT; ra.len()];
    };
    let index = TileIndex::build(footprints, union_bbox);

    ra.iter()
        .zip(dec)
        .map(|(&ra, &dec)| {
            let Some(candidates) = index.candidates(ra, dec) else {
                return UNASSIGNED_VISIT;
            };
            candidates
                .iter()
                .map(|&idx| &footprints[idx as usize])
                .find(|footprint| footprint.region.contains(ra, dec))
                .map_or(UNASSIGNED_VISIT, |footprint| footprint.visit)
        })
        .collect()
}
