//! # Per-visit coordinate projection
//!
//! Converts sky coordinates to visit-local pixel coordinates, one visit at a
//! time. The row partition by visit id is computed once before the loop and
//! held immutable; each iteration reads and writes a disjoint slice of the
//! output, so the loop body could run one-visit-per-worker without locks,
//! though the reference implementation stays sequential.
//!
//! ## Failure isolation
//! -----------------
//! A visit whose transform cannot be resolved keeps its rows at the pixel
//! sentinel; the failure is recorded and the loop continues. Only when every
//! visit fails does the pass as a whole fail.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::constants::{VisitId, UNASSIGNED_VISIT};
use crate::output::OutputCatalog;
use crate::visitxy_errors::VisitXyError;
use crate::wcs::{ResolveTransform, SkyToPixel};

/// One visit the projector had to give up on.
#[derive(Debug, Clone)]
pub struct SkippedVisit {
    pub visit: VisitId,
    pub reason: String,
}

/// Outcome of a projection pass.
#[derive(Debug, Clone, Default)]
pub struct ProjectionReport {
    /// Visits whose rows now carry real pixel coordinates, ascending.
    pub projected: Vec<VisitId>,
    /// Visits left at the pixel sentinel, with reasons.
    pub skipped: Vec<SkippedVisit>,
}

/// Project every assigned row of the catalog, visit by visit.
///
/// Arguments
/// ---------
/// * `catalog`: the augmented catalog; only `visit_X`/`visit_Y` of rows
///   belonging to successfully resolved visits are written
/// * `resolver`: per-visit transform lookup
///
/// Return
/// ------
/// * The [`ProjectionReport`]. Unassigned rows are never touched; a visit
///   with zero assigned rows is never resolved. An error is returned only
///   when **all** visits with assigned rows fail.
pub fn project_by_visit<R: ResolveTransform>(
    catalog: &mut OutputCatalog,
    resolver: &R,
) -> Result<ProjectionReport, VisitXyError> {
    // Partition rows by visit, ascending; computed once, immutable below.
    let mut partitions: BTreeMap<VisitId, Vec<usize>> = BTreeMap::new();
    for (row, &visit) in catalog.visit_num.iter().enumerate() {
        if visit != UNASSIGNED_VISIT {
            partitions.entry(visit).or_default().push(row);
        }
    }

    let mut report = ProjectionReport::default();
    for (visit, rows) in &partitions {
        let transform = match resolver.resolve(*visit) {
            Ok(transform) => transform,
            Err(error) => {
                warn!(visit, %error, "skipping visit: transform unavailable");
                report.skipped.push(SkippedVisit {
                    visit: *visit,
                    reason: error.to_string(),
                });
                continue;
            }
        };

        info!(visit, sources = rows.len(), "projecting visit");
        let ra: Vec<f64> = rows.iter().map(|&row| catalog.ra[row]).collect();
        let dec: Vec<f64> = rows.iter().map(|&row| catalog.dec[row]).collect();
        let (xs, ys) = transform.sky_to_pixel(&ra, &dec);

        for ((&row, x), y) in rows.iter().zip(xs).zip(ys) {
            catalog.visit_x[row] = x;
            catalog.visit_y[row] = y;
        }
        report.projected.push(*visit);
    }

    if report.projected.is_empty() && !report.skipped.is_empty() {
        return Err(VisitXyError::AllVisitsFailed(report.skipped.len()));
    }
    Ok(report)
}
