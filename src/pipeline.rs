//! # Pipeline orchestrator
//!
//! Sequences a full run: master catalog → footprint selection → visit
//! assignment → output building → checkpoint write → per-visit projection →
//! final write. Fatal errors (configuration, missing inputs, malformed
//! footprints) abort before any output exists; per-visit projection
//! failures are collected into the [`RunReport`] instead.

use itertools::Itertools;
use tracing::{debug, info};

use crate::assigner::assign_visits;
use crate::catalog::read_source_catalog;
use crate::config::RunConfig;
use crate::constants::{VisitId, UNASSIGNED_VISIT};
use crate::footprints::{select_footprint_file, FootprintCatalog};
use crate::mosaics::discover_visit_mosaics;
use crate::output::{write_catalog, OutputCatalog};
use crate::projector::{project_by_visit, SkippedVisit};
use crate::visitxy_errors::VisitXyError;
use crate::wcs::MosaicTransforms;

/// Summary of one completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Total rows in the master catalog (and in the output).
    pub n_sources: usize,
    /// Rows assigned to some visit.
    pub n_assigned: usize,
    /// Rows assigned to no footprint.
    pub n_unassigned: usize,
    /// Visits whose rows were projected, ascending.
    pub projected: Vec<VisitId>,
    /// Visits skipped during projection, with reasons.
    pub skipped: Vec<SkippedVisit>,
}

impl RunReport {
    /// True when every visit that had assigned sources was projected.
    pub fn fully_projected(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Execute one full assignment + projection run.
///
/// Arguments
/// ---------
/// * `config`: the validated run configuration
///
/// Return
/// ------
/// * A [`RunReport`] on success (possibly with skipped visits), or the
///   first fatal error.
pub fn run(config: &RunConfig) -> Result<RunReport, VisitXyError> {
    let output_dir = &config.output_catalog.path;
    if output_dir.is_dir() {
        info!("output directory {output_dir} exists, continuing");
    } else {
        std::fs::create_dir_all(output_dir)?;
    }

    let catalog_path = config.input_catalog.catalog_path();
    info!("reading master catalog {catalog_path}");
    let sources = read_source_catalog(
        &catalog_path,
        &config.input_catalog.ra_colname,
        &config.input_catalog.dec_colname,
        &config.output_catalog.extra_cols,
    )?;
    info!(sources = sources.len(), "master catalog read");

    let footprint_name =
        select_footprint_file(&config.bandpass, &config.coord_files.names)?;
    let footprint_path = config.coord_files.path.join(footprint_name);
    info!("using footprint file {footprint_path}");
    let footprints = FootprintCatalog::from_csv(&footprint_path)?;

    let mosaics = discover_visit_mosaics(&config.visit_mosaics, &config.bandpass)?;
    info!(mosaics = mosaics.len(), "visit mosaics discovered");

    let assignment = assign_visits(&footprints, &sources.ra, &sources.dec);
    let per_visit = assignment
        .iter()
        .filter(|&&visit| visit != UNASSIGNED_VISIT)
        .counts();
    let n_assigned: usize = per_visit.values().sum();
    let n_sources = assignment.len();
    info!(
        assigned = n_assigned,
        unassigned = n_sources - n_assigned,
        visits = per_visit.len(),
        "visit assignment complete"
    );

    for visit in mosaics.visits() {
        if !per_visit.contains_key(&&visit) {
            debug!(visit, "mosaic has no assigned sources, transform will not be loaded");
        }
    }

    let mut output = OutputCatalog::build(sources, assignment);

    // Checkpoint: assignment survives a crash during projection.
    let output_path = config.output_catalog.catalog_path();
    write_catalog(&output, &output_path)?;
    info!("checkpoint written to {output_path}");

    let resolver = MosaicTransforms::new(&mosaics);
    let projection = project_by_visit(&mut output, &resolver)?;

    write_catalog(&output, &output_path)?;
    info!("final catalog written to {output_path}");

    Ok(RunReport {
        n_sources,
        n_assigned,
        n_unassigned: n_sources - n_assigned,
        projected: projection.projected,
        skipped: projection.skipped,
    })
}
