//! # Visit footprint catalog
//!
//! One [`Footprint`] per visit: the visit identifier plus the sky region its
//! mosaic covers. The catalog for a bandpass is loaded from a CSV vertex file
//! with columns `visit,ra,dec`: one row per boundary vertex, vertices in
//! drawing order, grouped by visit:
//!
//! ```csv
//! visit,ra,dec
//! 12,10.0,0.0
//! 12,11.0,0.0
//! 12,11.0,1.0
//! 12,10.0,1.0
//! 27,11.0,0.0
//! ...
//! ```
//!
//! ## Invariants
//! -----------------
//! * Visit ids are unique and non-negative within one file.
//! * Footprints are stored **sorted by ascending visit id**; every consumer
//!   that enumerates footprints (in particular the assignment tie-break)
//!   inherits this order, so "first match" is deterministic rather than an
//!   accident of file layout.
//! * All geometry is validated at load time, before any assignment work.

pub mod footprint_file;
pub mod polygon;

use std::collections::BTreeMap;

use camino::Utf8Path;
use serde::Deserialize;

use crate::constants::{Degree, VisitId};
use crate::footprints::polygon::{BoundingBox, SkyPolygon};
use crate::visitxy_errors::VisitXyError;

pub use footprint_file::select_footprint_file;

/// One visit's sky footprint.
#[derive(Debug, Clone)]
pub struct Footprint {
    pub visit: VisitId,
    pub region: SkyPolygon,
}

/// One row of a footprint CSV file.
#[derive(Debug, Deserialize)]
struct VertexRecord {
    visit: VisitId,
    ra: Degree,
    dec: Degree,
}

/// All footprints of one bandpass, sorted by ascending visit id.
#[derive(Debug, Clone)]
pub struct FootprintCatalog {
    footprints: Vec<Footprint>,
}

impl FootprintCatalog {
    /// Load and validate a footprint catalog from a CSV vertex file.
    ///
    /// Arguments
    /// ---------
    /// * `path`: path to the `visit,ra,dec` vertex file
    ///
    /// Return
    /// ------
    /// * The catalog, sorted by visit id, with every polygon validated.
    ///   Any malformed footprint is fatal here, before assignment starts,
    ///   and the error names the offending visit.
    ///
    /// Note
    /// ----
    /// * Rows of one visit must be contiguous; a visit id reappearing after
    ///   another visit's rows is reported as a duplicate.
    pub fn from_csv(path: &Utf8Path) -> Result<Self, VisitXyError> {
        let mut csv_reader = csv::Reader::from_path(path)?;

        let mut grouped: BTreeMap<VisitId, Vec<(Degree, Degree)>> = BTreeMap::new();
        let mut current: Option<VisitId> = None;
        for record in csv_reader.deserialize::<VertexRecord>() {
            let record = record?;
            if record.visit < 0 {
                return Err(VisitXyError::MalformedFootprint {
                    visit: record.visit,
                    reason: "negative visit id".to_string(),
                });
            }
            if current != Some(record.visit) && grouped.contains_key(&record.visit) {
                return Err(VisitXyError::DuplicateFootprintVisit(record.visit));
            }
            current = Some(record.visit);
            grouped
                .entry(record.visit)
                .or_default()
                .push((record.ra, record.dec));
        }

        if grouped.is_empty() {
            return Err(VisitXyError::EmptyFootprintFile(path.to_owned()));
        }

        // BTreeMap iteration gives the ascending visit-id order the
        // assignment tie-break relies on.
        let footprints = grouped
            .into_iter()
            .map(|(visit, vertices)| {
                let region = SkyPolygon::new(vertices).map_err(|geometry| {
                    VisitXyError::MalformedFootprint {
                        visit,
                        reason: geometry.to_string(),
                    }
                })?;
                Ok(Footprint { visit, region })
            })
            .collect::<Result<Vec<_>, VisitXyError>>()?;

        Ok(FootprintCatalog { footprints })
    }

    /// Build a catalog from already-constructed footprints.
    ///
    /// Geometry is guaranteed by [`SkyPolygon::new`]; this only enforces the
    /// catalog-level invariants: footprints are sorted by ascending visit id
    /// and visit ids must be unique.
    pub fn from_footprints(mut footprints: Vec<Footprint>) -> Result<Self, VisitXyError> {
        footprints.sort_by_key(|f| f.visit);
        for pair in footprints.windows(2) {
            if pair[0].visit == pair[1].visit {
                return Err(VisitXyError::DuplicateFootprintVisit(pair[0].visit));
            }
        }
        Ok(FootprintCatalog { footprints })
    }

    /// Footprints in ascending visit-id order.
    pub fn footprints(&self) -> &[Footprint] {
        &self.footprints
    }

    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }

    /// Bounding box of the whole catalog, `None` when empty.
    pub fn union_bbox(&self) -> Option<BoundingBox> {
        self.footprints
            .iter()
            .map(|f| *f.region.bbox())
            .reduce(|a, b| a.union(&b))
    }
}

#[cfg(test)]
mod footprints_test {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> (tempfile::TempDir, camino::Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path =
            camino::Utf8PathBuf::from_path_buf(dir.path().join("footprints_f150w.csv")).unwrap();
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_sorted_by_visit_id() {
        let (_dir, path) = write_csv(
            "visit,ra,dec\n\
             27,11.0,0.0\n27,12.0,0.0\n27,12.0,1.0\n27,11.0,1.0\n\
             12,10.0,0.0\n12,11.0,0.0\n12,11.0,1.0\n12,10.0,1.0\n",
        );
        let catalog = FootprintCatalog::from_csv(&path).unwrap();
        let visits: Vec<_> = catalog.footprints().iter().map(|f| f.visit).collect();
        assert_eq!(visits, [12, 27]);
        assert!(catalog.footprints()[0].region.contains(10.5, 0.5));
    }

    #[test]
    fn test_malformed_footprint_is_fatal_and_named() {
        let (_dir, path) = write_csv("visit,ra,dec\n5,10.0,0.0\n5,11.0,0.0\n");
        let err = FootprintCatalog::from_csv(&path).unwrap_err();
        assert!(matches!(
            err,
            VisitXyError::MalformedFootprint { visit: 5, .. }
        ));
    }

    #[test]
    fn test_duplicate_visit_group_rejected() {
        let (_dir, path) = write_csv(
            "visit,ra,dec\n\
             1,0.0,0.0\n1,1.0,0.0\n1,1.0,1.0\n\
             2,5.0,0.0\n2,6.0,0.0\n2,6.0,1.0\n\
             1,0.0,0.0\n",
        );
        let err = FootprintCatalog::from_csv(&path).unwrap_err();
        assert!(matches!(err, VisitXyError::DuplicateFootprintVisit(1)));
    }

    #[test]
    fn test_negative_visit_rejected() {
        let (_dir, path) = write_csv("visit,ra,dec\n-3,0.0,0.0\n-3,1.0,0.0\n-3,1.0,1.0\n");
        let err = FootprintCatalog::from_csv(&path).unwrap_err();
        assert!(matches!(
            err,
            VisitXyError::MalformedFootprint { visit: -3, .. }
        ));
    }

    #[test]
    fn test_empty_file_rejected() {
        let (_dir, path) = write_csv("visit,ra,dec\n");
        let err = FootprintCatalog::from_csv(&path).unwrap_err();
        assert!(matches!(err, VisitXyError::EmptyFootprintFile(_)));
    }
}
