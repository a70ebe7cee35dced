//! # Sky polygons
//!
//! Planar polygons in (RA, Dec) degree space used as visit footprints, with a
//! cached bounding box for coarse rejection and an exact point-membership test.
//!
//! Footprints are a few arcminutes across, far from the poles, and use a
//! continuous RA convention across each polygon, so the membership test is the
//! planar even-odd rule. A point lying exactly on an edge or vertex counts as
//! **inside**; overlap between neighbouring footprints is resolved upstream by
//! a deterministic tie-break, not here.

use thiserror::Error;

use crate::constants::{Degree, EPS};

/// Geometry-level validation errors for a single footprint polygon.
///
/// Variants
/// -----------------
/// * `TooFewVertices` – Fewer than 3 vertices.
/// * `NonFiniteVertex` – A vertex coordinate is NaN or infinite.
/// * `ZeroArea` – All vertices are collinear (or coincident).
/// * `DegenerateEdge` – Two consecutive vertices coincide.
/// * `SelfIntersecting` – Two non-adjacent edges cross.
#[derive(Error, Debug, PartialEq)]
pub enum GeometryError {
    #[error("polygon has {0} vertices, at least 3 required")]
    TooFewVertices(usize),
    #[error("vertex {0} has a non-finite coordinate")]
    NonFiniteVertex(usize),
    #[error("polygon encloses zero area")]
    ZeroArea,
    #[error("edge {0} has zero length")]
    DegenerateEdge(usize),
    #[error("edges {0} and {1} intersect")]
    SelfIntersecting(usize, usize),
}

/// Axis-aligned bounding box in (RA, Dec) degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_ra: Degree,
    pub max_ra: Degree,
    pub min_dec: Degree,
    pub max_dec: Degree,
}

impl BoundingBox {
    /// Smallest box enclosing all vertices.
    pub fn from_vertices(vertices: &[(Degree, Degree)]) -> Self {
        let mut bbox = BoundingBox {
            min_ra: f64::INFINITY,
            max_ra: f64::NEG_INFINITY,
            min_dec: f64::INFINITY,
            max_dec: f64::NEG_INFINITY,
        };
        for &(ra, dec) in vertices {
            bbox.min_ra = bbox.min_ra.min(ra);
            bbox.max_ra = bbox.max_ra.max(ra);
            bbox.min_dec = bbox.min_dec.min(dec);
            bbox.max_dec = bbox.max_dec.max(dec);
        }
        bbox
    }

    /// Box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_ra: self.min_ra.min(other.min_ra),
            max_ra: self.max_ra.max(other.max_ra),
            min_dec: self.min_dec.min(other.min_dec),
            max_dec: self.max_dec.max(other.max_dec),
        }
    }

    /// Closed-interval membership test (boundary counts as inside).
    pub fn contains(&self, ra: Degree, dec: Degree) -> bool {
        ra >= self.min_ra && ra <= self.max_ra && dec >= self.min_dec && dec <= self.max_dec
    }

    /// Closed-interval overlap test with another box.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_ra <= other.max_ra
            && self.max_ra >= other.min_ra
            && self.min_dec <= other.max_dec
            && self.max_dec >= other.min_dec
    }
}

/// A visit footprint boundary in (RA, Dec) degree space.
#[derive(Debug, Clone)]
pub struct SkyPolygon {
    vertices: Vec<(Degree, Degree)>,
    bbox: BoundingBox,
}

impl SkyPolygon {
    /// Build a polygon from its boundary vertices, validating the geometry.
    ///
    /// Arguments
    /// ---------
    /// * `vertices`: boundary vertices in order (closing edge implied)
    ///
    /// Return
    /// ------
    /// * The polygon with its bounding box, or the first [`GeometryError`]
    ///   found. Validation runs before any membership test is possible, so a
    ///   malformed footprint can never fail an assignment mid-batch.
    pub fn new(vertices: Vec<(Degree, Degree)>) -> Result<Self, GeometryError> {
        validate_vertices(&vertices)?;
        let bbox = BoundingBox::from_vertices(&vertices);
        Ok(SkyPolygon { vertices, bbox })
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn vertices(&self) -> &[(Degree, Degree)] {
        &self.vertices
    }

    /// Exact membership test for a point.
    ///
    /// Even-odd ray casting with a closed boundary: a point exactly on an edge
    /// or vertex is inside. The bounding box is checked first so callers may
    /// pass arbitrary coordinates cheaply.
    pub fn contains(&self, ra: Degree, dec: Degree) -> bool {
        if !self.bbox.contains(ra, dec) {
            return false;
        }

        let n = self.vertices.len();
        let mut inside = false;
        for i in 0..n {
            let (x1, y1) = self.vertices[i];
            let (x2, y2) = self.vertices[(i + 1) % n];

            if on_segment(ra, dec, x1, y1, x2, y2) {
                return true;
            }

            // Even-odd rule: count edges crossed by the ray toward +RA.
            if (y1 > dec) != (y2 > dec) {
                let ra_cross = x1 + (dec - y1) * (x2 - x1) / (y2 - y1);
                if ra < ra_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

/// True when (`px`, `py`) lies on the closed segment (`x1`,`y1`)–(`x2`,`y2`).
fn on_segment(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
    let cross = (x2 - x1) * (py - y1) - (y2 - y1) * (px - x1);
    if cross.abs() > EPS {
        return false;
    }
    px >= x1.min(x2) - EPS
        && px <= x1.max(x2) + EPS
        && py >= y1.min(y2) - EPS
        && py <= y1.max(y2) + EPS
}

fn validate_vertices(vertices: &[(Degree, Degree)]) -> Result<(), GeometryError> {
    if vertices.len() < 3 {
        return Err(GeometryError::TooFewVertices(vertices.len()));
    }
    for (i, &(ra, dec)) in vertices.iter().enumerate() {
        if !ra.is_finite() || !dec.is_finite() {
            return Err(GeometryError::NonFiniteVertex(i));
        }
    }

    let n = vertices.len();
    for i in 0..n {
        let (x1, y1) = vertices[i];
        let (x2, y2) = vertices[(i + 1) % n];
        if (x1 - x2).abs() <= EPS && (y1 - y2).abs() <= EPS {
            return Err(GeometryError::DegenerateEdge(i));
        }
    }

    // Shoelace formula; zero signed area means collinear vertices.
    let mut area = 0.0;
    for i in 0..n {
        let (x1, y1) = vertices[i];
        let (x2, y2) = vertices[(i + 1) % n];
        area += x1 * y2 - x2 * y1;
    }
    if area.abs() <= EPS {
        return Err(GeometryError::ZeroArea);
    }

    // Pairwise proper-intersection test between non-adjacent edges. Footprint
    // polygons have a handful of vertices, so the quadratic scan is fine.
    for i in 0..n {
        for j in (i + 1)..n {
            if j == i || (j + 1) % n == i || (i + 1) % n == j {
                continue;
            }
            let (a1, a2) = (vertices[i], vertices[(i + 1) % n]);
            let (b1, b2) = (vertices[j], vertices[(j + 1) % n]);
            if segments_cross(a1, a2, b1, b2) {
                return Err(GeometryError::SelfIntersecting(i, j));
            }
        }
    }
    Ok(())
}

/// Proper crossing test between two segments (shared endpoints excluded by
/// the caller's adjacency filter).
fn segments_cross(a1: (f64, f64), a2: (f64, f64), b1: (f64, f64), b2: (f64, f64)) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn orientation(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> f64 {
    (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
}
