//! # Sky → pixel transforms
//!
//! The capability seam between the pipeline and the astrometry it depends
//! on. The projector only ever sees two traits:
//!
//! - [`SkyToPixel`]: one batched projection of (RA, Dec) arrays into
//!   visit-local pixel coordinates;
//! - [`ResolveTransform`]: `visit id → transform`, failing with
//!   [`VisitXyError::TransformUnavailable`] when the backing mosaic cannot
//!   be loaded.
//!
//! The production implementation is [`TanWcs`], a plain TAN (gnomonic)
//! projection read from the mosaic's FITS primary header
//! ([`MosaicTransforms`] does the per-visit lookup). Resampled single-visit
//! mosaics are distortion-free, so CRVAL/CRPIX and the CD matrix are all
//! that is needed. Tests drive the projector with synthetic transforms
//! through the same traits.

pub mod header;

use thiserror::Error;

use crate::constants::{Degree, Pixel, VisitId, RADEG};
use crate::mosaics::VisitMosaics;
use crate::visitxy_errors::VisitXyError;
use crate::wcs::header::FitsHeader;

/// WCS-level errors: the header parsed, but does not describe a usable
/// TAN transform.
#[derive(Error, Debug, PartialEq)]
pub enum WcsError {
    #[error("missing WCS keyword {0}")]
    MissingKeyword(&'static str),
    #[error("unsupported projection '{0}', expected a TAN CTYPE")]
    UnsupportedProjection(String),
    #[error("CD matrix is singular")]
    SingularCdMatrix,
    #[error("WCS keyword {0} is not finite")]
    NonFiniteKeyword(&'static str),
}

/// Batched celestial → pixel conversion for one visit.
pub trait SkyToPixel {
    /// Project parallel (RA, Dec) arrays, in degrees, to pixel coordinates.
    ///
    /// Output arrays are parallel to the input. Coordinates behind the
    /// projection's tangent plane come back as NaN; sources assigned to a
    /// visit are inside its footprint, so this does not occur in a normal
    /// run.
    fn sky_to_pixel(&self, ra: &[Degree], dec: &[Degree]) -> (Vec<Pixel>, Vec<Pixel>);
}

/// Per-visit transform lookup.
pub trait ResolveTransform {
    type Transform: SkyToPixel;

    /// Load the transform for one visit.
    ///
    /// Every failure mode (unknown visit, unreadable mosaic, malformed
    /// header, unusable WCS) is reported as
    /// [`VisitXyError::TransformUnavailable`] so callers can treat it as a
    /// per-visit skip.
    fn resolve(&self, visit: VisitId) -> Result<Self::Transform, VisitXyError>;
}

/// TAN (gnomonic) world coordinate system of one visit mosaic.
///
/// Pixel convention is FITS-style: coordinates are relative to `CRPIX`,
/// which is 1-based in the mosaic header; no origin shift is applied here.
#[derive(Debug, Clone)]
pub struct TanWcs {
    /// Reference point on the sky (RA, Dec), degrees.
    pub crval: [Degree; 2],
    /// Reference pixel.
    pub crpix: [Pixel; 2],
    /// CD matrix, degrees per pixel.
    pub cd: [[f64; 2]; 2],
    /// Inverse CD matrix, pixels per degree.
    inv_cd: [[f64; 2]; 2],
}

impl TanWcs {
    /// Build a transform from its WCS parameters.
    ///
    /// Return
    /// ------
    /// * The transform with the CD matrix inverted once up front, or a
    ///   [`WcsError`] when a parameter is non-finite or the CD matrix is
    ///   singular.
    pub fn new(
        crval: [Degree; 2],
        crpix: [Pixel; 2],
        cd: [[f64; 2]; 2],
    ) -> Result<Self, WcsError> {
        if !crval.iter().all(|v| v.is_finite()) {
            return Err(WcsError::NonFiniteKeyword("CRVAL"));
        }
        if !crpix.iter().all(|v| v.is_finite()) {
            return Err(WcsError::NonFiniteKeyword("CRPIX"));
        }
        if !cd.iter().flatten().all(|v| v.is_finite()) {
            return Err(WcsError::NonFiniteKeyword("CD"));
        }
        let det = cd[0][0] * cd[1][1] - cd[0][1] * cd[1][0];
        if det == 0.0 {
            return Err(WcsError::SingularCdMatrix);
        }
        let inv_cd = [
            [cd[1][1] / det, -cd[0][1] / det],
            [-cd[1][0] / det, cd[0][0] / det],
        ];
        Ok(TanWcs {
            crval,
            crpix,
            cd,
            inv_cd,
        })
    }

    /// Build a transform from a mosaic's primary header.
    ///
    /// `CTYPE1` must name a TAN projection; `CRVAL1/2` and `CRPIX1/2` are
    /// required. The linear term is taken from the `CD` matrix when any of
    /// its elements is present (absent elements default to the identity
    /// pattern), falling back to a diagonal `CDELT1/2` matrix.
    pub fn from_header(header: &FitsHeader) -> Result<Self, VisitXyError> {
        let ctype1 = header
            .get_str("CTYPE1")
            .ok_or(WcsError::MissingKeyword("CTYPE1"))?;
        if !ctype1.contains("TAN") {
            return Err(WcsError::UnsupportedProjection(ctype1.to_string()).into());
        }

        let required = |keyword: &'static str| -> Result<f64, VisitXyError> {
            header
                .get_f64(keyword)?
                .ok_or_else(|| WcsError::MissingKeyword(keyword).into())
        };
        let crval = [required("CRVAL1")?, required("CRVAL2")?];
        let crpix = [required("CRPIX1")?, required("CRPIX2")?];

        let cd_elements = [
            header.get_f64("CD1_1")?,
            header.get_f64("CD1_2")?,
            header.get_f64("CD2_1")?,
            header.get_f64("CD2_2")?,
        ];
        let cd = if cd_elements.iter().any(Option::is_some) {
            [
                [cd_elements[0].unwrap_or(1.0), cd_elements[1].unwrap_or(0.0)],
                [cd_elements[2].unwrap_or(0.0), cd_elements[3].unwrap_or(1.0)],
            ]
        } else {
            let cdelt1 = header
                .get_f64("CDELT1")?
                .ok_or(WcsError::MissingKeyword("CD1_1"))?;
            let cdelt2 = header
                .get_f64("CDELT2")?
                .ok_or(WcsError::MissingKeyword("CD2_2"))?;
            [[cdelt1, 0.0], [0.0, cdelt2]]
        };

        Ok(TanWcs::new(crval, crpix, cd)?)
    }

    /// Project a single coordinate pair (degrees) to pixels.
    fn project_one(&self, ra: Degree, dec: Degree) -> (Pixel, Pixel) {
        let ra0 = self.crval[0] * RADEG;
        let dec0 = self.crval[1] * RADEG;
        let (sin_dec0, cos_dec0) = dec0.sin_cos();
        let (sin_dec, cos_dec) = (dec * RADEG).sin_cos();
        let (sin_dra, cos_dra) = (ra * RADEG - ra0).sin_cos();

        // Gnomonic projection onto the tangent plane at CRVAL.
        let denom = sin_dec0 * sin_dec + cos_dec0 * cos_dec * cos_dra;
        if denom <= 0.0 {
            return (f64::NAN, f64::NAN);
        }
        let xi = cos_dec * sin_dra / denom / RADEG;
        let eta = (cos_dec0 * sin_dec - sin_dec0 * cos_dec * cos_dra) / denom / RADEG;

        (
            self.inv_cd[0][0] * xi + self.inv_cd[0][1] * eta + self.crpix[0],
            self.inv_cd[1][0] * xi + self.inv_cd[1][1] * eta + self.crpix[1],
        )
    }
}

impl SkyToPixel for TanWcs {
    fn sky_to_pixel(&self, ra: &[Degree], dec: &[Degree]) -> (Vec<Pixel>, Vec<Pixel>) {
        let mut xs = Vec::with_capacity(ra.len());
        let mut ys = Vec::with_capacity(ra.len());
        for (&ra, &dec) in ra.iter().zip(dec) {
            let (x, y) = self.project_one(ra, dec);
            xs.push(x);
            ys.push(y);
        }
        (xs, ys)
    }
}

/// Load the TAN transform of one mosaic file.
pub fn load_tan_wcs(path: &camino::Utf8Path) -> Result<TanWcs, VisitXyError> {
    let header = FitsHeader::from_file(path)?;
    TanWcs::from_header(&header)
}

/// [`ResolveTransform`] implementation backed by the discovered visit
/// mosaics: each `resolve` opens that visit's mosaic header, once.
pub struct MosaicTransforms<'a> {
    mosaics: &'a VisitMosaics,
}

impl<'a> MosaicTransforms<'a> {
    pub fn new(mosaics: &'a VisitMosaics) -> Self {
        MosaicTransforms { mosaics }
    }
}

impl ResolveTransform for MosaicTransforms<'_> {
    type Transform = TanWcs;

    fn resolve(&self, visit: VisitId) -> Result<TanWcs, VisitXyError> {
        let path = self
            .mosaics
            .path_for(visit)
            .ok_or_else(|| VisitXyError::TransformUnavailable {
                visit,
                reason: "no mosaic discovered for this visit".to_string(),
            })?;
        load_tan_wcs(path).map_err(|error| VisitXyError::TransformUnavailable {
            visit,
            reason: error.to_string(),
        })
    }
}

#[cfg(test)]
mod wcs_test {
    use super::*;
    use approx::assert_relative_eq;

    const ARCSEC: f64 = 1.0 / 3600.0;

    fn test_wcs() -> TanWcs {
        // 1 arcsec/pixel, RA decreasing with x as in real mosaics.
        TanWcs::new(
            [150.0, 2.0],
            [2048.0, 2048.0],
            [[-ARCSEC, 0.0], [0.0, ARCSEC]],
        )
        .unwrap()
    }

    #[test]
    fn test_crval_maps_to_crpix() {
        let wcs = test_wcs();
        let (xs, ys) = wcs.sky_to_pixel(&[150.0], &[2.0]);
        assert_relative_eq!(xs[0], 2048.0, epsilon = 1e-9);
        assert_relative_eq!(ys[0], 2048.0, epsilon = 1e-9);
    }

    #[test]
    fn test_small_offsets_match_plate_scale() {
        let wcs = test_wcs();
        // One arcsecond north: +1 pixel in y.
        let (xs, ys) = wcs.sky_to_pixel(&[150.0], &[2.0 + ARCSEC]);
        assert_relative_eq!(xs[0], 2048.0, epsilon = 1e-6);
        assert_relative_eq!(ys[0], 2049.0, epsilon = 1e-3);
        // One arcsecond east: -1 pixel in x (negative CD1_1), scaled by cos(dec).
        let (xs, ys) = wcs.sky_to_pixel(&[150.0 + ARCSEC / (2.0 * RADEG).cos()], &[2.0]);
        assert_relative_eq!(xs[0], 2047.0, epsilon = 1e-3);
        assert_relative_eq!(ys[0], 2048.0, epsilon = 1e-3);
    }

    #[test]
    fn test_antipode_is_nan() {
        let wcs = test_wcs();
        let (xs, ys) = wcs.sky_to_pixel(&[330.0], &[-2.0]);
        assert!(xs[0].is_nan());
        assert!(ys[0].is_nan());
    }

    #[test]
    fn test_singular_cd_rejected() {
        let err = TanWcs::new([0.0, 0.0], [0.0, 0.0], [[1.0, 1.0], [1.0, 1.0]]).unwrap_err();
        assert_eq!(err, WcsError::SingularCdMatrix);
    }

    #[test]
    fn test_non_finite_parameter_rejected() {
        let err = TanWcs::new([f64::NAN, 0.0], [0.0, 0.0], [[1.0, 0.0], [0.0, 1.0]]).unwrap_err();
        assert_eq!(err, WcsError::NonFiniteKeyword("CRVAL"));
    }
}
