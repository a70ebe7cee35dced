//! # Visit mosaic discovery
//!
//! Single-visit mosaics are found on disk with a glob pattern under the
//! bandpass directory, and each file name encodes its visit identifier as
//! the **second underscore-delimited token** (`visit_123_f150w_i2d.fits`
//! → visit 123). That encoding is an external contract; rather than
//! trusting it silently, the parser here fails loudly on any file name
//! that does not match, naming the file.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};

use crate::config::VisitMosaicsConfig;
use crate::constants::VisitId;
use crate::visitxy_errors::VisitXyError;

/// Discovered mosaics of one bandpass, keyed by visit id.
#[derive(Debug, Clone, Default)]
pub struct VisitMosaics {
    by_visit: BTreeMap<VisitId, Utf8PathBuf>,
}

impl VisitMosaics {
    /// Mosaic path for one visit, if discovered.
    pub fn path_for(&self, visit: VisitId) -> Option<&Utf8Path> {
        self.by_visit.get(&visit).map(Utf8PathBuf::as_path)
    }

    /// Number of discovered mosaics.
    pub fn len(&self) -> usize {
        self.by_visit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_visit.is_empty()
    }

    /// Visits with a mosaic, ascending.
    pub fn visits(&self) -> impl Iterator<Item = VisitId> + '_ {
        self.by_visit.keys().copied()
    }
}

/// Parse the visit id out of a mosaic file name.
///
/// Arguments
/// ---------
/// * `name`: bare file name, e.g. `visit_123_f150w_i2d.fits`
///
/// Return
/// ------
/// * The second underscore-delimited token parsed as a non-negative
///   integer; anything else (too few tokens, non-numeric, negative) is a
///   loud error carrying the file name.
pub fn visit_id_from_filename(name: &str) -> Result<VisitId, VisitXyError> {
    let invalid = |reason: &str| VisitXyError::InvalidMosaicFilename {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let token = name
        .split('_')
        .nth(1)
        .ok_or_else(|| invalid("expected at least two underscore-delimited tokens"))?;
    let visit: VisitId = token
        .parse()
        .map_err(|_| invalid("second token is not an integer"))?;
    if visit < 0 {
        return Err(invalid("visit id is negative"));
    }
    Ok(visit)
}

/// Discover the visit mosaics of one bandpass.
///
/// Arguments
/// ---------
/// * `config`: mosaic root directory and glob pattern
/// * `bandpass`: bandpass identifier, names the subdirectory searched
///
/// Return
/// ------
/// * The discovered mosaics keyed by visit id. Zero matches is fatal and
///   the error carries the searched pattern; so are an unparsable file
///   name and two mosaics claiming the same visit.
pub fn discover_visit_mosaics(
    config: &VisitMosaicsConfig,
    bandpass: &str,
) -> Result<VisitMosaics, VisitXyError> {
    let pattern = config.search_pattern(bandpass);

    let mut by_visit: BTreeMap<VisitId, Utf8PathBuf> = BTreeMap::new();
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        let path = Utf8PathBuf::from_path_buf(path)
            .map_err(|p| VisitXyError::Utf8PathError(p.display().to_string()))?;
        let name = path
            .file_name()
            .ok_or_else(|| VisitXyError::Utf8PathError(path.to_string()))?;

        let visit = visit_id_from_filename(name)?;
        if let Some(first) = by_visit.get(&visit) {
            return Err(VisitXyError::DuplicateMosaicVisit {
                visit,
                first: first.to_string(),
                second: path.to_string(),
            });
        }
        by_visit.insert(visit, path);
    }

    if by_visit.is_empty() {
        return Err(VisitXyError::NoMosaicsFound(pattern));
    }
    Ok(VisitMosaics { by_visit })
}
