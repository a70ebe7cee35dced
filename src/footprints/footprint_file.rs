//! Selection of the per-bandpass footprint file.
//!
//! Footprint file names embed a filter-code token (a letter, three digits,
//! a letter, e.g. `F150W`); the file for a run is the first configured name
//! whose token equals the requested bandpass, compared case-insensitively.

use std::sync::LazyLock;

use regex::Regex;

use crate::visitxy_errors::VisitXyError;

static FILTER_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[a-z]\d{3}[a-z]").expect("filter-code regex is valid"));

/// Pick the footprint file matching a bandpass from the configured candidates.
///
/// Arguments
/// ---------
/// * `bandpass`: bandpass identifier, e.g. `f150w` (case-insensitive)
/// * `names`: candidate file names, in configured order
///
/// Return
/// ------
/// * The first candidate whose filter-code token matches the bandpass. When
///   several match, the first in configured order wins; this is deliberate
///   and not an error. Zero matches is a fatal configuration error.
pub fn select_footprint_file<'a>(
    bandpass: &str,
    names: &'a [String],
) -> Result<&'a str, VisitXyError> {
    let wanted = bandpass.to_lowercase();
    names
        .iter()
        .find(|name| {
            FILTER_CODE
                .find(name)
                .is_some_and(|m| m.as_str().to_lowercase() == wanted)
        })
        .map(String::as_str)
        .ok_or_else(|| VisitXyError::NoFootprintForBandpass {
            bandpass: bandpass.to_string(),
            candidates: names.to_vec(),
        })
}
