//! # Run configuration
//!
//! This module defines [`RunConfig`], the YAML-backed configuration consumed by
//! the pipeline, mirroring the document shape expected by the batch runner:
//!
//! ```yaml
//! bandpass: f150w
//! input_catalog:
//!   path: /data/catalogs
//!   name: master_catalog.parquet
//!   ra_colname: ra
//!   dec_colname: dec
//! output_catalog:
//!   path: /data/output
//!   name: augmented_catalog.parquet
//!   extra_cols: [source_id, flux_auto]
//! coord_files:
//!   path: /data/footprints
//!   names: [footprints_f150w.csv, footprints_f277w.csv]
//! visit_mosaics:
//!   path: /data/mosaics
//!   pattern: "visit_*_i2d.fits"
//! ```
//!
//! Deserialization failures (missing required keys, wrong types) surface as
//! [`VisitXyError::YamlError`](crate::visitxy_errors::VisitXyError::YamlError)
//! and are fatal before any processing starts.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::visitxy_errors::VisitXyError;

/// Location and column naming of the master source catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct InputCatalogConfig {
    /// Directory containing the master catalog file.
    pub path: Utf8PathBuf,
    /// File name of the master catalog (Parquet).
    pub name: String,
    /// Name of the right-ascension column (degrees).
    pub ra_colname: String,
    /// Name of the declination column (degrees).
    pub dec_colname: String,
}

impl InputCatalogConfig {
    /// Full path to the master catalog file.
    pub fn catalog_path(&self) -> Utf8PathBuf {
        self.path.join(&self.name)
    }
}

/// Location, name and pass-through columns of the augmented output catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputCatalogConfig {
    /// Directory the output catalog is written to (created if missing).
    pub path: Utf8PathBuf,
    /// File name of the output catalog (Parquet).
    pub name: String,
    /// Master-catalog columns copied verbatim into the output, in order.
    ///
    /// Every name must exist in the master catalog; a missing name aborts the
    /// run before any output row is built.
    #[serde(default)]
    pub extra_cols: Vec<String>,
}

impl OutputCatalogConfig {
    /// Full path to the output catalog file.
    pub fn catalog_path(&self) -> Utf8PathBuf {
        self.path.join(&self.name)
    }
}

/// Candidate footprint (coords) files, one per bandpass.
#[derive(Debug, Clone, Deserialize)]
pub struct CoordFilesConfig {
    /// Directory containing the footprint files.
    pub path: Utf8PathBuf,
    /// Candidate file names; the first whose filter-code token matches the
    /// requested bandpass is used.
    pub names: Vec<String>,
}

/// Where and how single-visit mosaics are discovered.
#[derive(Debug, Clone, Deserialize)]
pub struct VisitMosaicsConfig {
    /// Root directory; mosaics live under `<path>/<bandpass>/`.
    pub path: Utf8PathBuf,
    /// Glob pattern applied inside the bandpass directory.
    #[serde(default = "default_mosaic_pattern")]
    pub pattern: String,
}

fn default_mosaic_pattern() -> String {
    "visit_*_i2d.fits".to_string()
}

impl VisitMosaicsConfig {
    /// Glob pattern string for one bandpass, e.g.
    /// `/data/mosaics/f150w/visit_*_i2d.fits`.
    pub fn search_pattern(&self, bandpass: &str) -> String {
        self.path.join(bandpass).join(&self.pattern).into_string()
    }
}

/// Top-level run configuration.
///
/// See the module documentation for the expected YAML shape.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Bandpass identifier, e.g. `f150w` (case-insensitive).
    pub bandpass: String,
    pub input_catalog: InputCatalogConfig,
    pub output_catalog: OutputCatalogConfig,
    pub coord_files: CoordFilesConfig,
    pub visit_mosaics: VisitMosaicsConfig,
}

impl RunConfig {
    /// Load a run configuration from a YAML file.
    ///
    /// Arguments
    /// ---------
    /// * `path`: path to the YAML configuration document
    ///
    /// Return
    /// ------
    /// * The parsed [`RunConfig`], or a fatal configuration error.
    pub fn from_yaml_file(path: &Utf8Path) -> Result<Self, VisitXyError> {
        let text = std::fs::read_to_string(path)?;
        let config: RunConfig = serde_yml::from_str(&text)?;
        Ok(config)
    }
}
