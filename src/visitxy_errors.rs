use camino::Utf8PathBuf;
use thiserror::Error;

use crate::constants::VisitId;
use crate::wcs::header::ParseHeaderError;
use crate::wcs::WcsError;

#[derive(Error, Debug)]
pub enum VisitXyError {
    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid YAML configuration: {0}")]
    YamlError(#[from] serde_yml::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow_schema::ArrowError),

    #[error("Invalid glob pattern: {0}")]
    GlobPatternError(#[from] glob::PatternError),

    #[error("Glob iteration error: {0}")]
    GlobError(#[from] glob::GlobError),

    #[error("Master catalog not found at: {0}")]
    CatalogNotFound(Utf8PathBuf),

    #[error("Requested column '{0}' not in master catalog")]
    MissingColumn(String),

    #[error("Column '{column}' has unexpected type: expected {expected}")]
    ColumnTypeMismatch { column: String, expected: String },

    #[error("Null value in column '{column}' at row {row}")]
    NullCatalogValue { column: String, row: usize },

    #[error("No footprint file matching bandpass '{bandpass}' among {candidates:?}")]
    NoFootprintForBandpass {
        bandpass: String,
        candidates: Vec<String>,
    },

    #[error("Malformed footprint for visit {visit}: {reason}")]
    MalformedFootprint { visit: VisitId, reason: String },

    #[error("Duplicate visit id {0} in footprint file")]
    DuplicateFootprintVisit(VisitId),

    #[error("Footprint file contains no footprints: {0}")]
    EmptyFootprintFile(Utf8PathBuf),

    #[error("No visit mosaics found matching: {0}")]
    NoMosaicsFound(String),

    #[error("Cannot parse visit id from mosaic filename '{name}': {reason}")]
    InvalidMosaicFilename { name: String, reason: String },

    #[error("Duplicate visit id {visit} among mosaics ('{first}' and '{second}')")]
    DuplicateMosaicVisit {
        visit: VisitId,
        first: String,
        second: String,
    },

    #[error("Transform unavailable for visit {visit}: {reason}")]
    TransformUnavailable { visit: VisitId, reason: String },

    #[error("Error parsing FITS header: {0}")]
    HeaderParsingError(#[from] ParseHeaderError),

    #[error("Unusable WCS: {0}")]
    InvalidWcs(#[from] WcsError),

    #[error("UTF-8 Path error: {0}")]
    Utf8PathError(String),

    #[error("All {0} visits failed to project; output retains pixel sentinels")]
    AllVisitsFailed(usize),
}
