#![allow(dead_code)]

//! Shared fixtures for the integration tests: a scratch run layout with a
//! master catalog, a footprint file, and mosaic headers on disk.

use std::fs::File;
use std::sync::Arc;

use arrow_array::array::{ArrayRef, Float64Array, Int64Array};
use arrow_array::RecordBatch;
use arrow_schema::{DataType, Field, Schema};
use camino::{Utf8Path, Utf8PathBuf};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;

use visitxy::config::{
    CoordFilesConfig, InputCatalogConfig, OutputCatalogConfig, RunConfig, VisitMosaicsConfig,
};

/// A run directory with the canonical three-footprint, five-source layout
/// used across the integration tests.
pub struct RunFixture {
    pub dir: tempfile::TempDir,
    pub config: RunConfig,
}

/// Footprint boxes: visit 1 covers RA 10–11, visit 2 RA 11–12 (shared edge
/// at RA 11), visit 3 is disjoint at RA 40–41 / Dec 40–41.
pub const FOOTPRINTS_CSV: &str = "visit,ra,dec\n\
    1,10.0,0.0\n1,11.0,0.0\n1,11.0,1.0\n1,10.0,1.0\n\
    2,11.0,0.0\n2,12.0,0.0\n2,12.0,1.0\n2,11.0,1.0\n\
    3,40.0,40.0\n3,41.0,40.0\n3,41.0,41.0\n3,40.0,41.0\n";

/// Sources: inside visit 1, inside visit 2, on the shared boundary, and two
/// strays outside every footprint.
pub const SOURCE_RA: [f64; 5] = [10.5, 11.5, 11.0, 50.0, 9.0];
pub const SOURCE_DEC: [f64; 5] = [0.5, 0.5, 0.5, 50.0, 9.0];

pub fn utf8(path: std::path::PathBuf) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path).unwrap()
}

/// Write a master catalog with `source_id`, `ra`, `dec` columns.
pub fn write_master_catalog(path: &Utf8Path, ids: &[i64], ra: &[f64], dec: &[f64]) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("source_id", DataType::Int64, false),
        Field::new("ra", DataType::Float64, false),
        Field::new("dec", DataType::Float64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(ids.to_vec())),
        Arc::new(Float64Array::from(ra.to_vec())),
        Arc::new(Float64Array::from(dec.to_vec())),
    ];
    let batch = RecordBatch::try_new(Arc::clone(&schema), columns).unwrap();
    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

/// Write a minimal FITS primary header describing a TAN WCS.
pub fn write_mosaic_fits(path: &Utf8Path, crval: [f64; 2], crpix: [f64; 2], cd: [[f64; 2]; 2]) {
    let mut cards: Vec<String> = vec![
        "SIMPLE  = T".to_string(),
        "BITPIX  = 8".to_string(),
        "NAXIS   = 0".to_string(),
        "CTYPE1  = 'RA---TAN'".to_string(),
        "CTYPE2  = 'DEC--TAN'".to_string(),
        format!("CRVAL1  = {}", crval[0]),
        format!("CRVAL2  = {}", crval[1]),
        format!("CRPIX1  = {}", crpix[0]),
        format!("CRPIX2  = {}", crpix[1]),
        format!("CD1_1   = {}", cd[0][0]),
        format!("CD1_2   = {}", cd[0][1]),
        format!("CD2_1   = {}", cd[1][0]),
        format!("CD2_2   = {}", cd[1][1]),
        "END".to_string(),
    ];
    let mut bytes = Vec::with_capacity(2880);
    for card in cards.drain(..) {
        let mut card = card.into_bytes();
        card.resize(80, b' ');
        bytes.extend_from_slice(&card);
    }
    bytes.resize(2880, b' ');
    std::fs::write(path, bytes).unwrap();
}

impl RunFixture {
    /// Lay out the canonical fixture: three footprints, five sources, one
    /// mosaic per footprint (1 mas/pixel-ish plate scale, CRVAL at the
    /// footprint center, CRPIX at (100, 100)).
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(dir.path().to_path_buf());

        let cat_dir = root.join("catalogs");
        let coord_dir = root.join("footprints");
        let mosaic_dir = root.join("mosaics").join("f150w");
        let out_dir = root.join("output");
        for d in [&cat_dir, &coord_dir, &mosaic_dir] {
            std::fs::create_dir_all(d).unwrap();
        }

        write_master_catalog(
            &cat_dir.join("master_catalog.parquet"),
            &[0, 1, 2, 3, 4],
            &SOURCE_RA,
            &SOURCE_DEC,
        );
        std::fs::write(coord_dir.join("footprints_f150w.csv"), FOOTPRINTS_CSV).unwrap();

        let cd = [[-0.001, 0.0], [0.0, 0.001]];
        for (visit, center) in [(1, [10.5, 0.5]), (2, [11.5, 0.5]), (3, [40.5, 40.5])] {
            write_mosaic_fits(
                &mosaic_dir.join(format!("visit_{visit}_f150w_i2d.fits")),
                center,
                [100.0, 100.0],
                cd,
            );
        }

        let config = RunConfig {
            bandpass: "f150w".to_string(),
            input_catalog: InputCatalogConfig {
                path: cat_dir,
                name: "master_catalog.parquet".to_string(),
                ra_colname: "ra".to_string(),
                dec_colname: "dec".to_string(),
            },
            output_catalog: OutputCatalogConfig {
                path: out_dir,
                name: "augmented_catalog.parquet".to_string(),
                extra_cols: vec!["source_id".to_string()],
            },
            coord_files: CoordFilesConfig {
                path: coord_dir,
                names: vec![
                    "footprints_f277w.csv".to_string(),
                    "footprints_f150w.csv".to_string(),
                ],
            },
            visit_mosaics: VisitMosaicsConfig {
                path: root.join("mosaics"),
                pattern: "visit_*_i2d.fits".to_string(),
            },
        };

        RunFixture { dir, config }
    }

    pub fn output_path(&self) -> Utf8PathBuf {
        self.config.output_catalog.catalog_path()
    }

    pub fn mosaic_path(&self, visit: i64) -> Utf8PathBuf {
        self.config
            .visit_mosaics
            .path
            .join("f150w")
            .join(format!("visit_{visit}_f150w_i2d.fits"))
    }
}

/// Columns of a written output catalog, in row order.
pub struct OutputColumns {
    pub source_id: Vec<i64>,
    pub visit_num: Vec<i64>,
    pub ra: Vec<f64>,
    pub dec: Vec<f64>,
    pub visit_x: Vec<f64>,
    pub visit_y: Vec<f64>,
}

pub fn read_output(path: &Utf8Path) -> OutputColumns {
    let file = File::open(path).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();

    let mut columns = OutputColumns {
        source_id: vec![],
        visit_num: vec![],
        ra: vec![],
        dec: vec![],
        visit_x: vec![],
        visit_y: vec![],
    };
    for batch in reader {
        let batch = batch.unwrap();
        let int_column = |name: &str| -> Vec<i64> {
            batch
                .column_by_name(name)
                .unwrap()
                .as_any()
                .downcast_ref::<Int64Array>()
                .unwrap()
                .values()
                .to_vec()
        };
        let float_column = |name: &str| -> Vec<f64> {
            batch
                .column_by_name(name)
                .unwrap()
                .as_any()
                .downcast_ref::<Float64Array>()
                .unwrap()
                .values()
                .to_vec()
        };
        columns.source_id.extend(int_column("source_id"));
        columns.visit_num.extend(int_column("visit_num"));
        columns.ra.extend(float_column("ra"));
        columns.dec.extend(float_column("dec"));
        columns.visit_x.extend(float_column("visit_X"));
        columns.visit_y.extend(float_column("visit_Y"));
    }
    columns
}
