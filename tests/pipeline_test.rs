mod common;

use approx::assert_relative_eq;

use common::RunFixture;
use visitxy::{pipeline, VisitXyError, PIXEL_SENTINEL, UNASSIGNED_VISIT};

#[test]
fn test_full_run_assigns_and_projects() {
    let fixture = RunFixture::new();
    let report = pipeline::run(&fixture.config).unwrap();

    assert_eq!(report.n_sources, 5);
    assert_eq!(report.n_assigned, 3);
    assert_eq!(report.n_unassigned, 2);
    // Visit 3 has a mosaic but no assigned sources: never resolved, never
    // reported. Visits 1 and 2 project.
    assert_eq!(report.projected, [1, 2]);
    assert!(report.fully_projected());

    let output = common::read_output(&fixture.output_path());
    // One row per source, in input order.
    assert_eq!(output.source_id, [0, 1, 2, 3, 4]);
    assert_eq!(output.ra, common::SOURCE_RA);
    assert_eq!(output.dec, common::SOURCE_DEC);
    assert_eq!(
        output.visit_num,
        [1, 2, 1, UNASSIGNED_VISIT, UNASSIGNED_VISIT]
    );

    // Sources at each mosaic's CRVAL land exactly on CRPIX.
    assert_relative_eq!(output.visit_x[0], 100.0, epsilon = 1e-9);
    assert_relative_eq!(output.visit_y[0], 100.0, epsilon = 1e-9);
    assert_relative_eq!(output.visit_x[1], 100.0, epsilon = 1e-9);
    assert_relative_eq!(output.visit_y[1], 100.0, epsilon = 1e-9);

    // The boundary source goes to visit 1: half a degree east of that
    // mosaic's center, so well off CRPIX but projected.
    assert!(output.visit_x[2] != PIXEL_SENTINEL);
    assert!(output.visit_x[2] < 100.0);
    assert_relative_eq!(output.visit_y[2], 100.0, epsilon = 0.05);

    // Unassigned sources are never projected.
    for row in [3, 4] {
        assert_eq!(output.visit_x[row], PIXEL_SENTINEL);
        assert_eq!(output.visit_y[row], PIXEL_SENTINEL);
    }
}

#[test]
fn test_two_runs_are_identical() {
    let fixture = RunFixture::new();
    pipeline::run(&fixture.config).unwrap();
    let first = common::read_output(&fixture.output_path());
    pipeline::run(&fixture.config).unwrap();
    let second = common::read_output(&fixture.output_path());

    assert_eq!(first.visit_num, second.visit_num);
    assert_eq!(first.ra, second.ra);
    assert_eq!(first.dec, second.dec);
    assert_eq!(first.visit_x, second.visit_x);
    assert_eq!(first.visit_y, second.visit_y);
}

#[test]
fn test_corrupt_mosaic_skips_only_that_visit() {
    let fixture = RunFixture::new();
    // Truncated garbage: the header reader cannot find an END card.
    std::fs::write(fixture.mosaic_path(2), b"not a fits file").unwrap();

    let report = pipeline::run(&fixture.config).unwrap();
    assert_eq!(report.projected, [1]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].visit, 2);

    let output = common::read_output(&fixture.output_path());
    // Visit 2's only source keeps the sentinel, everything else projected.
    assert_eq!(output.visit_x[1], PIXEL_SENTINEL);
    assert_eq!(output.visit_y[1], PIXEL_SENTINEL);
    assert!(output.visit_x[0] != PIXEL_SENTINEL);
    assert!(output.visit_x[2] != PIXEL_SENTINEL);
}

#[test]
fn test_missing_mosaic_skips_only_that_visit() {
    let fixture = RunFixture::new();
    std::fs::remove_file(fixture.mosaic_path(2)).unwrap();

    let report = pipeline::run(&fixture.config).unwrap();
    assert_eq!(report.projected, [1]);
    assert_eq!(report.skipped[0].visit, 2);
}

#[test]
fn test_all_mosaics_failing_leaves_the_assignment_checkpoint() {
    let fixture = RunFixture::new();
    for visit in [1, 2, 3] {
        std::fs::write(fixture.mosaic_path(visit), b"garbage").unwrap();
    }

    let err = pipeline::run(&fixture.config).unwrap_err();
    assert!(matches!(err, VisitXyError::AllVisitsFailed(2)));

    // The checkpoint written after assignment is still on disk: visit
    // numbers are final, pixel columns all sentinel.
    let output = common::read_output(&fixture.output_path());
    assert_eq!(
        output.visit_num,
        [1, 2, 1, UNASSIGNED_VISIT, UNASSIGNED_VISIT]
    );
    assert!(output.visit_x.iter().all(|&x| x == PIXEL_SENTINEL));
    assert!(output.visit_y.iter().all(|&y| y == PIXEL_SENTINEL));
}

#[test]
fn test_missing_passthrough_column_aborts_before_output() {
    let mut fixture = RunFixture::new();
    fixture
        .config
        .output_catalog
        .extra_cols
        .push("not_a_column".to_string());

    let err = pipeline::run(&fixture.config).unwrap_err();
    assert!(matches!(
        err,
        VisitXyError::MissingColumn(name) if name == "not_a_column"
    ));
    assert!(!fixture.output_path().exists());
}

#[test]
fn test_zero_mosaics_aborts_with_search_pattern() {
    let fixture = RunFixture::new();
    let mosaic_dir = fixture.config.visit_mosaics.path.join("f150w");
    for visit in [1, 2, 3] {
        std::fs::remove_file(fixture.mosaic_path(visit)).unwrap();
    }

    let err = pipeline::run(&fixture.config).unwrap_err();
    assert!(matches!(
        &err,
        VisitXyError::NoMosaicsFound(pattern) if pattern.starts_with(mosaic_dir.as_str())
    ));
    assert!(!fixture.output_path().exists());
}

#[test]
fn test_missing_master_catalog_reports_path() {
    let mut fixture = RunFixture::new();
    fixture.config.input_catalog.name = "no_such_catalog.parquet".to_string();

    let err = pipeline::run(&fixture.config).unwrap_err();
    assert!(matches!(
        err,
        VisitXyError::CatalogNotFound(path) if path.as_str().ends_with("no_such_catalog.parquet")
    ));
}
