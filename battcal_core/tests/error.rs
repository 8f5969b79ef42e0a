use std::fs;

use battcal_core::error::CalibrationError;
use battcal_core::mocks::{FailingSource, StaticSource};
use battcal_core::source_error::map_source_error;
use battcal_core::{Calibrator, Method};
use battcal_store::{CsvSampleStore, StoreError};
use rstest::rstest;
use tempfile::tempdir;

#[rstest]
#[case("connection refused", false)]
#[case("database is locked", false)]
#[case("malformed row 3", true)]
#[case("cannot scan percentage", true)]
fn boxed_errors_map_by_message(#[case] msg: &'static str, #[case] scan: bool) {
    let err = Calibrator::new(FailingSource(msg))
        .estimate(12.0)
        .expect_err("source always fails");
    match err {
        CalibrationError::StoreScan(m) if scan => assert!(m.contains(msg)),
        CalibrationError::StoreRead(m) if !scan => assert!(m.contains(msg)),
        other => panic!("unexpected error variant: {other:?}"),
    }
}

#[test]
fn typed_store_errors_map_precisely() {
    let malformed = StoreError::Malformed {
        line: 4,
        reason: "bad float".into(),
    };
    assert!(matches!(
        map_source_error(&malformed),
        CalibrationError::StoreScan(_)
    ));
    // Message mentions nothing scan-like, but the type says it is an I/O failure
    let io = StoreError::Io(std::io::Error::other("malformed-looking text"));
    assert!(matches!(map_source_error(&io), CalibrationError::StoreRead(_)));
}

#[test]
fn malformed_store_row_fails_the_whole_estimate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("samples.csv");
    fs::write(
        &path,
        "id,voltage,percentage,recorded_at\n\
         1,10.0,0,2024-01-01T00:00:00Z\n\
         2,twelve,50,2024-01-01T00:00:00Z\n\
         3,14.0,100,2024-01-01T00:00:00Z\n",
    )
    .unwrap();

    let c = Calibrator::new(CsvSampleStore::open(&path).unwrap());
    let err = c.estimate(12.0).expect_err("bad row must not be skipped");
    assert!(matches!(err, CalibrationError::StoreScan(_)), "{err:?}");
}

#[test]
fn unreadable_store_is_a_read_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("samples.csv");
    let store = CsvSampleStore::open(&path).unwrap();
    fs::remove_file(&path).unwrap();

    let err = Calibrator::new(store).estimate(12.0).expect_err("missing file");
    assert!(matches!(err, CalibrationError::StoreRead(_)), "{err:?}");
}

#[rstest]
#[case(&[(12.0, 40), (12.0, 60), (13.0, 80)], 3)]
#[case(&[(12.0, 40), (12.0, 60), (13.0, 80), (13.0, 90)], 4)]
#[case(&[(12.0, 40), (12.0, 60), (12.0, 80)], 3)]
fn duplicate_voltages_in_polynomial_path_are_errors(
    #[case] pairs: &[(f64, i32)],
    #[case] expected: usize,
) {
    assert!(matches!(
        Method::for_count(pairs.len()),
        Method::Polynomial { .. }
    ));
    let err = Calibrator::new(StaticSource::from_pairs(pairs))
        .estimate(12.5)
        .expect_err("singular fit");
    match err {
        CalibrationError::FitSingularity { expected: e, got } => {
            assert_eq!(e, expected);
            assert!(got < expected);
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
}

#[test]
fn error_messages_are_descriptive() {
    let e = CalibrationError::FitSingularity {
        expected: 4,
        got: 3,
    };
    assert_eq!(
        e.to_string(),
        "polynomial fit is singular: expected 4 coefficients, got 3"
    );
    assert!(
        CalibrationError::StoreRead("x".into())
            .to_string()
            .starts_with("sample store read failed")
    );
}
