use super::*;

#[test]
fn test_outcome_predicates() {
    assert!(TestOutcome::Passed.is_passed());
    assert!(!TestOutcome::Passed.is_failed());
    assert!(TestOutcome::Failed("error".into()).is_failed());
    assert!(TestOutcome::Skipped("reason".into()).is_skipped());
}

#[test]
fn test_package_report_counts() {
    let mut report = PackageReport::new("widgets".into(), PathBuf::from("/work"));
    report.add_result(TestResult::passed(
        "TestA".into(),
        vec![],
        Duration::from_millis(10),
    ));
    report.add_result(TestResult::failed(
        "TestB".into(),
        "bad sum".into(),
        vec![],
        Duration::from_millis(5),
    ));
    report.add_result(TestResult::skipped(
        "TestC".into(),
        "later".into(),
        vec![],
        Duration::ZERO,
    ));

    assert_eq!(report.passed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.total(), 3);
    assert_eq!(report.duration, Duration::from_millis(15));
    assert!(report.has_failures());
}

#[test]
fn test_summary_exit_code() {
    let mut summary = TestSummary::new();
    assert_eq!(summary.exit_code(), 0); // No tests is not a failure

    summary.passed = 1;
    assert_eq!(summary.exit_code(), 0);

    summary.failed = 1;
    assert_eq!(summary.exit_code(), 1);
}

#[test]
fn test_build_error_fails_summary() {
    let mut summary = TestSummary::new();
    summary.add_package(PackageReport::build_failed(
        "main".into(),
        PathBuf::from("/work"),
        BuildError::ReservedImportCollision {
            import_path: "main".into(),
            directory: PathBuf::from("/work"),
        },
    ));
    assert_eq!(summary.build_errors, 1);
    assert_eq!(summary.total(), 0);
    assert_eq!(summary.exit_code(), 1);
}
