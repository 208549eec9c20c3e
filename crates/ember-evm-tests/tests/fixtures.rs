//! Runs the shipped fixtures through the full harness

use std::path::PathBuf;

use ember_evm_tests::{StateTestRunner, TestRunner};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

#[test]
fn test_fixture_directory_passes() {
    let stats = TestRunner::new(None, true).unwrap().run_path(&fixtures()).unwrap();
    assert!(stats.is_success(), "failures: {:?}", stats.failures);
    assert_eq!(stats.files, 2);
    // valueTransfer, sstoreDynamicFee and both londonOnly entries
    assert_eq!(stats.passed, 4);
    // nonceTooHigh expects an exception
    assert_eq!(stats.skipped, 1);
}

#[test]
fn test_forced_fork_skips_missing() {
    let runner = TestRunner::new(Some("Shanghai"), false).unwrap();
    let stats = runner.run_path(&fixtures()).unwrap();
    assert!(stats.is_success(), "failures: {:?}", stats.failures);
    // Only valueTransfer has a Shanghai entry
    assert_eq!(stats.passed, 1);
    assert_eq!(stats.skipped, 3);
}

#[test]
fn test_single_file() {
    let runner = StateTestRunner::new(Some("London"), false).unwrap();
    let results = runner
        .run_file(&fixtures().join("basic/storage.json"))
        .unwrap();
    assert_eq!(results.passed, vec!["londonOnly_London_0", "londonOnly_London_1"]);
    assert_eq!(results.skipped.len(), 1);
}
