use rust_pattern_hunter::suite::{CaseOutcome, SuiteError, SuiteRunner, DEFINITION_FILE};
use std::fs;
use std::path::Path;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn listing_suite(dir: &Path) {
    write(
        dir,
        DEFINITION_FILE,
        "[TESTS]\n\
         name = items; desc = every list item; assert = len(matches) == 2\n\
         name = strict; desc = attributes must agree; matchType = 0; assert = len(matches) == 1\n\
         name = wrong; desc = expectation is off; assert = len(matches) == 5\n\
         name = absent; desc = case files missing; assert = 0\n\
         name = badtype; matchType = 9; assert = 0\n",
    );

    let html = r#"<ul><li class="hot"><a></a></li><li><a></a></li><li></li></ul>"#;
    for case in ["items", "strict", "wrong", "badtype"] {
        write(dir, &format!("{}_html.html", case), html);
    }
    write(dir, "items_element.html", "<li><a></a></li>");
    write(dir, "strict_element.html", r#"<li class="hot"><a></a></li>"#);
    write(dir, "wrong_element.html", "<li><a></a></li>");
    write(dir, "badtype_element.html", "<li><a></a></li>");
}

#[test]
fn test_suite_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    listing_suite(dir.path());

    let summary = SuiteRunner::new(dir.path()).run().unwrap();

    let outcomes: Vec<_> = summary.cases.iter().map(|c| (c.name.as_str(), &c.outcome)).collect();
    assert_eq!(outcomes[0], ("items", &CaseOutcome::Passed { matches: 2 }));
    assert_eq!(outcomes[1], ("strict", &CaseOutcome::Passed { matches: 1 }));
    assert_eq!(outcomes[2], ("wrong", &CaseOutcome::Failed { matches: 2, expected: 5 }));
    assert!(matches!(outcomes[3], ("absent", CaseOutcome::Skipped { .. })));
    assert!(matches!(outcomes[4], ("badtype", CaseOutcome::Skipped { reason }) if reason.contains("matchType")));

    assert_eq!(summary.executed(), 5);
    assert_eq!(summary.passed(), 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.skipped(), 2);
    assert!((summary.percent_passing() - 66.666).abs() < 0.01);
}

#[test]
fn test_suite_dumps_matches() {
    let dir = tempfile::tempdir().unwrap();
    listing_suite(dir.path());

    let runner = SuiteRunner::new(dir.path());
    runner.run().unwrap();

    let dump = fs::read_to_string(runner.standard_path("items")).unwrap();
    let lines: Vec<_> = dump.lines().collect();
    assert_eq!(lines, vec![r#"<li class="hot"><a></a></li>"#, "<li><a></a></li>"]);

    // skipped cases leave no dump behind
    assert!(!runner.standard_path("absent").exists());
}

#[test]
fn test_stale_dump_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    listing_suite(dir.path());
    write(dir.path(), "strict_standard.html", "stale\nstale\nstale\n");

    let runner = SuiteRunner::new(dir.path());
    runner.run().unwrap();

    let dump = fs::read_to_string(runner.standard_path("strict")).unwrap();
    assert_eq!(dump, "<li class=\"hot\"><a></a></li>\n");
}

#[test]
fn test_suite_report_is_json() {
    let dir = tempfile::tempdir().unwrap();
    listing_suite(dir.path());

    let summary = SuiteRunner::new(dir.path()).run().unwrap();
    let report_path = dir.path().join("report.json");
    summary.write_to_file(&report_path).unwrap();

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["cases"][0]["name"], "items");
    assert_eq!(report["cases"][0]["status"], "passed");
    assert_eq!(report["cases"][2]["expected"], 5);
}

#[test]
fn test_missing_definition_file() {
    let dir = tempfile::tempdir().unwrap();

    let result = SuiteRunner::new(dir.path()).run();
    assert!(matches!(result, Err(SuiteError::ReadError { .. })));
}

#[test]
fn test_bundled_suite_passes() {
    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("test");
    let dir = tempfile::tempdir().unwrap();
    for entry in fs::read_dir(&source).unwrap() {
        let path = entry.unwrap().path();
        fs::copy(&path, dir.path().join(path.file_name().unwrap())).unwrap();
    }

    let summary = SuiteRunner::new(dir.path()).run().unwrap();

    assert_eq!(summary.executed(), 3);
    assert_eq!(summary.passed(), 3, "{:?}", summary.cases);
}
