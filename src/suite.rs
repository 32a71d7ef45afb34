// src/suite.rs
//! Correctness suite runner
//!
//! A suite directory holds `definition.txt` plus, per case, an exemplar file
//! `<name>_element.html` and a document `<name>_html.html`. The definition
//! starts with a `[TESTS]` line; every following line is one case made of
//! `;`-separated `key = value` pairs:
//!
//! ```text
//! [TESTS]
//! name = rows; desc = table rows; matchMaxDepth = 1; assert = len(matches) == 3
//! ```
//!
//! Matches of each case are dumped to `<name>_standard.html`.

use crate::dom::{self, DomNode};
use crate::matcher::ExemplarMatcher;
use crate::models::MatchConfig;
use crate::observer::LogObserver;
use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFINITION_FILE: &str = "definition.txt";
const HEADER: &str = "[TESTS]";
const SETTING_KEYS: [&str; 4] = ["matchType", "matchMaxDepth", "matchTolerance", "matchInsideElement"];

/// Problems with the suite definition itself
#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("Failed to read suite definition {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Suite definition must start with [TESTS], found: {0:?}")]
    MissingHeader(String),

    #[error("Line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// One parsed definition line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub desc: Option<String>,
    pub expected: usize,
    /// Policy overrides, applied in order with [`MatchConfig::set`]
    pub settings: Vec<(String, String)>,
    pub line: usize,
}

/// Parse a definition file's contents
pub fn parse_definition(text: &str) -> Result<Vec<TestCase>, SuiteError> {
    let mut lines = text.lines().enumerate();

    match lines.next() {
        Some((_, first)) if first.trim() == HEADER => {}
        Some((_, first)) => return Err(SuiteError::MissingHeader(first.trim().to_string())),
        None => return Err(SuiteError::MissingHeader(String::new())),
    }

    lines
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_case(line, index + 1))
        .collect()
}

fn parse_case(line: &str, line_no: usize) -> Result<TestCase, SuiteError> {
    let malformed = |reason: String| SuiteError::Malformed { line: line_no, reason };

    let mut name = None;
    let mut desc = None;
    let mut expected = None;
    let mut settings = Vec::new();

    for pair in line.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| malformed(format!("expected key = value, found {:?}", pair)))?;
        let (key, value) = (key.trim(), value.trim());

        match key {
            "name" => name = Some(value.to_string()),
            "desc" => desc = Some(value.to_string()),
            "assert" => expected = Some(parse_assert(value).map_err(malformed)?),
            k if SETTING_KEYS.contains(&k) => settings.push((k.to_string(), value.to_string())),
            other => warn!("Line {}: ignoring unknown key {:?}", line_no, other),
        }
    }

    let name = name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| malformed("missing name".to_string()))?;
    let expected = expected.ok_or_else(|| malformed(format!("case {} has no assert", name)))?;

    Ok(TestCase {
        name,
        desc,
        expected,
        settings,
        line: line_no,
    })
}

/// `len(matches) == N`, or just `N`
fn parse_assert(value: &str) -> Result<usize, String> {
    let count = match value.split_once("==") {
        Some((lhs, rhs)) => {
            if lhs.trim() != "len(matches)" {
                return Err(format!("unsupported assert expression {:?}", lhs.trim()));
            }
            rhs.trim()
        }
        None => value,
    };

    count
        .parse()
        .map_err(|_| format!("assert expects a match count, found {:?}", count))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CaseOutcome {
    Passed { matches: usize },
    Failed { matches: usize, expected: usize },
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub desc: Option<String>,
    #[serde(flatten)]
    pub outcome: CaseOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteSummary {
    pub cases: Vec<CaseReport>,
}

impl SuiteSummary {
    pub fn executed(&self) -> usize {
        self.cases.len()
    }

    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Passed { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Skipped { .. }))
    }

    /// Share of non-skipped cases that passed, 0 when nothing ran
    pub fn percent_passing(&self) -> f64 {
        let ran = self.executed() - self.skipped();
        if ran == 0 {
            return 0.0;
        }
        self.passed() as f64 / ran as f64 * 100.0
    }

    fn count(&self, pred: impl Fn(&CaseOutcome) -> bool) -> usize {
        self.cases.iter().filter(|c| pred(&c.outcome)).count()
    }

    /// Write the summary as pretty JSON
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize suite report")?;

        let mut file = File::create(path.as_ref())
            .context("Failed to create suite report file")?;

        file.write_all(json.as_bytes())
            .context("Failed to write suite report file")?;

        Ok(())
    }
}

/// Runs every case of a suite directory
pub struct SuiteRunner {
    dir: PathBuf,
}

impl SuiteRunner {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn run(&self) -> Result<SuiteSummary, SuiteError> {
        let path = self.dir.join(DEFINITION_FILE);
        info!("Loading tests from {}", path.display());

        let text = fs::read_to_string(&path).map_err(|source| SuiteError::ReadError {
            path: path.display().to_string(),
            source,
        })?;

        let cases = parse_definition(&text)?;
        let mut summary = SuiteSummary::default();

        for case in &cases {
            let outcome = match self.run_case(case) {
                Ok(count) if count == case.expected => CaseOutcome::Passed { matches: count },
                Ok(count) => CaseOutcome::Failed {
                    matches: count,
                    expected: case.expected,
                },
                Err(e) => {
                    warn!("Skipping {}: {:#}", case.name, e);
                    CaseOutcome::Skipped {
                        reason: format!("{:#}", e),
                    }
                }
            };

            summary.cases.push(CaseReport {
                name: case.name.clone(),
                desc: case.desc.clone(),
                outcome,
            });
        }

        Ok(summary)
    }

    /// Path of the dump file for a case
    pub fn standard_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}_standard.html", name))
    }

    /// Run one case, dump its matches and return how many there were
    fn run_case(&self, case: &TestCase) -> Result<usize> {
        let standard = self.standard_path(&case.name);
        match fs::remove_file(&standard) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                return Err(e).with_context(|| format!("Failed to remove {}", standard.display()))
            }
            _ => {}
        }

        let mut config = MatchConfig::default();
        for (key, value) in &case.settings {
            config.set(key, value)?;
        }

        let exemplar = dom::parse_snippet_file(self.dir.join(format!("{}_element.html", case.name)))?;
        let document = dom::parse_file(self.dir.join(format!("{}_html.html", case.name)))?;

        let matcher = ExemplarMatcher::new(exemplar)
            .with_config(config)
            .with_observer(LogObserver);
        let matches = matcher.find_matches(&document)?;

        let mut file = File::create(&standard)
            .with_context(|| format!("Failed to create {}", standard.display()))?;
        for node in &matches {
            writeln!(file, "{}", dom::outer_html(node)?)?;
        }

        info!(
            "{}: {} match(es), first: {}",
            case.name,
            matches.len(),
            matches.first().map(|n| n.summary()).unwrap_or_default()
        );

        Ok(matches.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_definition_lines() {
        let text = "[TESTS]\n\
            name = rows; desc = table rows; matchMaxDepth = 1; assert = len(matches) == 3\n\
            \n\
            name=strict;matchType=0;matchTolerance=1;assert=2;\n";

        let cases = parse_definition(text).unwrap();

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].name, "rows");
        assert_eq!(cases[0].desc.as_deref(), Some("table rows"));
        assert_eq!(cases[0].expected, 3);
        assert_eq!(cases[0].settings, vec![("matchMaxDepth".to_string(), "1".to_string())]);
        assert_eq!(cases[0].line, 2);

        assert_eq!(cases[1].expected, 2);
        assert_eq!(cases[1].line, 4);
        assert_eq!(
            cases[1].settings,
            vec![
                ("matchType".to_string(), "0".to_string()),
                ("matchTolerance".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_header_is_required() {
        assert!(matches!(
            parse_definition("name = a; assert = 1"),
            Err(SuiteError::MissingHeader(_))
        ));
        assert!(matches!(parse_definition(""), Err(SuiteError::MissingHeader(_))));
    }

    #[test]
    fn test_malformed_lines() {
        let no_assert = parse_definition("[TESTS]\nname = a; desc = b");
        assert!(matches!(no_assert, Err(SuiteError::Malformed { line: 2, .. })));

        let bad_expr = parse_definition("[TESTS]\nname = a; assert = len(items) == 1");
        assert!(matches!(bad_expr, Err(SuiteError::Malformed { line: 2, .. })));

        let no_equals = parse_definition("[TESTS]\nname = a; assert = 1; broken");
        assert!(matches!(no_equals, Err(SuiteError::Malformed { line: 2, .. })));

        let no_name = parse_definition("[TESTS]\nassert = 1");
        assert!(matches!(no_name, Err(SuiteError::Malformed { line: 2, .. })));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let cases = parse_definition("[TESTS]\nname = a; element = .findChild(); assert = 0").unwrap();
        assert!(cases[0].settings.is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let report = |outcome| CaseReport {
            name: "c".to_string(),
            desc: None,
            outcome,
        };
        let summary = SuiteSummary {
            cases: vec![
                report(CaseOutcome::Passed { matches: 1 }),
                report(CaseOutcome::Passed { matches: 2 }),
                report(CaseOutcome::Failed { matches: 0, expected: 1 }),
                report(CaseOutcome::Skipped { reason: "missing".to_string() }),
            ],
        };

        assert_eq!(summary.executed(), 4);
        assert_eq!(summary.passed(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.skipped(), 1);
        assert!((summary.percent_passing() - 66.666).abs() < 0.01);
        assert_eq!(SuiteSummary::default().percent_passing(), 0.0);
    }
}
