use std::sync::Arc;

use serde::Serialize;

use crate::database::{FixtureStore, TestCase};
use crate::error::Result;
use crate::sandbox::SandboxRunner;

/// Outcome of one fixture
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    /// 1-based position in fixture order
    pub case_index: usize,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct JudgeReport {
    pub problem_id: i64,
    pub cases: Vec<CaseResult>,
    pub all_passed: bool,
}

impl JudgeReport {
    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }

    /// True when the problem had no fixtures to judge against
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Runs a submission against every fixture of a problem
#[derive(Clone)]
pub struct Judge {
    store: FixtureStore,
    runner: Arc<dyn SandboxRunner>,
}

impl Judge {
    pub fn new(store: FixtureStore, runner: Arc<dyn SandboxRunner>) -> Self {
        Self { store, runner }
    }

    /// Judges `source` against the fixtures of `problem_id`.
    ///
    /// Fixtures run one after another in ascending test case id order. A
    /// problem without fixtures yields an empty report with `all_passed`
    /// set.
    ///
    /// # Errors
    ///
    /// Fails with `SandboxUnavailable` as soon as any round trip fails; no
    /// partial report is produced.
    pub async fn judge(&self, problem_id: i64, source: &str) -> Result<JudgeReport> {
        let fixtures = self.store.list_test_cases(problem_id).await?;

        let mut cases = Vec::with_capacity(fixtures.len());
        for (idx, fixture) in fixtures.iter().enumerate() {
            let case_index = idx + 1;
            let result = self.run_single_case(case_index, fixture, source).await?;
            log::debug!(
                "Problem {problem_id} case {case_index} (test case {}): {}",
                fixture.id,
                if result.passed { "pass" } else { "fail" }
            );
            cases.push(result);
        }

        let all_passed = cases.iter().all(|c| c.passed);
        let report = JudgeReport {
            problem_id,
            cases,
            all_passed,
        };
        log::info!(
            "Judged problem {problem_id}: {}/{} cases passed",
            report.passed_count(),
            report.cases.len()
        );

        Ok(report)
    }

    async fn run_single_case(
        &self,
        case_index: usize,
        fixture: &TestCase,
        source: &str,
    ) -> Result<CaseResult> {
        let unit = compose_unit(&fixture.input, source);
        let output = self.runner.run(&unit).await?;

        let actual = normalize_output(&output.stdout);
        Ok(CaseResult {
            case_index,
            passed: actual == fixture.output,
            expected: fixture.output.clone(),
            actual: actual.to_string(),
        })
    }
}

/// Builds the unit sent to the sandbox for one fixture.
///
/// A single prelude line replaces `sys.stdin` with the fixture input, then the
/// submission follows untouched. Only its line numbers shift, by one.
pub fn compose_unit(input: &str, source: &str) -> String {
    format!(
        "import io, sys; sys.stdin = io.StringIO({})\n{source}",
        python_str_literal(input)
    )
}

/// Strips exactly one trailing newline, the one `print` adds.
///
/// Expected outputs are stored without it, so `"7\n"` matches `"7"` while
/// `"7\n\n"` does not.
pub fn normalize_output(stdout: &str) -> &str {
    stdout
        .strip_suffix("\r\n")
        .or_else(|| stdout.strip_suffix('\n'))
        .unwrap_or(stdout)
}

fn python_str_literal(text: &str) -> String {
    let mut literal = String::with_capacity(text.len() + 2);
    literal.push('"');
    for c in text.chars() {
        match c {
            '\\' => literal.push_str("\\\\"),
            '"' => literal.push_str("\\\""),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            c if c.is_control() => literal.push_str(&format!("\\U{:08x}", c as u32)),
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}
