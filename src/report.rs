//! Plain-text replies posted back into the chat.

use serde::Serialize;

use crate::database::{Dump, Problem};
use crate::judge::JudgeReport;

/// Output of `eval` after the display cap was applied
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EvalOutput {
    pub stdout: String,
    pub exit_code: i32,
    /// Lines dropped from the end of stdout
    pub truncated_lines: usize,
}

impl EvalOutput {
    pub fn truncate(stdout: &str, exit_code: i32, line_cap: usize) -> Self {
        let total = stdout.lines().count();
        if total <= line_cap {
            return Self {
                stdout: stdout.to_string(),
                exit_code,
                truncated_lines: 0,
            };
        }

        let kept: Vec<&str> = stdout.lines().take(line_cap).collect();
        Self {
            stdout: kept.join("\n") + "\n",
            exit_code,
            truncated_lines: total - line_cap,
        }
    }
}

pub fn render_report(report: &JudgeReport) -> String {
    let mut out: String = report
        .cases
        .iter()
        .map(|case| {
            if case.passed {
                format!("Test Case {}: pass\n", case.case_index)
            } else {
                format!(
                    "Test Case {}: fail\nExpected: {}\nActual: {}\n",
                    case.case_index, case.expected, case.actual
                )
            }
        })
        .collect();

    out.push_str(&format!(
        "Passed {}/{} test cases.",
        report.passed_count(),
        report.cases.len()
    ));
    if report.all_passed {
        out.push_str(" All test cases passed!");
    }
    out
}

pub fn render_eval(output: &EvalOutput) -> String {
    let mut out = format!("Your eval output:\n```\n{}", output.stdout);
    if !output.stdout.is_empty() && !output.stdout.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("```");
    if output.truncated_lines > 0 {
        out.push_str(&format!(
            "\n({} more lines truncated)",
            output.truncated_lines
        ));
    }
    out.push_str(&format!("\nExit code: {}", output.exit_code));
    out
}

pub fn render_problems(problems: &[Problem]) -> String {
    if problems.is_empty() {
        return "No active problems.".to_string();
    }

    problems
        .iter()
        .map(|p| format!("Problem {}: {}", p.id, p.description))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_dump(dump: &Dump) -> String {
    let problems = dump.problems.iter().map(|p| {
        let state = if p.active { "active" } else { "inactive" };
        format!("\n  [{}] ({state}) {:?}", p.id, p.description)
    });
    let test_cases = dump.test_cases.iter().map(|tc| {
        format!(
            "\n  [{}] problem {}: {:?} -> {:?}",
            tc.id, tc.problem_id, tc.input, tc.output
        )
    });

    std::iter::once(format!("Problems ({}):", dump.problems.len()))
        .chain(problems)
        .chain(std::iter::once(format!(
            "\nTest cases ({}):",
            dump.test_cases.len()
        )))
        .chain(test_cases)
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::database::TestCase;
    use crate::judge::CaseResult;

    #[test]
    fn test_render_report_shows_failures() {
        let report = JudgeReport {
            problem_id: 1,
            cases: vec![
                CaseResult {
                    case_index: 1,
                    passed: true,
                    expected: "7".to_string(),
                    actual: "7".to_string(),
                },
                CaseResult {
                    case_index: 2,
                    passed: false,
                    expected: "8".to_string(),
                    actual: "9".to_string(),
                },
            ],
            all_passed: false,
        };

        assert_eq!(
            render_report(&report),
            "Test Case 1: pass\nTest Case 2: fail\nExpected: 8\nActual: 9\nPassed 1/2 test cases."
        );
    }

    #[test]
    fn test_render_report_all_passed() {
        let report = JudgeReport {
            problem_id: 1,
            cases: vec![CaseResult {
                case_index: 1,
                passed: true,
                expected: "7".to_string(),
                actual: "7".to_string(),
            }],
            all_passed: true,
        };
        assert!(render_report(&report).ends_with("Passed 1/1 test cases. All test cases passed!"));
    }

    #[test]
    fn test_eval_truncation() {
        let stdout: String = (1..=50).map(|i| format!("{i}\n")).collect();
        let output = EvalOutput::truncate(&stdout, 0, 10);
        assert_eq!(output.stdout.lines().count(), 10);
        assert_eq!(output.stdout.lines().last(), Some("10"));
        assert_eq!(output.truncated_lines, 40);

        let rendered = render_eval(&output);
        assert!(rendered.contains("(40 more lines truncated)"));
        assert!(!rendered.contains("\n11\n"));
    }

    #[test]
    fn test_eval_short_output_untouched() {
        let output = EvalOutput::truncate("hello", 1, 10);
        assert_eq!(output.truncated_lines, 0);
        assert_eq!(
            render_eval(&output),
            "Your eval output:\n```\nhello\n```\nExit code: 1"
        );
    }

    #[test]
    fn test_render_problems() {
        let problems = vec![
            Problem {
                id: 1,
                description: "sum two ints".to_string(),
                active: true,
            },
            Problem {
                id: 3,
                description: "reverse a string".to_string(),
                active: true,
            },
        ];
        assert_eq!(
            render_problems(&problems),
            "Problem 1: sum two ints\nProblem 3: reverse a string"
        );
        assert_eq!(render_problems(&[]), "No active problems.");
    }

    #[test]
    fn test_render_dump() {
        let dump = Dump {
            problems: vec![
                Problem {
                    id: 1,
                    description: "sum".to_string(),
                    active: true,
                },
                Problem {
                    id: 2,
                    description: "draft".to_string(),
                    active: false,
                },
            ],
            test_cases: vec![TestCase {
                id: 5,
                input: "3 4".to_string(),
                output: "7".to_string(),
                problem_id: 1,
            }],
        };
        assert_eq!(
            render_dump(&dump),
            "Problems (2):\n  [1] (active) \"sum\"\n  [2] (inactive) \"draft\"\nTest cases (1):\n  [5] problem 1: \"3 4\" -> \"7\""
        );
        assert_eq!(
            render_dump(&Dump {
                problems: vec![],
                test_cases: vec![],
            }),
            "Problems (0):\nTest cases (0):"
        );
    }
}
