use crate::access::Action;
use crate::database::FixtureBatch;
use crate::error::{JudgeError, Result};

/// A parsed chat command, prefix already removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ProblemAdd { description: String },
    ProblemEdit { id: i64, description: String },
    ProblemDelete { id: i64 },
    ProblemActivate { id: i64 },
    ProblemDeactivate { id: i64 },
    TestCaseAdd { problem_id: i64, batch: FixtureBatch },
    TestCaseEdit { tc_id: i64, input: String, output: String },
    TestCaseDelete { tc_id: i64 },
    Post,
    Dump,
    Check { problem_id: i64, text: String },
    Eval { text: String },
}

impl Command {
    /// Parses the text following the command prefix.
    ///
    /// Descriptions and code are taken as the verbatim rest of the message.
    /// Test case tokens are split on whitespace with quoting, so `"1 2" 3` is
    /// two tokens. There are no comments or escapes: `#` and `\` are kept.
    pub fn parse(content: &str) -> Result<Self> {
        let (name, rest) = split_word(content);
        match name {
            "" => Err(JudgeError::BadArgument("missing command".to_string())),
            "problem" => parse_problem(rest),
            "testcase" => parse_test_case(rest),
            "post" => Ok(Self::Post),
            "dump" => Ok(Self::Dump),
            "check" => {
                let (id, text) = split_id(rest);
                Ok(Self::Check {
                    problem_id: parse_id(id)?,
                    text: text.to_string(),
                })
            }
            "eval" | "e" => Ok(Self::Eval {
                text: rest.to_string(),
            }),
            other => Err(JudgeError::UnknownCommand(other.to_string())),
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Self::ProblemAdd { .. }
            | Self::ProblemEdit { .. }
            | Self::ProblemDelete { .. }
            | Self::ProblemActivate { .. }
            | Self::ProblemDeactivate { .. }
            | Self::TestCaseAdd { .. }
            | Self::TestCaseEdit { .. }
            | Self::TestCaseDelete { .. } => Action::Instruct,
            Self::Check { .. } => Action::Check,
            Self::Post | Self::Dump | Self::Eval { .. } => Action::Open,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ProblemAdd { .. } => "problem add",
            Self::ProblemEdit { .. } => "problem edit",
            Self::ProblemDelete { .. } => "problem delete",
            Self::ProblemActivate { .. } => "problem activate",
            Self::ProblemDeactivate { .. } => "problem deactivate",
            Self::TestCaseAdd { .. } => "testcase add",
            Self::TestCaseEdit { .. } => "testcase edit",
            Self::TestCaseDelete { .. } => "testcase delete",
            Self::Post => "post",
            Self::Dump => "dump",
            Self::Check { .. } => "check",
            Self::Eval { .. } => "eval",
        }
    }
}

fn parse_problem(args: &str) -> Result<Command> {
    let (sub, rest) = split_word(args);
    match sub {
        "add" => Ok(Command::ProblemAdd {
            description: parse_description(rest)?,
        }),
        "edit" => {
            let (id, description) = split_word(rest);
            Ok(Command::ProblemEdit {
                id: parse_id(id)?,
                description: parse_description(description)?,
            })
        }
        "delete" => Ok(Command::ProblemDelete {
            id: parse_single_id(rest)?,
        }),
        "activate" => Ok(Command::ProblemActivate {
            id: parse_single_id(rest)?,
        }),
        "deactivate" => Ok(Command::ProblemDeactivate {
            id: parse_single_id(rest)?,
        }),
        "" => Err(JudgeError::BadArgument(
            "expected one of add, edit, delete, activate, deactivate".to_string(),
        )),
        other => Err(JudgeError::UnknownCommand(format!("problem {other}"))),
    }
}

fn parse_test_case(args: &str) -> Result<Command> {
    let (sub, rest) = split_word(args);
    match sub {
        "add" => {
            let (id, tokens) = split_word(rest);
            let problem_id = parse_id(id)?;
            let batch = FixtureBatch::from_tokens(split_tokens(tokens)?)?;
            Ok(Command::TestCaseAdd { problem_id, batch })
        }
        "edit" => {
            let (id, tokens) = split_word(rest);
            let tc_id = parse_id(id)?;
            let mut tokens = split_tokens(tokens)?;
            if tokens.len() != 2 {
                return Err(JudgeError::BadArgument(format!(
                    "expected an input and an output, got {} tokens",
                    tokens.len()
                )));
            }
            let output = tokens.pop().unwrap_or_default();
            let input = tokens.pop().unwrap_or_default();
            Ok(Command::TestCaseEdit {
                tc_id,
                input,
                output,
            })
        }
        "delete" => Ok(Command::TestCaseDelete {
            tc_id: parse_single_id(rest)?,
        }),
        "" => Err(JudgeError::BadArgument(
            "expected one of add, edit, delete".to_string(),
        )),
        other => Err(JudgeError::UnknownCommand(format!("testcase {other}"))),
    }
}

/// Splits off the first whitespace-delimited word
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], s[end..].trim_start()),
        None => (s, ""),
    }
}

/// Splits off a leading id that may run straight into a code block
fn split_id(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(|c: char| c.is_whitespace() || c == '`') {
        Some(end) => (&s[..end], s[end..].trim_start()),
        None => (s, ""),
    }
}

/// Splits fixture text into tokens.
///
/// Whitespace separates tokens unless inside `"..."` or `'...'`; quotes may
/// appear mid-token and `""` is an empty token. Every other character,
/// including `#` and `\`, is kept as written.
fn split_tokens(s: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in s.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err(JudgeError::BadArgument("unbalanced quotes".to_string()));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_id(token: &str) -> Result<i64> {
    if token.is_empty() {
        return Err(JudgeError::BadArgument("missing id".to_string()));
    }
    match token.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(JudgeError::BadArgument(format!(
            "`{token}` is not a valid id"
        ))),
    }
}

fn parse_single_id(args: &str) -> Result<i64> {
    let (id, rest) = split_word(args);
    if !rest.is_empty() {
        return Err(JudgeError::BadArgument(format!(
            "unexpected arguments: {rest}"
        )));
    }
    parse_id(id)
}

fn parse_description(text: &str) -> Result<String> {
    let description = text.trim();
    if description.is_empty() {
        return Err(JudgeError::BadArgument(
            "description must not be empty".to_string(),
        ));
    }
    Ok(description.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_problem_commands() {
        assert_eq!(
            Command::parse("problem add Sum two integers read from one line").unwrap(),
            Command::ProblemAdd {
                description: "Sum two integers read from one line".to_string()
            }
        );
        assert_eq!(
            Command::parse("problem edit 3   new text\nsecond line").unwrap(),
            Command::ProblemEdit {
                id: 3,
                description: "new text\nsecond line".to_string()
            }
        );
        assert_eq!(
            Command::parse("problem deactivate 2").unwrap(),
            Command::ProblemDeactivate { id: 2 }
        );
    }

    #[test]
    fn test_parse_test_case_batch() {
        let command = Command::parse(r#"testcase add 1 "3 4" 7 "10 -2" 8"#).unwrap();
        assert_eq!(
            command,
            Command::TestCaseAdd {
                problem_id: 1,
                batch: FixtureBatch::from_tokens(vec!["3 4", "7", "10 -2", "8"]).unwrap(),
            }
        );
        assert_eq!(command.action(), Action::Instruct);
    }

    #[test]
    fn test_parse_test_case_batch_with_odd_tokens() {
        assert!(matches!(
            Command::parse(r#"testcase add 1 "3 4" 7 "10 -2""#),
            Err(JudgeError::MalformedFixtureBatch(3))
        ));
    }

    #[test]
    fn test_parse_test_case_edit_needs_two_tokens() {
        assert_eq!(
            Command::parse("testcase edit 5 '1 1' 2").unwrap(),
            Command::TestCaseEdit {
                tc_id: 5,
                input: "1 1".to_string(),
                output: "2".to_string()
            }
        );
        assert!(matches!(
            Command::parse("testcase edit 5 only"),
            Err(JudgeError::BadArgument(_))
        ));
    }

    #[test]
    fn test_parse_check_keeps_code_verbatim() {
        let command = Command::parse("check 4\n```py\nprint(input())\n```").unwrap();
        assert_eq!(
            command,
            Command::Check {
                problem_id: 4,
                text: "```py\nprint(input())\n```".to_string()
            }
        );
        assert_eq!(command.action(), Action::Check);
    }

    #[test]
    fn test_parse_check_with_fence_right_after_id() {
        assert_eq!(
            Command::parse("check 1```py\nprint(1)\n```").unwrap(),
            Command::Check {
                problem_id: 1,
                text: "```py\nprint(1)\n```".to_string()
            }
        );
        assert_eq!(
            Command::parse("check 2`print(1)`").unwrap(),
            Command::Check {
                problem_id: 2,
                text: "`print(1)`".to_string()
            }
        );
    }

    #[test]
    fn test_fixture_tokens_keep_hash_and_backslash() {
        assert_eq!(
            Command::parse("testcase add 1 a b c d #e f").unwrap(),
            Command::TestCaseAdd {
                problem_id: 1,
                batch: FixtureBatch::from_tokens(vec!["a", "b", "c", "d", "#e", "f"]).unwrap(),
            }
        );
        assert_eq!(
            Command::parse("testcase add 1 3 ###").unwrap(),
            Command::TestCaseAdd {
                problem_id: 1,
                batch: FixtureBatch::from_tokens(vec!["3", "###"]).unwrap(),
            }
        );
        assert_eq!(
            Command::parse(r"testcase add 1 C:\path x").unwrap(),
            Command::TestCaseAdd {
                problem_id: 1,
                batch: FixtureBatch::from_tokens(vec![r"C:\path", "x"]).unwrap(),
            }
        );
        assert_eq!(
            Command::parse(r##"testcase edit 4 "#.#\n.#." '' "##).unwrap(),
            Command::TestCaseEdit {
                tc_id: 4,
                input: r"#.#\n.#.".to_string(),
                output: String::new(),
            }
        );
    }

    #[test]
    fn test_split_tokens_quoting() {
        assert_eq!(
            split_tokens(r#"  one "two words" th'r'ee "" "#).unwrap(),
            vec!["one", "two words", "three", ""]
        );
        assert!(split_tokens("'open").is_err());
    }

    #[test]
    fn test_parse_eval_alias() {
        assert_eq!(
            Command::parse("e `print(1)`").unwrap(),
            Command::Eval {
                text: "`print(1)`".to_string()
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Command::parse("frobnicate"),
            Err(JudgeError::UnknownCommand(name)) if name == "frobnicate"
        ));
        assert!(matches!(
            Command::parse("problem delete abc"),
            Err(JudgeError::BadArgument(_))
        ));
        assert!(matches!(
            Command::parse("problem delete 0"),
            Err(JudgeError::BadArgument(_))
        ));
        assert!(matches!(
            Command::parse("problem add   "),
            Err(JudgeError::BadArgument(_))
        ));
        assert!(matches!(
            Command::parse("testcase add 1 \"unterminated"),
            Err(JudgeError::BadArgument(_))
        ));
    }
}
