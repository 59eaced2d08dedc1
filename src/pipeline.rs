use std::sync::Arc;

use crate::access::{Access, AccessPolicy, Caller};
use crate::commands::Command;
use crate::database::FixtureStore;
use crate::error::{JudgeError, Result};
use crate::extract::extract_code;
use crate::judge::{Judge, JudgeReport};
use crate::report::{self, EvalOutput};
use crate::sandbox::SandboxRunner;

/// Reply to one command
#[derive(Debug)]
pub struct Reply {
    pub text: String,
    /// Present for `check`
    pub report: Option<JudgeReport>,
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Self { text, report: None }
    }
}

/// Entry point for every chat command
pub struct Pipeline {
    store: FixtureStore,
    judge: Judge,
    runner: Arc<dyn SandboxRunner>,
    policy: AccessPolicy,
    eval_line_cap: usize,
}

impl Pipeline {
    pub fn new(
        store: FixtureStore,
        runner: Arc<dyn SandboxRunner>,
        policy: AccessPolicy,
        eval_line_cap: usize,
    ) -> Self {
        let judge = Judge::new(store.clone(), runner.clone());
        Self {
            store,
            judge,
            runner,
            policy,
            eval_line_cap,
        }
    }

    /// Authorizes `command` for `caller`, then runs it
    pub async fn handle(&self, caller: &Caller, command: Command) -> Result<Reply> {
        if self.policy.authorize(caller, command.action()) == Access::Deny {
            log::info!(
                "Denied `{}` to user {} in channel {}",
                command.name(),
                caller.user_id,
                caller.channel_id
            );
            return Err(JudgeError::PermissionDenied);
        }
        log::info!("User {} used `{}`", caller.user_id, command.name());

        let reply: Reply = match command {
            Command::ProblemAdd { description } => {
                let id = self.store.add_problem(&description).await?;
                format!("Successfully added problem {id}").into()
            }
            Command::ProblemEdit { id, description } => {
                self.store.edit_problem(id, &description).await?;
                format!("Successfully updated problem {id}").into()
            }
            Command::ProblemDelete { id } => {
                self.store.delete_problem(id).await?;
                format!("Successfully deleted problem {id}").into()
            }
            Command::ProblemActivate { id } => {
                self.store.activate_problem(id).await?;
                format!("Problem {id} is now active").into()
            }
            Command::ProblemDeactivate { id } => {
                self.store.deactivate_problem(id).await?;
                format!("Problem {id} is now inactive").into()
            }
            Command::TestCaseAdd { problem_id, batch } => {
                let ids = self.store.add_test_cases(problem_id, &batch).await?;
                let ids: Vec<String> = ids.iter().map(i64::to_string).collect();
                format!(
                    "Successfully added {} test cases to problem {problem_id} (ids {})",
                    ids.len(),
                    ids.join(", ")
                )
                .into()
            }
            Command::TestCaseEdit {
                tc_id,
                input,
                output,
            } => {
                self.store.edit_test_case(tc_id, &input, &output).await?;
                format!("Successfully updated test case {tc_id}").into()
            }
            Command::TestCaseDelete { tc_id } => {
                self.store.delete_test_case(tc_id).await?;
                format!("Successfully deleted test case {tc_id}").into()
            }
            Command::Post => {
                let problems = self.store.list_active_problems().await?;
                report::render_problems(&problems).into()
            }
            Command::Dump => {
                let dump = self.store.dump().await?;
                report::render_dump(&dump).into()
            }
            Command::Check { problem_id, text } => {
                let judged = self.check(problem_id, &text).await?;
                Reply {
                    text: report::render_report(&judged),
                    report: Some(judged),
                }
            }
            Command::Eval { text } => {
                let output = self.eval(&text).await?;
                report::render_eval(&output).into()
            }
        };

        Ok(reply)
    }

    /// Judges the code block in `chat_text` against an active problem.
    ///
    /// # Errors
    ///
    /// - `NoCodeSupplied` if there is no code block.
    /// - `UnknownProblem` if the problem is absent or inactive.
    /// - `NoFixtures` if the problem has no test cases.
    /// - `SandboxUnavailable` if any execution fails.
    pub async fn check(&self, problem_id: i64, chat_text: &str) -> Result<JudgeReport> {
        let code = extract_code(chat_text);
        if code.is_empty() {
            return Err(JudgeError::NoCodeSupplied);
        }

        match self.store.find_problem(problem_id).await? {
            Some(problem) if problem.active => {}
            _ => return Err(JudgeError::UnknownProblem(problem_id)),
        }

        let report = self.judge.judge(problem_id, &code).await?;
        if report.is_empty() {
            return Err(JudgeError::NoFixtures(problem_id));
        }
        Ok(report)
    }

    /// Runs the code block in `chat_text` as is, with no input and no
    /// comparison
    pub async fn eval(&self, chat_text: &str) -> Result<EvalOutput> {
        let code = extract_code(chat_text);
        if code.is_empty() {
            return Err(JudgeError::NoCodeSupplied);
        }

        let output = self.runner.run(&code).await?;
        Ok(EvalOutput::truncate(
            &output.stdout,
            output.exit_code,
            self.eval_line_cap,
        ))
    }
}
