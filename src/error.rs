use thiserror::Error;

/// Everything that can go wrong while handling a command.
///
/// `Display` is the text shown back in the chat, so messages name the
/// offending identifier where there is one.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("Problem {0} doesn't exist, try again.")]
    UnknownProblem(i64),

    #[error("Test case {0} doesn't exist, try again.")]
    UnknownTestCase(i64),

    #[error("Test cases must come in input/output pairs, got {0} tokens.")]
    MalformedFixtureBatch(usize),

    #[error("No code block found in your message.")]
    NoCodeSupplied,

    #[error("Problem {0} has no test cases defined yet.")]
    NoFixtures(i64),

    #[error("The code runner is unavailable: {0}")]
    SandboxUnavailable(String),

    #[error("You are not allowed to use this command here.")]
    PermissionDenied,

    #[error("Command `{0}` not found, check your spelling.")]
    UnknownCommand(String),

    #[error("Bad argument: {0}")]
    BadArgument(String),

    #[error("Some error happened, {0}")]
    Database(#[from] sqlx::Error),
}

impl JudgeError {
    pub(crate) fn sandbox(err: impl std::fmt::Display) -> Self {
        Self::SandboxUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, JudgeError>;
