mod http_runner;
mod runner;

pub use http_runner::HttpRunner;
pub use runner::SandboxRunner;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::SandboxConfig;
use crate::error::Result;

/// What the sandbox reports back for one executed unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutput {
    pub stdout: String,
    #[serde(rename = "returncode")]
    pub exit_code: i32,
}

/// Creates the sandbox runner described by the configuration
pub fn create_sandbox_runner(config: &SandboxConfig) -> Result<Arc<dyn SandboxRunner>> {
    let timeout = config.timeout_secs.map(Duration::from_secs);
    let runner = HttpRunner::build(&config.url, timeout)?;
    log::info!("Using sandbox at {}", config.url);
    Ok(Arc::new(runner))
}
