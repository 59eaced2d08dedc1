use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::{JudgeError, Result};

use super::{ExecutionOutput, SandboxRunner};

/// Runner backed by a remote code execution service
///
/// Each call is a single `POST` carrying the source as `{"input": ...}`.
/// There is no retry; the only timeout is the optional one given at build
/// time.
pub struct HttpRunner {
    client: Client,
    url: Url,
}

#[derive(Serialize)]
struct EvalRequest<'a> {
    input: &'a str,
}

impl HttpRunner {
    pub fn build(url: &str, timeout: Option<Duration>) -> Result<Self> {
        let url = Url::parse(url).map_err(JudgeError::sandbox)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(JudgeError::sandbox)?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl SandboxRunner for HttpRunner {
    async fn run(&self, source: &str) -> Result<ExecutionOutput> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&EvalRequest { input: source })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                log::error!("Sandbox request to {} failed: {e}", self.url);
                JudgeError::sandbox(e)
            })?;

        let output = response.json::<ExecutionOutput>().await.map_err(|e| {
            log::error!("Sandbox returned an unexpected response: {e}");
            JudgeError::sandbox(e)
        })?;

        log::debug!(
            "Sandbox returned {} bytes of stdout with exit code {}",
            output.stdout.len(),
            output.exit_code
        );
        Ok(output)
    }
}
