// IP Info Bar - Data Provider Invocation
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Runs the external data provider and parses its answer.
//!
//! The provider is an opaque program that prints a single line of JSON
//! describing the host's network identity, or `{"error": "..."}` when it
//! cannot. The child is always reaped, whatever the outcome.

use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::models::{FetchError, NetworkFacts, ProviderConfig};

/// How long a provider may keep running after printing its line.
const REAP_GRACE: Duration = Duration::from_secs(2);

/// Boxed future returned by [`Provider::fetch`].
pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<NetworkFacts, FetchError>> + Send + 'a>>;

/// Source of network facts.
pub trait Provider: Send + Sync {
    /// Obtain a fresh snapshot of the host's network facts.
    fn fetch(&self) -> FetchFuture<'_>;
}

/// Provider backed by an external program.
#[derive(Debug, Clone)]
pub struct ScriptProvider {
    config: ProviderConfig,
}

impl ScriptProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    async fn run(&self) -> Result<NetworkFacts, FetchError> {
        let program = which::which(&self.config.program).map_err(|e| {
            warn!("Data provider '{}' was not found: {}", self.config.program, e);
            FetchError::ProviderNotFound(self.config.program.clone())
        })?;

        let mut cmd = Command::new(&program);
        if let Some(script) = &self.config.script {
            if !script.is_file() {
                warn!("Data provider script {:?} does not exist", script);
                return Err(FetchError::ProviderNotFound(script.display().to_string()));
            }
            cmd.arg(script);
        }

        debug!("Spawning data provider: {:?} {:?}", program, self.config.script);

        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                warn!("Failed to spawn data provider {:?}: {}", program, e);
                FetchError::SpawnFailed(e.to_string())
            })?;

        let line = read_first_line(&mut child, self.config.timeout()).await;

        let grace = match line {
            Err(FetchError::Timeout(_)) => Duration::ZERO,
            _ => REAP_GRACE,
        };
        reap(&mut child, grace).await;

        let line = line?;
        debug!("Data provider output: '{}'", line);
        parse_provider_output(&line)
    }
}

impl Provider for ScriptProvider {
    fn fetch(&self) -> FetchFuture<'_> {
        Box::pin(self.run())
    }
}

/// Read the first line of the child's stdout, trimmed.
///
/// The stdout handle is dropped before returning so a provider that keeps
/// writing gets EPIPE instead of blocking on a full pipe.
async fn read_first_line(child: &mut Child, timeout: Duration) -> Result<String, FetchError> {
    let Some(stdout) = child.stdout.take() else {
        return Err(FetchError::NoOutput);
    };

    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();

    match tokio::time::timeout(timeout, reader.read_until(b'\n', &mut buf)).await {
        Err(_) => {
            warn!("Data provider did not answer within {:?}", timeout);
            Err(FetchError::Timeout(timeout))
        }
        Ok(Err(e)) => {
            warn!("Failed to read data provider output: {}", e);
            Err(FetchError::NoOutput)
        }
        Ok(Ok(0)) => {
            warn!("Data provider exited without output");
            Err(FetchError::NoOutput)
        }
        Ok(Ok(_)) => {
            let line = String::from_utf8_lossy(&buf).trim().to_string();
            if line.is_empty() {
                warn!("Data provider printed an empty line");
                Err(FetchError::NoOutput)
            } else {
                Ok(line)
            }
        }
    }
}

/// Wait for the child to exit, killing it once `grace` has elapsed.
async fn reap(child: &mut Child, grace: Duration) {
    match tokio::time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => {
            debug!("Data provider exited with {}", status);
        }
        Ok(Err(e)) => {
            warn!("Failed to wait for data provider: {}", e);
        }
        Err(_) => {
            debug!("Data provider still running after {:?}, killing it", grace);
            if let Err(e) = child.kill().await {
                warn!("Failed to kill data provider: {}", e);
            }
        }
    }
}

/// Interpret one line of provider output.
pub fn parse_provider_output(line: &str) -> Result<NetworkFacts, FetchError> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        warn!("Failed to parse data provider JSON: {}", e);
        FetchError::MalformedOutput(e.to_string())
    })?;

    let Some(record) = value.as_object() else {
        warn!("Data provider output is not a JSON object");
        return Err(FetchError::MalformedOutput(
            "expected a JSON object".to_string(),
        ));
    };

    if let Some(error) = record.get("error").filter(|e| is_truthy(e)) {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        warn!("Data provider returned an error: {}", message);
        return Err(FetchError::ProviderReportedError(message));
    }

    serde_json::from_value(value).map_err(|e| {
        warn!("Data provider output has an unexpected shape: {}", e);
        FetchError::MalformedOutput(e.to_string())
    })
}

/// JSON truthiness: `null`, `false`, `0` and `""` do not count as an error.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
