//! Knowledge-base lookups over a child process's stdio

use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;

use super::{SymbolInfo, TypeLookup};
use crate::config::{LookupConfig, Validator};
use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id: u64,
    method: &'static str,
    type_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    found: bool,
    #[serde(default)]
    symbol: Option<SymbolInfo>,
    #[serde(default)]
    error: Option<String>,
}

/// A running knowledge-base process answering newline-delimited JSON
/// requests on stdin with one JSON line per response on stdout.
///
/// The handle owns the process. Call [`close`](Self::close) to shut it down;
/// dropping the handle kills it.
#[derive(Debug)]
pub struct ProcessTypeLookup {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    request_timeout: Duration,
}

impl ProcessTypeLookup {
    /// Launch the process described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid configuration and
    /// [`Error::Lookup`] if the process cannot be started.
    pub fn spawn(config: &LookupConfig) -> Result<Self> {
        config.validate()?;
        let mut child = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::lookup(format!("failed to start '{}': {e}", config.program)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::lookup("lookup process has no stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::lookup("lookup process has no stdout"))?;

        tracing::debug!(
            target: "entscan::lookup",
            program = %config.program,
            pid = child.id(),
            "lookup process started"
        );
        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout).lines(),
            next_id: 1,
            request_timeout: config.request_timeout,
        })
    }

    async fn request(&mut self, type_name: &str) -> Result<Option<SymbolInfo>> {
        let id = self.next_id;
        self.next_id += 1;

        let mut line = serde_json::to_string(&LookupRequest {
            id,
            method: "lookup",
            type_name,
        })
        .map_err(|e| Error::lookup(format!("failed to encode request: {e}")))?;
        line.push('\n');

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| Error::lookup("lookup process is closed"))?;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| Error::lookup(format!("failed to send request: {e}")))?;
        stdin
            .flush()
            .await
            .map_err(|e| Error::lookup(format!("failed to send request: {e}")))?;

        loop {
            let Some(reply) = self
                .stdout
                .next_line()
                .await
                .map_err(|e| Error::lookup(format!("failed to read response: {e}")))?
            else {
                return Err(Error::lookup("lookup process exited before responding"));
            };
            let reply = reply.trim();
            if reply.is_empty() {
                continue;
            }
            let response: LookupResponse = match serde_json::from_str(reply) {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!(
                        target: "entscan::lookup",
                        error = %e,
                        "skipping non-response output line"
                    );
                    continue;
                }
            };
            if response.id.is_some_and(|reply_id| reply_id != id) {
                continue;
            }
            if let Some(message) = response.error {
                return Err(Error::lookup(message));
            }
            return Ok(if response.found { response.symbol } else { None });
        }
    }

    /// Close stdin and wait for the process to exit, killing it if it does
    /// not exit within the request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lookup`] if the process cannot be waited on or killed.
    pub async fn close(mut self) -> Result<()> {
        drop(self.stdin.take());
        match timeout(self.request_timeout, self.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!(target: "entscan::lookup", %status, "lookup process exited");
                Ok(())
            }
            Ok(Err(e)) => Err(Error::lookup(format!("failed to wait for lookup process: {e}"))),
            Err(_) => {
                tracing::warn!(
                    target: "entscan::lookup",
                    timeout = ?self.request_timeout,
                    "lookup process did not exit; killing it"
                );
                self.child
                    .kill()
                    .await
                    .map_err(|e| Error::lookup(format!("failed to kill lookup process: {e}")))
            }
        }
    }
}

impl TypeLookup for ProcessTypeLookup {
    async fn lookup(&mut self, type_name: &str) -> Result<Option<SymbolInfo>> {
        let limit = self.request_timeout;
        match timeout(limit, self.request(type_name)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    target: "entscan::lookup",
                    type_name,
                    timeout = ?limit,
                    "type lookup timed out"
                );
                Err(Error::LookupTimeout(limit))
            }
        }
    }
}
