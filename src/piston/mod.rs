//! Reqwest-based client for the Piston `execute` endpoint.

use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{config::Config, language::Language};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub language: String,
    /// `*` selects the newest runtime the service has installed.
    pub version: String,
    pub files: Vec<SourceFile>,
}

impl ExecuteRequest {
    pub fn new(language: Language, source: &str) -> Self {
        Self {
            language: language.key().to_string(),
            version: "*".to_string(),
            files: vec![SourceFile {
                name: language.file_name(),
                content: source.to_string(),
            }],
        }
    }
}

/// The `run` stage of a Piston response. Fields the service omits read as empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunResult {
    pub stdout: String,
    pub stderr: String,
    /// stdout and stderr interleaved in arrival order.
    pub output: String,
    pub code: Option<i64>,
    pub signal: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PistonClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PistonClient {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.endpoint(), cfg.request_timeout())
    }

    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder.build().context("failed to build HTTP client")?;
        Ok(Self { http, endpoint: endpoint.into() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST one source file and return the decoded JSON body.
    ///
    /// The status code is deliberately not checked: Piston reports rejected
    /// requests as a JSON body without a `run` stage, which callers handle.
    pub async fn execute(&self, language: Language, source: &str) -> Result<Value> {
        let body = ExecuteRequest::new(language, source);
        debug!(
            "POST {} language={} file={} bytes={}",
            self.endpoint,
            body.language,
            body.files[0].name,
            source.len()
        );

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .http
            .post(&self.endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("execute request failed: {}", e);
                e
            })?;

        let status = resp.status();
        let value = resp.json::<Value>().await.map_err(|e| {
            warn!("execute response ({}) was not JSON: {}", status, e);
            e
        })?;
        debug!("execute response status={}", status);
        Ok(value)
    }
}

/// Extract the `run` stage, if the response carries one as an object.
pub fn run_stage(response: &Value) -> Option<RunResult> {
    let run = response.get("run").filter(|v| v.is_object())?;
    serde_json::from_value(run.clone()).ok().or_else(|| {
        // Wrong-typed fields: keep whatever strings are present.
        let text = |k: &str| run.get(k).and_then(Value::as_str).unwrap_or_default().to_string();
        Some(RunResult {
            stdout: text("stdout"),
            stderr: text("stderr"),
            output: text("output"),
            code: run.get("code").and_then(Value::as_i64),
            signal: run.get("signal").and_then(Value::as_str).map(str::to_string),
        })
    })
}
