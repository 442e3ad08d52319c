//! Turning an execute response (or its failure) into output text and a notification.

use anyhow::{anyhow, Result};
use log::debug;
use serde_json::Value;

use crate::{language::Language, piston::{run_stage, PistonClient}};

pub const UNABLE_TO_EXECUTE: &str = "Error: Unable to execute code";
pub const NO_OUTPUT: &str = "No output";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The service answered but without a `run` stage.
    Remote,
    /// The request never produced a usable JSON response.
    Transport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Success,
    /// The program ran but wrote to stderr.
    CompletedWithErrors,
    Failure(Failure),
}

impl Signal {
    pub fn message(self) -> &'static str {
        match self {
            Signal::Success => "Code executed successfully!",
            Signal::CompletedWithErrors => "Execution completed with errors",
            Signal::Failure(Failure::Remote) => "Execution failed",
            Signal::Failure(Failure::Transport) => "Failed to execute code",
        }
    }

    pub fn is_success(self) -> bool {
        self == Signal::Success
    }

    /// Process exit status for one-shot runs.
    pub fn exit_code(self) -> i32 {
        match self {
            Signal::Success => 0,
            Signal::CompletedWithErrors => 1,
            Signal::Failure(_) => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub signal: Signal,
}

/// Source captured at the moment Execute was triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub language: Language,
    pub source: String,
}

/// Send the submission and settle whatever comes back. Never fails.
pub async fn run(client: &PistonClient, submission: &Submission) -> Outcome {
    settle(client.execute(submission.language, &submission.source).await)
}

pub fn settle(response: Result<Value>) -> Outcome {
    // A `null` body cannot even be inspected for `run`, so it fails like a bad response.
    let response = response.and_then(|value| match value {
        Value::Null => Err(anyhow!("response body was null")),
        value => Ok(value),
    });
    match response {
        Ok(value) => from_response(&value),
        Err(e) => {
            let msg = e.to_string();
            let msg = if msg.trim().is_empty() { "Unknown error".to_string() } else { msg };
            Outcome {
                output: format!("Error: {}", msg),
                signal: Signal::Failure(Failure::Transport),
            }
        }
    }
}

fn from_response(value: &Value) -> Outcome {
    let Some(run) = run_stage(value) else {
        return Outcome {
            output: UNABLE_TO_EXECUTE.to_string(),
            signal: Signal::Failure(Failure::Remote),
        };
    };
    debug!(
        "run stage: code={:?} signal={:?} stdout={}B stderr={}B",
        run.code,
        run.signal,
        run.stdout.len(),
        run.stderr.len()
    );

    let output = [&run.output, &run.stderr]
        .into_iter()
        .find(|s| !s.is_empty())
        .cloned()
        .unwrap_or_else(|| NO_OUTPUT.to_string());

    let signal = if run.stderr.is_empty() {
        Signal::Success
    } else {
        Signal::CompletedWithErrors
    };

    Outcome { output, signal }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stdout_wins() {
        let out = settle(Ok(json!({ "run": { "output": "Hello, World!\n", "stderr": "" } })));
        assert_eq!(out.output, "Hello, World!\n");
        assert_eq!(out.signal, Signal::Success);
    }

    #[test]
    fn stderr_only() {
        let out = settle(Ok(json!({ "run": { "output": "", "stderr": "NameError: x" } })));
        assert_eq!(out.output, "NameError: x");
        assert_eq!(out.signal, Signal::CompletedWithErrors);
    }

    #[test]
    fn output_and_stderr_is_still_an_error_signal() {
        let out = settle(Ok(json!({ "run": { "output": "partial\nTraceback", "stderr": "Traceback" } })));
        assert_eq!(out.output, "partial\nTraceback");
        assert_eq!(out.signal, Signal::CompletedWithErrors);
    }

    #[test]
    fn nothing_printed() {
        let out = settle(Ok(json!({ "run": { "output": "", "stderr": "" } })));
        assert_eq!(out.output, "No output");
        assert_eq!(out.signal, Signal::Success);
    }

    #[test]
    fn missing_or_malformed_run() {
        for body in [json!({}), json!({ "message": "runtime is unknown" }), json!({ "run": null }), json!({ "run": 5 }), json!([])] {
            let out = settle(Ok(body));
            assert_eq!(out.output, "Error: Unable to execute code");
            assert_eq!(out.signal, Signal::Failure(Failure::Remote));
        }
    }

    #[test]
    fn transport_failure() {
        let out = settle(Err(anyhow!("network down")));
        assert_eq!(out.output, "Error: network down");
        assert_eq!(out.signal, Signal::Failure(Failure::Transport));
        assert_eq!(out.signal.message(), "Failed to execute code");
    }

    #[test]
    fn null_body_is_a_transport_failure() {
        let out = settle(Ok(Value::Null));
        assert_eq!(out.output, "Error: response body was null");
        assert_eq!(out.signal, Signal::Failure(Failure::Transport));
        assert_eq!(out.signal.message(), "Failed to execute code");
    }

    #[test]
    fn transport_failure_without_message() {
        let out = settle(Err(anyhow!("")));
        assert_eq!(out.output, "Error: Unknown error");
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Signal::Success.exit_code(), 0);
        assert_eq!(Signal::CompletedWithErrors.exit_code(), 1);
        assert_eq!(Signal::Failure(Failure::Remote).exit_code(), 2);
    }

    #[tokio::test]
    async fn unreachable_service_settles_as_transport_failure() {
        // Bind then drop to get a port nobody listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = PistonClient::new(format!("http://127.0.0.1:{}/execute", port), None).unwrap();
        let submission = Submission { language: Language::Python, source: "print(1)".into() };

        let out = run(&client, &submission).await;
        assert!(out.output.starts_with("Error: "), "Got: {}", out.output);
        assert_eq!(out.signal, Signal::Failure(Failure::Transport));
    }
}
