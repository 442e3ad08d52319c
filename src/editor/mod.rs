//! Editor session state: language, source, output and the in-flight flag.

use log::info;

use crate::{
    execution::{Outcome, Signal, Submission},
    language::Language,
};

pub const RUNNING_PLACEHOLDER: &str = "Running...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    language: Language,
    source: String,
    output: String,
    is_running: bool,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl EditorState {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            source: language.template().to_string(),
            output: String::new(),
            is_running: false,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Switch language, replacing the source with its template and clearing output.
    ///
    /// A request already in flight is not affected and still settles into this state.
    pub fn select_language(&mut self, language: Language) {
        self.language = language;
        self.source = language.template().to_string();
        self.output.clear();
    }

    pub fn edit_source(&mut self, text: impl Into<String>) {
        self.source = text.into();
    }

    /// Mutable access for in-place editing from the UI.
    pub fn source_mut(&mut self) -> &mut String {
        &mut self.source
    }

    /// Enter the running phase and capture what should be sent.
    pub fn begin_execution(&mut self) -> Submission {
        self.is_running = true;
        self.output = RUNNING_PLACEHOLDER.to_string();
        Submission {
            language: self.language,
            source: self.source.clone(),
        }
    }

    /// Apply a settled outcome and leave the running phase.
    pub fn settle(&mut self, outcome: Outcome) -> Signal {
        info!("execution settled: {:?}", outcome.signal);
        self.output = outcome.output;
        self.is_running = false;
        outcome.signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{self, Failure};
    use crate::piston::PistonClient;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn starts_on_default_template() {
        let state = EditorState::default();
        assert_eq!(state.language(), Language::JavaScript);
        assert_eq!(state.source(), Language::JavaScript.template());
        assert_eq!(state.output(), "");
        assert!(!state.is_running());
    }

    #[test]
    fn select_language_resets_source_and_output() {
        let mut state = EditorState::default();
        for lang in Language::ALL {
            state.edit_source("garbage");
            state.begin_execution();
            state.settle(execution::settle(Ok(json!({ "run": { "output": "x" } }))));
            assert_eq!(state.output(), "x");

            state.select_language(lang);
            assert_eq!(state.language(), lang);
            assert_eq!(state.source(), lang.template());
            assert_eq!(state.output(), "");
        }
    }

    #[test]
    fn edit_source_is_verbatim() {
        let mut state = EditorState::default();
        state.edit_source("  \n\tweird ☃ text\n");
        assert_eq!(state.source(), "  \n\tweird ☃ text\n");
        state.edit_source("");
        assert_eq!(state.source(), "");
    }

    #[test]
    fn begin_execution_captures_submission() {
        let mut state = EditorState::new(Language::C);
        state.edit_source("int main(){return 1;}");
        let sub = state.begin_execution();
        assert!(state.is_running());
        assert_eq!(state.output(), "Running...");
        assert_eq!(sub, Submission { language: Language::C, source: "int main(){return 1;}".into() });
    }

    #[test]
    fn language_switch_while_running_keeps_flag() {
        let mut state = EditorState::default();
        state.begin_execution();
        state.select_language(Language::Python);
        assert!(state.is_running());
        assert_eq!(state.output(), "");

        let signal = state.settle(execution::settle(Ok(json!({ "run": { "output": "late\n" } }))));
        assert_eq!(signal, Signal::Success);
        assert_eq!(state.output(), "late\n");
        assert!(!state.is_running());
    }

    async fn settle_against(body: ResponseTemplate) -> (EditorState, Signal) {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(body).mount(&server).await;
        let client = PistonClient::new(server.uri(), None).unwrap();

        let mut state = EditorState::new(Language::Python);
        assert!(!state.is_running());
        let sub = state.begin_execution();
        assert!(state.is_running());
        let outcome = execution::run(&client, &sub).await;
        assert!(state.is_running());
        let signal = state.settle(outcome);
        assert!(!state.is_running());
        (state, signal)
    }

    #[tokio::test]
    async fn running_flag_spans_each_settlement_kind() {
        let (state, signal) = settle_against(
            ResponseTemplate::new(200).set_body_json(json!({ "run": { "output": "Hello, World!\n", "stderr": "" } })),
        )
        .await;
        assert_eq!(state.output(), "Hello, World!\n");
        assert_eq!(signal, Signal::Success);

        let (state, signal) = settle_against(
            ResponseTemplate::new(200).set_body_json(json!({ "run": { "output": "", "stderr": "NameError: x" } })),
        )
        .await;
        assert_eq!(state.output(), "NameError: x");
        assert_eq!(signal, Signal::CompletedWithErrors);

        let (state, _) = settle_against(
            ResponseTemplate::new(200).set_body_json(json!({ "run": { "output": "", "stderr": "" } })),
        )
        .await;
        assert_eq!(state.output(), "No output");

        let (state, signal) = settle_against(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "python-* runtime is unknown" })),
        )
        .await;
        assert_eq!(state.output(), "Error: Unable to execute code");
        assert_eq!(signal, Signal::Failure(Failure::Remote));

        let (state, signal) = settle_against(ResponseTemplate::new(200).set_body_string("not json")).await;
        assert!(state.output().starts_with("Error: "));
        assert_eq!(signal, Signal::Failure(Failure::Transport));
    }

    #[test]
    fn transport_failure_settles_state() {
        let mut state = EditorState::default();
        state.begin_execution();
        let signal = state.settle(execution::settle(Err(anyhow::anyhow!("network down"))));
        assert_eq!(state.output(), "Error: network down");
        assert_eq!(signal, Signal::Failure(Failure::Transport));
        assert!(!state.is_running());
    }
}
