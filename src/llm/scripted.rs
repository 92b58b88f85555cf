//! Scripted model for tests.

use super::{LanguageModel, StructuredRequest};
use crate::error::{PodclipError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Replays canned responses per schema name and records every request.
#[derive(Default)]
pub struct ScriptedModel {
    responses: Mutex<HashMap<&'static str, VecDeque<Result<Value>>>>,
    requests: Mutex<Vec<StructuredRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for requests named `name`.
    pub fn respond(self, name: &'static str, value: Value) -> Self {
        self.push(name, Ok(value));
        self
    }

    /// Queue a failure for requests named `name`.
    pub fn fail(self, name: &'static str, message: &str) -> Self {
        self.push(name, Err(PodclipError::Model(message.to_string())));
        self
    }

    fn push(&self, name: &'static str, response: Result<Value>) {
        self.responses
            .lock()
            .unwrap()
            .entry(name)
            .or_default()
            .push_back(response);
    }

    pub fn requests(&self) -> Vec<StructuredRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_named(&self, name: &str) -> Vec<StructuredRequest> {
        self.requests().into_iter().filter(|r| r.name == name).collect()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete_json(&self, request: &StructuredRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .get_mut(request.name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(PodclipError::Model(format!("No scripted response for '{}'", request.name)))
            })
    }
}
