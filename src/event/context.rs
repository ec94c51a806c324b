//! Raw trigger context as exposed by the CI platform.

use std::env;
use std::path::Path;

use serde_json::Value;

use crate::error::EventError;

/// Event name, repository coordinates, ref and payload of the triggering run.
#[derive(Debug, Clone)]
pub struct TriggerContext {
    pub event_name: String,
    /// `owner/name`, if the platform provided it.
    pub repository: Option<String>,
    /// Fully qualified ref (`refs/heads/main`), if the platform provided it.
    pub git_ref: Option<String>,
    pub payload: Value,
}

impl TriggerContext {
    /// Build the context from `GITHUB_EVENT_NAME`, `GITHUB_REPOSITORY`,
    /// `GITHUB_REF` and the JSON file named by `GITHUB_EVENT_PATH`.
    pub fn from_env() -> Result<Self, EventError> {
        let event_name =
            env::var("GITHUB_EVENT_NAME").map_err(|_| EventError::MissingContext("GITHUB_EVENT_NAME"))?;
        let event_path =
            env::var("GITHUB_EVENT_PATH").map_err(|_| EventError::MissingContext("GITHUB_EVENT_PATH"))?;

        let payload = read_payload(Path::new(&event_path))?;

        Ok(Self {
            event_name,
            repository: non_empty_var("GITHUB_REPOSITORY"),
            git_ref: non_empty_var("GITHUB_REF"),
            payload,
        })
    }
}

/// Read and parse an event payload file.
pub fn read_payload(path: &Path) -> Result<Value, EventError> {
    let content = std::fs::read_to_string(path).map_err(|source| EventError::ReadFailed {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(EventError::ParseFailed)
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}
