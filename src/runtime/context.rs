use serde::{Deserialize, Serialize};

/// Per-invocation metadata supplied by the host alongside the raw event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationContext {
    pub request_id: String,
    pub function_name: String,
    /// Deadline as milliseconds since the Unix epoch, when the host enforces one.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
    #[serde(default)]
    pub invoked_function_arn: Option<String>,
}

impl InvocationContext {
    pub fn new(request_id: impl Into<String>, function_name: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            function_name: function_name.into(),
            ..Self::default()
        }
    }
}
