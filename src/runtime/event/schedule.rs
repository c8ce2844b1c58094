//! Scheduled-rule events delivered to jobs.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::Decode;
use crate::runtime::InvocationContext;

#[derive(Debug, Deserialize)]
struct RuleEvent {
    detail: Map<String, Value>,
    #[serde(rename = "detail-type", default)]
    detail_type: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

/// A scheduled-rule firing.
#[derive(Debug)]
pub struct JobEvent {
    detail: Map<String, Value>,
    detail_type: Option<String>,
    source: Option<String>,
    context: InvocationContext,
}

impl Decode for JobEvent {
    fn decode(event: Value, context: InvocationContext) -> Result<Self, serde_json::Error> {
        let event: RuleEvent = serde_json::from_value(event)?;
        Ok(Self {
            detail: event.detail,
            detail_type: event.detail_type,
            source: event.source,
            context,
        })
    }
}

impl JobEvent {
    /// The rule's `detail` payload (empty for plain schedules).
    pub fn detail(&self) -> &Map<String, Value> {
        &self.detail
    }

    pub fn detail_type(&self) -> Option<&str> {
        self.detail_type.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn context(&self) -> &InvocationContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exposes_detail() {
        let event = JobEvent::decode(
            json!({
                "version": "0",
                "detail-type": "Scheduled Event",
                "source": "aws.events",
                "time": "2023-05-01T12:00:00Z",
                "detail": {"batch": 3}
            }),
            InvocationContext::default(),
        )
        .unwrap();

        assert_eq!(event.detail()["batch"], 3);
        assert_eq!(event.detail_type(), Some("Scheduled Event"));
        assert_eq!(event.source(), Some("aws.events"));
    }

    #[test]
    fn missing_detail_fails_decode() {
        let err = JobEvent::decode(json!({"source": "aws.events"}), InvocationContext::default())
            .unwrap_err();
        assert!(err.to_string().contains("detail"));
    }
}
