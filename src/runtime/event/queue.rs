//! Queue batches delivered to queue workers.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;
use serde_json::Value;

use super::{Decode, Records};
use crate::runtime::InvocationContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage {
    message_id: String,
    body: String,
    #[serde(default)]
    receipt_handle: Option<String>,
    #[serde(default)]
    attributes: HashMap<String, Value>,
    #[serde(default)]
    message_attributes: HashMap<String, Value>,
}

/// One message of a queue batch.
#[derive(Debug)]
pub struct QueueMessage {
    message_id: String,
    raw_body: String,
    receipt_handle: Option<String>,
    attributes: HashMap<String, Value>,
    message_attributes: HashMap<String, Value>,
    body: OnceLock<Value>,
}

impl From<RawMessage> for QueueMessage {
    fn from(raw: RawMessage) -> Self {
        Self {
            message_id: raw.message_id,
            raw_body: raw.body,
            receipt_handle: raw.receipt_handle,
            attributes: raw.attributes,
            message_attributes: raw.message_attributes,
            body: OnceLock::new(),
        }
    }
}

impl QueueMessage {
    /// Identifier to report in [`BatchItemFailures`](crate::runtime::BatchItemFailures).
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// The body as JSON when it parses, otherwise the raw text as a JSON string.
    /// Never fails.
    pub fn body(&self) -> &Value {
        self.body.get_or_init(|| {
            serde_json::from_str(&self.raw_body)
                .unwrap_or_else(|_| Value::String(self.raw_body.clone()))
        })
    }

    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    pub fn receipt_handle(&self) -> Option<&str> {
        self.receipt_handle.as_deref()
    }

    /// System attributes (`ApproximateReceiveCount`, `SentTimestamp`, ...).
    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    /// Attributes set by the sender.
    pub fn message_attributes(&self) -> &HashMap<String, Value> {
        &self.message_attributes
    }
}

/// The messages of one queue invocation, in delivery order.
#[derive(Debug)]
pub struct QueueBatch {
    messages: Vec<QueueMessage>,
    context: InvocationContext,
}

impl Decode for QueueBatch {
    fn decode(event: Value, context: InvocationContext) -> Result<Self, serde_json::Error> {
        let batch: Records<RawMessage> = serde_json::from_value(event)?;
        Ok(Self {
            messages: batch.records.into_iter().map(QueueMessage::from).collect(),
            context,
        })
    }
}

impl QueueBatch {
    pub fn messages(&self) -> &[QueueMessage] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QueueMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn context(&self) -> &InvocationContext {
        &self.context
    }
}

impl<'a> IntoIterator for &'a QueueBatch {
    type Item = &'a QueueMessage;
    type IntoIter = std::slice::Iter<'a, QueueMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
