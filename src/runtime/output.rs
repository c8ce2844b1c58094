//! Handler outputs and how they are encoded for the host.
//!
//! Every user function returns a value implementing [`Encode`]; the dispatcher
//! always calls it, so there is no unencoded pass-through path. The provided
//! implementations cover the trigger kinds:
//!
//! | Output | Encodes to |
//! |---|---|
//! | [`Response`] | proxy-integration response (`statusCode`, `headers`, `isBase64Encoded`, `body`) |
//! | [`BatchItemFailures`] | `{"batchItemFailures": [{"itemIdentifier": id}, ...]}` |
//! | `()` | `null` |
//! | [`serde_json::Value`] | itself |

use std::collections::{BTreeMap, HashSet};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

/// Converts a handler's return value into the raw response handed to the host.
pub trait Encode {
    fn encode(self: Box<Self>) -> Result<Value, serde_json::Error>;
}

impl Encode for () {
    fn encode(self: Box<Self>) -> Result<Value, serde_json::Error> {
        Ok(Value::Null)
    }
}

impl Encode for Value {
    fn encode(self: Box<Self>) -> Result<Value, serde_json::Error> {
        Ok(*self)
    }
}

/// HTTP response for API handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    status_code: u16,
    headers: BTreeMap<String, String>,
    is_base64_encoded: bool,
    body: String,
}

impl Response {
    /// A response with the given status and an empty body.
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: BTreeMap::new(),
            is_base64_encoded: false,
            body: String::new(),
        }
    }

    /// `200 OK` with an empty body.
    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Serializes `body` as the JSON response body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = serde_json::to_string(body)?;
        Ok(self.header("content-type", "application/json"))
    }

    /// Uses `body` verbatim.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

impl Encode for Response {
    fn encode(self: Box<Self>) -> Result<Value, serde_json::Error> {
        serde_json::to_value(*self)
    }
}

/// Failed message ids of a queue batch.
///
/// Ids are kept once each, in the order they were first reported. Messages not
/// reported are considered processed. The platform only honours this report
/// when the event source binding enables batch-item-failure reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchItemFailures {
    ids: Vec<String>,
    seen: HashSet<String>,
}

impl BatchItemFailures {
    /// An empty report: the whole batch succeeded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a message as failed. Returns `false` if it was already marked.
    pub fn fail(&mut self, message_id: impl Into<String>) -> bool {
        let message_id = message_id.into();
        if !self.seen.insert(message_id.clone()) {
            return false;
        }
        self.ids.push(message_id);
        true
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.seen.contains(message_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for BatchItemFailures {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut failures = Self::new();
        for id in iter {
            failures.fail(id);
        }
        failures
    }
}

impl<S: Into<String>> Extend<S> for BatchItemFailures {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for id in iter {
            self.fail(id);
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchItemFailure<'a> {
    item_identifier: &'a str,
}

impl Serialize for BatchItemFailures {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let items: Vec<_> = self
            .ids()
            .map(|item_identifier| BatchItemFailure { item_identifier })
            .collect();
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("batchItemFailures", &items)?;
        map.end()
    }
}

impl Encode for BatchItemFailures {
    fn encode(self: Box<Self>) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&*self)
    }
}
