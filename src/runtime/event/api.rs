//! REST proxy-integration requests.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::Decode;
use crate::runtime::InvocationContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProxyEvent {
    http_method: String,
    path: String,
    #[serde(default)]
    headers: Option<HashMap<String, String>>,
    #[serde(default)]
    multi_value_query_string_parameters: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    is_base64_encoded: Option<bool>,
}

/// An HTTP request delivered to an API handler.
#[derive(Debug)]
pub struct Request {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    query_params: HashMap<String, Vec<String>>,
    path_params: HashMap<String, String>,
    body: Option<String>,
    is_base64_encoded: bool,
    json: OnceLock<Value>,
    context: InvocationContext,
}

impl Decode for Request {
    fn decode(event: Value, context: InvocationContext) -> Result<Self, serde_json::Error> {
        let event: ProxyEvent = serde_json::from_value(event)?;
        Ok(Self {
            method: event.http_method,
            path: event.path,
            headers: event.headers.unwrap_or_default(),
            query_params: event.multi_value_query_string_parameters.unwrap_or_default(),
            path_params: event.path_parameters.unwrap_or_default(),
            body: event.body,
            is_base64_encoded: event.is_base64_encoded.unwrap_or(false),
            json: OnceLock::new(),
            context,
        })
    }
}

impl Request {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// All query parameters, each with every value it was given.
    pub fn query_params(&self) -> &HashMap<String, Vec<String>> {
        &self.query_params
    }

    /// First value of a query parameter.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Path parameters; empty when the platform supplies none.
    pub fn path_params(&self) -> &HashMap<String, String> {
        &self.path_params
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn is_base64_encoded(&self) -> bool {
        self.is_base64_encoded
    }

    /// The body parsed as JSON, cached after the first successful parse.
    ///
    /// An absent or empty body yields `null`. A body that is not valid JSON
    /// returns the parse error and is retried on the next call.
    pub fn json(&self) -> Result<&Value, serde_json::Error> {
        if let Some(value) = self.json.get() {
            return Ok(value);
        }
        let value = match self.body.as_deref() {
            None | Some("") => Value::Null,
            Some(body) => serde_json::from_str(body)?,
        };
        Ok(self.json.get_or_init(|| value))
    }

    /// The body deserialized into `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(self.json()?)
    }

    pub fn context(&self) -> &InvocationContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(event: Value) -> Request {
        Request::decode(event, InvocationContext::new("req-1", "hello_api")).unwrap()
    }

    fn sample() -> Value {
        json!({
            "httpMethod": "POST",
            "path": "/users/42",
            "headers": {"Content-Type": "application/json"},
            "multiValueQueryStringParameters": {"tag": ["a", "b"]},
            "pathParameters": {"id": "42"},
            "body": "{\"name\": \"Alice\"}",
            "isBase64Encoded": false
        })
    }

    #[test]
    fn exposes_request_fields() {
        let request = decode(sample());
        assert_eq!(request.method(), "POST");
        assert_eq!(request.path(), "/users/42");
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.query("tag"), Some("a"));
        assert_eq!(request.query_params()["tag"], ["a", "b"]);
        assert_eq!(request.path_param("id"), Some("42"));
        assert_eq!(request.context().request_id, "req-1");
    }

    #[test]
    fn json_body_is_parsed_and_cached() {
        let request = decode(sample());
        assert_eq!(request.json().unwrap()["name"], "Alice");
        assert!(std::ptr::eq(request.json().unwrap(), request.json().unwrap()));

        #[derive(Deserialize)]
        struct NewUser {
            name: String,
        }
        let user: NewUser = request.json_as().unwrap();
        assert_eq!(user.name, "Alice");
    }

    #[test]
    fn empty_body_yields_null() {
        let mut event = sample();
        event["body"] = json!("");
        assert_eq!(decode(event).json().unwrap(), &Value::Null);

        let mut event = sample();
        event["body"] = Value::Null;
        assert_eq!(decode(event).json().unwrap(), &Value::Null);
    }

    #[test]
    fn null_optional_sections_become_empty() {
        let request = decode(json!({
            "httpMethod": "GET",
            "path": "/",
            "headers": null,
            "multiValueQueryStringParameters": null,
            "pathParameters": null,
            "body": null
        }));
        assert!(request.path_params().is_empty());
        assert!(request.query_params().is_empty());
        assert!(request.headers().is_empty());
        assert_eq!(request.body(), None);
    }

    #[test]
    fn missing_structural_field_fails_decode() {
        let err = Request::decode(json!({"path": "/"}), InvocationContext::default()).unwrap_err();
        assert!(err.to_string().contains("httpMethod"));
    }
}
