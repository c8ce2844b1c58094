//! Object-store notification batches delivered to object-store workers.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{Decode, Records};
use crate::model::ObjectEventKind;
use crate::runtime::InvocationContext;

/// Layout of `eventTime` in notification records.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Parses a notification timestamp such as `2023-05-01T12:00:00.000Z` as UTC.
pub fn parse_event_time(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, EVENT_TIME_FORMAT).map(|naive| Utc.from_utc_datetime(&naive))
}

fn deserialize_event_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let value = String::deserialize(deserializer)?;
    parse_event_time(&value).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BucketRef {
    pub name: String,
    pub arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectRef {
    pub key: String,
    /// Absent on removal events.
    #[serde(default)]
    pub size: Option<u64>,
    /// Absent on removal events.
    #[serde(rename = "eTag", default)]
    pub etag: Option<String>,
    pub sequencer: String,
    #[serde(rename = "versionId", default)]
    pub version_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Entity {
    bucket: BucketRef,
    object: ObjectRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNotification {
    event_name: String,
    #[serde(deserialize_with = "deserialize_event_time")]
    event_time: DateTime<Utc>,
    s3: Entity,
}

/// One notification record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectNotification {
    pub event_name: String,
    pub event_time: DateTime<Utc>,
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

impl From<RawNotification> for ObjectNotification {
    fn from(raw: RawNotification) -> Self {
        Self {
            event_name: raw.event_name,
            event_time: raw.event_time,
            bucket: raw.s3.bucket,
            object: raw.s3.object,
        }
    }
}

impl ObjectNotification {
    /// Whether this record falls under `kind` (wildcards included).
    pub fn is(&self, kind: ObjectEventKind) -> bool {
        kind.matches(&self.event_name)
    }
}

/// The notification records of one invocation, in delivery order.
#[derive(Debug)]
pub struct ObjectStoreBatch {
    records: Vec<ObjectNotification>,
    context: InvocationContext,
}

impl Decode for ObjectStoreBatch {
    fn decode(event: Value, context: InvocationContext) -> Result<Self, serde_json::Error> {
        let batch: Records<RawNotification> = serde_json::from_value(event)?;
        Ok(Self {
            records: batch.records.into_iter().map(ObjectNotification::from).collect(),
            context,
        })
    }
}

impl ObjectStoreBatch {
    pub fn records(&self) -> &[ObjectNotification] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObjectNotification> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn context(&self) -> &InvocationContext {
        &self.context
    }
}

impl<'a> IntoIterator for &'a ObjectStoreBatch {
    type Item = &'a ObjectNotification;
    type IntoIter = std::slice::Iter<'a, ObjectNotification>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use serde_json::json;

    fn record(event_name: &str, event_time: &str) -> Value {
        json!({
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "eventName": event_name,
            "eventTime": event_time,
            "s3": {
                "s3SchemaVersion": "1.0",
                "bucket": {"name": "uploads", "arn": "arn:aws:s3:::uploads"},
                "object": {
                    "key": "photos/cat.png",
                    "size": 1024,
                    "eTag": "d41d8cd98f00b204e9800998ecf8427e",
                    "sequencer": "0055AED6DCD90281E5"
                }
            }
        })
    }

    #[test]
    fn event_time_parses_as_utc() {
        let parsed = parse_event_time("2023-05-01T12:00:00.000Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn event_time_keeps_fractional_seconds() {
        let parsed = parse_event_time("2023-05-01T12:00:00.250Z").unwrap();
        assert_eq!(parsed.nanosecond(), 250_000_000);
    }

    #[test]
    fn event_time_rejects_other_layouts() {
        assert!(parse_event_time("01/05/2023 12:00").is_err());
    }

    #[test]
    fn decodes_records() {
        let batch = ObjectStoreBatch::decode(
            json!({"Records": [record("ObjectCreated:Put", "2023-05-01T12:00:00.000Z")]}),
            InvocationContext::default(),
        )
        .unwrap();

        let notification = &batch.records()[0];
        assert_eq!(notification.bucket.name, "uploads");
        assert_eq!(notification.bucket.arn, "arn:aws:s3:::uploads");
        assert_eq!(notification.object.key, "photos/cat.png");
        assert_eq!(notification.object.size, Some(1024));
        assert_eq!(notification.object.etag.as_deref(), Some("d41d8cd98f00b204e9800998ecf8427e"));
        assert_eq!(notification.object.sequencer, "0055AED6DCD90281E5");
        assert!(notification.is(ObjectEventKind::ObjectCreated));
        assert!(!notification.is(ObjectEventKind::ObjectRemoved));
    }

    #[test]
    fn malformed_event_time_fails_decode() {
        let result = ObjectStoreBatch::decode(
            json!({"Records": [record("ObjectCreated:Put", "yesterday")]}),
            InvocationContext::default(),
        );
        assert!(result.is_err());
    }
}
