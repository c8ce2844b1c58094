//! Object-store notification kinds an object-store worker can subscribe to.

use serde::{Serialize, Serializer};

/// Notification event types, rendered in the platform's `s3:Family:Action`
/// notation. Variants ending in a family name (e.g. [`ObjectCreated`]) are
/// wildcards over every action of that family.
///
/// [`ObjectCreated`]: ObjectEventKind::ObjectCreated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectEventKind {
    ObjectCreated,
    ObjectCreatedPut,
    ObjectCreatedPost,
    ObjectCreatedCopy,
    ObjectCreatedCompleteMultipartUpload,
    ObjectRemoved,
    ObjectRemovedDelete,
    ObjectRemovedDeleteMarkerCreated,
    ObjectRestorePost,
    ObjectRestoreCompleted,
    ObjectRestoreDelete,
    ReducedRedundancyLostObject,
    ReplicationOperationFailedReplication,
    ReplicationOperationMissedThreshold,
    ReplicationOperationReplicatedAfterThreshold,
    ReplicationOperationNotTracked,
    LifecycleExpiration,
    LifecycleExpirationDelete,
    LifecycleExpirationDeleteMarkerCreated,
    LifecycleTransition,
    IntelligentTiering,
    ObjectTagging,
    ObjectTaggingPut,
    ObjectTaggingDelete,
    ObjectAclPut,
}

impl ObjectEventKind {
    pub fn as_str(self) -> &'static str {
        use ObjectEventKind::*;
        match self {
            ObjectCreated => "s3:ObjectCreated:*",
            ObjectCreatedPut => "s3:ObjectCreated:Put",
            ObjectCreatedPost => "s3:ObjectCreated:Post",
            ObjectCreatedCopy => "s3:ObjectCreated:Copy",
            ObjectCreatedCompleteMultipartUpload => "s3:ObjectCreated:CompleteMultipartUpload",
            ObjectRemoved => "s3:ObjectRemoved:*",
            ObjectRemovedDelete => "s3:ObjectRemoved:Delete",
            ObjectRemovedDeleteMarkerCreated => "s3:ObjectRemoved:DeleteMarkerCreated",
            ObjectRestorePost => "s3:ObjectRestore:Post",
            ObjectRestoreCompleted => "s3:ObjectRestore:Completed",
            ObjectRestoreDelete => "s3:ObjectRestore:Delete",
            ReducedRedundancyLostObject => "s3:ReducedRedundancyLostObject",
            ReplicationOperationFailedReplication => "s3:Replication:OperationFailedReplication",
            ReplicationOperationMissedThreshold => "s3:Replication:OperationMissedThreshold",
            ReplicationOperationReplicatedAfterThreshold => {
                "s3:Replication:OperationReplicatedAfterThreshold"
            }
            ReplicationOperationNotTracked => "s3:Replication:OperationNotTracked",
            LifecycleExpiration => "s3:LifecycleExpiration:*",
            LifecycleExpirationDelete => "s3:LifecycleExpiration:Delete",
            LifecycleExpirationDeleteMarkerCreated => "s3:LifecycleExpiration:DeleteMarkerCreated",
            LifecycleTransition => "s3:LifecycleTransition",
            IntelligentTiering => "s3:IntelligentTiering",
            ObjectTagging => "s3:ObjectTagging:*",
            ObjectTaggingPut => "s3:ObjectTagging:Put",
            ObjectTaggingDelete => "s3:ObjectTagging:Delete",
            ObjectAclPut => "s3:ObjectAcl:Put",
        }
    }

    /// Whether a delivered notification's `eventName` (e.g. `ObjectCreated:Put`)
    /// falls under this kind.
    pub fn matches(self, event_name: &str) -> bool {
        let pattern = self.as_str().trim_start_matches("s3:");
        let event_name = event_name.trim_start_matches("s3:");
        match pattern.strip_suffix('*') {
            Some(family) => event_name.starts_with(family),
            None => event_name == pattern,
        }
    }
}

impl Serialize for ObjectEventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_kinds_match_their_family() {
        assert!(ObjectEventKind::ObjectCreated.matches("ObjectCreated:Put"));
        assert!(ObjectEventKind::ObjectCreated.matches("ObjectCreated:CompleteMultipartUpload"));
        assert!(!ObjectEventKind::ObjectCreated.matches("ObjectRemoved:Delete"));
    }

    #[test]
    fn exact_kinds_match_only_themselves() {
        assert!(ObjectEventKind::ObjectRemovedDelete.matches("ObjectRemoved:Delete"));
        assert!(!ObjectEventKind::ObjectRemovedDelete.matches("ObjectRemoved:DeleteMarkerCreated"));
        assert!(ObjectEventKind::LifecycleTransition.matches("s3:LifecycleTransition"));
    }

    #[test]
    fn serializes_in_platform_notation() {
        let json = serde_json::to_string(&[ObjectEventKind::ObjectCreated]).unwrap();
        assert_eq!(json, r#"["s3:ObjectCreated:*"]"#);
    }
}
