use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Platform-assigned submission id. Opaque; only compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubmissionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionKind {
    #[serde(rename = "t3", alias = "post")]
    Post,
    #[serde(rename = "t1", alias = "comment")]
    Comment,
}

/// One saved post or comment.
///
/// The payload is kept as the platform sent it; only `data.id` is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireSubmission", into = "WireSubmission")]
pub struct Submission {
    id: SubmissionId,
    kind: SubmissionKind,
    data: Map<String, Value>,
}

impl Submission {
    /// Builds a submission from its payload, reading the id from `data.id`.
    pub fn from_payload(kind: SubmissionKind, data: Map<String, Value>) -> Result<Self, InvalidSubmission> {
        let id = match data.get("id") {
            Some(Value::String(id)) if !id.is_empty() => SubmissionId::new(id.as_str()),
            Some(Value::String(_)) => return Err(InvalidSubmission::EmptyId),
            Some(_) => return Err(InvalidSubmission::NonStringId),
            None => return Err(InvalidSubmission::MissingId),
        };
        Ok(Self { id, kind, data })
    }

    pub fn id(&self) -> &SubmissionId {
        &self.id
    }

    pub fn kind(&self) -> SubmissionKind {
        self.kind
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Community the submission was saved from, if the payload names one.
    pub fn subreddit(&self) -> Option<&str> {
        self.data.get("subreddit").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSubmission {
    #[error("submission payload has no id")]
    MissingId,
    #[error("submission id is empty")]
    EmptyId,
    #[error("submission id is not a string")]
    NonStringId,
}

#[derive(Serialize, Deserialize)]
struct WireSubmission {
    kind: SubmissionKind,
    data: Map<String, Value>,
}

impl TryFrom<WireSubmission> for Submission {
    type Error = InvalidSubmission;

    fn try_from(wire: WireSubmission) -> Result<Self, Self::Error> {
        Submission::from_payload(wire.kind, wire.data)
    }
}

impl From<Submission> for WireSubmission {
    fn from(submission: Submission) -> Self {
        Self {
            kind: submission.kind,
            data: submission.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_platform_child() {
        let child = json!({"kind": "t1", "data": {"id": "c9", "body": "hi", "subreddit": "rust"}});
        let submission: Submission = serde_json::from_value(child).unwrap();
        assert_eq!(submission.id().as_str(), "c9");
        assert_eq!(submission.kind(), SubmissionKind::Comment);
        assert_eq!(submission.subreddit(), Some("rust"));
    }

    #[test]
    fn rejects_child_without_id() {
        let child = json!({"kind": "t3", "data": {"title": "no id"}});
        assert!(serde_json::from_value::<Submission>(child).is_err());
    }

    #[test]
    fn rejects_unknown_kind() {
        let child = json!({"kind": "t5", "data": {"id": "x"}});
        assert!(serde_json::from_value::<Submission>(child).is_err());
    }

    #[test]
    fn serializes_back_to_wire_shape() {
        let child = json!({"kind": "t3", "data": {"id": "p1", "title": "T"}});
        let submission: Submission = serde_json::from_value(child.clone()).unwrap();
        assert_eq!(serde_json::to_value(&submission).unwrap(), child);
    }
}
