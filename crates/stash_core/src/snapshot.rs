//! Versioned text form of a [`NormalizedCollection`].
//!
//! ```text
//! {"version":"1.0","submissions":{"<id>":{"kind":"t3","data":{..},"restoredFromSnapshot":true}}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::collection::{Entry, NormalizedCollection};
use crate::submission::{Submission, SubmissionKind};

/// The only snapshot version this build reads or writes.
pub const SNAPSHOT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported snapshot version {}", describe_version(.found))]
    UnsupportedVersion { found: Option<String> },
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

fn describe_version(found: &Option<String>) -> String {
    match found {
        Some(version) => format!("'{version}' (expected '{SNAPSHOT_VERSION}')"),
        None => format!("(missing, expected '{SNAPSHOT_VERSION}')"),
    }
}

#[derive(Debug, thiserror::Error)]
#[error("cannot serialize snapshot: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

#[derive(Deserialize)]
struct SnapshotSubmission {
    kind: SubmissionKind,
    data: Map<String, Value>,
    #[serde(rename = "restoredFromSnapshot", alias = "restoredFromFile", default)]
    restored_from_snapshot: bool,
}

#[derive(Serialize)]
struct SnapshotRecord<'a> {
    kind: SubmissionKind,
    data: &'a Map<String, Value>,
    #[serde(rename = "restoredFromSnapshot")]
    restored_from_snapshot: bool,
}

#[derive(Serialize)]
struct SnapshotDocument<'a> {
    version: &'a str,
    submissions: BTreeMap<&'a str, SnapshotRecord<'a>>,
}

/// Serializes a collection as a version-tagged snapshot document.
///
/// The in-memory provenance flag is not carried over: every written entry is
/// marked as restored, which is what it will be once read back.
pub fn encode(collection: &NormalizedCollection) -> Result<String, EncodeError> {
    let submissions = collection
        .iter()
        .map(|(id, entry)| {
            let record = SnapshotRecord {
                kind: entry.submission.kind(),
                data: entry.submission.data(),
                restored_from_snapshot: true,
            };
            (id.as_str(), record)
        })
        .collect();
    let document = SnapshotDocument {
        version: SNAPSHOT_VERSION,
        submissions,
    };
    Ok(serde_json::to_string(&document)?)
}

/// Parses a snapshot document. Every returned entry is flagged as restored.
pub fn decode(text: &str) -> Result<NormalizedCollection, DecodeError> {
    decode_bytes(text.as_bytes())
}

/// Like [`decode`], for raw file contents; invalid UTF-8 is malformed data.
pub fn decode_bytes(bytes: &[u8]) -> Result<NormalizedCollection, DecodeError> {
    let root: Value = serde_json::from_slice(bytes)
        .map_err(|err| DecodeError::MalformedSnapshot(err.to_string()))?;
    let Value::Object(mut root) = root else {
        return Err(DecodeError::MalformedSnapshot(
            "top-level value is not an object".into(),
        ));
    };

    match root.get("version") {
        Some(Value::String(version)) if version == SNAPSHOT_VERSION => {}
        Some(Value::String(version)) => {
            return Err(DecodeError::UnsupportedVersion {
                found: Some(version.clone()),
            })
        }
        Some(other) => {
            return Err(DecodeError::UnsupportedVersion {
                found: Some(other.to_string()),
            })
        }
        None => return Err(DecodeError::UnsupportedVersion { found: None }),
    }

    let submissions = match root.remove("submissions") {
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(DecodeError::MalformedSnapshot(
                "'submissions' is not an object".into(),
            ))
        }
        None => {
            return Err(DecodeError::MalformedSnapshot(
                "missing 'submissions'".into(),
            ))
        }
    };

    let mut collection = NormalizedCollection::new();
    for (key, value) in submissions {
        let record: SnapshotSubmission = serde_json::from_value(value)
            .map_err(|err| DecodeError::MalformedSnapshot(format!("entry '{key}': {err}")))?;
        let submission = Submission::from_payload(record.kind, record.data)
            .map_err(|err| DecodeError::MalformedSnapshot(format!("entry '{key}': {err}")))?;
        if submission.id().as_str() != key {
            return Err(DecodeError::MalformedSnapshot(format!(
                "entry '{key}' carries id '{}'",
                submission.id()
            )));
        }
        collection.insert(Entry {
            submission,
            restored_from_snapshot: true,
        });
    }
    Ok(collection)
}
