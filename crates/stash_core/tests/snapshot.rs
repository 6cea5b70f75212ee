use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use stash_core::snapshot::{decode, decode_bytes, encode};
use stash_core::{normalize, DecodeError, NormalizedCollection, Provenance, Submission, SubmissionId};

fn submission(kind: &str, id: &str) -> Submission {
    serde_json::from_value(json!({
        "kind": kind,
        "data": {"id": id, "permalink": format!("/r/rust/{id}"), "score": 12}
    }))
    .unwrap()
}

fn sample() -> NormalizedCollection {
    normalize(
        vec![submission("t3", "p1"), submission("t1", "c1"), submission("t3", "p2")],
        Provenance::Live,
    )
}

#[test]
fn round_trip_keeps_payloads_and_forces_restored_flag() {
    let original = sample();
    let decoded = decode(&encode(&original).unwrap()).expect("decode");

    assert_eq!(decoded.len(), original.len());
    for (id, entry) in original.iter() {
        let restored = decoded.get(id).expect("id survives round trip");
        assert_eq!(restored.submission, entry.submission);
        assert!(restored.restored_from_snapshot);
    }
}

#[test]
fn encoded_document_has_version_and_keyed_submissions() {
    let encoded: Value = serde_json::from_str(&encode(&sample()).unwrap()).unwrap();

    assert_eq!(encoded["version"], "1.0");
    let submissions = encoded["submissions"].as_object().unwrap();
    assert_eq!(submissions.len(), 3);
    assert_eq!(submissions["c1"]["kind"], "t1");
    assert_eq!(submissions["c1"]["data"]["id"], "c1");
    assert_eq!(submissions["c1"]["restoredFromSnapshot"], true);
}

#[test]
fn empty_collection_round_trips() {
    let decoded = decode(&encode(&NormalizedCollection::new()).unwrap()).unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn rejects_other_version() {
    let text = r#"{"version":"2.0","submissions":{}}"#;
    assert_eq!(
        decode(text),
        Err(DecodeError::UnsupportedVersion {
            found: Some("2.0".to_string())
        })
    );
}

#[test]
fn rejects_missing_version() {
    let text = r#"{"submissions":{}}"#;
    assert_eq!(decode(text), Err(DecodeError::UnsupportedVersion { found: None }));
}

#[test]
fn rejects_numeric_version() {
    let err = decode(r#"{"version":1.0,"submissions":{}}"#).unwrap_err();
    assert!(matches!(err, DecodeError::UnsupportedVersion { found: Some(_) }));
}

#[test]
fn rejects_unparseable_text() {
    let err = decode("this is not { json").unwrap_err();
    assert!(matches!(err, DecodeError::MalformedSnapshot(_)));
}

#[test]
fn rejects_non_object_documents() {
    assert!(matches!(decode("[1,2,3]"), Err(DecodeError::MalformedSnapshot(_))));
    assert!(matches!(
        decode(r#"{"version":"1.0"}"#),
        Err(DecodeError::MalformedSnapshot(_))
    ));
    assert!(matches!(
        decode(r#"{"version":"1.0","submissions":[]}"#),
        Err(DecodeError::MalformedSnapshot(_))
    ));
}

#[test]
fn rejects_key_that_disagrees_with_payload_id() {
    let text = r#"{"version":"1.0","submissions":{"x":{"kind":"t3","data":{"id":"y"}}}}"#;
    let err = decode(text).unwrap_err();
    assert!(err.to_string().contains("'x'"));
}

#[test]
fn accepts_legacy_flag_name_and_forces_flag_true() {
    let text = r#"{"version":"1.0","submissions":{
        "a":{"kind":"t3","data":{"id":"a"},"restoredFromFile":false},
        "b":{"kind":"t1","data":{"id":"b"}}
    }}"#;
    let decoded = decode(text).unwrap();

    assert_eq!(decoded.len(), 2);
    assert!(decoded.get(&SubmissionId::new("a")).unwrap().restored_from_snapshot);
    assert!(decoded.get(&SubmissionId::new("b")).unwrap().restored_from_snapshot);
}

#[test]
fn error_messages_distinguish_version_from_corruption() {
    let version = decode(r#"{"version":"0.9","submissions":{}}"#).unwrap_err();
    let corrupt = decode("{").unwrap_err();

    assert!(version.to_string().contains("unsupported snapshot version '0.9'"));
    assert!(corrupt.to_string().starts_with("malformed snapshot"));
}

#[test]
fn non_utf8_bytes_are_malformed() {
    let err = decode_bytes(&[0xff, 0xfe, b'{', 0x80]).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedSnapshot(_)));
}

#[test]
fn bytes_and_text_decode_alike() {
    let text = encode(&sample()).unwrap();
    assert_eq!(decode_bytes(text.as_bytes()).unwrap(), decode(&text).unwrap());
}
