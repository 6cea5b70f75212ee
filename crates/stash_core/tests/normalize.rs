use pretty_assertions::assert_eq;
use serde_json::json;
use stash_core::{normalize, Entry, NormalizedCollection, Provenance, Submission, SubmissionId};

fn post(id: &str, title: &str) -> Submission {
    serde_json::from_value(json!({
        "kind": "t3",
        "data": {"id": id, "title": title, "subreddit": "rust"}
    }))
    .unwrap()
}

fn comment(id: &str, body: &str, subreddit: &str) -> Submission {
    serde_json::from_value(json!({
        "kind": "t1",
        "data": {"id": id, "body": body, "subreddit": subreddit}
    }))
    .unwrap()
}

fn ids(collection: &NormalizedCollection) -> Vec<&str> {
    collection.ids().map(SubmissionId::as_str).collect()
}

#[test]
fn key_set_is_union_of_all_pages() {
    let pages = vec![
        vec![post("a", "A"), post("b", "B")],
        vec![comment("c", "C", "rust")],
        vec![post("d", "D"), comment("e", "E", "golang")],
    ];

    let mut collection = NormalizedCollection::new();
    for page in pages {
        collection.merge(normalize(page, Provenance::Live));
    }

    assert_eq!(ids(&collection), vec!["a", "b", "c", "d", "e"]);
    assert!(collection.contains(&SubmissionId::new("e")));
    assert!(!collection.contains(&SubmissionId::new("f")));
}

#[test]
fn later_duplicate_wins_within_a_page() {
    let collection = normalize(
        vec![post("a", "first"), post("b", "B"), post("a", "second")],
        Provenance::Live,
    );

    assert_eq!(collection.len(), 2);
    let entry = collection.get(&SubmissionId::new("a")).unwrap();
    assert_eq!(entry.submission.data()["title"], "second");
}

#[test]
fn later_page_overwrites_earlier_entry_on_merge() {
    let mut collection = normalize(vec![post("a", "old")], Provenance::Live);
    let added = collection.merge(normalize(vec![post("a", "edited"), post("z", "Z")], Provenance::Live));

    assert_eq!(added, 1);
    let entry = collection.get(&SubmissionId::new("a")).unwrap();
    assert_eq!(entry.submission.data()["title"], "edited");
}

#[test]
fn live_input_is_not_flagged_and_snapshot_input_always_is() {
    let live = normalize(vec![post("a", "A")], Provenance::Live);
    assert!(live.iter().all(|(_, entry)| !entry.restored_from_snapshot));

    let restored = normalize(vec![post("a", "A"), comment("b", "B", "rust")], Provenance::Snapshot);
    assert!(restored.iter().all(|(_, entry)| entry.restored_from_snapshot));
    assert_eq!(restored.restored_count(), 2);
}

#[test]
fn live_merge_replaces_restored_entry_and_clears_flag() {
    let mut collection = normalize(vec![post("a", "from file")], Provenance::Snapshot);
    collection.merge(normalize(vec![post("a", "from server")], Provenance::Live));

    let entry = collection.get(&SubmissionId::new("a")).unwrap();
    assert!(!entry.restored_from_snapshot);
    assert_eq!(entry.submission.data()["title"], "from server");
}

#[test]
fn normalize_is_deterministic() {
    let input = vec![post("b", "B"), comment("a", "A", "rust"), post("b", "B2")];
    assert_eq!(
        normalize(input.clone(), Provenance::Live),
        normalize(input, Provenance::Live)
    );
}

#[test]
fn subreddits_and_kind_counts() {
    let mut collection = normalize(
        vec![
            post("a", "A"),
            comment("b", "B", "golang"),
            comment("c", "C", "rust"),
        ],
        Provenance::Live,
    );
    collection.insert(Entry {
        submission: post("d", "D"),
        restored_from_snapshot: true,
    });

    assert_eq!(collection.subreddits(), vec!["golang".to_string(), "rust".to_string()]);
    assert_eq!(collection.count_by_kind(), (2, 2));
    assert_eq!(collection.restored_count(), 1);
}
