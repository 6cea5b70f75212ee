use std::collections::{BTreeMap, BTreeSet};

use crate::submission::{Submission, SubmissionId, SubmissionKind};

/// Where a batch of submissions came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Fetched from the platform during a sync.
    Live,
    /// Read back from an exported snapshot.
    Snapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub submission: Submission,
    pub restored_from_snapshot: bool,
}

/// Submissions keyed by id. Keys are unique; iteration is in id order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedCollection {
    entries: BTreeMap<SubmissionId, Entry>,
}

/// Converts a sequence of submissions into a keyed collection.
///
/// Later duplicates replace earlier ones. Entries are flagged as restored
/// exactly when `provenance` is [`Provenance::Snapshot`].
pub fn normalize<I>(submissions: I, provenance: Provenance) -> NormalizedCollection
where
    I: IntoIterator<Item = Submission>,
{
    let restored_from_snapshot = provenance == Provenance::Snapshot;
    let mut collection = NormalizedCollection::new();
    for submission in submissions {
        collection.insert(Entry {
            submission,
            restored_from_snapshot,
        });
    }
    collection
}

impl NormalizedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &SubmissionId) -> Option<&Entry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &SubmissionId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &SubmissionId> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SubmissionId, &Entry)> {
        self.entries.iter()
    }

    pub fn submissions(&self) -> impl Iterator<Item = &Submission> {
        self.entries.values().map(|entry| &entry.submission)
    }

    /// Inserts an entry, replacing any entry with the same id.
    pub fn insert(&mut self, entry: Entry) -> Option<Entry> {
        self.entries.insert(entry.submission.id().clone(), entry)
    }

    /// Merges `other` into `self` with last-write-wins on id collisions.
    ///
    /// Returns the number of ids that were not present before.
    pub fn merge(&mut self, other: NormalizedCollection) -> usize {
        let mut added = 0;
        for (id, entry) in other.entries {
            if self.entries.insert(id, entry).is_none() {
                added += 1;
            }
        }
        added
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sorted, de-duplicated community names across all entries.
    pub fn subreddits(&self) -> Vec<String> {
        self.submissions()
            .filter_map(Submission::subreddit)
            .map(ToOwned::to_owned)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Returns `(posts, comments)`.
    pub fn count_by_kind(&self) -> (usize, usize) {
        self.submissions()
            .fold((0, 0), |(posts, comments), submission| match submission.kind() {
                SubmissionKind::Post => (posts + 1, comments),
                SubmissionKind::Comment => (posts, comments + 1),
            })
    }

    pub fn restored_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.restored_from_snapshot)
            .count()
    }
}

impl IntoIterator for NormalizedCollection {
    type Item = (SubmissionId, Entry);
    type IntoIter = std::collections::btree_map::IntoIter<SubmissionId, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
