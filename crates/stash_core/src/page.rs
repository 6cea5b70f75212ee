use std::fmt;

use crate::submission::Submission;

/// Opaque pagination token. `None` where a cursor is expected means no more pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The caller's own account, as reported by the identity endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
}

/// One request against the saved listing. Retrying means re-issuing an equal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub username: String,
    pub after: Option<Cursor>,
}

impl PageRequest {
    pub fn first(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            after: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub submissions: Vec<Submission>,
    pub after: Option<Cursor>,
    /// Items the server says it returned; zero marks an exhausted listing.
    pub count: usize,
}
