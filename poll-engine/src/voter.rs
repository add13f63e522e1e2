use std::convert::TryFrom;
use std::fmt;

use thiserror::Error;

/// An opaque identifier for a channel member (e.g. a chat-platform user
/// id). The engine never resolves it to a display name; that is the
/// directory collaborator's job. Equality and ordering are by identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoterId(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("voter identifier cannot be empty")]
pub struct EmptyVoterId;

impl VoterId {
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyVoterId> {
        let id = id.into();
        if id.is_empty() {
            return Err(EmptyVoterId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for VoterId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VoterId {
    type Error = EmptyVoterId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
