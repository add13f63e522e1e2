//! The persistence contract: a poll expressed as a mapping of field name
//! to value, suitable for the embedding application's storage collaborator.
//!
//! Snapshot types are a separate representation from the domain types so
//! that restoring can re-check the engine's invariants: a snapshot whose
//! ballot names a voter outside the eligible set is a corruption signal
//! and is rejected, never silently repaired.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ballot::{Ballot, VoteChoice};
use crate::electorate::Electorate;
use crate::event::{Event, EventKind, History};
use crate::poll::{Poll, PollStatus, PollType, POLL_VERSION};
use crate::voter::VoterId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub actor: Option<String>,
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    pub detail: String,
}

/// Field-name→value view of a poll. Enum-valued fields are stored in
/// their snake_case string forms; the ballot is stringified on both
/// sides; history order is chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSnapshot {
    pub poll_type: String,
    pub created_by: String,
    pub status: String,
    pub public_text: String,
    pub private_text: String,
    pub required_approver_count: u32,
    pub eligible_voters: Vec<String>,
    pub required_voters: Vec<String>,
    pub ballot: BTreeMap<String, String>,
    pub history: Vec<EventSnapshot>,
    pub version: u32,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed poll snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot ballot contains voter {voter} absent from the eligible set")]
    BallotVoterNotEligible { voter: VoterId },

    #[error("snapshot required voter {voter} is absent from the eligible set")]
    RequiredVoterNotEligible { voter: VoterId },

    #[error("unknown poll type {0:?}")]
    UnknownPollType(String),

    #[error("unknown poll status {0:?}")]
    UnknownStatus(String),

    #[error("unknown vote choice {0:?}")]
    UnknownChoice(String),

    #[error("unknown event kind {0:?}")]
    UnknownKind(String),

    #[error("snapshot contains an empty voter identifier")]
    EmptyVoterId,

    #[error("unsupported snapshot version {found}")]
    UnsupportedVersion { found: u32 },
}

impl Poll {
    /// The serialization view of this poll.
    pub fn snapshot(&self) -> PollSnapshot {
        PollSnapshot {
            poll_type: self.poll_type.to_string(),
            created_by: self.created_by.to_string(),
            status: self.status.to_string(),
            public_text: self.public_text.clone(),
            private_text: self.private_text.clone(),
            required_approver_count: self.required_approver_count,
            eligible_voters: self
                .electorate
                .eligible()
                .iter()
                .map(VoterId::to_string)
                .collect(),
            required_voters: self
                .electorate
                .required()
                .iter()
                .map(VoterId::to_string)
                .collect(),
            ballot: self
                .ballot
                .iter()
                .map(|(voter, choice)| (voter.to_string(), choice.to_string()))
                .collect(),
            history: self
                .history
                .iter()
                .map(|event| EventSnapshot {
                    actor: event.actor().map(VoterId::to_string),
                    kind: event.kind().to_string(),
                    timestamp: event.timestamp(),
                    detail: event.detail().to_string(),
                })
                .collect(),
            version: self.version,
        }
    }

    /// Reconstruct a poll from its snapshot, re-checking invariants.
    pub fn from_snapshot(snapshot: &PollSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.version != POLL_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
            });
        }

        let poll_type = PollType::from_str(&snapshot.poll_type)
            .map_err(|_| SnapshotError::UnknownPollType(snapshot.poll_type.clone()))?;
        let status = PollStatus::from_str(&snapshot.status)
            .map_err(|_| SnapshotError::UnknownStatus(snapshot.status.clone()))?;
        let created_by = voter_id(&snapshot.created_by)?;

        let eligible = snapshot
            .eligible_voters
            .iter()
            .map(|id| voter_id(id))
            .collect::<Result<BTreeSet<_>, _>>()?;
        let required = snapshot
            .required_voters
            .iter()
            .map(|id| voter_id(id))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let electorate = Electorate::new(eligible, required)
            .map_err(|e| SnapshotError::RequiredVoterNotEligible { voter: e.0 })?;

        let mut ballot = Ballot::new();
        for (id, choice) in &snapshot.ballot {
            let voter = voter_id(id)?;
            if !electorate.is_eligible(&voter) {
                return Err(SnapshotError::BallotVoterNotEligible { voter });
            }
            let choice = VoteChoice::from_str(choice)
                .map_err(|_| SnapshotError::UnknownChoice(choice.clone()))?;
            ballot.record(voter, choice);
        }

        let mut history = History::new();
        for event in &snapshot.history {
            let actor = event.actor.as_deref().map(voter_id).transpose()?;
            let kind = EventKind::from_str(&event.kind)
                .map_err(|_| SnapshotError::UnknownKind(event.kind.clone()))?;
            history.push(Event::new(actor, kind, event.timestamp, event.detail.clone()));
        }

        Ok(Poll {
            poll_type,
            created_by,
            status,
            public_text: snapshot.public_text.clone(),
            private_text: snapshot.private_text.clone(),
            required_approver_count: snapshot.required_approver_count,
            electorate,
            ballot,
            history,
            version: snapshot.version,
        })
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: PollSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(&snapshot)
    }
}

fn voter_id(id: &str) -> Result<VoterId, SnapshotError> {
    VoterId::new(id).map_err(|_| SnapshotError::EmptyVoterId)
}
