//! A keyed registry of polls for the embedding application.
//!
//! The engine proper is per-poll; this ledger is the piece the scheduler
//! and command dispatcher talk to: it routes intents to a poll by id,
//! sweeps every open poll on the cron tick, and hands terminal polls back
//! for archiving. Deadlines stay a caller concern and are looked up per
//! poll during the sweep.

use std::collections::{btree_map, BTreeMap};
use std::convert::TryFrom;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::poll::{CronReport, Poll};

/// Opaque poll identifier, chosen by the embedding application (the
/// original bot keyed polls by the chat message timestamp).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PollId(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("poll identifier cannot be empty")]
pub struct EmptyPollId;

impl PollId {
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyPollId> {
        let id = id.into();
        if id.is_empty() {
            return Err(EmptyPollId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PollId {
    type Error = EmptyPollId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("poll {0} already exists")]
    PollExists(PollId),

    #[error("poll {0} does not exist")]
    PollNotFound(PollId),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollLedger {
    polls: BTreeMap<PollId, Poll>,
}

impl PollLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a poll under an id. Ids are never reused, so a duplicate
    /// is a caller error.
    pub fn add_poll(&mut self, id: PollId, poll: Poll) -> Result<(), LedgerError> {
        match self.polls.entry(id) {
            btree_map::Entry::Occupied(entry) => Err(LedgerError::PollExists(entry.key().clone())),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(poll);
                Ok(())
            }
        }
    }

    pub fn poll(&self, id: &PollId) -> Result<&Poll, LedgerError> {
        self.polls
            .get(id)
            .ok_or_else(|| LedgerError::PollNotFound(id.clone()))
    }

    pub fn poll_mut(&mut self, id: &PollId) -> Result<&mut Poll, LedgerError> {
        self.polls
            .get_mut(id)
            .ok_or_else(|| LedgerError::PollNotFound(id.clone()))
    }

    pub fn remove(&mut self, id: &PollId) -> Result<Poll, LedgerError> {
        self.polls
            .remove(id)
            .ok_or_else(|| LedgerError::PollNotFound(id.clone()))
    }

    pub fn len(&self) -> usize {
        self.polls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PollId, &Poll)> {
        self.polls.iter()
    }

    pub fn open_polls(&self) -> impl Iterator<Item = (&PollId, &Poll)> {
        self.polls.iter().filter(|(_, poll)| poll.is_open())
    }

    /// Run one cron sweep over every open poll, in id order, returning
    /// the per-poll reports. `deadline_of` resolves the external deadline
    /// for a poll, if it has one.
    pub fn cron_sweep<F>(&mut self, now: DateTime<Utc>, deadline_of: F) -> Vec<(PollId, CronReport)>
    where
        F: Fn(&PollId) -> Option<DateTime<Utc>>,
    {
        self.polls
            .iter_mut()
            .filter(|(_, poll)| poll.is_open())
            .map(|(id, poll)| {
                let report = poll.cron(now, deadline_of(id));
                (id.clone(), report)
            })
            .collect()
    }

    /// Remove and return every terminal poll so the caller can archive
    /// them with its persistence collaborator. Open polls stay put.
    pub fn gc(&mut self) -> Vec<(PollId, Poll)> {
        let terminal: Vec<PollId> = self
            .polls
            .iter()
            .filter(|(_, poll)| !poll.is_open())
            .map(|(id, _)| id.clone())
            .collect();
        terminal
            .into_iter()
            .filter_map(|id| {
                let poll = self.polls.remove(&id)?;
                Some((id, poll))
            })
            .collect()
    }
}
