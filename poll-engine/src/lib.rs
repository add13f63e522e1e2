//! Poll lifecycle and vote-recording engine.
//!
//! The engine models a single poll as an aggregate: an electorate of
//! eligible voters, a ballot holding one current choice per voter, an
//! append-only event history, and a lifecycle state machine that moves the
//! poll from `Open` to exactly one terminal status. It performs no I/O of
//! its own: the embedding application (a chat-bot event handler plus a
//! periodic scheduler) feeds it intents and timestamps and renders the
//! events it records.

pub mod ballot;
pub mod electorate;
pub mod event;
pub mod ledger;
pub mod poll;
pub mod snapshot;
pub mod voter;

#[cfg(any(test, feature = "property-test-api"))]
pub mod testing;

pub use crate::{
    ballot::{Ballot, VoteChoice},
    electorate::{Electorate, RequiredVoterNotEligible},
    event::{Event, EventKind, History},
    ledger::{EmptyPollId, LedgerError, PollId, PollLedger},
    poll::{CronReport, EditField, Poll, PollEdit, PollError, PollStatus, PollType},
    snapshot::{EventSnapshot, PollSnapshot, SnapshotError},
    voter::{EmptyVoterId, VoterId},
};
