//! The poll aggregate: vote ledger, edit capability and lifecycle state
//! machine.
//!
//! A poll is created `Open`, mutated by [`Poll::cast_vote`] and
//! [`Poll::edit`] while open, and leaves `Open` exactly once, either
//! through [`Poll::close`] or through the automatic evaluation inside
//! [`Poll::cron`]. Once the status is terminal the poll is a read-only
//! audit record.
//!
//! The engine assumes external mutual exclusion per poll: the embedding
//! application serializes mutating calls on one poll (votes, edits and the
//! cron sweep may otherwise race), while distinct polls share no mutable
//! state. Every operation is a single atomic step: preconditions are
//! verified first, and the history is only appended once an operation can
//! no longer fail, so a failed call never leaves a spurious event.

mod edit;
mod rules;

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::ballot::{Ballot, VoteChoice};
use crate::electorate::{Electorate, RequiredVoterNotEligible};
use crate::event::{Event, EventKind, History};
use crate::voter::VoterId;

pub use edit::{EditField, PollEdit};
use rules::Verdict;

/// Snapshot compatibility tag for persisted polls.
pub const POLL_VERSION: u32 = 1;

/// The voting rule governing how a poll closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PollType {
    /// Motion-by-consensus: everyone must answer, a single nay rejects.
    CommitteeMotion,
    /// Approval-by-quota: passes as soon as enough ayes are recorded.
    CommitteeApproval,
}

/// Lifecycle state. Every state except `Open` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PollStatus {
    Open,
    Passed,
    Rejected,
    ClosedEarly,
    Lapsed,
}

impl PollStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, PollStatus::Open)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("operation not permitted while the poll is {status}")]
    InvalidState { status: PollStatus },

    #[error("voter {voter} is not eligible to vote in this poll")]
    NotEligible { voter: VoterId },

    #[error("only the creator ({created_by}) may edit this poll, not {editor}")]
    NotAuthorized {
        editor: VoterId,
        created_by: VoterId,
    },

    #[error("{field} is not an editable poll field")]
    UnknownField { field: String },

    #[error("invalid value for editable field {field}")]
    InvalidValue { field: EditField },

    #[error("the eligible voter set cannot drop {voter}: their vote is already recorded")]
    VoterHasBallot { voter: VoterId },

    #[error(transparent)]
    RequiredVoterNotEligible(#[from] RequiredVoterNotEligible),
}

/// What a single [`Poll::cron`] sweep did. `events` holds the newly
/// appended events so the caller can post them to its notification
/// channel without diffing the history.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CronReport {
    pub closed: Option<PollStatus>,
    pub reminded: Vec<VoterId>,
    pub events: Vec<Event>,
}

impl CronReport {
    pub fn is_empty(&self) -> bool {
        self.closed.is_none() && self.events.is_empty()
    }
}

/// The aggregate root. All timestamps are supplied by the caller so the
/// engine never reads the clock itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    pub(crate) poll_type: PollType,
    pub(crate) created_by: VoterId,
    pub(crate) status: PollStatus,
    pub(crate) public_text: String,
    pub(crate) private_text: String,
    pub(crate) required_approver_count: u32,
    pub(crate) electorate: Electorate,
    pub(crate) ballot: Ballot,
    pub(crate) history: History,
    pub(crate) version: u32,
}

impl Poll {
    /// Create an open poll and record the `created` event.
    pub fn new(
        poll_type: PollType,
        created_by: VoterId,
        public_text: impl Into<String>,
        private_text: impl Into<String>,
        required_approver_count: u32,
        electorate: Electorate,
        now: DateTime<Utc>,
    ) -> Self {
        let mut poll = Self {
            poll_type,
            created_by: created_by.clone(),
            status: PollStatus::Open,
            public_text: public_text.into(),
            private_text: private_text.into(),
            required_approver_count,
            electorate,
            ballot: Ballot::new(),
            history: History::new(),
            version: POLL_VERSION,
        };
        poll.history.push(Event::new(
            Some(created_by),
            EventKind::Created,
            now,
            format!("Created a {} poll", poll_type),
        ));
        poll
    }

    pub fn poll_type(&self) -> PollType {
        self.poll_type
    }

    pub fn created_by(&self) -> &VoterId {
        &self.created_by
    }

    pub fn status(&self) -> PollStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == PollStatus::Open
    }

    pub fn public_text(&self) -> &str {
        &self.public_text
    }

    pub fn private_text(&self) -> &str {
        &self.private_text
    }

    pub fn required_approver_count(&self) -> u32 {
        self.required_approver_count
    }

    pub fn electorate(&self) -> &Electorate {
        &self.electorate
    }

    pub fn ballot(&self) -> &Ballot {
        &self.ballot
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Eligible voters with no ballot entry yet, in id order.
    pub fn voters_without_ballot(&self) -> Vec<VoterId> {
        self.electorate
            .eligible()
            .iter()
            .filter(|voter| !self.ballot.has_voted(voter))
            .cloned()
            .collect()
    }

    /// Record (or change) a voter's choice.
    ///
    /// A re-vote always appends a `changed_vote` event, even when the
    /// choice is unchanged: the ledger tracks intent to re-affirm, not
    /// just value change. Returns the appended event.
    pub fn cast_vote(
        &mut self,
        voter: &VoterId,
        choice: VoteChoice,
        now: DateTime<Utc>,
    ) -> Result<&Event, PollError> {
        self.ensure_open()?;
        if !self.electorate.is_eligible(voter) {
            return Err(PollError::NotEligible {
                voter: voter.clone(),
            });
        }

        let prior = self.ballot.record(voter.clone(), choice);
        let (kind, detail) = match prior {
            None => (EventKind::Voted, format!("Cast vote of {}", choice)),
            Some(prior) => (
                EventKind::ChangedVote,
                format!("Changed vote from {} to {}", prior, choice),
            ),
        };
        Ok(self
            .history
            .push(Event::new(Some(voter.clone()), kind, now, detail)))
    }

    /// Apply field changes, in the supplied order, appending one `edited`
    /// event per field. Only the creator may edit, and only while open.
    ///
    /// The whole change sequence is validated before anything is applied:
    /// a failing call leaves the poll untouched. An eligibility change
    /// may not drop a voter whose ballot is already recorded, nor strand
    /// a required voter outside the eligible set.
    pub fn edit(
        &mut self,
        editor: &VoterId,
        changes: &[PollEdit],
        now: DateTime<Utc>,
    ) -> Result<&[Event], PollError> {
        self.ensure_open()?;
        if *editor != self.created_by {
            return Err(PollError::NotAuthorized {
                editor: editor.clone(),
                created_by: self.created_by.clone(),
            });
        }
        self.validate_membership_changes(changes)?;

        let first_new = self.history.len();
        for change in changes {
            let detail = self.apply_change(change);
            self.history.push(Event::new(
                Some(editor.clone()),
                EventKind::Edited,
                now,
                detail,
            ));
        }
        Ok(&self.history.as_slice()[first_new..])
    }

    /// Close the poll manually. The poll-type rule decides the outcome:
    /// a conclusive rule maps to `passed`/`rejected`, an inconclusive
    /// ballot to `closed_early`. Any actor may close; the actor is
    /// recorded so the embedding application can layer its own policy on
    /// top.
    pub fn close(&mut self, actor: &VoterId, now: DateTime<Utc>) -> Result<&Event, PollError> {
        self.ensure_open()?;
        let (status, reason) = match self.verdict() {
            Verdict::Pass(rule) => (PollStatus::Passed, rule),
            Verdict::Reject(rule) => (PollStatus::Rejected, rule),
            Verdict::Pending => (
                PollStatus::ClosedEarly,
                "closed before any closing rule was conclusive".to_string(),
            ),
        };
        self.status = status;
        Ok(self.history.push(Event::new(
            Some(actor.clone()),
            EventKind::ManuallyClosed,
            now,
            format!("Closed as {}: {}", status, reason),
        )))
    }

    /// One scheduler sweep. A no-op on a non-open poll. Otherwise, in
    /// order: evaluate the closing rule (a conclusive verdict transitions
    /// the status with one `auto_closed` event and emits no reminders),
    /// then lapse the poll if `deadline` has passed, and finally record
    /// one `sent_reminder_to_vote` event per eligible voter who has not
    /// voted. Deadline management belongs to the caller, which is why the
    /// deadline arrives as an argument.
    pub fn cron(&mut self, now: DateTime<Utc>, deadline: Option<DateTime<Utc>>) -> CronReport {
        if !self.is_open() {
            return CronReport::default();
        }

        match self.verdict() {
            Verdict::Pass(rule) => return self.auto_close(PollStatus::Passed, rule, now),
            Verdict::Reject(rule) => return self.auto_close(PollStatus::Rejected, rule, now),
            Verdict::Pending => {}
        }

        if let Some(deadline) = deadline {
            if now >= deadline {
                let reason = format!("deadline {} passed without a conclusive result", deadline);
                return self.auto_close(PollStatus::Lapsed, reason, now);
            }
        }

        let mut report = CronReport::default();
        for voter in self.voters_without_ballot() {
            let event = self.history.push(Event::new(
                Some(voter.clone()),
                EventKind::SentReminderToVote,
                now,
                "Reminder to vote sent",
            ));
            report.events.push(event.clone());
            report.reminded.push(voter);
        }
        report
    }

    fn ensure_open(&self) -> Result<(), PollError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(PollError::InvalidState {
                status: self.status,
            })
        }
    }

    fn verdict(&self) -> Verdict {
        rules::evaluate(
            self.poll_type,
            self.required_approver_count,
            &self.electorate,
            &self.ballot,
        )
    }

    fn auto_close(&mut self, status: PollStatus, rule: String, now: DateTime<Utc>) -> CronReport {
        self.status = status;
        let event = self
            .history
            .push(Event::new(None, EventKind::AutoClosed, now, rule));
        CronReport {
            closed: Some(status),
            reminded: Vec::new(),
            events: vec![event.clone()],
        }
    }

    /// Dry-run the membership changes in sequence so a failing edit call
    /// never partially applies.
    fn validate_membership_changes(&self, changes: &[PollEdit]) -> Result<(), PollError> {
        let mut eligible = self.electorate.eligible().clone();
        let mut required = self.electorate.required().clone();
        for change in changes {
            match change {
                PollEdit::EligibleVoters(new) => {
                    if let Some(voter) = self.ballot.voters().find(|v| !new.contains(*v)) {
                        return Err(PollError::VoterHasBallot {
                            voter: voter.clone(),
                        });
                    }
                    if let Some(voter) = required.iter().find(|v| !new.contains(*v)) {
                        return Err(RequiredVoterNotEligible(voter.clone()).into());
                    }
                    eligible = new.clone();
                }
                PollEdit::RequiredVoters(new) => {
                    if let Some(voter) = new.iter().find(|v| !eligible.contains(*v)) {
                        return Err(RequiredVoterNotEligible(voter.clone()).into());
                    }
                    required = new.clone();
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn apply_change(&mut self, change: &PollEdit) -> String {
        let field = change.field();
        match change {
            PollEdit::PublicText(new) => {
                let detail = format!("{} changed from {:?} to {:?}", field, self.public_text, new);
                self.public_text = new.clone();
                detail
            }
            PollEdit::PrivateText(new) => {
                let detail =
                    format!("{} changed from {:?} to {:?}", field, self.private_text, new);
                self.private_text = new.clone();
                detail
            }
            PollEdit::RequiredApproverCount(new) => {
                let detail = format!(
                    "{} changed from {} to {}",
                    field, self.required_approver_count, new
                );
                self.required_approver_count = *new;
                detail
            }
            PollEdit::EligibleVoters(new) => {
                let detail = format!(
                    "{} changed from {} to {}",
                    field,
                    render_voters(self.electorate.eligible()),
                    render_voters(new)
                );
                let required = self.electorate.required().clone();
                self.electorate.replace(new.clone(), required);
                detail
            }
            PollEdit::RequiredVoters(new) => {
                let detail = format!(
                    "{} changed from {} to {}",
                    field,
                    render_voters(self.electorate.required()),
                    render_voters(new)
                );
                let eligible = self.electorate.eligible().clone();
                self.electorate.replace(eligible, new.clone());
                detail
            }
        }
    }
}

fn render_voters(voters: &BTreeSet<VoterId>) -> String {
    if voters.is_empty() {
        return "(none)".to_string();
    }
    let ids: Vec<&str> = voters.iter().map(VoterId::as_str).collect();
    ids.join(", ")
}

impl fmt::Display for Poll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} poll by {} ({}): {}/{} voted",
            self.poll_type,
            self.created_by,
            self.status,
            self.ballot.len(),
            self.electorate.len()
        )
    }
}
