use std::fmt;
use std::slice;

use chrono::{DateTime, Utc};
use strum_macros::{Display, EnumString};

use crate::voter::VoterId;

/// What happened to a poll. The string forms (snake_case) are the stored
/// forms in snapshots.
///
/// `ManuallyReopened` is part of the recorded vocabulary for forward
/// compatibility but no engine operation emits it: terminal statuses are
/// final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    Created,
    Edited,
    Voted,
    ChangedVote,
    ManuallyClosed,
    ManuallyReopened,
    AutoClosed,
    SentReminderToVote,
}

/// An immutable audit record. `actor` is `None` for automatic actions
/// (scheduler-driven transitions); for reminders it names the voter being
/// reminded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    actor: Option<VoterId>,
    kind: EventKind,
    timestamp: DateTime<Utc>,
    detail: String,
}

impl Event {
    pub fn new(
        actor: Option<VoterId>,
        kind: EventKind,
        timestamp: DateTime<Utc>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            actor,
            kind,
            timestamp,
            detail: detail.into(),
        }
    }

    pub fn actor(&self) -> Option<&VoterId> {
        self.actor.as_ref()
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// Renders the notification line for the embedding application's
/// notification channel, e.g. `U042 changed_vote: Changed vote from aye to
/// nay`.
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actor {
            Some(actor) => write!(f, "{} {}: {}", actor, self.kind, self.detail),
            None => write!(f, "{}: {}", self.kind, self.detail),
        }
    }
}

/// Append-only event history. Insertion order is chronological order;
/// entries are never reordered, pruned or mutated after append, which is
/// why this exposes no mutable access to recorded entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct History(Vec<Event>);

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, event: Event) -> &Event {
        let index = self.0.len();
        self.0.push(event);
        &self.0[index]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Event> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.0
    }

    pub fn last(&self) -> Option<&Event> {
        self.0.last()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Event;
    type IntoIter = slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::PollTestGen;

    #[test]
    fn renders_actor_and_detail() {
        let voter = PollTestGen::voter(42);
        let event = Event::new(
            Some(voter),
            EventKind::ChangedVote,
            PollTestGen::timestamp(0),
            "Changed vote from aye to nay",
        );
        assert_eq!(
            event.to_string(),
            "U042 changed_vote: Changed vote from aye to nay"
        );
    }

    #[test]
    fn renders_automatic_events_without_actor() {
        let event = Event::new(
            None,
            EventKind::AutoClosed,
            PollTestGen::timestamp(0),
            "quota reached",
        );
        assert_eq!(event.to_string(), "auto_closed: quota reached");
    }

    #[test]
    fn history_grows_in_order() {
        let mut history = History::new();
        for i in 0..3 {
            history.push(Event::new(
                None,
                EventKind::SentReminderToVote,
                PollTestGen::timestamp(i),
                format!("reminder {}", i),
            ));
        }
        assert_eq!(history.len(), 3);
        let details: Vec<_> = history.iter().map(Event::detail).collect();
        assert_eq!(details, vec!["reminder 0", "reminder 1", "reminder 2"]);
    }

    #[test]
    fn kind_strings_are_snake_case() {
        assert_eq!(EventKind::SentReminderToVote.to_string(), "sent_reminder_to_vote");
        assert_eq!(EventKind::ChangedVote.to_string(), "changed_vote");
    }
}
