//! Full-lifecycle scenarios driven the way the embedding application
//! drives the engine: dispatcher intents, periodic sweeps, archiving.

use crate::ballot::VoteChoice;
use crate::event::EventKind;
use crate::ledger::{PollId, PollLedger};
use crate::poll::{Poll, PollEdit, PollStatus};
use crate::testing::PollTestGen;

#[test]
fn quota_poll_full_lifecycle() {
    let mut ledger = PollLedger::new();
    let id = PollId::new("1700000000.000100").unwrap();
    let creator = PollTestGen::voter(0);

    // "create poll" intent
    ledger
        .add_poll(id.clone(), PollTestGen::approval_poll(4, 2, 2))
        .unwrap();

    // first sweep: nobody has voted, everyone gets a reminder
    let reports = ledger.cron_sweep(PollTestGen::timestamp(60), |_| None);
    assert_eq!(reports[0].1.reminded.len(), 4);

    // the creator tightens the wording, then votes arrive
    ledger
        .poll_mut(&id)
        .unwrap()
        .edit(
            &creator,
            &[PollEdit::PublicText("Approve the Q3 budget".to_string())],
            PollTestGen::timestamp(120),
        )
        .unwrap();
    for i in 0..2 {
        ledger
            .poll_mut(&id)
            .unwrap()
            .cast_vote(
                &PollTestGen::voter(i),
                VoteChoice::Aye,
                PollTestGen::timestamp(180 + i as i64),
            )
            .unwrap();
    }

    // next sweep: both required voters said aye, quota met
    let reports = ledger.cron_sweep(PollTestGen::timestamp(240), |_| None);
    assert_eq!(reports[0].1.closed, Some(PollStatus::Passed));

    // the poll is now a read-only audit record; archive it via snapshot
    let archived = ledger.gc();
    assert_eq!(archived.len(), 1);
    let json = archived[0].1.to_json().unwrap();
    let restored = Poll::from_json(&json).unwrap();
    assert_eq!(restored, archived[0].1);
    assert_eq!(restored.status(), PollStatus::Passed);

    let kinds: Vec<_> = restored.history().iter().map(|e| e.kind()).collect();
    assert_eq!(kinds[0], EventKind::Created);
    assert_eq!(*kinds.last().unwrap(), EventKind::AutoClosed);
    assert!(kinds.contains(&EventKind::Edited));
    assert!(kinds.contains(&EventKind::SentReminderToVote));
}

#[test]
fn motion_poll_lapses_when_nobody_concludes_it() {
    let mut poll = PollTestGen::motion_poll(3, 3);
    poll.cast_vote(
        &PollTestGen::voter(0),
        VoteChoice::Abstain,
        PollTestGen::timestamp(10),
    )
    .unwrap();

    let deadline = PollTestGen::timestamp(3600);
    // sweeps before the deadline only remind
    let report = poll.cron(PollTestGen::timestamp(600), Some(deadline));
    assert_eq!(report.closed, None);
    assert_eq!(report.reminded.len(), 2);

    // past the deadline the poll lapses, once
    let report = poll.cron(PollTestGen::timestamp(3601), Some(deadline));
    assert_eq!(report.closed, Some(PollStatus::Lapsed));
    assert!(poll.cron(PollTestGen::timestamp(7200), Some(deadline)).is_empty());
}
