//! `quickcheck::Arbitrary` instances. Polls are generated through the
//! public API only, so every generated poll is reachable in production.

use std::collections::BTreeSet;

use quickcheck::{Arbitrary, Gen};

use crate::ballot::VoteChoice;
use crate::electorate::Electorate;
use crate::poll::{Poll, PollType};
use crate::testing::PollTestGen;
use crate::voter::VoterId;

impl Arbitrary for VoteChoice {
    fn arbitrary<G: Gen>(g: &mut G) -> Self {
        match u32::arbitrary(g) % 3 {
            0 => VoteChoice::Aye,
            1 => VoteChoice::Nay,
            _ => VoteChoice::Abstain,
        }
    }
}

impl Arbitrary for PollType {
    fn arbitrary<G: Gen>(g: &mut G) -> Self {
        if bool::arbitrary(g) {
            PollType::CommitteeMotion
        } else {
            PollType::CommitteeApproval
        }
    }
}

impl Arbitrary for VoterId {
    fn arbitrary<G: Gen>(g: &mut G) -> Self {
        PollTestGen::voter(u32::arbitrary(g) % 1000)
    }
}

impl Arbitrary for Poll {
    fn arbitrary<G: Gen>(g: &mut G) -> Self {
        let size = 1 + u32::arbitrary(g) % 6;
        let eligible = PollTestGen::voters(size);
        let required: BTreeSet<VoterId> = eligible
            .iter()
            .filter(|_| bool::arbitrary(g))
            .cloned()
            .collect();
        let electorate = Electorate::new(eligible.clone(), required).unwrap();

        let mut poll = Poll::new(
            PollType::arbitrary(g),
            PollTestGen::voter(0),
            "public",
            "private",
            u32::arbitrary(g) % (size + 2),
            electorate,
            PollTestGen::timestamp(0),
        );

        let mut tick = 1;
        for voter in &eligible {
            if bool::arbitrary(g) {
                poll.cast_vote(voter, VoteChoice::arbitrary(g), PollTestGen::timestamp(tick))
                    .unwrap();
                tick += 1;
            }
        }

        // sometimes run the lifecycle forward so terminal polls are
        // generated too
        match u32::arbitrary(g) % 4 {
            0 => {
                let _ = poll.cron(PollTestGen::timestamp(tick), None);
            }
            1 => {
                let _ = poll.close(&PollTestGen::voter(0), PollTestGen::timestamp(tick));
            }
            _ => {}
        }
        poll
    }
}
