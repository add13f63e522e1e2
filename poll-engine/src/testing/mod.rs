//! Deterministic builders for tests. Compiled for this crate's own tests
//! and for downstream crates via the `property-test-api` feature.

mod arbitrary;
#[cfg(test)]
mod e2e;

use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone, Utc};

use crate::electorate::Electorate;
use crate::poll::{Poll, PollType};
use crate::voter::VoterId;

pub struct PollTestGen;

impl PollTestGen {
    /// Voter `n` as `U{n:03}`, so ids sort numerically.
    pub fn voter(n: u32) -> VoterId {
        VoterId::new(format!("U{:03}", n)).unwrap()
    }

    /// Voters `U000..U{count-1}`.
    pub fn voters(count: u32) -> BTreeSet<VoterId> {
        (0..count).map(Self::voter).collect()
    }

    /// A fixed instant plus `offset` seconds; tests pass increasing
    /// offsets to order events.
    pub fn timestamp(offset: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_600_000_000 + offset, 0).unwrap()
    }

    /// An open consensus poll created by `U000` over `voters` eligible
    /// voters, with the given minimum aye count.
    pub fn motion_poll(voters: u32, min_ayes: u32) -> Poll {
        Poll::new(
            PollType::CommitteeMotion,
            Self::voter(0),
            "public",
            "private",
            min_ayes,
            Electorate::of(Self::voters(voters)),
            Self::timestamp(0),
        )
    }

    /// An open quota poll created by `U000`; the first `required` voters
    /// are mandatory.
    pub fn approval_poll(voters: u32, required: u32, quota: u32) -> Poll {
        let eligible = Self::voters(voters);
        let required: BTreeSet<_> = eligible.iter().take(required as usize).cloned().collect();
        Poll::new(
            PollType::CommitteeApproval,
            Self::voter(0),
            "public",
            "private",
            quota,
            Electorate::new(eligible, required).unwrap(),
            Self::timestamp(0),
        )
    }
}
