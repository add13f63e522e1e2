use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::str::FromStr;

use strum_macros::{Display, EnumString};

use crate::voter::VoterId;

/// The three ways a voter can answer a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum VoteChoice {
    Aye,
    Nay,
    Abstain,
}

impl VoteChoice {
    pub fn parse(s: &str) -> Option<Self> {
        Self::from_str(s).ok()
    }
}

/// One current choice per voter who has voted. Re-voting overwrites the
/// entry; the audit trail of overwrites lives in the poll history, not
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ballot(BTreeMap<VoterId, VoteChoice>);

impl Ballot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a choice, returning the voter's prior choice if they had
    /// already voted. Eligibility is the poll's concern, not the ballot's.
    pub(crate) fn record(&mut self, voter: VoterId, choice: VoteChoice) -> Option<VoteChoice> {
        self.0.insert(voter, choice)
    }

    pub fn choice(&self, voter: &VoterId) -> Option<VoteChoice> {
        self.0.get(voter).copied()
    }

    pub fn has_voted(&self, voter: &VoterId) -> bool {
        self.0.contains_key(voter)
    }

    pub fn voters(&self) -> impl Iterator<Item = &VoterId> {
        self.0.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, VoterId, VoteChoice> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ayes(&self) -> usize {
        self.count(VoteChoice::Aye)
    }

    pub fn nays(&self) -> usize {
        self.count(VoteChoice::Nay)
    }

    /// Count of `choice` entries whose voter belongs to `scope`.
    pub fn count_among(&self, scope: &BTreeSet<VoterId>, choice: VoteChoice) -> usize {
        self.0
            .iter()
            .filter(|(voter, c)| **c == choice && scope.contains(*voter))
            .count()
    }

    fn count(&self, choice: VoteChoice) -> usize {
        self.0.values().filter(|c| **c == choice).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::PollTestGen;

    #[test]
    fn record_returns_prior_choice() {
        let voter = PollTestGen::voter(0);
        let mut ballot = Ballot::new();
        assert_eq!(ballot.record(voter.clone(), VoteChoice::Aye), None);
        assert_eq!(
            ballot.record(voter.clone(), VoteChoice::Nay),
            Some(VoteChoice::Aye)
        );
        assert_eq!(ballot.choice(&voter), Some(VoteChoice::Nay));
        assert_eq!(ballot.len(), 1);
    }

    #[test]
    fn counts_respect_scope() {
        let voters: Vec<_> = PollTestGen::voters(4).into_iter().collect();
        let mut ballot = Ballot::new();
        ballot.record(voters[0].clone(), VoteChoice::Aye);
        ballot.record(voters[1].clone(), VoteChoice::Aye);
        ballot.record(voters[2].clone(), VoteChoice::Nay);

        let scope: BTreeSet<_> = voters[..2].iter().cloned().collect();
        assert_eq!(ballot.ayes(), 2);
        assert_eq!(ballot.nays(), 1);
        assert_eq!(ballot.count_among(&scope, VoteChoice::Aye), 2);
        assert_eq!(ballot.count_among(&scope, VoteChoice::Nay), 0);
    }

    #[test]
    fn choice_strings_are_snake_case() {
        assert_eq!(VoteChoice::Aye.to_string(), "aye");
        assert_eq!(VoteChoice::parse("abstain"), Some(VoteChoice::Abstain));
        assert_eq!(VoteChoice::parse("maybe"), None);
    }
}
