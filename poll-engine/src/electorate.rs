use std::collections::BTreeSet;

use thiserror::Error;

use crate::voter::VoterId;

/// The membership model of a poll: who may vote, and whose vote is
/// mandatory under quota-style closing rules.
///
/// The required set is always a subset of the eligible set; construction
/// enforces this so the rest of the engine can rely on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Electorate {
    eligible: BTreeSet<VoterId>,
    required: BTreeSet<VoterId>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("required voter {0} is not in the eligible set")]
pub struct RequiredVoterNotEligible(pub VoterId);

impl Electorate {
    pub fn new(
        eligible: impl IntoIterator<Item = VoterId>,
        required: impl IntoIterator<Item = VoterId>,
    ) -> Result<Self, RequiredVoterNotEligible> {
        let eligible: BTreeSet<_> = eligible.into_iter().collect();
        let required: BTreeSet<_> = required.into_iter().collect();
        if let Some(stray) = required.iter().find(|v| !eligible.contains(*v)) {
            return Err(RequiredVoterNotEligible(stray.clone()));
        }
        Ok(Self { eligible, required })
    }

    /// An electorate with no mandatory voters.
    pub fn of(eligible: impl IntoIterator<Item = VoterId>) -> Self {
        Self {
            eligible: eligible.into_iter().collect(),
            required: BTreeSet::new(),
        }
    }

    pub fn eligible(&self) -> &BTreeSet<VoterId> {
        &self.eligible
    }

    pub fn required(&self) -> &BTreeSet<VoterId> {
        &self.required
    }

    pub fn is_eligible(&self, voter: &VoterId) -> bool {
        self.eligible.contains(voter)
    }

    pub fn len(&self) -> usize {
        self.eligible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eligible.is_empty()
    }

    pub(crate) fn replace(&mut self, eligible: BTreeSet<VoterId>, required: BTreeSet<VoterId>) {
        self.eligible = eligible;
        self.required = required;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::PollTestGen;

    #[test]
    fn required_must_be_eligible() {
        let outsider = PollTestGen::voter(9);
        let err = Electorate::new(PollTestGen::voters(2), [outsider.clone()]).unwrap_err();
        assert_eq!(err, RequiredVoterNotEligible(outsider));
    }

    #[test]
    fn required_subset_is_accepted() {
        let voters = PollTestGen::voters(3);
        let required = [voters.iter().next().unwrap().clone()];
        let electorate = Electorate::new(voters.clone(), required).unwrap();
        assert_eq!(electorate.eligible(), &voters);
        assert_eq!(electorate.required().len(), 1);
    }

    #[test]
    fn duplicate_voters_collapse() {
        let voter = PollTestGen::voter(0);
        let electorate = Electorate::of([voter.clone(), voter]);
        assert_eq!(electorate.len(), 1);
    }
}
