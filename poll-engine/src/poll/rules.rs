//! Poll-type-specific closing rules.
//!
//! Thresholds come from the poll itself (`required_approver_count` and the
//! required-voter set); nothing here is a hard-coded quorum constant.

use crate::ballot::{Ballot, VoteChoice};
use crate::electorate::Electorate;
use crate::poll::PollType;

/// The outcome of evaluating a poll's closing rule against its current
/// ballot. The strings name the rule that fired; they end up in the
/// `auto_closed` event detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Verdict {
    Pass(String),
    Reject(String),
    Pending,
}

pub(crate) fn evaluate(
    poll_type: PollType,
    required_approver_count: u32,
    electorate: &Electorate,
    ballot: &Ballot,
) -> Verdict {
    match poll_type {
        PollType::CommitteeMotion => consensus(required_approver_count, electorate, ballot),
        PollType::CommitteeApproval => quota(required_approver_count, electorate, ballot),
    }
}

/// Motion-by-consensus: a single nay rejects at once, without waiting for
/// the remaining voters; passing requires every eligible voter to have
/// voted (aye or abstain) with at least the configured minimum of ayes.
fn consensus(min_ayes: u32, electorate: &Electorate, ballot: &Ballot) -> Verdict {
    if ballot.nays() > 0 {
        return Verdict::Reject("a nay vote rejects a committee motion".to_string());
    }
    let ayes = ballot.ayes();
    if ballot.len() == electorate.len() && ayes >= min_ayes as usize {
        return Verdict::Pass(format!(
            "all {} eligible voters voted with {} ayes (minimum {})",
            electorate.len(),
            ayes,
            min_ayes
        ));
    }
    Verdict::Pending
}

/// Approval-by-quota: counted over the required voters when any are named,
/// otherwise over the whole electorate. A nay from a required voter
/// rejects at once; with no required voters a nay never rejects, the poll
/// either reaches quota or lapses.
fn quota(quota: u32, electorate: &Electorate, ballot: &Ballot) -> Verdict {
    let required = electorate.required();
    if !required.is_empty() && ballot.count_among(required, VoteChoice::Nay) > 0 {
        return Verdict::Reject("a required voter voted nay".to_string());
    }
    let ayes = if required.is_empty() {
        ballot.ayes()
    } else {
        ballot.count_among(required, VoteChoice::Aye)
    };
    if ayes >= quota as usize {
        return Verdict::Pass(format!("aye quota reached: {} of required {}", ayes, quota));
    }
    Verdict::Pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::PollTestGen;
    use crate::voter::VoterId;
    use std::collections::BTreeSet;

    fn ballot_of(votes: &[(VoterId, VoteChoice)]) -> Ballot {
        let mut ballot = Ballot::new();
        for (voter, choice) in votes {
            ballot.record(voter.clone(), *choice);
        }
        ballot
    }

    #[test]
    fn consensus_rejects_on_any_nay() {
        let voters: Vec<_> = PollTestGen::voters(4).into_iter().collect();
        let electorate = Electorate::of(voters.clone());
        let ballot = ballot_of(&[
            (voters[0].clone(), VoteChoice::Aye),
            (voters[1].clone(), VoteChoice::Nay),
        ]);
        assert!(matches!(
            evaluate(PollType::CommitteeMotion, 4, &electorate, &ballot),
            Verdict::Reject(_)
        ));
    }

    #[test]
    fn consensus_waits_for_full_turnout() {
        let voters: Vec<_> = PollTestGen::voters(3).into_iter().collect();
        let electorate = Electorate::of(voters.clone());
        let ballot = ballot_of(&[
            (voters[0].clone(), VoteChoice::Aye),
            (voters[1].clone(), VoteChoice::Aye),
        ]);
        assert_eq!(
            evaluate(PollType::CommitteeMotion, 2, &electorate, &ballot),
            Verdict::Pending
        );
    }

    #[test]
    fn consensus_passes_with_abstentions_once_minimum_met() {
        let voters: Vec<_> = PollTestGen::voters(3).into_iter().collect();
        let electorate = Electorate::of(voters.clone());
        let ballot = ballot_of(&[
            (voters[0].clone(), VoteChoice::Aye),
            (voters[1].clone(), VoteChoice::Aye),
            (voters[2].clone(), VoteChoice::Abstain),
        ]);
        assert!(matches!(
            evaluate(PollType::CommitteeMotion, 2, &electorate, &ballot),
            Verdict::Pass(_)
        ));
    }

    #[test]
    fn consensus_stays_pending_when_minimum_not_met() {
        let voters: Vec<_> = PollTestGen::voters(2).into_iter().collect();
        let electorate = Electorate::of(voters.clone());
        let ballot = ballot_of(&[
            (voters[0].clone(), VoteChoice::Abstain),
            (voters[1].clone(), VoteChoice::Abstain),
        ]);
        assert_eq!(
            evaluate(PollType::CommitteeMotion, 1, &electorate, &ballot),
            Verdict::Pending
        );
    }

    #[test]
    fn quota_counts_required_voters_only() {
        let voters: Vec<_> = PollTestGen::voters(4).into_iter().collect();
        let required: BTreeSet<_> = voters[..2].iter().cloned().collect();
        let electorate = Electorate::new(voters.clone(), required).unwrap();
        // ayes from outside the required set do not count towards quota
        let ballot = ballot_of(&[
            (voters[2].clone(), VoteChoice::Aye),
            (voters[3].clone(), VoteChoice::Aye),
        ]);
        assert_eq!(
            evaluate(PollType::CommitteeApproval, 2, &electorate, &ballot),
            Verdict::Pending
        );

        let ballot = ballot_of(&[
            (voters[0].clone(), VoteChoice::Aye),
            (voters[1].clone(), VoteChoice::Aye),
        ]);
        assert!(matches!(
            evaluate(PollType::CommitteeApproval, 2, &electorate, &ballot),
            Verdict::Pass(_)
        ));
    }

    #[test]
    fn quota_rejects_on_required_nay() {
        let voters: Vec<_> = PollTestGen::voters(3).into_iter().collect();
        let required: BTreeSet<_> = voters[..2].iter().cloned().collect();
        let electorate = Electorate::new(voters.clone(), required).unwrap();
        let ballot = ballot_of(&[(voters[0].clone(), VoteChoice::Nay)]);
        assert!(matches!(
            evaluate(PollType::CommitteeApproval, 2, &electorate, &ballot),
            Verdict::Reject(_)
        ));
    }

    #[test]
    fn quota_without_required_voters_counts_everyone_and_ignores_nays() {
        let voters: Vec<_> = PollTestGen::voters(3).into_iter().collect();
        let electorate = Electorate::of(voters.clone());
        let ballot = ballot_of(&[
            (voters[0].clone(), VoteChoice::Nay),
            (voters[1].clone(), VoteChoice::Aye),
            (voters[2].clone(), VoteChoice::Aye),
        ]);
        assert!(matches!(
            evaluate(PollType::CommitteeApproval, 2, &electorate, &ballot),
            Verdict::Pass(_)
        ));
    }
}
