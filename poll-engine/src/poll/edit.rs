use std::collections::BTreeSet;
use std::str::FromStr;

use strum_macros::{Display, EnumString};

use crate::poll::PollError;
use crate::voter::VoterId;

/// Names of the poll attributes a creator may change while the poll is
/// open. `status`, `ballot`, `history` and `created_by` are deliberately
/// absent: those only move through the poll's own operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum EditField {
    PublicText,
    PrivateText,
    RequiredApproverCount,
    EligibleVoters,
    RequiredVoters,
}

/// One requested field change. A closed set of variants rather than
/// name/value pairs, so an edit can only ever name an editable attribute
/// and carries a correctly typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEdit {
    PublicText(String),
    PrivateText(String),
    RequiredApproverCount(u32),
    EligibleVoters(BTreeSet<VoterId>),
    RequiredVoters(BTreeSet<VoterId>),
}

impl PollEdit {
    pub fn field(&self) -> EditField {
        match self {
            PollEdit::PublicText(_) => EditField::PublicText,
            PollEdit::PrivateText(_) => EditField::PrivateText,
            PollEdit::RequiredApproverCount(_) => EditField::RequiredApproverCount,
            PollEdit::EligibleVoters(_) => EditField::EligibleVoters,
            PollEdit::RequiredVoters(_) => EditField::RequiredVoters,
        }
    }

    /// Parse an untyped `(field name, value)` pair as delivered by the
    /// command dispatcher (e.g. a modal-dialog submission) into the closed
    /// edit set. Unknown names fail with [`PollError::UnknownField`],
    /// ill-typed values with [`PollError::InvalidValue`].
    pub fn from_field(name: &str, value: &serde_json::Value) -> Result<Self, PollError> {
        let field = EditField::from_str(name).map_err(|_| PollError::UnknownField {
            field: name.to_string(),
        })?;
        let invalid = || PollError::InvalidValue { field };
        match field {
            EditField::PublicText => {
                let text = value.as_str().ok_or_else(invalid)?;
                Ok(PollEdit::PublicText(text.to_string()))
            }
            EditField::PrivateText => {
                let text = value.as_str().ok_or_else(invalid)?;
                Ok(PollEdit::PrivateText(text.to_string()))
            }
            EditField::RequiredApproverCount => {
                let count = value
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(invalid)?;
                Ok(PollEdit::RequiredApproverCount(count))
            }
            EditField::EligibleVoters => Ok(PollEdit::EligibleVoters(voter_set(value, invalid)?)),
            EditField::RequiredVoters => Ok(PollEdit::RequiredVoters(voter_set(value, invalid)?)),
        }
    }
}

fn voter_set(
    value: &serde_json::Value,
    invalid: impl Fn() -> PollError,
) -> Result<BTreeSet<VoterId>, PollError> {
    value
        .as_array()
        .ok_or_else(&invalid)?
        .iter()
        .map(|entry| {
            let id = entry.as_str().ok_or_else(&invalid)?;
            VoterId::new(id).map_err(|_| invalid())
        })
        .collect()
}
