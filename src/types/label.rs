//! Document category labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::HuginnError;

/// A document category.
///
/// The set is closed: every successful classification resolves to one of
/// these variants. Parsing is exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Invoice,
    Contract,
    Resume,
    Email,
    Report,
}

impl Label {
    /// Every label, in prompt order.
    pub const ALL: [Label; 5] = [
        Label::Invoice,
        Label::Contract,
        Label::Resume,
        Label::Email,
        Label::Report,
    ];

    /// Display name, as sent to backends and returned to callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "Invoice",
            Self::Contract => "Contract",
            Self::Resume => "Resume",
            Self::Email => "Email",
            Self::Report => "Report",
        }
    }

    /// Join label names with `", "`.
    pub fn join(labels: &[Label]) -> String {
        labels
            .iter()
            .map(Label::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = HuginnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| HuginnError::InvalidCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_labels() {
        for label in Label::ALL {
            assert_eq!(label.as_str().parse::<Label>().unwrap(), label);
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        let err = "invoice".parse::<Label>().unwrap_err();
        assert!(matches!(err, HuginnError::InvalidCategory(ref s) if s == "invoice"));
    }

    #[test]
    fn join_uses_prompt_order() {
        assert_eq!(
            Label::join(&Label::ALL),
            "Invoice, Contract, Resume, Email, Report"
        );
    }

    #[test]
    fn serializes_as_display_name() {
        let json = serde_json::to_string(&Label::Resume).unwrap();
        assert_eq!(json, r#""Resume""#);
    }
}
