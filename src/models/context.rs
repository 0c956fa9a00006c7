use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::IdeaId;

/// Identity of a voter the session is already associated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub email: String,
    pub zip: String,
}

/// Ideas the current voter has already voted for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotesCast {
    #[serde(default)]
    pub submissions: BTreeSet<IdeaId>,
}

impl VotesCast {
    /// Parses the embedded `{"submissions": [...]}` blob. Anything unreadable
    /// is treated as no votes cast.
    pub fn parse(blob: &str) -> Self {
        if blob.trim().is_empty() {
            return Self::default();
        }
        serde_json::from_str(blob).unwrap_or_else(|e| {
            debug!("Ignoring unreadable votes-cast blob: {}", e);
            Self::default()
        })
    }

    pub fn contains(&self, id: &IdeaId) -> bool {
        self.submissions.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IdeaId> {
        self.submissions.iter()
    }
}

/// Page-level state handed to the vote client at startup.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub voter: Option<Voter>,
    pub captcha_required: bool,
    pub votes_cast: VotesCast,
    pub csrf_token: String,
    /// Referral `source` captured from the landing URL.
    pub source: Option<String>,
}

impl PageContext {
    pub fn new(csrf_token: impl Into<String>) -> Self {
        Self {
            csrf_token: csrf_token.into(),
            ..Self::default()
        }
    }

    pub fn with_voter(mut self, voter: Voter) -> Self {
        self.voter = Some(voter);
        self
    }

    pub fn with_captcha_required(mut self, required: bool) -> Self {
        self.captcha_required = required;
        self
    }

    pub fn with_votes_cast(mut self, votes_cast: VotesCast) -> Self {
        self.votes_cast = votes_cast;
        self
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    /// A known voter may skip the dialog only when no captcha is needed.
    pub fn can_vote_implicitly(&self) -> bool {
        self.voter.is_some() && !self.captcha_required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_votes_cast() {
        let votes = VotesCast::parse(r#"{"submissions": [3, "17", 42]}"#);

        assert!(votes.contains(&IdeaId::from("3")));
        assert!(votes.contains(&IdeaId::from("17")));
        assert!(votes.contains(&IdeaId::from(42u64)));
        assert!(!votes.contains(&IdeaId::from("4")));
    }

    #[test]
    fn test_parse_votes_cast_malformed() {
        assert!(VotesCast::parse("{not json").is_empty());
        assert!(VotesCast::parse("").is_empty());
        assert!(VotesCast::parse("{}").is_empty());
    }

    #[test]
    fn test_can_vote_implicitly() {
        let voter = Voter {
            email: "a@b.com".to_string(),
            zip: "12345".to_string(),
        };

        assert!(!PageContext::new("t").can_vote_implicitly());
        assert!(PageContext::new("t")
            .with_voter(voter.clone())
            .can_vote_implicitly());
        assert!(!PageContext::new("t")
            .with_voter(voter)
            .with_captcha_required(true)
            .can_vote_implicitly());
    }
}
