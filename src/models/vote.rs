use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::VoteError;

/// Status string the vote endpoint reports for a counted vote.
pub const SUCCESS_STATUS: &str = "200";

/// Error key the server uses for a rejected captcha token.
pub const CAPTCHA_FIELD: &str = "captcha";

/// Opaque identifier of an idea card.
///
/// The server encodes ids as JSON numbers while page markup carries them as
/// strings, so both forms are accepted and normalised to text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct IdeaId(pub String);

impl IdeaId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdeaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdeaId {
    fn from(value: &str) -> Self {
        IdeaId(value.to_string())
    }
}

impl From<u64> for IdeaId {
    fn from(value: u64) -> Self {
        IdeaId(value.to_string())
    }
}

impl<'de> Deserialize<'de> for IdeaId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => IdeaId(text),
            Raw::Number(number) => IdeaId::from(number),
        })
    }
}

/// Fields a voter supplies, read from the dialog form or the known identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterFields {
    pub email: String,
    pub zipcode: String,
    pub captcha_token: Option<String>,
}

impl VoterFields {
    pub fn new(email: impl Into<String>, zipcode: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            zipcode: zipcode.into(),
            captcha_token: None,
        }
    }

    pub fn with_captcha_token(mut self, token: impl Into<String>) -> Self {
        self.captcha_token = Some(token.into());
        self
    }
}

/// Form body of a vote POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteRequest {
    pub email: String,
    pub zipcode: String,
    #[serde(
        rename = "g-recaptcha-response",
        skip_serializing_if = "Option::is_none"
    )]
    pub captcha_token: Option<String>,
    #[serde(rename = "csrfmiddlewaretoken")]
    pub csrf_token: String,
}

impl VoteRequest {
    /// Carries the captcha token if and only if `captcha_required` is set.
    pub fn build(
        fields: VoterFields,
        csrf_token: &str,
        captcha_required: bool,
    ) -> Result<Self, VoteError> {
        let captcha_token = if captcha_required {
            match fields.captcha_token {
                Some(token) if !token.trim().is_empty() => Some(token),
                _ => return Err(VoteError::MissingCaptchaToken),
            }
        } else {
            None
        };

        Ok(Self {
            email: fields.email,
            zipcode: fields.zipcode,
            captcha_token,
            csrf_token: csrf_token.to_string(),
        })
    }
}

/// Per-field error messages reported by the server, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Messages for `field` joined the way they are shown inline.
    pub fn joined(&self, field: &str) -> Option<String> {
        self.get(field).map(|messages| messages.join(" "))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    pub fn insert(&mut self, field: impl Into<String>, messages: Vec<String>) {
        self.0.insert(field.into(), messages);
    }
}

impl<'de> Deserialize<'de> for FieldErrors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Messages {
            One(String),
            Many(Vec<String>),
        }

        let raw: Option<BTreeMap<String, Messages>> = Option::deserialize(deserializer)?;
        let errors = raw
            .unwrap_or_default()
            .into_iter()
            .map(|(field, messages)| {
                let messages = match messages {
                    Messages::One(message) => vec![message],
                    Messages::Many(messages) => messages,
                };
                (field, messages)
            })
            .collect();

        Ok(FieldErrors(errors))
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VoteResponse {
    pub status: String,
    #[serde(default)]
    pub id: Option<IdeaId>,
    #[serde(default)]
    pub tally: Option<u64>,
    #[serde(default)]
    pub errors: FieldErrors,
}

impl VoteResponse {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}
