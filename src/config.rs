use chrono::{DateTime, Utc};
use log::info;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::api_client::DEFAULT_TIMEOUT;
use crate::error::ConfigError;
use crate::models::{PageContext, Voter, VotesCast};
use crate::poller::BACKOFF_INCREMENT;
use crate::utils::default_countdown_target;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub csrf_token: String,
    pub voter: Option<Voter>,
    pub vote_needs_captcha: bool,
    pub votes_cast: VotesCast,
    pub source: Option<String>,
    pub request_timeout: Duration,
    pub poll_increment: Duration,
    pub countdown_target: DateTime<Utc>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            csrf_token: String::new(),
            voter: None,
            vote_needs_captcha: false,
            votes_cast: VotesCast::default(),
            source: None,
            request_timeout: DEFAULT_TIMEOUT,
            poll_increment: BACKOFF_INCREMENT,
            countdown_target: default_countdown_target(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let base_url = match non_empty("OPENDEBATES_BASE_URL") {
            Some(raw) => Url::parse(&raw).map_err(|e| invalid("OPENDEBATES_BASE_URL", &raw, e))?,
            None => defaults.base_url,
        };

        // Both halves are needed to vote without the dialog.
        let voter = match (
            non_empty("OPENDEBATES_VOTER_EMAIL"),
            non_empty("OPENDEBATES_VOTER_ZIP"),
        ) {
            (Some(email), Some(zip)) => Some(Voter { email, zip }),
            _ => None,
        };

        let vote_needs_captcha = match non_empty("OPENDEBATES_VOTE_NEEDS_CAPTCHA") {
            Some(raw) => parse_flag("OPENDEBATES_VOTE_NEEDS_CAPTCHA", &raw)?,
            None => defaults.vote_needs_captcha,
        };

        let request_timeout = parse_positive("OPENDEBATES_REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let poll_increment = parse_positive("OPENDEBATES_POLL_INCREMENT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_increment);

        let countdown_target = match non_empty("OPENDEBATES_COUNTDOWN_TARGET") {
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|target| target.with_timezone(&Utc))
                .map_err(|e| invalid("OPENDEBATES_COUNTDOWN_TARGET", &raw, e))?,
            None => defaults.countdown_target,
        };

        let config = Self {
            base_url,
            csrf_token: non_empty("OPENDEBATES_CSRF_TOKEN").unwrap_or_default(),
            voter,
            vote_needs_captcha,
            votes_cast: VotesCast::parse(&non_empty("OPENDEBATES_VOTES_CAST").unwrap_or_default()),
            source: non_empty("OPENDEBATES_SOURCE"),
            request_timeout,
            poll_increment,
            countdown_target,
        };
        info!(
            "Loaded config for {} (known voter: {}, captcha: {})",
            config.base_url,
            config.voter.is_some(),
            config.vote_needs_captcha
        );
        Ok(config)
    }

    pub fn page_context(&self) -> PageContext {
        PageContext {
            voter: self.voter.clone(),
            captcha_required: self.vote_needs_captcha,
            votes_cast: self.votes_cast.clone(),
            csrf_token: self.csrf_token.clone(),
            source: self.source.clone(),
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid(key: &str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: ToString,
{
    non_empty(key)
        .map(|raw| raw.parse::<T>().map_err(|e| invalid(key, &raw, e)))
        .transpose()
}

/// A zero timeout fails every request and a zero increment polls without pause.
fn parse_positive(key: &str) -> Result<Option<u64>, ConfigError> {
    match parse_var::<u64>(key)? {
        Some(0) => Err(invalid(key, "0", "must be greater than zero")),
        value => Ok(value),
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(invalid(key, raw, "expected true or false")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IdeaId;
    use serial_test::serial;

    const KEYS: [&str; 10] = [
        "OPENDEBATES_BASE_URL",
        "OPENDEBATES_CSRF_TOKEN",
        "OPENDEBATES_VOTER_EMAIL",
        "OPENDEBATES_VOTER_ZIP",
        "OPENDEBATES_VOTE_NEEDS_CAPTCHA",
        "OPENDEBATES_VOTES_CAST",
        "OPENDEBATES_SOURCE",
        "OPENDEBATES_REQUEST_TIMEOUT_SECS",
        "OPENDEBATES_POLL_INCREMENT_MS",
        "OPENDEBATES_COUNTDOWN_TARGET",
    ];

    fn clear_env() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();

        let config = ClientConfig::from_env().unwrap();

        assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
        assert!(config.voter.is_none());
        assert!(!config.vote_needs_captcha);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.poll_increment, Duration::from_millis(2000));
        assert_eq!(config.countdown_target, default_countdown_target());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        env::set_var("OPENDEBATES_BASE_URL", "https://debates.example.org");
        env::set_var("OPENDEBATES_CSRF_TOKEN", "abc");
        env::set_var("OPENDEBATES_VOTER_EMAIL", "a@b.com");
        env::set_var("OPENDEBATES_VOTER_ZIP", "12345");
        env::set_var("OPENDEBATES_VOTE_NEEDS_CAPTCHA", "True");
        env::set_var("OPENDEBATES_VOTES_CAST", r#"{"submissions": [5]}"#);
        env::set_var("OPENDEBATES_POLL_INCREMENT_MS", "500");
        env::set_var("OPENDEBATES_COUNTDOWN_TARGET", "2016-03-06T18:00:00-05:00");

        let config = ClientConfig::from_env().unwrap();
        let context = config.page_context();

        assert_eq!(context.csrf_token, "abc");
        assert_eq!(context.voter.unwrap().zip, "12345");
        assert!(context.captcha_required);
        assert!(context.votes_cast.contains(&IdeaId::from(5u64)));
        assert_eq!(config.poll_increment, Duration::from_millis(500));
        assert_eq!(config.countdown_target, default_countdown_target());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_voter_needs_email_and_zip() {
        clear_env();
        env::set_var("OPENDEBATES_VOTER_EMAIL", "a@b.com");

        assert!(ClientConfig::from_env().unwrap().voter.is_none());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values() {
        clear_env();
        env::set_var("OPENDEBATES_REQUEST_TIMEOUT_SECS", "soon");
        assert!(matches!(
            ClientConfig::from_env(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "OPENDEBATES_REQUEST_TIMEOUT_SECS"
        ));

        for key in [
            "OPENDEBATES_REQUEST_TIMEOUT_SECS",
            "OPENDEBATES_POLL_INCREMENT_MS",
        ] {
            for raw in ["0", "-2000"] {
                clear_env();
                env::set_var(key, raw);
                assert!(matches!(
                    ClientConfig::from_env(),
                    Err(ConfigError::InvalidValue { key: bad, .. }) if bad == key
                ));
            }
        }

        clear_env();
        env::set_var("OPENDEBATES_VOTE_NEEDS_CAPTCHA", "maybe");
        assert!(ClientConfig::from_env().is_err());
        clear_env();
    }
}
