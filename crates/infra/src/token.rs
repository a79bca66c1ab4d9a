//! Invite token generation.

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

use veridoc_core::{EngineError, EngineResult};
use veridoc_invites::InviteToken;

const SUFFIX_LEN: usize = 24;
const MAX_ATTEMPTS: usize = 8;

/// Generate an invite token: millisecond timestamp, a dash, then a random
/// alphanumeric suffix. The timestamp keeps tokens roughly sortable; the
/// suffix carries the entropy.
pub fn generate_invite_token() -> InviteToken {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();
    InviteToken::new(format!("{}-{}", Utc::now().timestamp_millis(), suffix))
}

/// Generate a token not present in `existing`, with bounded retries.
///
/// Uniqueness is validated, not assumed. Collisions are effectively
/// impossible at this entropy, so exhausting the retry budget signals a
/// broken randomness source rather than bad luck.
pub fn issue_unique_token<F>(is_taken: F) -> EngineResult<InviteToken>
where
    F: Fn(&InviteToken) -> bool,
{
    for _ in 0..MAX_ATTEMPTS {
        let token = generate_invite_token();
        if !is_taken(&token) {
            return Ok(token);
        }
    }
    Err(EngineError::conflict(
        "invite token collision retries exhausted",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_have_timestamp_prefix_and_suffix() {
        let token = generate_invite_token();
        let raw = token.as_str();
        let (prefix, suffix) = raw.split_once('-').unwrap();
        assert!(prefix.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn consecutive_tokens_differ() {
        assert_ne!(generate_invite_token(), generate_invite_token());
    }

    #[test]
    fn unique_issue_skips_taken_tokens() {
        let token = issue_unique_token(|_| false).unwrap();
        assert!(!token.as_str().is_empty());
    }

    #[test]
    fn exhausted_retries_is_a_conflict() {
        let err = issue_unique_token(|_| true).unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }
}
