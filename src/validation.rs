//! Tweet acceptability rules.
//!
//! Pure functions: no store access, no metrics. Rules are evaluated in a
//! fixed order and the first failure wins.
//!
//! The body-length rule strips "well-formed" link tokens before counting:
//! `http://` or `https://` at a word boundary, one or more non-whitespace
//! characters, and a single trailing space. The trailing space is part of
//! the pattern on purpose. A link at the very end of the text (no trailing
//! space) is not stripped and its full length counts toward the 140-char
//! body limit, as does a link glued to the preceding word ("pagehttp://...",
//! no word boundary). That quirk is contractual and pinned by tests.

use crate::error::{ChirpError, Result};
use crate::model::{TWEET_MAX_LENGTH, TWEET_MAX_LENGTH_WITH_LINKS};
use once_cell::sync::Lazy;
use regex::Regex;

/// A URL token followed by a single trailing space.
static LINK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bhttps?://\S+ ").expect("link pattern must compile"));

/// Length of `text` in characters with every well-formed link token removed.
///
/// Counts Unicode scalar values, not bytes. No trimming or normalization
/// is applied.
#[must_use]
pub fn body_length(text: &str) -> usize {
    LINK_PATTERN.replace_all(text, "").chars().count()
}

/// Decide whether a candidate tweet is acceptable.
///
/// Rules, in order (first failure wins):
/// 1. `publisher` must be non-empty.
/// 2. `text` must be non-empty and its link-stripped body at most
///    [`TWEET_MAX_LENGTH`] characters.
/// 3. The raw `text`, links included, must be at most
///    [`TWEET_MAX_LENGTH_WITH_LINKS`] characters.
///
/// # Errors
///
/// Returns `EmptyPublisher`, `TextTooLongOrEmpty`, or `TextExceedsHardLimit`
/// accordingly.
pub fn validate(publisher: &str, text: &str) -> Result<()> {
    if publisher.is_empty() {
        return Err(ChirpError::EmptyPublisher);
    }

    let body_length = body_length(text);
    if text.is_empty() || body_length > TWEET_MAX_LENGTH {
        return Err(ChirpError::TextTooLongOrEmpty { body_length });
    }

    let raw_length = text.chars().count();
    if raw_length > TWEET_MAX_LENGTH_WITH_LINKS {
        return Err(ChirpError::TextExceedsHardLimit { length: raw_length });
    }

    Ok(())
}
