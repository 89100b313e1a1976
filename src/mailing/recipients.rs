use crate::mailing::error::ValidationError;
use crate::mailing::error::ValidationError::{BadFormat, Empty, TooMany};
use regex::Regex;
use std::sync::LazyLock;

pub const MAX_RECIPIENTS: usize = 10;
const RECIPIENTS_SEPARATOR: char = ',';

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Email regex should be valid")
});

/// Split the raw recipients field on commas, trim each part and drop empty ones.
/// The order of the input is preserved and duplicates are kept.
///
/// The count is checked before the format, so that an oversized list is refused
/// whatever its content.
pub fn parse_recipients(raw_recipients: &str) -> Result<Vec<String>, ValidationError> {
    let recipients = raw_recipients
        .split(RECIPIENTS_SEPARATOR)
        .map(str::trim)
        .filter(|recipient| !recipient.is_empty())
        .map(str::to_owned)
        .collect::<Vec<String>>();

    if recipients.is_empty() {
        return Err(Empty);
    }
    if recipients.len() > MAX_RECIPIENTS {
        return Err(TooMany);
    }

    let invalid_recipients = recipients
        .iter()
        .filter(|recipient| !is_email_shaped(recipient))
        .cloned()
        .collect::<Vec<String>>();
    if !invalid_recipients.is_empty() {
        return Err(BadFormat(invalid_recipients));
    }

    Ok(recipients)
}

/// Syntactic check only: it says nothing about deliverability.
pub fn is_email_shaped(candidate: &str) -> bool {
    EMAIL_REGEX.is_match(candidate)
}
