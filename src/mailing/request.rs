use crate::mailing::error::ValidationError;
use crate::mailing::recipients::parse_recipients;
use crate::mailing::sanitizer::sanitize_html;
use derive_getters::Getters;
use std::fmt::{Debug, Formatter};

#[derive(Getters, PartialEq, Clone)]
pub struct SenderCredentials {
    address: String,
    password: String,
}

impl SenderCredentials {
    pub fn new(address: String, password: String) -> Self {
        Self { address, password }
    }
}

impl Debug for SenderCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SenderCredentials {{address={}, password=MASKED}}",
            self.address
        )
    }
}

/// Everything needed to relay one message to a list of recipients.
#[derive(Debug, Getters, Clone)]
pub struct SendRequest {
    sender: SenderCredentials,
    recipients: Vec<String>,
    subject: String,
    plain_body: String,
    html_body: String,
}

impl SendRequest {
    /// Parse the raw recipients and derive the HTML variant of the body.
    /// The plain text variant is the body as typed.
    pub fn new(
        sender: SenderCredentials,
        raw_recipients: &str,
        subject: String,
        body: String,
    ) -> Result<Self, ValidationError> {
        let recipients = parse_recipients(raw_recipients)?;
        let html_body = sanitize_html(&body);
        Ok(Self {
            sender,
            recipients,
            subject,
            plain_body: body,
            html_body,
        })
    }
}

#[cfg(test)]
impl SendRequest {
    pub fn with_recipients(recipients: &[&str]) -> Self {
        Self::from_sender("jon.doe@example.org", recipients)
    }

    pub fn from_sender(sender_address: &str, recipients: &[&str]) -> Self {
        Self::new(
            SenderCredentials::new(sender_address.to_owned(), "s3cr3t".to_owned()),
            &recipients.join(","),
            "This is a subject".to_owned(),
            "<p>This is a body</p>".to_owned(),
        )
        .unwrap()
    }
}
