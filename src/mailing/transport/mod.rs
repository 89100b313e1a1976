use crate::mailing::error::RelayError;
use crate::mailing::relay::RelaySettings;
use crate::mailing::request::SenderCredentials;
use derive_getters::Getters;

#[cfg(test)]
pub mod fake;
pub mod smtp;

/// Opens sessions with a mail relay.
/// A connector holds no per-request state, so that a single one can be shared by all requests.
#[rocket::async_trait]
pub trait RelayConnector: Send + Sync {
    /// Reach the relay and secure the channel. No credentials are sent at this point.
    async fn connect(&self, relay: &RelaySettings) -> Result<Box<dyn RelaySession>, RelayError>;
}

/// An open, secured channel with a relay.
/// Dropping a session closes the underlying connection without saying goodbye;
/// [RelaySession::release] should be preferred whenever possible.
#[rocket::async_trait]
pub trait RelaySession: Send {
    async fn authenticate(&mut self, credentials: &SenderCredentials) -> Result<(), RelayError>;

    async fn send(&mut self, message: &OutgoingMessage) -> Result<(), RelayError>;

    async fn release(&mut self) -> Result<(), RelayError>;
}

/// A single message, addressed to a single recipient,
/// carrying both a plain text and an HTML variant of the body.
#[derive(Debug, Getters, PartialEq, Clone)]
pub struct OutgoingMessage {
    from: String,
    to: String,
    subject: String,
    text_body: String,
    html_body: String,
}

impl OutgoingMessage {
    pub fn new(
        from: String,
        to: String,
        subject: String,
        text_body: String,
        html_body: String,
    ) -> Self {
        Self {
            from,
            to,
            subject,
            text_body,
            html_body,
        }
    }
}
