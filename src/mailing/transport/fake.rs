use crate::mailing::error::RelayError;
use crate::mailing::relay::RelaySettings;
use crate::mailing::request::SenderCredentials;
use crate::mailing::transport::{OutgoingMessage, RelayConnector, RelaySession};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// What the fake relay went through, shared between the connector and its sessions.
#[derive(Debug, Default)]
pub struct FakeRelayJournal {
    pub connection_attempts: u8,
    pub authentications: Vec<String>,
    pub sent_messages: Vec<OutgoingMessage>,
    pub releases: u8,
}

/// A relay answering as scripted, for tests.
#[derive(Clone, Default)]
pub struct FakeRelay {
    failing_connections: u8,
    connection_error: Option<RelayError>,
    authentication_error: Option<RelayError>,
    rejected_recipients: HashSet<String>,
    journal: Arc<Mutex<FakeRelayJournal>>,
}

impl FakeRelay {
    /// The `count` first connections fail as if the relay were down.
    pub fn failing_connections(mut self, count: u8) -> Self {
        self.failing_connections = count;
        self
    }

    /// Every connection fails with this error.
    pub fn connection_error(mut self, error: RelayError) -> Self {
        self.connection_error = Some(error);
        self
    }

    pub fn authentication_error(mut self, error: RelayError) -> Self {
        self.authentication_error = Some(error);
        self
    }

    pub fn rejecting(mut self, recipient: &str) -> Self {
        self.rejected_recipients.insert(recipient.to_owned());
        self
    }

    pub fn journal(&self) -> std::sync::MutexGuard<'_, FakeRelayJournal> {
        self.journal.lock().unwrap()
    }
}

#[rocket::async_trait]
impl RelayConnector for FakeRelay {
    async fn connect(&self, _relay: &RelaySettings) -> Result<Box<dyn RelaySession>, RelayError> {
        let mut journal = self.journal();
        journal.connection_attempts += 1;
        if let Some(error) = &self.connection_error {
            return Err(error.clone());
        }
        if journal.connection_attempts <= self.failing_connections {
            return Err(RelayError::Unreachable("Connection refused".to_owned()));
        }

        Ok(Box::new(FakeSession {
            relay: self.clone(),
        }))
    }
}

struct FakeSession {
    relay: FakeRelay,
}

#[rocket::async_trait]
impl RelaySession for FakeSession {
    async fn authenticate(&mut self, credentials: &SenderCredentials) -> Result<(), RelayError> {
        self.relay
            .journal()
            .authentications
            .push(credentials.address().clone());
        match &self.relay.authentication_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn send(&mut self, message: &OutgoingMessage) -> Result<(), RelayError> {
        if self.relay.rejected_recipients.contains(message.to()) {
            return Err(RelayError::Delivery(format!(
                "550 5.1.1 <{}>: Recipient address rejected",
                message.to()
            )));
        }
        self.relay.journal().sent_messages.push(message.clone());
        Ok(())
    }

    async fn release(&mut self) -> Result<(), RelayError> {
        self.relay.journal().releases += 1;
        Ok(())
    }
}
