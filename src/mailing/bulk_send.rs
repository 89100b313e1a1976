use crate::mailing::error::{AuthError, BulkSendError, RelayError};
use crate::mailing::outcome::{OutcomeClass, SendOutcome};
use crate::mailing::relay::{RelaySettings, select_relay, sender_domain};
use crate::mailing::request::{SendRequest, SenderCredentials};
use crate::mailing::transport::{OutgoingMessage, RelayConnector, RelaySession};
use log::{debug, error, info, warn};

pub const MAX_CONNECTION_ATTEMPTS: u8 = 3;

const APP_PASSWORD_DOMAIN_MARKER: &str = "gmail";
const CREDENTIALS_REJECTION_MARKERS: &[&str] =
    &["Username and Password not accepted", "BadCredentials"];

/// Relay every message of the request, one recipient at a time, on a single connection.
///
/// A recipient the relay refuses is recorded and the batch goes on.
/// Only connection and authentication problems abort the batch, before anything is sent.
pub async fn send_bulk(
    connector: &dyn RelayConnector,
    request: &SendRequest,
) -> Result<SendOutcome, BulkSendError> {
    let sender_address = request.sender().address();
    info!(
        "Starting to send emails to {} recipients from {sender_address}",
        request.recipients().len()
    );

    let relay = select_relay(sender_address);
    let connected_relay = connect(connector, &relay, MAX_CONNECTION_ATTEMPTS).await?;
    let authenticated_relay = connected_relay.authenticate(request.sender()).await?;
    let outcome = authenticated_relay.send_batch(request).await;

    match outcome.classify() {
        OutcomeClass::FullSuccess { sent } => info!("All {sent} emails sent successfully"),
        OutcomeClass::PartialSuccess {
            sent, attempted, ..
        } => warn!("Partially successful: {sent} of {attempted} emails sent"),
        OutcomeClass::TotalFailure => error!("Failed to send any emails"),
    }

    Ok(outcome)
}

/// Open a session with the relay.
/// Only network failures are retried, up to `max_attempts` attempts in total.
pub async fn connect(
    connector: &dyn RelayConnector,
    relay: &RelaySettings,
    max_attempts: u8,
) -> Result<ConnectedRelay, BulkSendError> {
    let mut last_reason = String::new();
    for attempt in 1..=max_attempts {
        match connector.connect(relay).await {
            Ok(session) => return Ok(ConnectedRelay { session }),
            Err(RelayError::Unreachable(reason)) => {
                warn!("SMTP connection attempt {attempt} failed [relay: {relay}, reason: {reason}]");
                last_reason = reason;
            }
            Err(error) => {
                error!("Can't connect to relay [relay: {relay}]\n{error:#?}");
                return Err(BulkSendError::Fatal(error.to_string()));
            }
        }
    }

    error!("Giving up connecting to relay after {max_attempts} attempts [relay: {relay}]");
    Err(BulkSendError::Connect {
        attempts: max_attempts,
        reason: last_reason,
    })
}

/// A session which reached the relay, but which hasn't proven its identity yet.
pub struct ConnectedRelay {
    session: Box<dyn RelaySession>,
}

impl ConnectedRelay {
    /// On failure, the session is released before the error is returned.
    pub async fn authenticate(
        mut self,
        credentials: &SenderCredentials,
    ) -> Result<AuthenticatedRelay, BulkSendError> {
        match self.session.authenticate(credentials).await {
            Ok(()) => {
                debug!("Authenticated onto relay [sender: {}]", credentials.address());
                Ok(AuthenticatedRelay {
                    session: self.session,
                })
            }
            Err(relay_error) => {
                release(self.session.as_mut()).await;
                Err(classify_authentication_failure(
                    credentials.address(),
                    relay_error,
                ))
            }
        }
    }
}

/// A session ready to carry messages.
pub struct AuthenticatedRelay {
    session: Box<dyn RelaySession>,
}

impl AuthenticatedRelay {
    /// Send one message per recipient, in order, then release the session.
    pub async fn send_batch(mut self, request: &SendRequest) -> SendOutcome {
        let mut outcome = SendOutcome::default();
        for recipient in request.recipients() {
            let message = OutgoingMessage::new(
                request.sender().address().clone(),
                recipient.clone(),
                request.subject().clone(),
                request.plain_body().clone(),
                request.html_body().clone(),
            );
            match self.session.send(&message).await {
                Ok(()) => {
                    info!("Email sent to {recipient}");
                    outcome.record_success();
                }
                Err(relay_error) => {
                    error!("Failed to send email to {recipient}: {relay_error}");
                    outcome.record_failure(recipient.clone());
                }
            }
        }

        release(self.session.as_mut()).await;
        outcome
    }
}

/// Say goodbye to the relay. Failing to do so changes nothing for the user.
async fn release(session: &mut dyn RelaySession) {
    if let Err(relay_error) = session.release().await {
        debug!("Relay session has not been released cleanly: {relay_error}");
    }
}

fn classify_authentication_failure(sender_address: &str, relay_error: RelayError) -> BulkSendError {
    match relay_error {
        RelayError::AuthenticationRejected(reason) => {
            error!("Authentication error [sender: {sender_address}, reason: {reason}]");
            let needs_app_password = sender_domain(sender_address)
                .contains(APP_PASSWORD_DOMAIN_MARKER)
                && CREDENTIALS_REJECTION_MARKERS
                    .iter()
                    .any(|marker| reason.contains(marker));
            if needs_app_password {
                AuthError::AppPasswordRequired.into()
            } else {
                AuthError::Rejected(reason).into()
            }
        }
        relay_error => {
            error!("Relay failed during authentication [sender: {sender_address}]\n{relay_error:#?}");
            BulkSendError::Fatal(relay_error.to_string())
        }
    }
}
