use crate::mailing::error::RelayError;
use crate::mailing::relay::RelaySettings;
use crate::mailing::request::SenderCredentials;
use crate::mailing::transport::{OutgoingMessage, RelayConnector, RelaySession};
use log::debug;
use mail_send::mail_builder::MessageBuilder;
use mail_send::{Credentials, SmtpClient, SmtpClientBuilder};
use rocket::tokio::io::{AsyncRead, AsyncWrite};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_HELO_HOST: &str = "localhost";

/// Reach relays on their submission port, then upgrade the channel with STARTTLS.
pub struct SmtpRelayConnector {
    timeout: Duration,
    helo_host: String,
}

impl Default for SmtpRelayConnector {
    fn default() -> Self {
        Self {
            timeout: CONNECT_TIMEOUT,
            helo_host: DEFAULT_HELO_HOST.to_owned(),
        }
    }
}

#[rocket::async_trait]
impl RelayConnector for SmtpRelayConnector {
    async fn connect(&self, relay: &RelaySettings) -> Result<Box<dyn RelaySession>, RelayError> {
        // EHLO is postponed to authentication, as the server capabilities are only needed there.
        let client = SmtpClientBuilder::new(relay.host().clone(), *relay.port())
            .implicit_tls(false)
            .say_ehlo(false)
            .helo_host(self.helo_host.clone())
            .timeout(self.timeout)
            .connect()
            .await
            .map_err(connection_failure)?;

        debug!("Connected to relay [relay: {relay}]");
        Ok(Box::new(SmtpRelaySession {
            client: Some(client),
            helo_host: self.helo_host.clone(),
        }))
    }
}

struct SmtpRelaySession<T: AsyncRead + AsyncWrite + Unpin> {
    /// Emptied once the session has been released.
    client: Option<SmtpClient<T>>,
    helo_host: String,
}

#[rocket::async_trait]
impl<T> RelaySession for SmtpRelaySession<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn authenticate(&mut self, credentials: &SenderCredentials) -> Result<(), RelayError> {
        let client = self.client.as_mut().ok_or_else(released_session)?;
        let capabilities = client
            .ehlo(&self.helo_host)
            .await
            .map_err(authentication_failure)?;
        let credentials = Credentials::new(
            credentials.address().clone(),
            credentials.password().clone(),
        );
        client
            .authenticate(&credentials, &capabilities)
            .await
            .map_err(authentication_failure)?;

        Ok(())
    }

    async fn send(&mut self, message: &OutgoingMessage) -> Result<(), RelayError> {
        let client = self.client.as_mut().ok_or_else(released_session)?;
        match client.send(build_message(message)).await {
            Ok(()) => Ok(()),
            Err(error) => {
                // A refused recipient leaves the mail transaction open,
                // which would make the relay refuse the next MAIL FROM.
                if let Err(reset_error) = client.rset().await {
                    debug!("Mail transaction has not been reset: {reset_error}");
                }
                Err(RelayError::Delivery(error.to_string()))
            }
        }
    }

    async fn release(&mut self) -> Result<(), RelayError> {
        match self.client.take() {
            Some(mut client) => client
                .quit()
                .await
                .map_err(|error| RelayError::Unexpected(error.to_string())),
            None => Ok(()),
        }
    }
}

/// Both variants of the body are attached, which makes a `multipart/alternative` message.
fn build_message(message: &OutgoingMessage) -> MessageBuilder<'_> {
    MessageBuilder::new()
        .from(message.from().as_str())
        .to(message.to().as_str())
        .subject(message.subject().as_str())
        .text_body(message.text_body().as_str())
        .html_body(message.html_body().as_str())
}

/// Network failures, timeouts and transient refusals (4xx greetings, such as
/// `421 Service not available`) are worth another try. Anything else,
/// such as a failed TLS negotiation, is not.
fn connection_failure(error: mail_send::Error) -> RelayError {
    match &error {
        mail_send::Error::Io(_)
        | mail_send::Error::Timeout
        | mail_send::Error::UnparseableReply => RelayError::Unreachable(error.to_string()),
        mail_send::Error::UnexpectedReply(reply) if reply.code / 100 == 4 => {
            RelayError::Unreachable(error.to_string())
        }
        _ => RelayError::Handshake(error.to_string()),
    }
}

fn authentication_failure(error: mail_send::Error) -> RelayError {
    match &error {
        mail_send::Error::AuthenticationFailed(_)
        | mail_send::Error::UnexpectedReply(_)
        | mail_send::Error::UnsupportedAuthMechanism => {
            RelayError::AuthenticationRejected(error.to_string())
        }
        _ => RelayError::Unexpected(error.to_string()),
    }
}

fn released_session() -> RelayError {
    RelayError::Unexpected("The session has already been released".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use rocket::tokio::net::TcpListener as AsyncTcpListener;
    use rocket::tokio::task::JoinHandle;
    use std::io::ErrorKind;
    use std::net::TcpListener;

    fn closed_local_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    /// What a scripted relay received during its single session.
    #[derive(Debug, Default)]
    struct RelayTranscript {
        commands: Vec<String>,
        delivered_to: Vec<String>,
    }

    /// Serve a single SMTP session on a local port, without TLS.
    /// RCPT TO for `rejected_recipient` is refused, and MAIL FROM is refused while a
    /// transaction is still open, as real relays do.
    async fn scripted_relay(
        greeting: &'static str,
        rejected_recipient: &'static str,
    ) -> (u16, JoinHandle<RelayTranscript>) {
        let listener = AsyncTcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = rocket::tokio::spawn(async move {
            let mut transcript = RelayTranscript::default();
            let (socket, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = socket.into_split();
            let mut lines = BufReader::new(reader).lines();
            writer.write_all(greeting.as_bytes()).await.unwrap();

            let mut transaction_open = false;
            let mut current_recipient = String::new();
            while let Some(line) = lines.next_line().await.unwrap() {
                transcript.commands.push(line.clone());
                let command = line.to_uppercase();
                let reply = if command.starts_with("EHLO") {
                    "250-localhost\r\n250 AUTH PLAIN\r\n"
                } else if command.starts_with("AUTH") {
                    "235 2.7.0 Authentication successful\r\n"
                } else if command.starts_with("MAIL FROM") {
                    if transaction_open {
                        "503 5.5.1 Error: nested MAIL command\r\n"
                    } else {
                        transaction_open = true;
                        "250 2.1.0 Ok\r\n"
                    }
                } else if command.starts_with("RCPT TO") {
                    current_recipient = line[9..line.len() - 1].to_owned();
                    if current_recipient == rejected_recipient {
                        "550 5.1.1 Recipient address rejected\r\n"
                    } else {
                        "250 2.1.5 Ok\r\n"
                    }
                } else if command == "DATA" {
                    writer.write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n").await.unwrap();
                    while let Some(data_line) = lines.next_line().await.unwrap() {
                        if data_line == "." {
                            break;
                        }
                    }
                    transaction_open = false;
                    transcript.delivered_to.push(current_recipient.clone());
                    "250 2.0.0 Ok: queued\r\n"
                } else if command == "RSET" {
                    transaction_open = false;
                    "250 2.0.0 Ok\r\n"
                } else if command == "QUIT" {
                    writer.write_all(b"221 2.0.0 Bye\r\n").await.unwrap();
                    break;
                } else {
                    "502 5.5.2 Error: command not recognized\r\n"
                };
                writer.write_all(reply.as_bytes()).await.unwrap();
            }

            transcript
        });

        (port, handle)
    }

    async fn plain_session(port: u16) -> SmtpRelaySession<rocket::tokio::net::TcpStream> {
        let client = SmtpClientBuilder::new("127.0.0.1".to_owned(), port)
            .say_ehlo(false)
            .timeout(Duration::from_secs(5))
            .connect_plain()
            .await
            .unwrap();

        SmtpRelaySession {
            client: Some(client),
            helo_host: DEFAULT_HELO_HOST.to_owned(),
        }
    }

    fn message_to(recipient: &str) -> OutgoingMessage {
        OutgoingMessage::new(
            "jon.doe@example.org".to_owned(),
            recipient.to_owned(),
            "This is a subject".to_owned(),
            "Hi".to_owned(),
            "<p>Hi</p>".to_owned(),
        )
    }

    #[async_test]
    async fn should_go_on_sending_after_a_rejected_recipient() {
        let (port, relay) = scripted_relay("220 localhost ESMTP\r\n", "b@email.com").await;
        let mut session = plain_session(port).await;
        let credentials =
            SenderCredentials::new("jon.doe@example.org".to_owned(), "s3cr3t".to_owned());

        session.authenticate(&credentials).await.unwrap();
        let first = session.send(&message_to("a@email.com")).await;
        let second = session.send(&message_to("b@email.com")).await;
        let third = session.send(&message_to("c@email.com")).await;
        session.release().await.unwrap();

        assert_eq!(Ok(()), first);
        assert!(matches!(second, Err(RelayError::Delivery(_))));
        assert_eq!(Ok(()), third);
        let transcript = relay.await.unwrap();
        assert_eq!(vec!["a@email.com", "c@email.com"], transcript.delivered_to);
        assert!(transcript.commands.iter().any(|command| command == "RSET"));
        assert_eq!(Some(&"QUIT".to_owned()), transcript.commands.last());
    }

    #[async_test]
    async fn should_not_send_once_released() {
        let (port, relay) = scripted_relay("220 localhost ESMTP\r\n", "b@email.com").await;
        let mut session = plain_session(port).await;

        session.release().await.unwrap();
        let result = session.send(&message_to("a@email.com")).await;

        assert!(matches!(result, Err(RelayError::Unexpected(_))));
        assert_eq!(vec!["QUIT".to_owned()], relay.await.unwrap().commands);
    }

    #[async_test]
    async fn should_retry_busy_relay() {
        let (port, _relay) =
            scripted_relay("421 4.3.2 Service not available\r\n", "b@email.com").await;
        let relay = RelaySettings::new("127.0.0.1".to_owned(), port);

        let result = SmtpRelayConnector::default().connect(&relay).await;

        assert!(matches!(result, Err(RelayError::Unreachable(_))));
    }

    #[async_test]
    async fn should_not_retry_relay_refusing_service() {
        let (port, _relay) =
            scripted_relay("554 5.7.1 No SMTP service here\r\n", "b@email.com").await;
        let relay = RelaySettings::new("127.0.0.1".to_owned(), port);

        let result = SmtpRelayConnector::default().connect(&relay).await;

        assert!(matches!(result, Err(RelayError::Handshake(_))));
    }

    #[async_test]
    async fn should_not_connect_to_closed_port() {
        let relay = RelaySettings::new("127.0.0.1".to_owned(), closed_local_port());

        let result = SmtpRelayConnector::default().connect(&relay).await;

        assert!(matches!(result, Err(RelayError::Unreachable(_))));
    }

    #[test]
    fn should_build_multipart_message() {
        let message = OutgoingMessage::new(
            "jon.doe@example.org".to_owned(),
            "jonette.snow@email.com".to_owned(),
            "This is a subject".to_owned(),
            "Hi".to_owned(),
            "<b>Hi</b>".to_owned(),
        );

        let builder = build_message(&message);

        assert!(builder.text_body.is_some());
        assert!(builder.html_body.is_some());
    }

    #[test]
    fn should_retry_network_failures_only() {
        let refused = mail_send::Error::Io(std::io::Error::from(ErrorKind::ConnectionRefused));
        let reset = mail_send::Error::Io(std::io::Error::from(ErrorKind::ConnectionReset));

        assert!(matches!(connection_failure(refused), RelayError::Unreachable(_)));
        assert!(matches!(connection_failure(reset), RelayError::Unreachable(_)));
        assert!(matches!(
            connection_failure(mail_send::Error::Timeout),
            RelayError::Unreachable(_)
        ));
        assert!(matches!(
            connection_failure(mail_send::Error::MissingStartTls),
            RelayError::Handshake(_)
        ));
    }

    #[test]
    fn should_classify_authentication_failures() {
        let disconnected = mail_send::Error::Io(std::io::Error::from(ErrorKind::BrokenPipe));

        assert!(matches!(
            authentication_failure(mail_send::Error::UnsupportedAuthMechanism),
            RelayError::AuthenticationRejected(_)
        ));
        assert!(matches!(
            authentication_failure(disconnected),
            RelayError::Unexpected(_)
        ));
    }
}
