use thiserror::Error;

/// Raised while turning the raw recipients field into a list of addresses.
/// Messages are shown as is to the user, next to the field.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ValidationError {
    #[error("Please enter at least one email address.")]
    Empty,
    #[error("Maximum {max} email recipients allowed.", max = crate::mailing::recipients::MAX_RECIPIENTS)]
    TooMany,
    #[error("Invalid email format: {}", .0.join(", "))]
    BadFormat(Vec<String>),
}

/// Failures reported by the relay transport.
/// Each variant carries the reason given by the relay or the network layer.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum RelayError {
    #[error("The relay can't be reached [reason: {0}]")]
    Unreachable(String),
    #[error("The secure channel with the relay can't be established [reason: {0}]")]
    Handshake(String),
    #[error("The relay rejected the credentials [reason: {0}]")]
    AuthenticationRejected(String),
    #[error("The relay refused the message [reason: {0}]")]
    Delivery(String),
    #[error("Unexpected relay failure [reason: {0}]")]
    Unexpected(String),
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum AuthError {
    #[error(
        "Gmail authentication failed. You must use an App Password, not your regular Gmail password. \
        Go to Google Account > Security > App passwords to create one. \
        See instructions on the form below."
    )]
    AppPasswordRequired,
    #[error("Authentication error: {0}. Please check your email and password.")]
    Rejected(String),
}

/// Errors aborting a whole batch before any message is sent.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum BulkSendError {
    #[error("Error connecting to email server: {reason}")]
    Connect { attempts: u8, reason: String },
    #[error(transparent)]
    Authentication(#[from] AuthError),
    #[error("Error connecting to email server: {0}")]
    Fatal(String),
}
