use crate::mailing::error::ValidationError;
use crate::mailing::recipients::{is_email_shaped, parse_recipients};
use crate::mailing::request::{SendRequest, SenderCredentials};
use rocket::form;
use std::fmt::{Debug, Formatter};

/// The send form, as posted by the browser.
#[derive(FromForm)]
pub struct SendForm {
    #[field(validate = sender_address())]
    sender_email: String,
    #[field(validate = required("Please enter your password or app password."))]
    sender_password: String,
    #[field(validate = recipients())]
    emails: String,
    #[field(validate = required("Please enter an email subject."))]
    subject: String,
    #[field(validate = required("Please enter an email body."))]
    body: String,
    /// Checked by the controller against the token of the browser session.
    csrf_token: Option<String>,
}

impl SendForm {
    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn to_request(&self) -> Result<SendRequest, ValidationError> {
        let sender = SenderCredentials::new(
            self.sender_email.trim().to_owned(),
            self.sender_password.clone(),
        );
        SendRequest::new(
            sender,
            &self.emails,
            self.subject.clone(),
            self.body.clone(),
        )
    }
}

impl Debug for SendForm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SendForm {{sender_email={}, sender_password=MASKED, emails={}, subject={}}}",
            self.sender_email, self.emails, self.subject
        )
    }
}

fn required<'v>(value: &str, message: &'static str) -> form::Result<'v, ()> {
    if value.trim().is_empty() {
        Err(form::Error::validation(message))?;
    }

    Ok(())
}

fn sender_address<'v>(value: &str) -> form::Result<'v, ()> {
    required(value, "Please enter your email address.")?;
    if !is_email_shaped(value.trim()) {
        Err(form::Error::validation("Please enter a valid email address."))?;
    }

    Ok(())
}

fn recipients<'v>(value: &str) -> form::Result<'v, ()> {
    required(value, "Please enter recipient email addresses.")?;
    parse_recipients(value).map_err(|error| form::Error::validation(error.to_string()))?;

    Ok(())
}
