use crate::mailing::bulk_send::send_bulk;
use crate::mailing::outcome::{OutcomeClass, SendOutcome};
use crate::mailing::transport::RelayConnector;
use crate::tools::log_message_and_return;
use crate::web::csrf::{issue_token, is_token_valid};
use crate::web::frontend::render_form;
use crate::web::submission::send_form::SendForm;
use log::{debug, warn};
use rocket::State;
use rocket::form::{Contextual, Form};
use rocket::http::{CookieJar, Status};
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::{Template, context};

const WARNING: &str = "warning";
const DANGER: &str = "danger";
const EXPIRED_FORM_MESSAGE: &str = "The form has expired. Please submit it again.";

#[derive(Responder)]
pub enum Submission {
    Sent(Template),
    Invalid((Status, Template)),
    Redirected(Flash<Redirect>),
}

/// Validate the send form, then relay the message to every recipient.
/// An invalid form is rendered again with its errors. Anything but a full success
/// sends the user back to the form with a flash message.
#[post("/", data = "<form>")]
pub async fn submit<'r>(
    connector: &State<Box<dyn RelayConnector>>,
    cookies: &CookieJar<'_>,
    form: Form<Contextual<'r, SendForm>>,
) -> Submission {
    let Some(send_form) = &form.value else {
        debug!("Invalid send form, rendering it again");
        let page = render_form(&form.context, None, &issue_token(cookies));
        return Submission::Invalid((form.context.status(), page));
    };

    if !is_token_valid(cookies, send_form.csrf_token()) {
        warn!("Send form refused, its CSRF token doesn't match the browser session");
        return redirect(DANGER, EXPIRED_FORM_MESSAGE.to_owned());
    }

    let request = match send_form.to_request() {
        Ok(request) => request,
        Err(error) => {
            let flash = redirect(DANGER, error.to_string());
            return log_message_and_return("Send form can't be turned into a request", flash)(error);
        }
    };

    match send_bulk(connector.inner().as_ref(), &request).await {
        Ok(outcome) => report(outcome),
        Err(error) => redirect(DANGER, error.to_string()),
    }
}

/// Kept for old bookmarks and forms.
#[post("/send")]
pub async fn send() -> Redirect {
    Redirect::to(uri!("/"))
}

fn report(outcome: SendOutcome) -> Submission {
    match outcome.classify() {
        OutcomeClass::FullSuccess { sent } => Submission::Sent(Template::render(
            "success",
            context! {
                title: "ArrayForms - Emails sent",
                recipient_count: sent,
                outcome: &outcome,
            },
        )),
        OutcomeClass::PartialSuccess {
            sent,
            attempted,
            failed_recipients,
        } => redirect(
            WARNING,
            format!(
                "Partially successful: {sent} of {attempted} emails sent. Failed recipients: {}",
                failed_recipients.join(", ")
            ),
        ),
        OutcomeClass::TotalFailure => redirect(DANGER, "Failed to send any emails.".to_owned()),
    }
}

fn redirect(kind: &str, message: String) -> Submission {
    Submission::Redirected(Flash::new(Redirect::to(uri!("/")), kind, message))
}
