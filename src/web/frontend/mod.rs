use rocket::form::Context;
use rocket::request::FlashMessage;
use rocket_dyn_templates::{Template, context};
use serde::Serialize;

pub mod frontend_controller;
pub mod server;

const TITLE: &str = "ArrayForms";

/// What the form template needs to display a flash message.
#[derive(Serialize, Debug, PartialEq)]
pub struct FlashView {
    kind: String,
    message: String,
}

impl From<FlashMessage<'_>> for FlashView {
    fn from(flash: FlashMessage<'_>) -> Self {
        Self {
            kind: flash.kind().to_owned(),
            message: flash.message().to_owned(),
        }
    }
}

/// Render the send form, filled with whatever `form` holds: previous values and field errors.
pub fn render_form(form: &Context<'_>, flash: Option<FlashView>, csrf_token: &str) -> Template {
    Template::render(
        "index",
        context! {
            title: TITLE,
            form: form,
            flash: flash,
            csrf_token: csrf_token,
        },
    )
}
