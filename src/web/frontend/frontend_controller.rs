use crate::web::csrf::issue_token;
use crate::web::frontend::{FlashView, TITLE, render_form};
use rocket::Request;
use rocket::form::Context;
use rocket::http::CookieJar;
use rocket::request::FlashMessage;
use rocket_dyn_templates::{Template, context};

#[get("/")]
pub async fn index(cookies: &CookieJar<'_>, flash: Option<FlashMessage<'_>>) -> Template {
    render_form(
        &Context::default(),
        flash.map(FlashView::from),
        &issue_token(cookies),
    )
}

#[get("/gmail-help")]
pub async fn gmail_help() -> Template {
    Template::render(
        "gmail-help",
        context! {
            title: format!("{TITLE} - Gmail App Password"),
        },
    )
}

#[catch(404)]
pub async fn not_found(req: &Request<'_>) -> Template {
    Template::render(
        "error/404",
        context! {
            title: format!("{TITLE} - Page not found"),
            uri: req.uri().to_string(),
        },
    )
}
