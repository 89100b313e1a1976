mod mailing;
mod tools;
mod web;

#[macro_use]
extern crate rocket;

use crate::mailing::transport::smtp::SmtpRelayConnector;
use crate::tools::logging::init_logger;
use crate::web::start_servers;

#[launch]
fn rocket() -> _ {
    init_logger();

    start_servers(Box::new(SmtpRelayConnector::default()))
}
