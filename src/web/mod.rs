use crate::mailing::transport::RelayConnector;
use crate::web::server::build_server;
use rocket::{Build, Rocket};

mod csrf;
mod frontend;
mod server;
mod submission;

pub fn start_servers(connector: Box<dyn RelayConnector>) -> Rocket<Build> {
    build_server(connector)
}
