use crate::web::server::Server;
use crate::web::submission::submission_controller;
use rocket::{Build, Rocket};

/// Routes receiving the send form. They rely on the relay connector managed by the main server.
pub struct SubmissionServer {}

impl SubmissionServer {
    pub fn new() -> Self {
        Self {}
    }
}

impl Server for SubmissionServer {
    fn configure(&self, rocket_build: Rocket<Build>) -> Rocket<Build> {
        rocket_build.mount(
            "/",
            routes![submission_controller::submit, submission_controller::send],
        )
    }
}
