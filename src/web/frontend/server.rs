use crate::web::frontend::frontend_controller;
use crate::web::server::Server;
use rocket::fs::FileServer;
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;

const STATIC_FILES_FOLDER: &str = "./public/static";

/// Pages which don't involve the relay: the empty form, help and errors.
pub struct FrontendServer {}

impl FrontendServer {
    pub fn new() -> Self {
        Self {}
    }
}

impl Server for FrontendServer {
    fn configure(&self, rocket_build: Rocket<Build>) -> Rocket<Build> {
        rocket_build
            .mount(
                "/",
                routes![frontend_controller::index, frontend_controller::gmail_help],
            )
            .mount("/", FileServer::from(STATIC_FILES_FOLDER))
            .register("/", catchers![frontend_controller::not_found])
            .attach(Template::fairing())
    }
}
