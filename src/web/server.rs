use crate::mailing::transport::RelayConnector;
use crate::tools::env_args::{retrieve_arg_value, retrieve_parsed_arg_value};
use crate::web::frontend::server::FrontendServer;
use crate::web::submission::server::SubmissionServer;
use log::warn;
use rocket::data::{Limits, ToByteUnit};
use rocket::figment::Figment;
use rocket::{Build, Rocket};
use std::env;

const PORT_ARG: &str = "--port";
const DEFAULT_PORT: u16 = 8000;
const SECRET_KEY_ARG: &str = "--secret-key";
const SECRET_KEY_ENV_VAR: &str = "SECRET_KEY";
const SECRET_KEY_MIN_LENGTH: usize = 32;
/// Message bodies are not limited, but the whole form has to fit in memory.
const FORM_LIMIT_MIB: u64 = 2;

pub trait Server {
    fn configure(&self, rocket_build: Rocket<Build>) -> Rocket<Build>;
}

/// The connector is shared by every request: it is the only state the servers manage.
pub fn build_server(connector: Box<dyn RelayConnector>) -> Rocket<Build> {
    let rocket_build = rocket::custom(build_figment()).manage(connector);

    let servers: Vec<Box<dyn Server>> = vec![
        Box::new(FrontendServer::new()),
        Box::new(SubmissionServer::new()),
    ];
    servers
        .iter()
        .fold(rocket_build, |rocket_build, server| server.configure(rocket_build))
}

pub fn build_figment() -> Figment {
    rocket::Config::figment()
        .merge(("port", get_port()))
        .merge(("limits", build_limits()))
        .merge(("secret_key", get_secret_key()))
}

fn get_port() -> u16 {
    retrieve_parsed_arg_value(PORT_ARG, DEFAULT_PORT)
}

fn build_limits() -> Limits {
    Limits::default().limit("form", FORM_LIMIT_MIB.mebibytes())
}

/// Material of the key signing cookies, and thus flash messages and CSRF tokens.
/// Looked up in args, then in the environment. Any passphrase is accepted:
/// Rocket derives the actual key from these bytes.
/// When none is provided, random material is generated: cookies then don't survive a restart.
fn get_secret_key() -> Vec<u8> {
    retrieve_arg_value(SECRET_KEY_ARG)
        .or_else(|| env::var(SECRET_KEY_ENV_VAR).ok())
        .filter(|passphrase| !passphrase.is_empty())
        .map(|passphrase| stretch_passphrase(&passphrase))
        .unwrap_or_else(|| {
            warn!("No secret key provided, using an ephemeral one. Flash messages won't survive a restart.");
            generate_secret_key()
        })
}

/// Rocket wants at least 32 bytes of material: shorter passphrases are repeated.
fn stretch_passphrase(passphrase: &str) -> Vec<u8> {
    let bytes = passphrase.as_bytes();
    bytes
        .iter()
        .cycle()
        .take(bytes.len().max(SECRET_KEY_MIN_LENGTH))
        .copied()
        .collect()
}

fn generate_secret_key() -> Vec<u8> {
    let key: [u8; SECRET_KEY_MIN_LENGTH] = rand::random();
    key.to_vec()
}
