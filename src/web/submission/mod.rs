pub mod send_form;
pub mod server;
pub mod submission_controller;
