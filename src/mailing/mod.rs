pub mod bulk_send;
pub mod error;
pub mod outcome;
pub mod recipients;
pub mod relay;
pub mod request;
pub mod sanitizer;
pub mod transport;
