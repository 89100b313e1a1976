use log::error;
use std::fmt::Debug;

pub mod env_args;
pub mod logging;

/// Build a closure logging the error it receives along with `message`,
/// then returning `value_to_return`. Meant to be given to `map_err`.
pub fn log_message_and_return<E: Debug, T>(
    message: &str,
    value_to_return: T,
) -> impl FnOnce(E) -> T {
    move |e| {
        error!("{message}\n{e:#?}");
        value_to_return
    }
}
