//! Messenger abstractions (Telegram is the only adapter).

pub mod port;
pub mod throttled;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;
