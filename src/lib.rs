//! Terminal chat client.
//!
//! User text is posted to a chat endpoint, each reply fills a placeholder
//! reserved at submission time, and replies are revealed one character at a
//! time.

pub mod app;
pub mod client;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod events;
pub mod logging;
pub mod reveal;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;
