//! Core of the group relay bot.
//!
//! Routing, identity mapping and anonymity policy live here. The Telegram transport is an
//! adapter crate implementing [`messaging::port::MessagingPort`].

pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod menu;
pub mod messaging;
pub mod relay;

#[cfg(test)]
mod testing;

pub use errors::{Error, Result};
