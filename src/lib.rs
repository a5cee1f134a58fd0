//! notegram — relays Telegram messages into a note-capture inbox,
//! with optional AI headline/summary enrichment.

pub mod bot;
pub mod channels;
pub mod config;
pub mod error;
pub mod fetch;
pub mod inbox;
pub mod pipeline;
pub mod stats;
pub mod summarize;
