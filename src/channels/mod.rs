//! Channel abstraction for message I/O.

pub mod telegram;

pub use telegram::{TelegramChannel, TelegramMessage, UpdateStream};
