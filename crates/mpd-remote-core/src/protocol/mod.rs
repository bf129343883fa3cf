//! The daemon's text-line wire protocol.
//!
//! Commands are single lines; replies are zero or more `key: value` lines
//! terminated by `OK`, or a single `ACK …` error line. Spontaneous change
//! notifications are delivered through the `idle` command as
//! `changed: <subsystem>` lines.

pub mod command;
pub mod reply;
