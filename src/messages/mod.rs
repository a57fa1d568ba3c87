//! The numbered, severity-tagged message catalog and the [`MessageHandler`] trait
//! objects the search driver reports progress through.
//!
//! Every message the engine emits carries a stable numeric code, so a downstream tool
//! can match on codes rather than parsing English text. The default handler forwards
//! to the `log` crate at a level derived from the code's severity band.

use std::fmt;

pub mod catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    fn from_code(code: u32) -> Severity {
        match code {
            0..=2999 => Severity::Info,
            3000..=5999 => Severity::Warning,
            6000..=8999 => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub code: u32,
    pub severity: Severity,
    pub text: String,
}

impl Message {
    pub fn new(code: u32, text: impl Into<String>) -> Self {
        Message {
            code,
            severity: Severity::from_code(code),
            text: text.into(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:04}] {}", self.code, self.text)
    }
}

/// Receives every message the `Model` emits over the course of a solve.
///
/// Implementing this directly (rather than always going through `log`) is how an
/// embedder captures progress into something other than the process' log stream,
/// e.g. a UI progress bar or a structured event sink.
pub trait MessageHandler {
    fn handle(&mut self, message: &Message);
}

/// Default handler: forwards every message to the `log` crate at the level implied
/// by its severity band.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMessageHandler;

impl MessageHandler for LoggingMessageHandler {
    fn handle(&mut self, message: &Message) {
        match message.severity {
            Severity::Info => log::info!("{message}"),
            Severity::Warning => log::warn!("{message}"),
            Severity::Error => log::error!("{message}"),
            Severity::Fatal => log::error!("{message}"),
        }
    }
}

/// A handler that discards every message; useful for tests that only care about the
/// final solver outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentMessageHandler;

impl MessageHandler for SilentMessageHandler {
    fn handle(&mut self, _message: &Message) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_bands_match_code_ranges() {
        assert_eq!(Severity::from_code(30), Severity::Info);
        assert_eq!(Severity::from_code(3500), Severity::Warning);
        assert_eq!(Severity::from_code(7000), Severity::Error);
        assert_eq!(Severity::from_code(9002), Severity::Fatal);
    }
}
