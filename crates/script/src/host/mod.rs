//! Host environment - the capabilities a page script runs against
//!
//! Everything the script touches outside its own code goes through this
//! trait: the document tree, modal dialogs, navigation, the console and
//! the timer. Handlers take the host explicitly, so any implementation
//! (a real page, `FakeHost` in tests) can be substituted.

pub mod fake;

pub use fake::{DialogRecord, FakeHost, Navigation};

use async_trait::async_trait;
use page_dom::Document;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::Result;
use crate::events::EventBus;

/// Console severity (`console.log` / `info` / `warn` / `error`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsoleLevel {
    Log,
    Info,
    Warn,
    Error,
}

impl fmt::Display for ConsoleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConsoleLevel::Log => "log",
            ConsoleLevel::Info => "info",
            ConsoleLevel::Warn => "warn",
            ConsoleLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// Capability interface supplied by the page environment
#[async_trait]
pub trait Host: Send + Sync {
    /// The live document
    fn document(&self) -> &Document;

    fn document_mut(&mut self) -> &mut Document;

    /// Modal notification; returns once dismissed
    fn alert(&mut self, message: &str);

    /// Reload the current page
    fn reload(&mut self);

    /// Replace the current page with `url` (resolved against the current location)
    fn navigate(&mut self, url: &str) -> Result<()>;

    /// Fire-and-forget console output
    fn console(&mut self, level: ConsoleLevel, message: &str);

    /// Timer facility: resolves once `delay` has elapsed
    async fn sleep(&self, delay: Duration);

    /// Optional: route host activity onto a session's event bus
    fn attach_events(&mut self, bus: EventBus) {
        let _ = bus;
    }
}
