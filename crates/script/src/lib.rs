//! SCos page script
//!
//! The interaction handler behind the SCos browser demo page: button
//! handlers that restyle and extend the document, modal notifications,
//! navigation requests and one timed load.
//!
//! # Architecture
//!
//! 1. **Explicit host**: every capability (document, dialogs, navigation,
//!    console, timer) comes from a `Host`, never from globals
//! 2. **Enums over closures**: listeners are `Action` values
//! 3. **Terminal means consumed**: reload/navigate take the session by value

pub mod browser_info;
pub mod config;
pub mod error;
pub mod events;
pub mod handler;
pub mod host;
pub mod listeners;
pub mod loader;
pub mod session;

pub use browser_info::{greet_user, BrowserInfo};
pub use config::PageConfig;
pub use error::{PageError, Result};
pub use events::{EventBus, PageEvent};
pub use handler::{Outcome, PageHandler};
pub use host::{ConsoleLevel, FakeHost, Host};
pub use listeners::{Action, DomEventType, ListenerRegistry};
pub use loader::{load_data, report_load};
pub use session::{PageSession, ReadyState};
