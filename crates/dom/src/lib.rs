//! Page DOM - in-memory document tree for page scripts
//!
//! A small, deterministic stand-in for the document a browser hands to
//! page scripts: lookup by id and selector, inline styles, element
//! construction, markup fragments.
//!
//! ## Core Design
//!
//! ```text
//! markup → parser → DomArena (owned) → Document (lookups, mutation)
//!                        ↓
//!                   NodeId (u32)
//! ```

pub mod arena;
pub mod document;
pub mod error;
pub mod parser;
pub mod selector;
pub mod serializer;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use document::{Document, DocumentConfig};
pub use error::{DomError, Result};
pub use selector::Selector;
pub use serializer::DomSerializer;
pub use types::*;
