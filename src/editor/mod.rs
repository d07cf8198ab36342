//! Diagram source editing.
//!
//! A rope-backed buffer with a character-based cursor, driven by the
//! application's message loop.

mod source;

pub use source::{Cursor, Direction, SourceEditor};
