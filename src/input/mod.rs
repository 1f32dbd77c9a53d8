//! Event sources feeding the gesture router.

mod debug_events;

pub use debug_events::{parse_line, ParseError};
