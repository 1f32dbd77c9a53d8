//! Gesture daemon for touchpads and touchscreens.
//!
//! [`gesture`] turns multi-finger input into directional swipes and pinches,
//! [`input`] parses the `libinput debug-events` stream that feeds it, and
//! [`daemon`] binds triggered gestures to shell commands from `gebaard.toml`.

pub mod daemon;
pub mod gesture;
pub mod input;
