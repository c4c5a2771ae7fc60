//! Plume Runtime - frame loop building blocks
//!
//! - `SimClock` - simulation time with pause and fixed stepping
//! - `InputState` - keyboard tracking resolved to demo actions

mod clock;
mod input;

pub use clock::{SimClock, MAX_DELTA};
pub use input::{DemoAction, InputState};
