//! A [`session::DebugEngine`] that replays a recorded execution trace.
//!
//! A trace is the sequence of source positions a debuggee passed through,
//! with the call depth at each one. Stepping walks the trace the way a real
//! debugger would walk the program, which is enough to drive the front-end
//! without a debuggee.
mod breakpoint;
mod engine;
mod trace;

pub use breakpoint::Breakpoint;
pub use engine::ReplayEngine;
pub use trace::{Frame, ReplayError, Trace};
