//! Application layer driving vend sessions.
//!
//! `VendSessionController` applies the transition table to one session at a
//! time. `SessionRunner` gives it a single tokio task to live on, so commands,
//! transport events and countdown ticks are handled strictly one after another.

pub mod controller;
pub mod runner;
