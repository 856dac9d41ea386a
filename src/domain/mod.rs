//! Domain types and rules of a vend session, free of any runtime concerns.

pub mod countdown;
pub mod event;
pub mod machine;
pub mod outcome;
pub mod ports;
pub mod receipt;
pub mod session;
pub mod settings;
pub mod transition;
