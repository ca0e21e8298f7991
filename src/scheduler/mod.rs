//! Timed refresh of live bodies
//!
//! [`RefreshScheduler`] owns one fixed-delay timer per body and is driven
//! cooperatively by calling `poll`. [`LiveFeed`] runs a scheduler on a worker
//! thread for callers that do not want propagation on their own thread.

pub(crate) mod refresh;
mod worker;

pub use refresh::*;
pub use worker::*;
