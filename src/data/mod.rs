//! Live orbital element data: catalog parsing, allow-list filtering and loading

mod allowlist;
mod catalog;
mod loader;
mod satellite;

pub use allowlist::*;
pub use catalog::*;
pub use loader::*;
pub use satellite::*;
