//! Error types

mod config;
mod fetch;
mod params;
mod stale;

pub use config::*;
pub use fetch::*;
pub use params::*;
pub use stale::*;
