//! Asynchronous transform pipeline primitives.
//!
//! Everything long-running in the conversion core flows through this module:
//! [`map_unordered`] fans work out across a bounded number of cooperative
//! tasks, [`ConcurrencyPolicy`] decides how many, and [`FormatGovernor`]
//! watches optional post-processing and abandons it when it goes idle for
//! too long.

mod governor;
mod mapper;
mod policy;

pub use governor::{ActivityGuard, FormatGovernor};
pub use mapper::{MapError, Unordered, map_unordered};
pub use policy::ConcurrencyPolicy;
