//! HTTP handlers for mlb-analyzer.

pub mod metrics;
pub mod players;
pub mod provider_raw;
pub mod schedule;
pub mod self_test;
pub mod slate;
pub mod streaks;

pub use players::*;
pub use provider_raw::*;
pub use schedule::*;
pub use self_test::*;
pub use slate::*;
pub use streaks::*;
