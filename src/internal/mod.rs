//! Internal implementation details.

pub(crate) mod circular;

pub use circular::DEFAULT_MAX_DEPTH;
pub(crate) use circular::{current_depth, ResolutionGuard};
