//! Query application (verb module)
//!
//! CanonicalQuery + variables → interpolated, repaired backend payload.

mod apply;

pub use apply::QueryApplier;
