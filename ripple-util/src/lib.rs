//! Utilities for `ripple`

// Modules
pub mod latch;
pub mod weak_vec;

// Exports
pub use self::{latch::Latch, weak_vec::WeakVec};
