//! Bitcoin scripts.

pub mod deposit;
pub mod general;
