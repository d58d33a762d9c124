//! Structured logging vocabulary and relay counters.

pub mod counters;
pub mod events;
pub mod fields;
