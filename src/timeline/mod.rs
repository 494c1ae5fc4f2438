//! Mapping output ticks onto each item's own frame sequence.

pub mod resolver;
