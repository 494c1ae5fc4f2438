//! JSON project files for batch merges.

pub mod config;
