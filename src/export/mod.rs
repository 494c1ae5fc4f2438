//! Tick loop, disposal emulation, palette building and GIF encoding.

pub mod disposal;
pub mod encode;
pub mod palette;
pub mod session;
