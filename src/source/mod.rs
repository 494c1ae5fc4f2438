//! Source decoders: per-frame metadata plus RGBA decode-by-index.

pub mod decode;
pub mod memory;
