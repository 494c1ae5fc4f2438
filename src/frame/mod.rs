//! RGBA pixel buffers with deferred affine transforms and hard-cutover compositing.

pub mod buffer;
pub(crate) mod resample;
