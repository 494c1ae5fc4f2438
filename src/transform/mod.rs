//! Affine helpers shared by frame baking.

pub mod affine;
