//! Command implementations for each file format

pub mod model;
pub mod static_mesh;
