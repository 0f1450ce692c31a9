//! Color transform pipeline: per-pixel shading and the snapshot it reads.

pub mod shading;
pub mod snapshot;
